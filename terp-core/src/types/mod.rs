//! Domain types for terp.
//!
//! - [`Semester`] / [`Season`]: academic terms and their two textual encodings
//! - [`AdminAction`]: moderation actions posted from the admin page
//! - [`ReviewsTableColumn`]: columns of the admin reviews table
//! - [`PendingCounts`]: snapshot of the moderation queue

mod admin;
mod queue;
mod semester;

pub use admin::*;
pub use queue::*;
pub use semester::*;
