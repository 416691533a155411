//! # terp core
//!
//! Core types, errors, and traits shared by the terp admin-backend crates.
//!
//! - **Types**: semesters, admin moderation actions, review-table columns
//! - **Errors**: a single error enum with context
//! - **Constants**: season codes, recent semesters, cache defaults
//! - **Traits**: the moderation queue the webhook summary reads from
//!
//! ## Example
//!
//! ```rust
//! use terp_core::{semester_name, semester_number};
//!
//! assert_eq!(semester_name("202012").unwrap(), "Winter 2021");
//! assert_eq!(semester_number("Winter 2021").unwrap(), "202012");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod messages;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{Result, TerpError};
pub use messages::slug_in_use_err;
pub use traits::*;
pub use types::*;
