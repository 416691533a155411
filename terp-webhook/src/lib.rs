//! Moderation-queue summaries for the admin chat channel.
//!
//! Counts pending professors and reviews through a
//! [`terp_core::ModerationQueue`] and posts a one-embed message linking to
//! the admin page.

mod summary;
mod webhook;

pub use summary::{summary_title, Embed, UpdateScope, WebhookMessage};
pub use webhook::{SendOutcome, UpdatesWebhook, WebhookConfig};
