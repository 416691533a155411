//! Common traits for terp.
//!
//! The moderation queue lives in the web application's database; these
//! traits are the only way the utilities reach it.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::PendingCounts;

// ═══════════════════════════════════════════════════════════════════════════════
// MODERATION QUEUE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Read access to items awaiting admin verification.
///
/// Implementations might use:
/// - The application's ORM (production)
/// - Fixed counts (CLI, testing)
#[async_trait]
pub trait ModerationQueue: Send + Sync {
    /// Number of professors with pending status.
    async fn pending_professors(&self) -> Result<u64>;

    /// Number of reviews with pending status.
    async fn pending_reviews(&self) -> Result<u64>;
}

#[async_trait]
impl ModerationQueue for PendingCounts {
    async fn pending_professors(&self) -> Result<u64> {
        Ok(self.professors)
    }

    async fn pending_reviews(&self) -> Result<u64> {
        Ok(self.reviews)
    }
}
