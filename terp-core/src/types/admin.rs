//! Admin moderation vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TerpError};

// ═══════════════════════════════════════════════════════════════════════════════
// ADMIN ACTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// An action submitted from the admin moderation page.
///
/// Serialized as its snake_case code (`"professor_merge"`), which is what
/// the admin forms post.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    // Review actions
    /// Mark a review as verified or rejected.
    ReviewVerify,
    /// Flag a review for a second opinion.
    ReviewHelp,

    // Professor actions
    /// Mark a professor as verified or rejected.
    ProfessorVerify,
    /// Edit a professor's details.
    ProfessorEdit,
    /// Merge a duplicate professor into another.
    ProfessorMerge,
    /// Delete a professor.
    ProfessorDelete,
    /// Change a professor's slug.
    ProfessorSlug,
}

impl AdminAction {
    /// Every action, review actions first.
    pub const ALL: [AdminAction; 7] = [
        AdminAction::ReviewVerify,
        AdminAction::ReviewHelp,
        AdminAction::ProfessorVerify,
        AdminAction::ProfessorEdit,
        AdminAction::ProfessorMerge,
        AdminAction::ProfessorDelete,
        AdminAction::ProfessorSlug,
    ];

    /// Wire code of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            AdminAction::ReviewVerify => "review_verify",
            AdminAction::ReviewHelp => "review_help",
            AdminAction::ProfessorVerify => "professor_verify",
            AdminAction::ProfessorEdit => "professor_edit",
            AdminAction::ProfessorMerge => "professor_merge",
            AdminAction::ProfessorDelete => "professor_delete",
            AdminAction::ProfessorSlug => "professor_slug",
        }
    }

    /// True for actions that act on a review.
    pub fn is_review_action(self) -> bool {
        matches!(self, AdminAction::ReviewVerify | AdminAction::ReviewHelp)
    }

    /// True for actions that act on a professor.
    pub fn is_professor_action(self) -> bool {
        !self.is_review_action()
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminAction {
    type Err = TerpError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| TerpError::UnknownAdminAction(s.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REVIEWS TABLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Columns of the admin reviews table, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReviewsTableColumn {
    /// Course, professor and reviewer details.
    Information = 1,
    /// Review text.
    Review = 2,
    /// Verification status.
    Status = 3,
    /// Action buttons.
    Action = 4,
}

impl ReviewsTableColumn {
    /// Every column in display order.
    pub const ALL: [ReviewsTableColumn; 4] = [
        ReviewsTableColumn::Information,
        ReviewsTableColumn::Review,
        ReviewsTableColumn::Status,
        ReviewsTableColumn::Action,
    ];

    /// 1-based position of the column.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Header label.
    pub fn label(self) -> &'static str {
        match self {
            ReviewsTableColumn::Information => "Information",
            ReviewsTableColumn::Review => "Review",
            ReviewsTableColumn::Status => "Status",
            ReviewsTableColumn::Action => "Action",
        }
    }
}
