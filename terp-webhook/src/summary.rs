//! Message body for the updates webhook.

use serde::{Deserialize, Serialize};

/// Which parts of the queue a summary covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateScope {
    /// Include the unverified professor count
    pub professors: bool,
    /// Include the unverified review count
    pub reviews: bool,
}

impl Default for UpdateScope {
    fn default() -> Self {
        Self {
            professors: true,
            reviews: true,
        }
    }
}

impl UpdateScope {
    /// Only professors.
    pub fn professors_only() -> Self {
        Self {
            professors: true,
            reviews: false,
        }
    }

    /// Only reviews.
    pub fn reviews_only() -> Self {
        Self {
            professors: false,
            reviews: true,
        }
    }
}

/// Builds the summary title from whichever counts were gathered.
///
/// `None` means the count is out of scope. With neither count the title is
/// empty.
pub fn summary_title(professors: Option<u64>, reviews: Option<u64>) -> String {
    let mut title = String::new();
    if let Some(n) = professors {
        title.push_str(&format!("{n} unverified professor(s)"));
    }
    if professors.is_some() && reviews.is_some() {
        title.push_str(" and ");
    }
    if let Some(n) = reviews {
        title.push_str(&format!("{n} unverified review(s)"));
    }
    title
}

/// A chat embed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Embed title
    pub title: String,
    /// Embed body
    pub description: String,
    /// Link opened when the title is clicked
    pub url: String,
}

/// Webhook request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookMessage {
    /// Embeds shown in the message
    pub embeds: Vec<Embed>,
}

impl WebhookMessage {
    /// A single-embed message linking to the admin page.
    pub fn summary(title: String, admin_url: &str) -> Self {
        Self {
            embeds: vec![Embed {
                title,
                description: "\n".into(),
                url: admin_url.to_string(),
            }],
        }
    }
}
