//! Webhook client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use terp_core::constants::{DEFAULT_WEBHOOK_TIMEOUT_SECS, WEBHOOK_URL_ENV};
use terp_core::error::{Result, TerpError};
use terp_core::traits::ModerationQueue;

use crate::summary::{summary_title, UpdateScope, WebhookMessage};

/// Webhook client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Webhook endpoint; `None` disables posting
    pub url: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_seconds: DEFAULT_WEBHOOK_TIMEOUT_SECS,
        }
    }
}

impl WebhookConfig {
    /// Creates config posting to `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Reads the endpoint from `WEBHOOK_URL_UPDATE`; unset or empty disables posting.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var(WEBHOOK_URL_ENV).ok().filter(|u| !u.trim().is_empty()),
            ..Default::default()
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// What [`UpdatesWebhook::send_updates`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// No endpoint configured; nothing was queried or sent.
    Skipped,
    /// The summary was accepted by the endpoint.
    Sent {
        /// Title of the posted embed
        title: String,
    },
}

/// Posts moderation-queue summaries.
pub struct UpdatesWebhook {
    endpoint: Option<Url>,
    http_client: reqwest::Client,
}

impl UpdatesWebhook {
    /// Creates a client, validating the configured endpoint.
    pub fn with_config(config: WebhookConfig) -> Result<Self> {
        let endpoint = config.url.as_deref().map(parse_http_url).transpose()?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| TerpError::HttpError(e.to_string()))?;

        Ok(Self {
            endpoint,
            http_client,
        })
    }

    /// Whether an endpoint is configured.
    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Counts the in-scope queues and posts a summary linking to `admin_url`.
    ///
    /// Returns [`SendOutcome::Skipped`] without touching the queue when no
    /// endpoint is configured.
    #[instrument(skip(self, queue))]
    pub async fn send_updates(
        &self,
        queue: &dyn ModerationQueue,
        admin_url: &str,
        scope: UpdateScope,
    ) -> Result<SendOutcome> {
        let Some(endpoint) = &self.endpoint else {
            debug!("No updates webhook configured, skipping");
            return Ok(SendOutcome::Skipped);
        };

        let admin_url = parse_http_url(admin_url)?;

        let professors = if scope.professors {
            Some(queue.pending_professors().await?)
        } else {
            None
        };
        let reviews = if scope.reviews {
            Some(queue.pending_reviews().await?)
        } else {
            None
        };

        let title = summary_title(professors, reviews);
        let message = WebhookMessage::summary(title.clone(), admin_url.as_str());

        let response = self
            .http_client
            .post(endpoint.clone())
            .json(&message)
            .send()
            .await
            .map_err(|e| TerpError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Webhook rejected summary");
            return Err(TerpError::WebhookRejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(%title, "Posted moderation summary");
        Ok(SendOutcome::Sent { title })
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| TerpError::ConfigError(format!("invalid URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TerpError::ConfigError(format!(
            "URL '{raw}' must use http or https, not {other}"
        ))),
    }
}
