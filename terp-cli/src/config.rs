//! Settings for the `notify` command, gathered from flags and the environment.

use anyhow::{bail, Result};

use terp_core::constants::{ADMIN_URL_ENV, DEFAULT_WEBHOOK_TIMEOUT_SECS};
use terp_webhook::{UpdateScope, WebhookConfig};

/// Loads `.env` from the working directory, if present.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

#[derive(Clone, Debug)]
pub struct NotifySettings {
    pub webhook: WebhookConfig,
    pub admin_url: String,
    pub scope: UpdateScope,
}

impl NotifySettings {
    pub fn resolve(
        webhook_url: Option<String>,
        admin_url: Option<String>,
        timeout_seconds: Option<u64>,
        skip_professors: bool,
        skip_reviews: bool,
    ) -> Result<Self> {
        let Some(admin_url) = admin_url.filter(|u| !u.trim().is_empty()) else {
            bail!("admin URL missing: pass --admin-url or set {ADMIN_URL_ENV}");
        };

        let webhook = WebhookConfig {
            url: webhook_url.filter(|u| !u.trim().is_empty()),
            timeout_seconds: timeout_seconds.unwrap_or(DEFAULT_WEBHOOK_TIMEOUT_SECS),
        };

        Ok(Self {
            webhook,
            admin_url,
            scope: UpdateScope {
                professors: !skip_professors,
                reviews: !skip_reviews,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_admin_url() {
        assert!(NotifySettings::resolve(None, None, None, false, false).is_err());
        assert!(NotifySettings::resolve(None, Some("  ".into()), None, false, false).is_err());
    }

    #[test]
    fn test_empty_webhook_disables_posting() {
        let settings = NotifySettings::resolve(
            Some(String::new()),
            Some("https://example.com/admin".into()),
            None,
            false,
            true,
        )
        .unwrap();
        assert!(settings.webhook.url.is_none());
        assert_eq!(settings.webhook.timeout_seconds, DEFAULT_WEBHOOK_TIMEOUT_SECS);
        assert_eq!(settings.scope, UpdateScope::professors_only());
    }
}
