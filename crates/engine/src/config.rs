//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHIPRESTRICT_LICENSE_ENDPOINT` - Licensing API base URL
//!   (default: `https://keyforge.dev/api/v1/public`)
//! - `SHIPRESTRICT_SITE_NAME` - Installation display name, used as part of
//!   the device name during activation (default: `Ship Restrict`)
//! - `SHIPRESTRICT_SITE_URL` - Installation URL, used as part of the device
//!   name during activation (default: `http://localhost`)

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Licensing product identifier, fixed per release channel.
pub const KEYFORGE_PRODUCT_ID: &str = "p_bg74trwu1aa8d801q35qri5z";

/// Default licensing API base URL.
pub const DEFAULT_LICENSE_ENDPOINT: &str = "https://keyforge.dev/api/v1/public";

/// Outbound license call timeout. Never retried within a request.
pub const LICENSE_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Installation identity used to label license activations.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Human-readable site name.
    pub name: String,
    /// Public site URL.
    pub url: String,
}

impl SiteConfig {
    /// Device display name sent on activation: site name + URL.
    #[must_use]
    pub fn device_name(&self) -> String {
        format!("{} ({})", self.name, self.url)
    }
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Licensing API base URL.
    pub license_endpoint: Url,
    /// Licensing product identifier.
    pub product_id: String,
    /// Installation identity.
    pub site: SiteConfig,
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns an error if `SHIPRESTRICT_LICENSE_ENDPOINT` is set but is
    /// not a valid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = std::env::var("SHIPRESTRICT_LICENSE_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_LICENSE_ENDPOINT.to_string());
        let license_endpoint = Url::parse(&endpoint).map_err(|e| {
            ConfigError::InvalidEnvVar("SHIPRESTRICT_LICENSE_ENDPOINT".to_string(), e.to_string())
        })?;

        let name = std::env::var("SHIPRESTRICT_SITE_NAME")
            .unwrap_or_else(|_| "Ship Restrict".to_string());
        let url =
            std::env::var("SHIPRESTRICT_SITE_URL").unwrap_or_else(|_| "http://localhost".to_string());

        Ok(Self {
            license_endpoint,
            product_id: KEYFORGE_PRODUCT_ID.to_string(),
            site: SiteConfig { name, url },
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            license_endpoint: Url::parse(DEFAULT_LICENSE_ENDPOINT)
                .unwrap_or_else(|_| unreachable!("default endpoint is a valid URL")),
            product_id: KEYFORGE_PRODUCT_ID.to_string(),
            site: SiteConfig {
                name: "Ship Restrict".to_string(),
                url: "http://localhost".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_name_combines_site_name_and_url() {
        let site = SiteConfig {
            name: "Example Shop".to_string(),
            url: "https://example.test".to_string(),
        };
        assert_eq!(site.device_name(), "Example Shop (https://example.test)");
    }

    #[test]
    fn default_config_uses_keyforge_endpoint() {
        let config = EngineConfig::default();
        assert_eq!(config.license_endpoint.as_str(), "https://keyforge.dev/api/v1/public");
        assert_eq!(config.product_id, KEYFORGE_PRODUCT_ID);
    }
}
