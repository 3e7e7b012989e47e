//! License state and remote check outcomes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single validate or activate call.
///
/// Network failures never surface as errors; they come back as an invalid
/// check with a descriptive message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseCheck {
    pub valid: bool,
    pub error: String,
    pub product_id: String,
}

impl LicenseCheck {
    /// A successful check.
    #[must_use]
    pub fn valid(product_id: &str) -> Self {
        Self {
            valid: true,
            error: String::new(),
            product_id: product_id.to_string(),
        }
    }

    /// A failed check with a reason.
    #[must_use]
    pub fn invalid(error: impl Into<String>, product_id: &str) -> Self {
        Self {
            valid: false,
            error: error.into(),
            product_id: product_id.to_string(),
        }
    }
}

/// Persisted license state, stored inside the settings record.
///
/// `valid` is re-derived at most once per cache window unless the key
/// itself changes or an explicit save occurs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseState {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub last_checked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub product_id: String,
}

impl LicenseState {
    /// Whether the last remote check, either outcome, is still within
    /// `ttl` at `now`. A cached failure is cached too; it does not trigger
    /// a recheck on every access.
    #[must_use]
    pub fn checked_within(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.last_checked_at
            .is_some_and(|checked| now - checked < ttl)
    }

    /// Record the outcome of a remote check.
    pub fn record_check(&mut self, check: &LicenseCheck, now: DateTime<Utc>) {
        self.valid = check.valid;
        self.last_checked_at = Some(now);
        self.error = check.error.clone();
        self.product_id = check.product_id.clone();
    }
}
