//! The persisted settings record.
//!
//! One structured value per installation holding the message template, the
//! rule sequence, and the license state. The record is always read-modify-
//! written as a whole; concurrent writers race last-writer-wins, which is
//! tolerated because the record is advisory configuration.

use serde::{Deserialize, Serialize};

use ship_restrict_core::{LicenseState, Rule};

/// Default shopper-facing message; `{product}` is replaced with the
/// product's display name.
pub const DEFAULT_MESSAGE_TEMPLATE: &str =
    "The {product} cannot currently be shipped to your location. Please remove from cart to continue.";

/// The whole settings record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    /// Admin-configured message template; empty means use the default.
    #[serde(default)]
    pub message: String,
    /// Restriction rules in evaluation order.
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// License key and cached check outcome.
    #[serde(default)]
    pub license: LicenseState,
}

impl SettingsRecord {
    /// The message template in effect: the admin's, or the default when
    /// blank.
    #[must_use]
    pub fn message_template(&self) -> &str {
        let trimmed = self.message.trim();
        if trimmed.is_empty() {
            DEFAULT_MESSAGE_TEMPLATE
        } else {
            trimmed
        }
    }

    /// Sanitize the record before persisting: trim the message and drop
    /// rules whose name is blank.
    pub fn sanitize(&mut self) {
        self.message = self.message.trim().to_string();
        self.rules.retain(|rule| !rule.name.trim().is_empty());
    }
}
