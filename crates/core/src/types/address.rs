//! Shipping destination for a cart or checkout.

use serde::{Deserialize, Serialize};

/// Destination address as reported by the host platform's customer session.
///
/// Only the fields the restriction engine evaluates are carried; street
/// lines and recipient details stay with the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// ISO country code, e.g. `US`.
    #[serde(default)]
    pub country: String,
    /// Two-letter state code, e.g. `CA`.
    #[serde(default)]
    pub state: String,
    /// City name, compared case-insensitively.
    #[serde(default)]
    pub city: String,
    /// ZIP code, compared as an exact string.
    #[serde(default)]
    pub postcode: String,
}

impl ShippingAddress {
    /// Convenience constructor for a US address.
    #[must_use]
    pub fn us(state: &str, city: &str, postcode: &str) -> Self {
        Self {
            country: "US".to_string(),
            state: state.to_string(),
            city: city.to_string(),
            postcode: postcode.to_string(),
        }
    }

    /// Whether this address can be evaluated at all.
    ///
    /// Restrictions only apply to US addresses with a known state; anything
    /// else short-circuits to "no restriction".
    #[must_use]
    pub fn is_evaluable(&self) -> bool {
        self.country == "US" && !self.state.is_empty()
    }
}
