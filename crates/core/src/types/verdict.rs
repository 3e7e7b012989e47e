//! Evaluator inputs and outcomes.

use serde::{Deserialize, Serialize};

use super::id::{ProductId, VariationId};

/// One line of the host platform's cart, reduced to what evaluation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<VariationId>,
}

impl CartItem {
    /// A simple (non-variable) product line.
    #[must_use]
    pub const fn product(product_id: ProductId) -> Self {
        Self {
            product_id,
            variation_id: None,
        }
    }

    /// A variation line.
    #[must_use]
    pub const fn variation(product_id: ProductId, variation_id: VariationId) -> Self {
        Self {
            product_id,
            variation_id: Some(variation_id),
        }
    }
}

/// The evaluator's restricted/not-restricted outcome for one cart item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub restricted: bool,
    /// Shopper-facing reason; empty when not restricted.
    pub reason: String,
}

impl Verdict {
    /// The item may ship.
    #[must_use]
    pub const fn not_restricted() -> Self {
        Self {
            restricted: false,
            reason: String::new(),
        }
    }

    /// The item may not ship, with a shopper-facing reason.
    #[must_use]
    pub fn restricted(reason: impl Into<String>) -> Self {
        Self {
            restricted: true,
            reason: reason.into(),
        }
    }
}

/// A restricted cart line collected for checkout notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictedItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub reason: String,
}
