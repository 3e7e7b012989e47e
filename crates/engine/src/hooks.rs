//! Cart and checkout validation entry points.
//!
//! The host calls these at two moments: when the cart contents or address
//! change (legacy notice path) and when the checkout order is about to be
//! placed (blocking validation path). Both walk the cart through the
//! evaluator and format the same shopper-facing notice block.

use tracing::{info, instrument};

use ship_restrict_core::{CartItem, RestrictedItem, ShippingAddress};

use crate::restriction::Evaluator;

/// Header line shown above the per-item reasons.
pub const CART_ERRORS_HEADER: &str =
    "Some items in your cart cannot be shipped to your address:";

/// Checkout integration surface.
pub struct CheckoutHooks {
    evaluator: Evaluator,
}

impl CheckoutHooks {
    #[must_use]
    pub const fn new(evaluator: Evaluator) -> Self {
        Self { evaluator }
    }

    /// Blocking validation errors for order placement.
    ///
    /// Empty means the order may proceed. Otherwise the first entry is the
    /// header and each following entry is one restricted item's reason.
    #[instrument(skip(self, cart))]
    #[must_use]
    pub fn collect_validation_errors(
        &self,
        cart: &[CartItem],
        address: &ShippingAddress,
    ) -> Vec<String> {
        let restricted = self.evaluator.restricted_cart_items(cart, address);
        if restricted.is_empty() {
            return Vec::new();
        }
        info!(count = restricted.len(), "Blocking checkout on restricted items");
        Self::format_notices(&restricted)
    }

    /// Non-blocking notices for the cart page, re-run whenever the cart or
    /// address changes.
    #[must_use]
    pub fn cart_items_changed(
        &self,
        cart: &[CartItem],
        address: &ShippingAddress,
    ) -> Vec<String> {
        let restricted = self.evaluator.restricted_cart_items(cart, address);
        if restricted.is_empty() {
            return Vec::new();
        }
        Self::format_notices(&restricted)
    }

    fn format_notices(restricted: &[RestrictedItem]) -> Vec<String> {
        let mut notices = Vec::with_capacity(restricted.len() + 1);
        notices.push(CART_ERRORS_HEADER.to_string());
        for item in restricted {
            notices.push(item.reason.clone());
        }
        notices
    }
}
