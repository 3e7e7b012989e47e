//! Per-cart-item restriction evaluation.
//!
//! Precedence, stopping at the first restricting match:
//!
//! 1. Variation-level spec (when the line has a variation)
//! 2. Product-level spec
//! 3. Category/tag rules, in store order
//!
//! Evaluation never raises into the checkout flow: any internal storage
//! failure degrades to "not restricted" for that item.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use ship_restrict_core::{
    CartItem, RestrictedItem, RestrictionSpec, RuleLogic, ShippingAddress, Verdict,
};

use crate::settings::SettingsRecord;
use crate::store::{Catalog, MetaField, MetaOwner, MetadataStore, SettingsStore, StoreError};

use super::matcher::match_spec;

/// The restriction evaluator service.
///
/// Holds the storage gateways it reads live cart configuration through;
/// construct one per request scope.
pub struct Evaluator {
    settings: Arc<dyn SettingsStore>,
    metadata: Arc<dyn MetadataStore>,
    catalog: Arc<dyn Catalog>,
}

impl Evaluator {
    #[must_use]
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        metadata: Arc<dyn MetadataStore>,
        catalog: Arc<dyn Catalog>,
    ) -> Self {
        Self {
            settings,
            metadata,
            catalog,
        }
    }

    /// Evaluate one cart item against the destination address.
    ///
    /// Returns a not-restricted verdict for any non-US address or when the
    /// state is missing, regardless of configuration.
    #[must_use]
    pub fn evaluate_item(&self, item: &CartItem, address: &ShippingAddress) -> Verdict {
        let record = match self.settings.load() {
            Ok(record) => record,
            Err(error) => {
                warn!(%error, "Settings unavailable, treating item as not restricted");
                return Verdict::not_restricted();
            }
        };
        self.evaluate_with(&record, item, address)
    }

    /// Evaluate every cart line, collecting the restricted ones with their
    /// formatted shopper-facing reasons.
    #[instrument(skip(self, cart))]
    #[must_use]
    pub fn restricted_cart_items(
        &self,
        cart: &[CartItem],
        address: &ShippingAddress,
    ) -> Vec<RestrictedItem> {
        if !address.is_evaluable() {
            info!("Skipping restriction check: not a US address or state missing");
            return Vec::new();
        }

        let record = match self.settings.load() {
            Ok(record) => record,
            Err(error) => {
                warn!(%error, "Settings unavailable, skipping restriction check");
                return Vec::new();
            }
        };

        let mut restricted = Vec::new();
        for item in cart {
            let verdict = self.evaluate_with(&record, item, address);
            if verdict.restricted {
                let product_name = self.display_name(item);
                warn!(product = %product_name, reason = %verdict.reason, "Restricted item in cart");
                restricted.push(RestrictedItem {
                    product_id: item.product_id,
                    product_name,
                    reason: verdict.reason,
                });
            }
        }
        restricted
    }

    fn evaluate_with(
        &self,
        record: &SettingsRecord,
        item: &CartItem,
        address: &ShippingAddress,
    ) -> Verdict {
        if !address.is_evaluable() {
            return Verdict::not_restricted();
        }

        match self.find_restriction(record, item, address) {
            Ok(Some(qualifier)) => {
                let product_name = self.display_name(item);
                let rendered = record
                    .message_template()
                    .replace("{product}", &product_name);
                Verdict::restricted(format!("{rendered} ({qualifier})"))
            }
            Ok(None) => Verdict::not_restricted(),
            Err(error) => {
                warn!(
                    product_id = %item.product_id,
                    %error,
                    "Evaluation failed, treating item as not restricted"
                );
                Verdict::not_restricted()
            }
        }
    }

    /// The qualifier describing why the item is restricted, or `None`.
    fn find_restriction(
        &self,
        record: &SettingsRecord,
        item: &CartItem,
        address: &ShippingAddress,
    ) -> Result<Option<String>, StoreError> {
        // 1. Variation-level
        if let Some(variation_id) = item.variation_id {
            let spec = self.load_item_spec(MetaOwner::Variation(variation_id))?;
            if let Some(matched) = match_spec(address, &spec) {
                debug!(%variation_id, "Variation-level restriction matched");
                return Ok(Some(matched.qualifier()));
            }
        }

        // 2. Product-level
        let spec = self.load_item_spec(MetaOwner::Product(item.product_id))?;
        if let Some(matched) = match_spec(address, &spec) {
            debug!(product_id = %item.product_id, "Product-level restriction matched");
            return Ok(Some(matched.qualifier()));
        }

        // 3. Category/tag rules
        self.apply_rules(record, item, address)
    }

    fn apply_rules(
        &self,
        record: &SettingsRecord,
        item: &CartItem,
        address: &ShippingAddress,
    ) -> Result<Option<String>, StoreError> {
        debug!(
            rule_count = record.rules.len(),
            product_id = %item.product_id,
            "Checking rules for product"
        );

        for rule in &record.rules {
            let product_terms = self
                .catalog
                .product_terms(item.product_id, rule.target_kind)?;
            if !product_terms.contains(&rule.term_id) {
                continue;
            }
            debug!(rule = %rule.name, product_id = %item.product_id, "Rule targets product");

            if let Some(matched) = match_spec(address, &rule.spec) {
                match rule.logic {
                    RuleLogic::BlockFrom => {
                        return Ok(Some(format!("{} via rule: {}", matched.qualifier(), rule.name)));
                    }
                    RuleLogic::AllowOnly => {
                        // This rule permits the address; later rules may
                        // still restrict.
                        debug!(rule = %rule.name, "Location allowed by rule");
                    }
                }
            } else if rule.logic == RuleLogic::AllowOnly {
                return Ok(Some(format!(
                    "Location not in allowed list for rule: {}",
                    rule.name
                )));
            }
        }
        Ok(None)
    }

    /// Item-level spec from the three metadata fields, migrating legacy
    /// comma-joined values to structured form as they are encountered.
    fn load_item_spec(&self, owner: MetaOwner) -> Result<RestrictionSpec, StoreError> {
        Ok(RestrictionSpec {
            states: self.load_field(owner, MetaField::States)?.into_iter().collect(),
            cities: self.load_field(owner, MetaField::Cities)?.into_iter().collect(),
            zip_codes: self
                .load_field(owner, MetaField::ZipCodes)?
                .into_iter()
                .collect(),
            state_cities: Vec::new(),
        })
    }

    fn load_field(&self, owner: MetaOwner, field: MetaField) -> Result<Vec<String>, StoreError> {
        let Some(stored) = self.metadata.read(owner, field)? else {
            return Ok(Vec::new());
        };
        let legacy = stored.is_legacy();
        let items = stored.into_items();
        if legacy {
            debug!(?owner, key = field.key(), "Migrating legacy comma-joined value");
            if let Err(error) = self.metadata.write(owner, field, &items) {
                // Migration is best-effort; the normalized items still
                // drive this evaluation.
                warn!(?owner, key = field.key(), %error, "Legacy value migration failed");
            }
        }
        Ok(items)
    }

    fn display_name(&self, item: &CartItem) -> String {
        match self.catalog.product_name(item.product_id) {
            Ok(Some(name)) => name,
            Ok(None) => format!("Product #{}", item.product_id),
            Err(error) => {
                warn!(product_id = %item.product_id, %error, "Product name lookup failed");
                format!("Product #{}", item.product_id)
            }
        }
    }
}
