//! Rule store: validated creation, deletion, and admin display views.
//!
//! Every mutation persists the full rule sequence back through the
//! settings gateway. Rules are never updated in place; the admin deletes
//! and re-adds.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use ship_restrict_core::{
    us_states, RestrictionSpec, Rule, RuleId, RuleLogic, TermId,
};

use crate::settings::SettingsRecord;
use crate::store::{Catalog, SettingsStore, StoreError};

/// Maximum rules on an unlicensed installation.
pub const FREE_RULE_LIMIT: usize = 2;

/// Maximum products carrying item-level restrictions on an unlicensed
/// installation.
pub const FREE_PRODUCT_LIMIT: usize = 2;

/// Why a rule mutation was rejected.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Rule name is required")]
    MissingName,

    #[error("Term {0} does not resolve to a category or tag")]
    UnknownTerm(TermId),

    #[error("Rule limit reached ({limit}); upgrade to add more rules")]
    LimitReached { limit: usize },

    #[error("Rule not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validated input for a new rule.
#[derive(Debug, Clone)]
pub struct NewRule {
    pub name: String,
    pub term_id: TermId,
    pub logic: RuleLogic,
    pub spec: RestrictionSpec,
}

/// One rule prepared for admin display.
#[derive(Debug, Clone)]
pub struct RuleView {
    pub rule: Rule,
    /// Snapshot index at render time, carried by legacy delete forms.
    pub index: usize,
    /// Resolved target name, or `(Deleted)` when the term is gone.
    pub target_name: String,
}

/// The rule store service.
pub struct RuleStore {
    settings: Arc<dyn SettingsStore>,
    catalog: Arc<dyn Catalog>,
}

impl RuleStore {
    #[must_use]
    pub fn new(settings: Arc<dyn SettingsStore>, catalog: Arc<dyn Catalog>) -> Self {
        Self { settings, catalog }
    }

    /// Whether the installation currently holds a valid license.
    ///
    /// Reads the persisted flag; freshness is the license manager's
    /// concern, not checked here.
    #[must_use]
    pub fn is_pro_active(&self, record: &SettingsRecord) -> bool {
        record.license.valid
    }

    /// Rule ceiling in effect for this record.
    #[must_use]
    pub fn rule_limit(&self, record: &SettingsRecord) -> usize {
        if self.is_pro_active(record) {
            usize::MAX
        } else {
            FREE_RULE_LIMIT
        }
    }

    /// Product-restriction ceiling in effect for this record.
    #[must_use]
    pub fn product_limit(&self, record: &SettingsRecord) -> usize {
        if self.is_pro_active(record) {
            usize::MAX
        } else {
            FREE_PRODUCT_LIMIT
        }
    }

    /// Add a validated rule and persist the sequence.
    ///
    /// The target term is resolved once here; its kind is stored on the
    /// rule and never re-derived during evaluation. State codes that are
    /// not recognized US states are filtered out.
    ///
    /// # Errors
    ///
    /// Rejects a blank name, an unresolvable term, or an unlicensed
    /// installation already at the rule ceiling.
    pub fn add_rule(&self, new_rule: NewRule) -> Result<Rule, RuleError> {
        let name = new_rule.name.trim().to_string();
        if name.is_empty() {
            return Err(RuleError::MissingName);
        }

        let term = self
            .catalog
            .resolve_term(new_rule.term_id)?
            .ok_or(RuleError::UnknownTerm(new_rule.term_id))?;

        let mut record = self.settings.load()?;
        let limit = self.rule_limit(&record);
        if record.rules.len() >= limit {
            return Err(RuleError::LimitReached { limit });
        }

        let mut spec = new_rule.spec;
        spec.states.retain(|code| {
            let known = us_states::is_valid_code(code);
            if !known {
                warn!(%code, "Dropping unrecognized state code from rule");
            }
            known
        });

        let rule = Rule {
            id: RuleId::generate(),
            name,
            target_kind: term.kind,
            term_id: term.id,
            logic: new_rule.logic,
            spec,
        };
        debug!(rule = %rule.name, target = %term.name, "Adding rule");

        record.rules.push(rule.clone());
        record.sanitize();
        self.settings.save(&record)?;
        Ok(rule)
    }

    /// Delete a rule by its stable id and persist the sequence.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::NotFound`] when no rule carries the id.
    pub fn delete_rule(&self, id: RuleId) -> Result<Rule, RuleError> {
        let mut record = self.settings.load()?;
        let position = record
            .rules
            .iter()
            .position(|rule| rule.id == id)
            .ok_or(RuleError::NotFound)?;
        let removed = record.rules.remove(position);
        self.settings.save(&record)?;
        debug!(rule = %removed.name, "Deleted rule");
        Ok(removed)
    }

    /// Delete a rule by the snapshot index a legacy admin form captured at
    /// render time.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::NotFound`] for an out-of-range index rather
    /// than deleting a recomputed position.
    pub fn delete_rule_at(&self, index: usize) -> Result<Rule, RuleError> {
        let mut record = self.settings.load()?;
        if index >= record.rules.len() {
            return Err(RuleError::NotFound);
        }
        let removed = record.rules.remove(index);
        self.settings.save(&record)?;
        debug!(rule = %removed.name, index, "Deleted rule by index");
        Ok(removed)
    }

    /// Rules prepared for admin display, with targets resolved and deleted
    /// terms labelled rather than faulting.
    ///
    /// # Errors
    ///
    /// Returns an error only when the settings record itself cannot be
    /// read.
    pub fn rules_for_display(&self) -> Result<Vec<RuleView>, RuleError> {
        let record = self.settings.load()?;
        let mut views = Vec::with_capacity(record.rules.len());
        for (index, rule) in record.rules.into_iter().enumerate() {
            let target_name = match self.catalog.resolve_term(rule.term_id) {
                Ok(Some(term)) => term.name,
                Ok(None) => "(Deleted)".to_string(),
                Err(error) => {
                    warn!(term_id = %rule.term_id, %error, "Term lookup failed");
                    "(Deleted)".to_string()
                }
            };
            views.push(RuleView {
                rule,
                index,
                target_name,
            });
        }
        Ok(views)
    }
}
