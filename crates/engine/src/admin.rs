//! Admin surface: explicit commands and the notices they produce.
//!
//! Every form submission maps to one command struct handled here. Handlers
//! return a [`Notice`] for the admin to render; only backend storage
//! failures surface as errors.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use std::collections::BTreeSet;

use ship_restrict_core::{
    us_states, LicenseState, RestrictionSpec, Rule, RuleId, RuleLogic, StateCity, TermId,
};

use crate::license::{LicenseApi, LicenseManager};
use crate::rules::{NewRule, RuleError, RuleStore, RuleView, FREE_PRODUCT_LIMIT, FREE_RULE_LIMIT};
use crate::store::{MetaField, MetaOwner, MetadataStore, SettingsStore, StoreError};

/// Notice severity for admin rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// One message for the admin to display after handling a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

/// Where an upgrade prompt would be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeContext {
    Rules,
    Products,
}

/// Submission of the add-rule form.
#[derive(Debug, Clone)]
pub struct AddRuleCommand {
    pub name: String,
    pub term_id: TermId,
    pub logic: RuleLogic,
    pub states: Vec<String>,
    pub state_cities: Vec<StateCity>,
    /// Comma-joined as typed into the form.
    pub zip_codes: String,
}

/// Submission of the message-template form.
#[derive(Debug, Clone)]
pub struct SaveMessageCommand {
    pub message: String,
}

/// Submission of the license-key form.
#[derive(Debug, Clone)]
pub struct SaveLicenseCommand {
    pub key: String,
}

/// Submission of a product or variation restriction editor.
#[derive(Debug, Clone, Default)]
pub struct SaveItemRestrictionsCommand {
    pub states: Vec<String>,
    pub cities: Vec<String>,
    /// Comma-joined as typed into the form.
    pub zip_codes: String,
}

fn split_joined(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// The admin command handler.
pub struct AdminService<A: LicenseApi> {
    rules: RuleStore,
    license: LicenseManager<A>,
    settings: Arc<dyn SettingsStore>,
    metadata: Arc<dyn MetadataStore>,
}

impl<A: LicenseApi> AdminService<A> {
    #[must_use]
    pub fn new(
        rules: RuleStore,
        license: LicenseManager<A>,
        settings: Arc<dyn SettingsStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            rules,
            license,
            settings,
            metadata,
        }
    }

    /// Handle the add-rule form.
    ///
    /// Revalidates a stale license first, so an expired key re-gates the
    /// rule ceiling before the new rule is counted against it.
    ///
    /// # Errors
    ///
    /// Returns an error only when storage fails; validation failures come
    /// back as error notices.
    #[instrument(skip(self, command), fields(rule = %command.name))]
    pub async fn add_rule(&self, command: AddRuleCommand) -> Result<Notice, StoreError> {
        self.license.ensure_fresh().await?;
        let new_rule = NewRule {
            name: command.name,
            term_id: command.term_id,
            logic: command.logic,
            spec: RestrictionSpec {
                states: command.states.into_iter().collect(),
                state_cities: command.state_cities,
                cities: BTreeSet::new(),
                zip_codes: split_joined(&command.zip_codes).into_iter().collect(),
            },
        };

        match self.rules.add_rule(new_rule) {
            Ok(rule) => {
                info!(rule = %rule.name, "Rule added");
                Ok(Notice::success("Rule added successfully."))
            }
            Err(RuleError::MissingName | RuleError::UnknownTerm(_)) => Ok(Notice::error(
                "Failed to add rule. Please fill all required fields.",
            )),
            Err(RuleError::LimitReached { .. }) => Ok(Notice::error(
                self.prompt_text(UpgradeContext::Rules),
            )),
            Err(RuleError::NotFound) => Ok(Notice::error("Rule not found.")),
            Err(RuleError::Store(error)) => Err(error),
        }
    }

    /// Delete a rule by its stable id.
    ///
    /// # Errors
    ///
    /// Returns an error only when storage fails.
    pub fn delete_rule(&self, id: RuleId) -> Result<Notice, StoreError> {
        self.finish_delete(self.rules.delete_rule(id))
    }

    /// Delete a rule by the index a legacy form captured at render time.
    ///
    /// # Errors
    ///
    /// Returns an error only when storage fails.
    pub fn delete_rule_at(&self, index: usize) -> Result<Notice, StoreError> {
        self.finish_delete(self.rules.delete_rule_at(index))
    }

    fn finish_delete(&self, result: Result<Rule, RuleError>) -> Result<Notice, StoreError> {
        match result {
            Ok(rule) => {
                info!(rule = %rule.name, "Rule deleted");
                Ok(Notice::success("Rule deleted successfully."))
            }
            Err(RuleError::Store(error)) => Err(error),
            Err(_) => Ok(Notice::error("Rule not found.")),
        }
    }

    /// Rules prepared for the admin list.
    ///
    /// This is the settings-page read path, so a stale license cache is
    /// revalidated here (at most once per cache window).
    ///
    /// # Errors
    ///
    /// Returns an error when the settings record cannot be read.
    pub async fn rules_for_display(&self) -> Result<Vec<RuleView>, StoreError> {
        self.license.ensure_fresh().await?;
        match self.rules.rules_for_display() {
            Ok(views) => Ok(views),
            Err(RuleError::Store(error)) => Err(error),
            // rules_for_display only fails through storage.
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Save the shopper-facing message template.
    ///
    /// # Errors
    ///
    /// Returns an error when the settings record cannot be read or written.
    pub fn save_message(&self, command: SaveMessageCommand) -> Result<Notice, StoreError> {
        let mut record = self.settings.load()?;
        record.message = command.message;
        record.sanitize();
        self.settings.save(&record)?;
        Ok(Notice::success("Settings saved."))
    }

    /// Save a license key, checking it remotely.
    ///
    /// # Errors
    ///
    /// Returns an error when the settings record cannot be read or written;
    /// a failed remote check is reported as an error notice.
    pub async fn save_license(
        &self,
        command: SaveLicenseCommand,
    ) -> Result<(Notice, LicenseState), StoreError> {
        let state = self.license.save_key(&command.key).await?;
        let notice = if state.key.is_empty() {
            Notice::success("License key cleared.")
        } else if state.valid {
            Notice::success("License saved and active.")
        } else {
            Notice::error(state.error.clone())
        };
        Ok((notice, state))
    }

    /// Save item-level restrictions for a product or variation.
    ///
    /// Unlicensed installations may restrict at most [`FREE_PRODUCT_LIMIT`]
    /// products; entities that already carry a restriction stay editable
    /// past the ceiling. A stale license is revalidated before the ceiling
    /// is applied.
    ///
    /// # Errors
    ///
    /// Returns an error only when storage fails.
    #[instrument(skip(self, command))]
    pub async fn save_item_restrictions(
        &self,
        owner: MetaOwner,
        command: SaveItemRestrictionsCommand,
    ) -> Result<Notice, StoreError> {
        let licensed = self.license.ensure_fresh().await?;

        let mut states = command.states;
        states.retain(|code| {
            let known = us_states::is_valid_code(code);
            if !known {
                warn!(%code, "Dropping unrecognized state code from item restriction");
            }
            known
        });
        let cities = command.cities;
        let zip_codes = split_joined(&command.zip_codes);

        let clearing = states.is_empty() && cities.is_empty() && zip_codes.is_empty();
        if !clearing && !licensed && !self.owner_restricted(owner)? {
            let count = self.metadata.count_restricted_products()?;
            if count >= FREE_PRODUCT_LIMIT {
                return Ok(Notice::error(self.prompt_text(UpgradeContext::Products)));
            }
        }

        self.metadata.write(owner, MetaField::States, &states)?;
        self.metadata.write(owner, MetaField::Cities, &cities)?;
        self.metadata.write(owner, MetaField::ZipCodes, &zip_codes)?;
        info!(?owner, "Item restrictions saved");
        Ok(Notice::success("Restrictions saved."))
    }

    /// The upgrade prompt for a context, or `None` when licensed.
    ///
    /// Revalidates a stale license, so a revoked key brings the prompts
    /// back.
    ///
    /// # Errors
    ///
    /// Returns an error when the settings record cannot be read or written.
    pub async fn upgrade_prompt(
        &self,
        context: UpgradeContext,
    ) -> Result<Option<String>, StoreError> {
        if self.license.ensure_fresh().await? {
            return Ok(None);
        }
        Ok(Some(self.prompt_text(context)))
    }

    fn prompt_text(&self, context: UpgradeContext) -> String {
        match context {
            UpgradeContext::Rules => format!(
                "The free version is limited to {FREE_RULE_LIMIT} restriction rules. Upgrade to Pro for unlimited rules."
            ),
            UpgradeContext::Products => format!(
                "The free version is limited to {FREE_PRODUCT_LIMIT} product restrictions. Upgrade to Pro for unlimited product restrictions."
            ),
        }
    }

    fn owner_restricted(&self, owner: MetaOwner) -> Result<bool, StoreError> {
        for field in [MetaField::States, MetaField::Cities, MetaField::ZipCodes] {
            if self.metadata.read(owner, field)?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
