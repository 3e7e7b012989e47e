//! Category/tag-targeted restriction rules.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::id::TermId;
use super::spec::RestrictionSpec;

/// Stable rule identifier, generated once at creation.
///
/// Rules used to be identified by their position in the stored sequence,
/// which made concurrent deletes able to remove the wrong rule. The UUID
/// survives reordering and deletion of neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(Uuid);

impl RuleId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RuleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// What kind of taxonomy term a rule targets.
///
/// Resolved once when the rule is created and stored with it, never
/// re-derived from live taxonomy state during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Category,
    Tag,
}

impl TargetKind {
    /// Capitalized label for admin display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Tag => "Tag",
        }
    }
}

/// Logic mode applied when a rule's location spec is compared to an address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleLogic {
    /// Restrict when the address matches the spec.
    #[default]
    BlockFrom,
    /// Restrict when the address does NOT match the spec.
    AllowOnly,
}

impl RuleLogic {
    /// Label for admin display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BlockFrom => "Block from",
            Self::AllowOnly => "Allow only",
        }
    }
}

/// A taxonomy term as resolved from the host catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub name: String,
    pub kind: TargetKind,
}

/// A named category/tag-targeted restriction with block/allow logic.
///
/// Rules are never updated in place; the admin deletes and re-adds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    pub target_kind: TargetKind,
    pub term_id: TermId,
    #[serde(default)]
    pub logic: RuleLogic,
    #[serde(flatten)]
    pub spec: RestrictionSpec,
}
