//! Shared type definitions.
//!
//! # Organization
//!
//! - [`id`] - Newtype IDs for type-safe entity references
//! - [`address`] - Shipping destination
//! - [`spec`] - Restriction specs and location matches
//! - [`rule`] - Category/tag-targeted restriction rules
//! - [`license`] - License state and check outcomes
//! - [`verdict`] - Evaluator outcomes

pub mod address;
pub mod id;
pub mod license;
pub mod rule;
pub mod spec;
pub mod verdict;

pub use address::ShippingAddress;
pub use id::{ProductId, TermId, VariationId};
pub use license::{LicenseCheck, LicenseState};
pub use rule::{Rule, RuleId, RuleLogic, TargetKind, Term};
pub use spec::{LocationMatch, RestrictionSpec, StateCity};
pub use verdict::{CartItem, RestrictedItem, Verdict};
