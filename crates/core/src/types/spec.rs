//! Restriction specs: the location dimensions a restriction can name.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A state + city pair.
///
/// The state code must match exactly; the city is compared
/// case-insensitively. Pairs disambiguate same-named cities
/// (Springfield, IL vs Springfield, MO).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCity {
    pub state: String,
    pub city: String,
}

/// The locations a product, variation, or rule is restricted for.
///
/// Empty dimensions are skipped during matching, never treated as a
/// wildcard. The flat `cities` list is legacy: records created before
/// state-city pairs existed carry it, and it matches state-agnostically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionSpec {
    /// Two-letter US state codes, exact membership.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub states: BTreeSet<String>,
    /// State + city pairs, in admin-entered order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub state_cities: Vec<StateCity>,
    /// Legacy state-agnostic city names.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub cities: BTreeSet<String>,
    /// Exact-match ZIP strings; no prefix or wildcard matching.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub zip_codes: BTreeSet<String>,
}

impl RestrictionSpec {
    /// Whether the spec declares no restriction at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
            && self.state_cities.is_empty()
            && self.cities.is_empty()
            && self.zip_codes.is_empty()
    }
}

/// Which dimension of a spec matched a shipping address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationMatch {
    /// The address state was in the spec's state set.
    State(String),
    /// A state + city pair matched.
    StateCity { state: String, city: String },
    /// The address city was in the legacy flat city list.
    City(String),
    /// The address postcode was in the ZIP set.
    Zip(String),
}

impl LocationMatch {
    /// Human-readable qualifier for notices and logs,
    /// e.g. `State restriction (CA)`.
    #[must_use]
    pub fn qualifier(&self) -> String {
        match self {
            Self::State(state) => format!("State restriction ({state})"),
            Self::StateCity { state, city } => format!("City restriction ({city}, {state})"),
            Self::City(city) => format!("City restriction ({city})"),
            Self::Zip(zip) => format!("ZIP code restriction ({zip})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spec_is_empty() {
        assert!(RestrictionSpec::default().is_empty());
    }

    #[test]
    fn spec_with_any_dimension_is_not_empty() {
        let spec = RestrictionSpec {
            zip_codes: BTreeSet::from(["90210".to_string()]),
            ..RestrictionSpec::default()
        };
        assert!(!spec.is_empty());
    }

    #[test]
    fn empty_dimensions_are_omitted_from_json() {
        let spec = RestrictionSpec {
            states: BTreeSet::from(["CA".to_string()]),
            ..RestrictionSpec::default()
        };
        let json = serde_json::to_value(&spec).expect("serialize");
        assert_eq!(json, serde_json::json!({ "states": ["CA"] }));
    }

    #[test]
    fn qualifiers_name_the_matched_dimension() {
        let matched = LocationMatch::StateCity {
            state: "IL".to_string(),
            city: "Springfield".to_string(),
        };
        assert_eq!(matched.qualifier(), "City restriction (Springfield, IL)");
        assert_eq!(
            LocationMatch::Zip("60601".to_string()).qualifier(),
            "ZIP code restriction (60601)"
        );
    }
}
