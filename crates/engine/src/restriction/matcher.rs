//! Pure location matching.
//!
//! Compares a shipping address against one restriction spec. Dimension
//! order is fixed and the first hit wins: states, state-city pairs, the
//! legacy flat city list, then ZIP codes. Empty dimensions are skipped,
//! never treated as a wildcard. There is no partial, prefix, or fuzzy
//! matching anywhere.

use ship_restrict_core::{LocationMatch, RestrictionSpec, ShippingAddress};

/// Compare `address` against `spec`, returning the first matching
/// dimension.
///
/// State codes compare exactly (case-sensitive); cities compare
/// case-insensitively; ZIP codes compare as exact strings.
#[must_use]
pub fn match_spec(address: &ShippingAddress, spec: &RestrictionSpec) -> Option<LocationMatch> {
    if spec.states.contains(&address.state) {
        return Some(LocationMatch::State(address.state.clone()));
    }

    if !address.city.is_empty() {
        let city_lower = address.city.to_lowercase();

        for pair in &spec.state_cities {
            if pair.state == address.state && pair.city.to_lowercase() == city_lower {
                return Some(LocationMatch::StateCity {
                    state: pair.state.clone(),
                    city: address.city.clone(),
                });
            }
        }

        if spec
            .cities
            .iter()
            .any(|city| city.to_lowercase() == city_lower)
        {
            return Some(LocationMatch::City(address.city.clone()));
        }
    }

    if !address.postcode.is_empty() && spec.zip_codes.contains(&address.postcode) {
        return Some(LocationMatch::Zip(address.postcode.clone()));
    }

    None
}
