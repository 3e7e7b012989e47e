//! Canonical US state and territory codes.
//!
//! Matches the host platform's US state list: 50 states, DC, the inhabited
//! territories, and the armed-forces codes. Used to validate state codes on
//! rules and item-level restrictions before they are persisted.

/// `(code, name)` pairs for every recognized state and territory.
pub const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("AS", "American Samoa"),
    ("GU", "Guam"),
    ("MP", "Northern Mariana Islands"),
    ("PR", "Puerto Rico"),
    ("VI", "U.S. Virgin Islands"),
    ("AA", "Armed Forces (AA)"),
    ("AE", "Armed Forces (AE)"),
    ("AP", "Armed Forces (AP)"),
];

/// Whether `code` is a recognized state or territory code.
#[must_use]
pub fn is_valid_code(code: &str) -> bool {
    US_STATES.iter().any(|(c, _)| *c == code)
}

/// Display name for a state code, if recognized.
#[must_use]
pub fn name(code: &str) -> Option<&'static str> {
    US_STATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, n)| *n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_states_dc_and_territories() {
        assert!(US_STATES.len() >= 51);
        for code in ["CA", "NY", "TX", "FL", "DC", "PR"] {
            assert!(is_valid_code(code), "missing {code}");
        }
    }

    #[test]
    fn lookup_is_exact_membership() {
        assert!(!is_valid_code("C"));
        assert!(!is_valid_code("CAL"));
        assert!(!is_valid_code("ca"));
    }

    #[test]
    fn name_resolves_known_codes() {
        assert_eq!(name("CT"), Some("Connecticut"));
        assert_eq!(name("ZZ"), None);
    }
}
