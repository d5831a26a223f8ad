//! Fixed place-name tables used for keyword matching.
//!
//! The tables are tuned for Kerala-based sellers, with the large metros added
//! so that common out-of-state orders still resolve.

use once_cell::sync::Lazy;

/// Known cities and towns, in their canonical spelling.
pub static KNOWN_CITIES: &[&str] = &[
    "Thiruvananthapuram",
    "Trivandrum",
    "Kochi",
    "Cochin",
    "Ernakulam",
    "Kozhikode",
    "Calicut",
    "Thrissur",
    "Kannur",
    "Kollam",
    "Palakkad",
    "Malappuram",
    "Alappuzha",
    "Kottayam",
    "Kasaragod",
    "Pathanamthitta",
    "Wayanad",
    "Idukki",
    "Aluva",
    "Perinthalmanna",
    "Bangalore",
    "Bengaluru",
    "Chennai",
    "Mumbai",
    "Delhi",
    "Hyderabad",
    "Coimbatore",
    "Mangalore",
];

/// Known states as `(lowercase key, canonical name)`. A key only differs from
/// its canonical name in casing and spacing, so the output always spells the
/// state the way the input did (`tamilnadu` -> `Tamil Nadu`, `orissa` ->
/// `Orissa`).
pub static KNOWN_STATES: &[(&str, &str)] = &[
    ("kerala", "Kerala"),
    ("tamil nadu", "Tamil Nadu"),
    ("tamilnadu", "Tamil Nadu"),
    ("karnataka", "Karnataka"),
    ("maharashtra", "Maharashtra"),
    ("andhra pradesh", "Andhra Pradesh"),
    ("telangana", "Telangana"),
    ("goa", "Goa"),
    ("gujarat", "Gujarat"),
    ("delhi", "Delhi"),
    ("west bengal", "West Bengal"),
    ("uttar pradesh", "Uttar Pradesh"),
    ("rajasthan", "Rajasthan"),
    ("odisha", "Odisha"),
    ("orissa", "Orissa"),
];

/// District names stripped from address text even when they were not the
/// matched city.
pub static COMMON_DISTRICTS: &[&str] = &[
    "Ernakulam",
    "Thrissur",
    "Kozhikode",
    "Malappuram",
    "Kannur",
    "Palakkad",
    "Kollam",
    "Kottayam",
    "Alappuzha",
    "Thiruvananthapuram",
];

static CITIES_BY_LENGTH: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut cities = KNOWN_CITIES.to_vec();
    cities.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    cities
});

static STATES_BY_LENGTH: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    let mut states = KNOWN_STATES.to_vec();
    states.sort_by(|a, b| {
        b.0.chars()
            .count()
            .cmp(&a.0.chars().count())
            .then_with(|| a.0.cmp(b.0))
    });
    states
});

/// Known cities ordered longest first (ties alphabetical).
pub fn cities_longest_first() -> &'static [&'static str] {
    &CITIES_BY_LENGTH
}

/// Known states ordered by key length, longest first (ties alphabetical).
pub fn states_longest_first() -> &'static [(&'static str, &'static str)] {
    &STATES_BY_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cities_sorted_longest_first() {
        let cities = cities_longest_first();
        assert_eq!(cities.len(), KNOWN_CITIES.len());
        assert_eq!(cities[0], "Thiruvananthapuram");
        for pair in cities.windows(2) {
            assert!(pair[0].chars().count() >= pair[1].chars().count());
        }
    }

    #[test]
    fn test_states_sorted_longest_first() {
        let states = states_longest_first();
        for pair in states.windows(2) {
            assert!(pair[0].0.len() >= pair[1].0.len());
        }
        assert_eq!(states.last().map(|s| s.0), Some("goa"));
    }

    #[test]
    fn test_state_keys_are_lowercase() {
        for (key, canonical) in KNOWN_STATES {
            assert_eq!(*key, key.to_lowercase());
            assert!(canonical.chars().next().unwrap().is_uppercase());
        }
    }

    #[test]
    fn test_state_names_only_change_casing_and_spacing() {
        let squash = |s: &str| s.to_lowercase().replace(' ', "");
        for (key, canonical) in KNOWN_STATES {
            assert_eq!(squash(key), squash(canonical), "key {:?}", key);
        }
    }
}
