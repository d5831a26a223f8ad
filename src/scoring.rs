//! Weighted completeness score for a parsed contact.
//!
//! The score says how much of the form could be pre-filled. It says nothing
//! about whether the extracted values are correct.

use crate::models::ParsedContact;
use serde::{Deserialize, Serialize};

pub const MISSING_NAME: &str = "Name";
pub const MISSING_PHONE: &str = "Phone";
pub const MISSING_ADDRESS: &str = "Address";
pub const MISSING_PINCODE: &str = "Pincode";

/// Points awarded per populated field. City and state are optional and never
/// reported as missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub name: u8,
    pub phone: u8,
    pub address: u8,
    pub pincode: u8,
    pub city: u8,
    pub state: u8,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            name: 25,
            phone: 30,
            address: 20,
            pincode: 15,
            city: 5,
            state: 5,
        }
    }
}

impl ScoringWeights {
    /// Sum of all weights, before capping.
    pub fn total(&self) -> u32 {
        [self.name, self.phone, self.address, self.pincode, self.city, self.state]
            .iter()
            .map(|w| u32::from(*w))
            .sum()
    }
}

/// Returns the capped score and the ordered list of missing required fields.
pub fn score(contact: &ParsedContact, weights: &ScoringWeights) -> (u8, Vec<String>) {
    let mut total: u32 = 0;
    let mut missing = Vec::new();

    let required = [
        (contact.name.is_some(), weights.name, MISSING_NAME),
        (contact.phone.is_some(), weights.phone, MISSING_PHONE),
        (contact.address_line1.is_some(), weights.address, MISSING_ADDRESS),
        (contact.pincode.is_some(), weights.pincode, MISSING_PINCODE),
    ];
    for (present, weight, label) in required {
        if present {
            total += u32::from(weight);
        } else {
            missing.push(label.to_string());
        }
    }

    if contact.city.is_some() {
        total += u32::from(weights.city);
    }
    if contact.state.is_some() {
        total += u32::from(weights.state);
    }

    (total.min(100) as u8, missing)
}
