//! The extraction pipeline.
//!
//! Phase one runs the independent field extractors. Phase two runs the
//! address extractor, which depends on the city, state and PIN code found in
//! phase one. The result is then canonicalized and scored.

use crate::address::extract_address;
use crate::canonical::to_title_case;
use crate::extractors::{
    FieldMatch, city_match, email_match, name_match, phone_match, pincode_match, state_match,
};
use crate::models::{ParsedContact, ValidationResult};
use crate::scoring::{ScoringWeights, score};
use crate::validator;
use once_cell::sync::Lazy;

static DEFAULT_PARSER: Lazy<ContactParser> = Lazy::new(ContactParser::default);

/// Outputs of the extractors that do not depend on each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndependentFields {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

fn traced(field: &'static str, found: Option<FieldMatch>) -> Option<String> {
    match found {
        Some(m) => {
            tracing::debug!(target: "extract", "{} matched by '{}' tier: {}", field, m.tier, m.value);
            Some(m.value)
        }
        None => {
            tracing::debug!(target: "extract", "{} not found", field);
            None
        }
    }
}

/// Phase one. None of these extractors reads another's output.
pub fn extract_independent_fields(text: &str) -> IndependentFields {
    IndependentFields {
        name: traced("name", name_match(text)),
        phone: traced("phone", phone_match(text)),
        email: traced("email", email_match(text)),
        city: traced("city", city_match(text)),
        state: traced("state", state_match(text)),
        pincode: traced("pincode", pincode_match(text)),
    }
}

fn normalize_line_endings(message: &str) -> String {
    message.replace("\r\n", "\n").replace('\r', "\n")
}

/// Parses pasted chat text into a [`ParsedContact`].
///
/// Holds only the scoring weights, so one instance can be shared freely
/// between threads.
#[derive(Debug, Clone, Default)]
pub struct ContactParser {
    weights: ScoringWeights,
}

impl ContactParser {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Runs the full pipeline over one message. Never fails; anything that
    /// cannot be found is left as `None` and listed in `missing_fields`.
    pub fn parse(&self, message: &str) -> ParsedContact {
        let text = normalize_line_endings(message);

        let fields = extract_independent_fields(&text);
        let address = extract_address(
            &text,
            fields.city.as_deref(),
            fields.state.as_deref(),
            fields.pincode.as_deref(),
        );

        let mut contact = ParsedContact {
            name: fields.name.as_deref().map(to_title_case),
            whatsapp: fields.phone.clone(),
            phone: fields.phone,
            email: fields.email,
            address_line1: address.line1,
            address_line2: address.line2,
            city: fields.city.as_deref().map(to_title_case),
            state: fields.state.as_deref().map(to_title_case),
            pincode: fields.pincode,
            confidence: 0,
            missing_fields: Vec::new(),
        };

        let (confidence, missing_fields) = score(&contact, &self.weights);
        contact.confidence = confidence;
        contact.missing_fields = missing_fields;

        tracing::debug!(
            "Parsed message ({} chars): confidence {}, missing {:?}",
            message.chars().count(),
            contact.confidence,
            contact.missing_fields
        );
        contact
    }
}

/// Parses a message with the default scoring weights.
pub fn parse_whatsapp_message(message: &str) -> ParsedContact {
    DEFAULT_PARSER.parse(message)
}

/// Strict validation of a contact-shaped record.
pub fn validate_customer_data(data: &ParsedContact) -> ValidationResult {
    validator::validate_customer_data(data)
}
