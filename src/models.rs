//! Defines the core data structures used in the chat-contact-parser application.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The structured contact record extracted from one block of pasted text.
///
/// Every populated field is traceable to a substring of the input. Absent
/// fields are `None`; the parser never invents a value.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ParsedContact {
    /// Title-cased human name, 1 to 5 words.
    pub name: Option<String>,
    /// Exactly 10 digits, first digit 6-9.
    pub phone: Option<String>,
    /// Lower-cased email address.
    pub email: Option<String>,
    /// Street/house level fragment with city, state and PIN removed.
    pub address_line1: Option<String>,
    /// Landmark fragment, always of the form "Near ...".
    pub address_line2: Option<String>,
    /// Title-cased city, or the district when no city was given.
    pub city: Option<String>,
    /// Title-cased Indian state.
    pub state: Option<String>,
    /// Exactly 6 digits, first digit 1-9.
    pub pincode: Option<String>,
    /// Mirror of `phone`.
    pub whatsapp: Option<String>,
    /// Weighted completeness score in 0..=100. Not an accuracy measure.
    pub confidence: u8,
    /// Human-readable names of required fields that were not found.
    pub missing_fields: Vec<String>,
}

/// Output of the address extractor.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressLines {
    pub line1: Option<String>,
    pub line2: Option<String>,
}

/// Result of the strict validator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Every failing rule, in rule order.
    pub errors: Vec<String>,
}

/// A parsed contact together with its optional strict validation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParseOutcome {
    pub contact: ParsedContact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
}

/// One input message for batch processing.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageRecord {
    /// Caller-supplied identifier, echoed back in the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The pasted chat text.
    #[serde(alias = "text")]
    pub message: String,
    // Allow capturing other fields from the input JSON
    #[serde(flatten)]
    pub other_fields: HashMap<String, serde_json::Value>,
}

/// Final output structure for each batch record, combining input and results.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    #[serde(flatten)]
    pub record: MessageRecord,

    /// The extracted contact; absent when the record was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<ParsedContact>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    #[serde(default)]
    pub skipped: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_contact_uses_camel_case_keys() {
        let contact = ParsedContact {
            address_line1: Some("12 MG Road".to_string()),
            missing_fields: vec!["Name".to_string()],
            confidence: 20,
            ..Default::default()
        };
        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(json["addressLine1"], "12 MG Road");
        assert_eq!(json["missingFields"][0], "Name");
        assert_eq!(json["confidence"], 20);
        assert!(json["addressLine2"].is_null());
    }

    #[test]
    fn test_parsed_contact_deserializes_partial_record() {
        let contact: ParsedContact =
            serde_json::from_str(r#"{"name": "Priya", "phone": "9876543210"}"#).unwrap();
        assert_eq!(contact.name.as_deref(), Some("Priya"));
        assert_eq!(contact.phone.as_deref(), Some("9876543210"));
        assert_eq!(contact.confidence, 0);
        assert!(contact.missing_fields.is_empty());
    }

    #[test]
    fn test_message_record_keeps_extra_fields() {
        let record: MessageRecord =
            serde_json::from_str(r#"{"id": "7", "text": "hello", "source": "whatsapp"}"#).unwrap();
        assert_eq!(record.message, "hello");
        assert_eq!(record.other_fields["source"], "whatsapp");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["source"], "whatsapp");
        assert_eq!(json["id"], "7");
    }

    #[test]
    fn test_parse_outcome_omits_missing_validation() {
        let outcome = ParseOutcome {
            contact: ParsedContact::default(),
            validation: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("validation").is_none());
        assert_eq!(json["contact"]["confidence"], 0);
    }

    #[test]
    fn test_validation_result_serializes_is_valid() {
        let result = ValidationResult {
            is_valid: false,
            errors: vec!["Phone is required".to_string()],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isValid"], false);
        assert_eq!(json["errors"][0], "Phone is required");
    }
}
