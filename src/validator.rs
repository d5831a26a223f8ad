//! Strict format check run before a contact is accepted into storage.
//!
//! Unlike the confidence score this reports every failing rule, so a form can
//! highlight all problems at once.

use crate::models::{ParsedContact, ValidationResult};
use once_cell::sync::Lazy;
use regex::Regex;

static PHONE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[6-9]\d{9}$").expect("phone shape regex"));
static PINCODE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9]\d{5}$").expect("pincode shape regex"));

const MIN_NAME_LEN: usize = 2;
const MIN_ADDRESS_LEN: usize = 3;

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Validates a contact-shaped record against the strict shape rules.
pub fn validate_customer_data(data: &ParsedContact) -> ValidationResult {
    let mut errors = Vec::new();

    match present(&data.name) {
        None => errors.push("Name is required".to_string()),
        Some(name) if name.chars().count() < MIN_NAME_LEN => errors.push(format!(
            "Name must be at least {} characters",
            MIN_NAME_LEN
        )),
        Some(_) => {}
    }

    match present(&data.phone) {
        None => errors.push("Phone is required".to_string()),
        Some(phone) if !PHONE_SHAPE.is_match(phone) => errors
            .push("Phone must be a 10-digit number starting with 6, 7, 8 or 9".to_string()),
        Some(_) => {}
    }

    match present(&data.address_line1) {
        None => errors.push("Address is required".to_string()),
        Some(address) if address.chars().count() < MIN_ADDRESS_LEN => errors.push(format!(
            "Address must be at least {} characters",
            MIN_ADDRESS_LEN
        )),
        Some(_) => {}
    }

    match present(&data.pincode) {
        None => errors.push("Pincode is required".to_string()),
        Some(pincode) if !PINCODE_SHAPE.is_match(pincode) => errors
            .push("Pincode must be a 6-digit number that does not start with 0".to_string()),
        Some(_) => {}
    }

    if !errors.is_empty() {
        tracing::debug!("Validation failed with {} error(s): {:?}", errors.len(), errors);
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn valid_contact() -> ParsedContact {
        ParsedContact {
            name: some("Priya Sharma"),
            phone: some("9876543210"),
            address_line1: some("12 MG Road"),
            pincode: some("682001"),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_contact_passes() {
        let result = validate_customer_data(&valid_contact());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_every_failing_rule_is_reported() {
        let contact = ParsedContact {
            name: some("R"),
            phone: some("123"),
            address_line1: None,
            pincode: some("12345"),
            ..Default::default()
        };
        let result = validate_customer_data(&contact);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 4);
        assert!(result.errors[0].starts_with("Name"));
        assert!(result.errors[1].starts_with("Phone"));
        assert_eq!(result.errors[2], "Address is required");
        assert!(result.errors[3].starts_with("Pincode"));
    }

    #[test]
    fn test_phone_shape() {
        for bad in ["5876543210", "98765432101", "98765 43210", "+919876543210"] {
            let contact = ParsedContact {
                phone: some(bad),
                ..valid_contact()
            };
            let result = validate_customer_data(&contact);
            assert_eq!(result.errors.len(), 1, "phone {:?} should fail", bad);
        }
    }

    #[test]
    fn test_pincode_shape() {
        let contact = ParsedContact {
            pincode: some("012345"),
            ..valid_contact()
        };
        let result = validate_customer_data(&contact);
        assert_eq!(
            result.errors,
            vec!["Pincode must be a 6-digit number that does not start with 0"]
        );
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let contact = ParsedContact {
            name: some("   "),
            address_line1: some("ab"),
            ..valid_contact()
        };
        let result = validate_customer_data(&contact);
        assert_eq!(
            result.errors,
            vec!["Name is required", "Address must be at least 3 characters"]
        );
    }

    #[test]
    fn test_empty_record_reports_all_required_fields() {
        let result = validate_customer_data(&ParsedContact::default());
        assert_eq!(
            result.errors,
            vec![
                "Name is required",
                "Phone is required",
                "Address is required",
                "Pincode is required"
            ]
        );
    }
}
