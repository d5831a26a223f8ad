//! Extracts structured Indian contact details (name, phone, email, address,
//! city, state, PIN code) from free-form text pasted out of chat apps.
//!
//! ```
//! use chat_contact_parser::parse_whatsapp_message;
//!
//! let contact = parse_whatsapp_message("Name: Priya Sharma\nPhone: 9876543210");
//! assert_eq!(contact.phone.as_deref(), Some("9876543210"));
//! assert_eq!(contact.missing_fields, vec!["Address", "Pincode"]);
//! ```

pub mod address;
pub mod api;
pub mod canonical;
pub mod config;
pub mod error;
pub mod extractors;
pub mod gazetteer;
pub mod models;
pub mod parser;
pub mod processor;
pub mod scoring;
pub mod validator;

pub use error::{AppError, Result};
pub use models::{AddressLines, MessageRecord, ParseOutcome, ParsedContact, ProcessingResult, ValidationResult};
pub use parser::{ContactParser, parse_whatsapp_message, validate_customer_data};
pub use scoring::ScoringWeights;
