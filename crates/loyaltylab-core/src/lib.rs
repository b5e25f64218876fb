pub mod error;
pub mod fault;
pub mod fields;
pub mod response;
pub mod sanitization;

// Re-export commonly used types
pub use error::{LoyaltyError, LoyaltyResult};
pub use fault::{FaultClassifier, FaultKind, AUTHENTICATION_FAULT_CODE};
pub use fields::{normalize_key, underscore, wire_key, FieldMappingTable, FieldTranslator, WIRE_PREFIX};
pub use response::{FaultDetail, SoapFault, SoapResponse};
pub use sanitization::{
    create_debug_string, is_sensitive_field, sanitize_json_value, SANITIZED_PLACEHOLDER,
};
