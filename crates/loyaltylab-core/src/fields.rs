//! Translation between caller field names and the wire's namespaced names
//!
//! Requests only gain the namespace prefix on every key. Responses are
//! renamed through the per-operation [`FieldMappingTable`] for top-level
//! keys and the default case transform ([`normalize_key`]) everywhere else.

use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

/// Namespace prefix bound to the service namespace in every envelope.
pub const WIRE_PREFIX: &str = "wsdl";

const SHOPPER_FIELD_MAPPINGS: &[(&str, &str)] = &[("retailer_guid", "RetailerGUID")];

const AUTHENTICATE_USER_MAPPINGS: &[(&str, &str)] = &[("ics_user_id", "ICSUserID")];

const SHOPPER_LOOKUP_OPERATIONS: &[&str] =
    &["GetShopperByID", "GetShopperByEmail", "GetShopperByRetailerID"];

/// Per-operation overrides, stored as semantic key -> wire key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMappingTable {
    operations: HashMap<String, HashMap<String, String>>,
}

impl FieldMappingTable {
    /// An empty table: every key gets the default transform.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The overrides the Loyalty Lab API needs.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        for (semantic, wire) in AUTHENTICATE_USER_MAPPINGS {
            table.insert("AuthenticateUser", *semantic, *wire);
        }
        for operation in SHOPPER_LOOKUP_OPERATIONS {
            for (semantic, wire) in SHOPPER_FIELD_MAPPINGS {
                table.insert(*operation, *semantic, *wire);
            }
        }
        table
    }

    pub fn insert(
        &mut self,
        operation: impl Into<String>,
        semantic_key: impl Into<String>,
        wire_key: impl Into<String>,
    ) {
        self.operations
            .entry(operation.into())
            .or_default()
            .insert(semantic_key.into(), wire_key.into());
    }

    /// Builder form of [`FieldMappingTable::insert`]
    pub fn with_mapping(
        mut self,
        operation: impl Into<String>,
        semantic_key: impl Into<String>,
        wire_key: impl Into<String>,
    ) -> Self {
        self.insert(operation, semantic_key, wire_key);
        self
    }

    pub fn wire_key(&self, operation: &str, semantic_key: &str) -> Option<&str> {
        self.operations
            .get(operation)
            .and_then(|fields| fields.get(semantic_key))
            .map(String::as_str)
    }

    /// Reverse lookup used for responses.
    pub fn semantic_key(&self, operation: &str, wire_key: &str) -> Option<&str> {
        self.operations.get(operation).and_then(|fields| {
            fields
                .iter()
                .find(|(_, wire)| wire.as_str() == wire_key)
                .map(|(semantic, _)| semantic.as_str())
        })
    }

    pub fn has_overrides(&self, operation: &str) -> bool {
        self.operations
            .get(operation)
            .is_some_and(|fields| !fields.is_empty())
    }
}

/// Default inbound key transform.
///
/// Splits on `_`, lowercases the first character of the first segment and
/// uppercases the first character of every later segment. All other
/// characters are kept, so acronyms survive untouched after the first letter.
pub fn normalize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (index, segment) in key.split('_').filter(|s| !s.is_empty()).enumerate() {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            if index == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Underscore a PascalCase operation name: `GetShopperByID` -> `get_shopper_by_id`.
pub fn underscore(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Prefix a key with the wire namespace.
pub fn wire_key(key: &str) -> String {
    format!("{}:{}", WIRE_PREFIX, key)
}

/// Bidirectional field-name translator.
#[derive(Debug, Clone)]
pub struct FieldTranslator {
    table: FieldMappingTable,
}

impl Default for FieldTranslator {
    fn default() -> Self {
        Self::new(FieldMappingTable::standard())
    }
}

impl FieldTranslator {
    pub fn new(table: FieldMappingTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &FieldMappingTable {
        &self.table
    }

    /// Translate request parameters into wire form.
    pub fn outbound(&self, params: &Map<String, JsonValue>) -> Map<String, JsonValue> {
        params
            .iter()
            .map(|(key, value)| (wire_key(key), self.outbound_value(value)))
            .collect()
    }

    fn outbound_value(&self, value: &JsonValue) -> JsonValue {
        match value {
            JsonValue::Object(map) => JsonValue::Object(self.outbound(map)),
            JsonValue::Array(items) => {
                JsonValue::Array(items.iter().map(|item| self.outbound_value(item)).collect())
            }
            scalar => scalar.clone(),
        }
    }

    /// Translate an unwrapped response into caller form.
    ///
    /// Overrides for `operation` only apply to the keys of a top-level object.
    pub fn inbound(&self, operation: &str, value: &JsonValue) -> JsonValue {
        match value {
            JsonValue::Object(map) => JsonValue::Object(
                map.iter()
                    .map(|(key, value)| {
                        let name = self
                            .table
                            .semantic_key(operation, key)
                            .map(str::to_string)
                            .unwrap_or_else(|| normalize_key(key));
                        (name, self.inbound_nested(value))
                    })
                    .collect(),
            ),
            other => self.inbound_nested(other),
        }
    }

    fn inbound_nested(&self, value: &JsonValue) -> JsonValue {
        match value {
            JsonValue::Object(map) => JsonValue::Object(
                map.iter()
                    .map(|(key, value)| (normalize_key(key), self.inbound_nested(value)))
                    .collect(),
            ),
            JsonValue::Array(items) => {
                JsonValue::Array(items.iter().map(|item| self.inbound_nested(item)).collect())
            }
            scalar => scalar.clone(),
        }
    }
}
