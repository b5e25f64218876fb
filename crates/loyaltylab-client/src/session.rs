//! Authentication session established by `AuthenticateUser`
//!
//! The service expires a session 20 minutes after its last use. Nothing here
//! tracks that window: long-lived clients must call
//! [`LoyaltyClient::authenticate`](crate::LoyaltyClient::authenticate) again
//! when calls start failing with an authentication error.

use loyaltylab_core::{wire_key, LoyaltyError, LoyaltyResult, SANITIZED_PLACEHOLDER};
use serde_json::{json, Map, Value as JsonValue};

/// Operation that establishes a session.
pub const AUTHENTICATE_OPERATION: &str = "AuthenticateUser";

// Keys of a normalized AuthenticateUser result
const RETAILER_GUID_KEY: &str = "retailerGuid";
const AUTHENTICATED_KEY: &str = "authenticated";
const TOKEN_KEY: &str = "token";
const ICS_USER_ID_KEY: &str = "ics_user_id";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    pub retailer_guid: String,
    pub authenticated: bool,
    pub token: String,
    pub ics_user_id: String,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("retailer_guid", &self.retailer_guid)
            .field("authenticated", &self.authenticated)
            .field("token", &SANITIZED_PLACEHOLDER)
            .field("ics_user_id", &self.ics_user_id)
            .finish()
    }
}

impl AuthSession {
    /// Build a session from a normalized `AuthenticateUser` result.
    ///
    /// A well-formed response with `Authenticated = false` is the service's
    /// way of rejecting credentials and yields an authentication error.
    pub fn from_response(result: &JsonValue) -> LoyaltyResult<Self> {
        let empty = Map::new();
        let fields = result.as_object().unwrap_or(&empty);

        let session = Self {
            retailer_guid: string_field(fields, RETAILER_GUID_KEY),
            authenticated: flag_field(fields, AUTHENTICATED_KEY),
            token: string_field(fields, TOKEN_KEY),
            ics_user_id: string_field(fields, ICS_USER_ID_KEY),
        };

        if !session.authenticated {
            return Err(LoyaltyError::Authentication(
                "authentication failed".to_string(),
            ));
        }

        Ok(session)
    }

    /// SOAP header value attached to every non-authentication call.
    pub fn header(&self) -> JsonValue {
        json!({
            wire_key("AuthenticationResult"): {
                wire_key("RetailerGuid"): self.retailer_guid,
                wire_key("Authenticated"): self.authenticated,
                wire_key("Token"): self.token,
                wire_key("ICSUserID"): self.ics_user_id,
            }
        })
    }
}

fn string_field(fields: &Map<String, JsonValue>, key: &str) -> String {
    match fields.get(key) {
        Some(JsonValue::String(value)) => value.clone(),
        Some(JsonValue::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn flag_field(fields: &Map<String, JsonValue>, key: &str) -> bool {
    match fields.get(key) {
        Some(JsonValue::Bool(flag)) => *flag,
        Some(JsonValue::String(text)) => text.eq_ignore_ascii_case("true"),
        _ => false,
    }
}
