//! Default shopper and card records for `CreateShopper` style calls
//!
//! Keys are already in wire case, so the records can be passed straight into
//! request parameters. Update the contact fields before saving.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value as JsonValue};
use std::fmt::Display;

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Shopper record with the defaults the service expects for a new member.
pub fn build_default_shopper(retailer_guid: &str, retailer_shopper_id: impl Display) -> JsonValue {
    default_shopper_at(retailer_guid, retailer_shopper_id, Utc::now())
}

pub fn default_shopper_at(
    retailer_guid: &str,
    retailer_shopper_id: impl Display,
    now: DateTime<Utc>,
) -> JsonValue {
    let now = timestamp(now);
    json!({
        "ShopperId": 0,
        "RetailerGUID": retailer_guid,
        "EmailAddress": "",
        "EmailFrequency": 1,
        "EmailFrequencyUnit": "D",
        "EmailFormat": "HTML",
        "Password": " ",
        "Status": "A",
        "LastName": "",
        "MiddleInitial": "",
        "FirstName": "",
        "Address1": "",
        "City": "",
        "State": "",
        "Zip": "",
        "PhoneNumber": "",
        "ProfileCreateDateTime": now,
        "ProfileUpdateDateTime": now,
        "CreateDateTime": now,
        "PasswordLastChanged": now,
        "Origin": "W",
        "RetailerShopperId": retailer_shopper_id.to_string(),
        "FileImportId": 0,
        "BulkEmail": 1,
        "LoyaltyMember": true,
        "PersonStatus": "P",
        "RetailerRegistered": false,
        "MailOptIn": false,
        "PhoneOptIn": false,
        "RetailerShopperCreationDate": now,
        "LoyaltyLabCreateDateTime": now,
        "StatusUpdateDateTime": now
    })
}

/// Loyalty card record keyed to the retailer's shopper id.
pub fn build_default_card(retailer_shopper_id: impl Display) -> JsonValue {
    default_card_at(retailer_shopper_id, Utc::now())
}

pub fn default_card_at(retailer_shopper_id: impl Display, now: DateTime<Utc>) -> JsonValue {
    json!({
        "RegisteredCardId": 0,
        "ShopperId": 0,
        "CommonName": "loyalty member id",
        "AlternateCardIdentifier": retailer_shopper_id.to_string(),
        "CardType": "L",
        "ExpirationMonth": 12,
        "ExpirationYear": 3010,
        "LastFour": " ",
        "CardHolderName": " ",
        "Status": "A",
        "CreateDateTime": timestamp(now),
        "IsPreferred": " ",
        "FileImportId": 0
    })
}
