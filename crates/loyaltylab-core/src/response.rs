//! Decoded view of a SOAP response as handed back by a transport

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Structured `<detail>` block of a SOAP fault.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultDetail {
    pub code: Option<String>,
    pub description: Option<String>,
}

/// A SOAP `<Fault>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapFault {
    pub faultcode: Option<String>,
    pub faultstring: Option<String>,
    pub detail: Option<FaultDetail>,
}

/// Response returned by a transport for one SOAP request.
#[derive(Debug, Clone, PartialEq)]
pub struct SoapResponse {
    pub status_code: u16,
    /// Children of the SOAP `Body`, keyed by element local name.
    pub body: JsonValue,
    pub fault: Option<SoapFault>,
    /// Raw response body as received.
    pub raw: String,
}

impl SoapResponse {
    /// A successful response carrying the given body.
    pub fn ok(body: JsonValue) -> Self {
        let raw = body.to_string();
        Self {
            status_code: 200,
            body,
            fault: None,
            raw,
        }
    }

    /// A fault response; SOAP 1.1 services answer faults with HTTP 500.
    pub fn fault(fault: SoapFault, raw: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            body: JsonValue::Null,
            fault: Some(fault),
            raw: raw.into(),
        }
    }

    /// A non-SOAP HTTP error, e.g. a proxy error page.
    pub fn http_error(status_code: u16, raw: impl Into<String>) -> Self {
        Self {
            status_code,
            body: JsonValue::Null,
            fault: None,
            raw: raw.into(),
        }
    }

    pub fn is_soap_fault(&self) -> bool {
        self.fault.is_some()
    }

    pub fn is_http_error(&self) -> bool {
        self.status_code >= 400
    }
}

impl std::fmt::Display for SoapResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
