//! Classification of service-reported faults into the error taxonomy

use crate::error::{LoyaltyError, LoyaltyResult};
use crate::response::SoapResponse;
use std::collections::HashMap;

/// Fault code the service uses for rejected credentials or expired tokens.
pub const AUTHENTICATION_FAULT_CODE: &str = "100";

/// Error kind a recognized fault code is mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Authentication,
    Connection,
    Unknown,
}

impl FaultKind {
    fn into_error(self, message: String) -> LoyaltyError {
        match self {
            FaultKind::Authentication => LoyaltyError::Authentication(message),
            FaultKind::Connection => LoyaltyError::Connection(message),
            FaultKind::Unknown => LoyaltyError::Unknown(message),
        }
    }
}

/// Maps SOAP fault codes to typed errors.
///
/// Codes without an entry, and faults whose detail cannot be read, all end
/// up as [`LoyaltyError::Unknown`].
#[derive(Debug, Clone)]
pub struct FaultClassifier {
    handlers: HashMap<String, FaultKind>,
}

impl Default for FaultClassifier {
    fn default() -> Self {
        let mut handlers = HashMap::new();
        handlers.insert(AUTHENTICATION_FAULT_CODE.to_string(), FaultKind::Authentication);
        Self { handlers }
    }
}

impl FaultClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the error kind for a fault code
    pub fn with_handler(mut self, code: impl Into<String>, kind: FaultKind) -> Self {
        self.handlers.insert(code.into(), kind);
        self
    }

    pub fn kind_for(&self, code: &str) -> Option<FaultKind> {
        self.handlers.get(code).copied()
    }

    /// Return `Ok(())` for a clean response, otherwise the typed error it carries.
    pub fn check(&self, response: &SoapResponse) -> LoyaltyResult<()> {
        if !response.is_soap_fault() && !response.is_http_error() {
            return Ok(());
        }

        // A detail without a code carries nothing to classify on.
        let detail = response.fault.as_ref().and_then(|fault| {
            fault
                .detail
                .as_ref()
                .and_then(|detail| detail.code.as_deref().map(|code| (fault, detail, code)))
        });

        let Some((fault, detail, code)) = detail else {
            tracing::debug!(status = response.status_code, "unparseable fault, returning raw body");
            return Err(LoyaltyError::Unknown(response.to_string()));
        };

        let faultstring = fault.faultstring.clone().unwrap_or_default();

        if let Some(kind) = self.kind_for(code) {
            return Err(kind.into_error(faultstring));
        }

        Err(LoyaltyError::Unknown(format!(
            "{} {}: {}",
            code,
            detail.description.as_deref().unwrap_or_default(),
            faultstring
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{FaultDetail, SoapFault};
    use serde_json::json;

    fn fault_response(code: &str, description: &str, faultstring: &str) -> SoapResponse {
        SoapResponse::fault(
            SoapFault {
                faultcode: Some("soap:Server".to_string()),
                faultstring: Some(faultstring.to_string()),
                detail: Some(FaultDetail {
                    code: Some(code.to_string()),
                    description: Some(description.to_string()),
                }),
            },
            "<soap:Fault/>",
        )
    }

    #[test]
    fn test_clean_response_passes() {
        let classifier = FaultClassifier::new();
        let response = SoapResponse::ok(json!({"GetEventDefinitionsResponse": {}}));
        assert_eq!(classifier.check(&response), Ok(()));
    }

    #[test]
    fn test_authentication_code() {
        let classifier = FaultClassifier::new();
        let response = fault_response("100", "Auth", "Invalid token");
        assert_eq!(
            classifier.check(&response),
            Err(LoyaltyError::Authentication("Invalid token".to_string()))
        );
    }

    #[test]
    fn test_unknown_code_message_format() {
        let classifier = FaultClassifier::new();
        let response = fault_response("999", "D", "Something broke");
        assert_eq!(
            classifier.check(&response),
            Err(LoyaltyError::Unknown("999 D: Something broke".to_string()))
        );
    }

    #[test]
    fn test_fault_without_detail_uses_raw_body() {
        let classifier = FaultClassifier::new();
        let response = SoapResponse::fault(
            SoapFault {
                faultcode: Some("soap:Client".to_string()),
                faultstring: Some("Server was unable to read request".to_string()),
                detail: None,
            },
            "<soap:Envelope>raw</soap:Envelope>",
        );
        assert_eq!(
            classifier.check(&response),
            Err(LoyaltyError::Unknown("<soap:Envelope>raw</soap:Envelope>".to_string()))
        );
    }

    #[test]
    fn test_http_error_without_fault_uses_raw_body() {
        let classifier = FaultClassifier::new();
        let response = SoapResponse::http_error(503, "Service Unavailable");
        assert_eq!(
            classifier.check(&response),
            Err(LoyaltyError::Unknown("Service Unavailable".to_string()))
        );
    }

    #[test]
    fn test_detail_without_code_uses_raw_body() {
        let classifier = FaultClassifier::new();
        for detail in [
            FaultDetail::default(),
            FaultDetail {
                code: None,
                description: Some("Unhandled".to_string()),
            },
        ] {
            let response = SoapResponse::fault(
                SoapFault {
                    faultcode: None,
                    faultstring: Some("oops".to_string()),
                    detail: Some(detail),
                },
                "<soap:Envelope>oops</soap:Envelope>",
            );
            assert_eq!(
                classifier.check(&response),
                Err(LoyaltyError::Unknown(
                    "<soap:Envelope>oops</soap:Envelope>".to_string()
                ))
            );
        }
    }

    #[test]
    fn test_code_without_description() {
        let classifier = FaultClassifier::new();
        let response = SoapResponse::fault(
            SoapFault {
                faultcode: None,
                faultstring: Some("oops".to_string()),
                detail: Some(FaultDetail {
                    code: Some("42".to_string()),
                    description: None,
                }),
            },
            "",
        );
        assert_eq!(
            classifier.check(&response),
            Err(LoyaltyError::Unknown("42 : oops".to_string()))
        );
    }

    #[test]
    fn test_custom_handler() {
        let classifier = FaultClassifier::new().with_handler("503", FaultKind::Connection);
        let response = fault_response("503", "Busy", "try later");
        let err = classifier.check(&response).unwrap_err();
        assert!(err.is_transient());
        assert_eq!(err.message(), "try later");
    }
}
