use async_trait::async_trait;
use loyaltylab_client::{
    ClientConfig, InvokeOptions, LoyaltyClient, LoyaltyError, SoapRequest, SoapResponse,
    SoapTransport, TransportError, TransportResult,
};
use loyaltylab_core::{FaultDetail, SoapFault};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays canned replies in order and records every request it sees.
#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<TransportResult<SoapResponse>>>,
    fallback_error: Option<String>,
    requests: Mutex<Vec<SoapRequest>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<TransportResult<SoapResponse>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        })
    }

    fn always_failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            fallback_error: Some(message.to_string()),
            ..Default::default()
        })
    }

    fn requests(&self) -> Vec<SoapRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SoapTransport for ScriptedTransport {
    async fn request(&self, request: &SoapRequest) -> TransportResult<SoapResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            return reply;
        }
        match &self.fallback_error {
            Some(message) => Err(TransportError::Connection(message.clone())),
            None => panic!("unexpected request for {}", request.operation),
        }
    }
}

const NS: &str = "http://www.loyaltylab.com/loyaltyapi/";

fn config() -> ClientConfig {
    ClientConfig::default()
        .with_credentials("joe", "secret")
        .with_lazy_authentication(true)
}

fn params(value: JsonValue) -> Map<String, JsonValue> {
    value.as_object().cloned().unwrap_or_default()
}

fn result_body(operation: &str, result: JsonValue) -> SoapResponse {
    SoapResponse::ok(json!({
        format!("{operation}Response"): { format!("{operation}Result"): result }
    }))
}

fn auth_ok() -> TransportResult<SoapResponse> {
    Ok(result_body(
        "AuthenticateUser",
        json!({
            "RetailerGuid": "G1",
            "Authenticated": true,
            "Token": "T1",
            "ICSUserID": "U1"
        }),
    ))
}

fn fault(code: Option<&str>, description: Option<&str>, faultstring: &str) -> SoapResponse {
    SoapResponse::fault(
        SoapFault {
            faultcode: Some("soap:Server".to_string()),
            faultstring: Some(faultstring.to_string()),
            detail: Some(FaultDetail {
                code: code.map(str::to_string),
                description: description.map(str::to_string),
            }),
        },
        "<soap:Fault/>".to_string(),
    )
}

#[tokio::test]
async fn test_lazy_authentication_precedes_first_call() {
    let transport = ScriptedTransport::new(vec![
        auth_ok(),
        Ok(result_body(
            "GetShopperByEmail",
            json!({"ShopperId": 5, "RetailerGUID": "G1", "FirstName": "Ann"}),
        )),
    ]);
    let mut client = LoyaltyClient::with_transport(config(), transport.clone());
    assert!(!client.is_authenticated());

    let shopper = client
        .call("GetShopperByEmail", params(json!({"email": "a@example.com"})))
        .await
        .unwrap();

    assert_eq!(
        shopper,
        json!({"shopperId": 5, "retailer_guid": "G1", "firstName": "Ann"})
    );
    assert!(client.is_authenticated());
    assert_eq!(client.retailer_guid(), Some("G1"));

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].operation, "AuthenticateUser");
    assert_eq!(requests[1].operation, "GetShopperByEmail");
}

#[tokio::test]
async fn test_authentication_request_shape() {
    let transport = ScriptedTransport::new(vec![auth_ok()]);
    let mut client = LoyaltyClient::with_transport(config(), transport.clone());

    client.authenticate().await.unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.soap_action, format!("{NS}AuthenticateUser"));
    assert_eq!(request.header, None);
    assert_eq!(
        request.body,
        json!({"wsdl:username": "joe", "wsdl:password": "secret"})
    );

    let session = client.session().unwrap();
    assert_eq!(session.token, "T1");
    assert_eq!(session.ics_user_id, "U1");
}

#[tokio::test]
async fn test_session_header_on_later_calls() {
    let transport = ScriptedTransport::new(vec![
        auth_ok(),
        Ok(result_body("AdjustShopperPoints", json!("1500"))),
    ]);
    let mut client = LoyaltyClient::with_transport(config(), transport.clone());

    let balance = client
        .call(
            "AdjustShopperPoints",
            params(json!({"shopperId": 5, "pointChange": 1000, "description": "promo"})),
        )
        .await
        .unwrap();
    assert_eq!(balance, json!("1500"));

    let request = &transport.requests()[1];
    assert_eq!(request.soap_action, format!("{NS}AdjustShopperPoints"));
    assert_eq!(
        request.header,
        Some(json!({
            "wsdl:AuthenticationResult": {
                "wsdl:RetailerGuid": "G1",
                "wsdl:Authenticated": true,
                "wsdl:Token": "T1",
                "wsdl:ICSUserID": "U1"
            }
        }))
    );

    let keys: Vec<&str> = request
        .body
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        keys,
        vec!["wsdl:shopperId", "wsdl:pointChange", "wsdl:description"]
    );
}

#[tokio::test]
async fn test_authentication_fault_code() {
    let transport = ScriptedTransport::new(vec![
        auth_ok(),
        Ok(fault(Some("100"), Some("Auth"), "Session expired")),
    ]);
    let mut client = LoyaltyClient::with_transport(config(), transport);

    let err = client
        .call("GetShopperByID", params(json!({"shopperId": 1})))
        .await
        .unwrap_err();
    assert_eq!(err, LoyaltyError::Authentication("Session expired".to_string()));
}

#[tokio::test]
async fn test_unknown_fault_code() {
    let transport = ScriptedTransport::new(vec![
        auth_ok(),
        Ok(fault(Some("999"), Some("D"), "Something broke")),
    ]);
    let mut client = LoyaltyClient::with_transport(config(), transport.clone());

    let err = client
        .call("GetShopperByID", params(json!({"shopperId": 1})))
        .await
        .unwrap_err();
    assert_eq!(err, LoyaltyError::Unknown("999 D: Something broke".to_string()));

    // Faults are never retried.
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn test_http_error_without_envelope() {
    let transport = ScriptedTransport::new(vec![
        auth_ok(),
        Ok(SoapResponse::http_error(503, "Service Unavailable".to_string())),
    ]);
    let mut client = LoyaltyClient::with_transport(config(), transport);

    let err = client.call("Ping", Map::new()).await.unwrap_err();
    assert_eq!(err, LoyaltyError::Unknown("Service Unavailable".to_string()));
}

#[tokio::test]
async fn test_transport_failures_exhaust_retries() {
    let transport = ScriptedTransport::always_failing("connection refused");
    let mut client = LoyaltyClient::with_transport(config().with_retries(2), transport.clone());

    let err = client
        .invoke("AuthenticateUser", Map::new(), InvokeOptions::authentication())
        .await
        .unwrap_err();

    assert!(matches!(&err, LoyaltyError::Connection(msg) if msg.contains("connection refused")));
    assert_eq!(transport.requests().len(), 3);
}

#[tokio::test]
async fn test_operation_retries_without_reauthenticating() {
    let transport = Arc::new(ScriptedTransport {
        replies: Mutex::new(vec![auth_ok()].into()),
        fallback_error: Some("connection refused".to_string()),
        ..Default::default()
    });
    let mut client = LoyaltyClient::with_transport(config().with_retries(2), transport.clone());

    let err = client
        .invoke(
            "GetShopperByID",
            params(json!({"shopperId": 1})),
            InvokeOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(&err, LoyaltyError::Connection(msg) if msg.contains("connection refused")));
    assert!(client.is_authenticated());

    let operations: Vec<String> = transport
        .requests()
        .into_iter()
        .map(|request| request.operation)
        .collect();
    assert_eq!(
        operations,
        vec![
            "AuthenticateUser",
            "GetShopperByID",
            "GetShopperByID",
            "GetShopperByID"
        ]
    );
}

#[tokio::test]
async fn test_per_call_retry_override() {
    let transport = ScriptedTransport::always_failing("reset by peer");
    let mut client = LoyaltyClient::with_transport(config().with_retries(5), transport.clone());

    let err = client
        .invoke(
            "AuthenticateUser",
            Map::new(),
            InvokeOptions::authentication().with_retries(0),
        )
        .await
        .unwrap_err();

    assert!(err.is_transient());
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_transient_failure_then_success() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportError::Timeout("read timed out".to_string())),
        auth_ok(),
    ]);
    let mut client = LoyaltyClient::with_transport(config().with_retries(1), transport.clone());

    client.authenticate().await.unwrap();
    assert!(client.is_authenticated());
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn test_rejected_credentials_leave_client_unauthenticated() {
    let transport = ScriptedTransport::new(vec![Ok(result_body(
        "AuthenticateUser",
        json!({"RetailerGuid": "", "Authenticated": false, "Token": "", "ICSUserID": ""}),
    ))]);
    let mut client = LoyaltyClient::with_transport(config(), transport.clone());

    let err = client
        .call("GetShopperByID", params(json!({"shopperId": 1})))
        .await
        .unwrap_err();

    assert!(matches!(err, LoyaltyError::Authentication(_)));
    assert!(!client.is_authenticated());
    // The operation itself was never sent.
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_failed_reauthentication_keeps_previous_session() {
    let transport = ScriptedTransport::new(vec![
        auth_ok(),
        Ok(fault(Some("100"), None, "bad credentials")),
    ]);
    let mut client = LoyaltyClient::with_transport(config(), transport);

    client.authenticate().await.unwrap();
    assert!(client.authenticate().await.is_err());
    assert_eq!(client.session().map(|s| s.token.as_str()), Some("T1"));
}

#[tokio::test]
async fn test_missing_result_is_null() {
    let transport = ScriptedTransport::new(vec![
        auth_ok(),
        Ok(SoapResponse::ok(json!({"DeleteShopperResponse": {}}))),
    ]);
    let mut client = LoyaltyClient::with_transport(config(), transport);

    let result = client.call("DeleteShopper", Map::new()).await.unwrap();
    assert_eq!(result, JsonValue::Null);
}

#[tokio::test]
async fn test_builders_use_session_retailer() {
    let transport = ScriptedTransport::new(vec![auth_ok()]);
    let mut client = LoyaltyClient::with_transport(config(), transport);
    client.authenticate().await.unwrap();

    let shopper = client.build_default_shopper(77);
    assert_eq!(shopper["RetailerGUID"], "G1");
    assert_eq!(shopper["RetailerShopperId"], "77");

    let card = client.build_default_card(77);
    assert_eq!(card["AlternateCardIdentifier"], "77");
}
