//! Request orchestration for the Loyalty Lab API
//!
//! Any operation the service defines can be called by name through
//! [`LoyaltyClient::invoke`]. A call authenticates lazily on first use,
//! translates parameters into wire form, retries transport failures
//! immediately up to the configured count, classifies service faults and
//! normalizes the result.

use crate::builders;
use crate::config::ClientConfig;
use crate::session::{AuthSession, AUTHENTICATE_OPERATION};
use crate::transport::{HttpSoapTransport, SoapRequest, SoapTransport};
use loyaltylab_core::{
    create_debug_string, underscore, FaultClassifier, FieldMappingTable, FieldTranslator,
    LoyaltyError, LoyaltyResult,
};
use serde_json::{json, Map, Value as JsonValue};
use tracing::{debug, info, instrument, trace};

/// Per-call options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvokeOptions {
    /// Skip the authentication precondition and the session header.
    pub is_authentication_call: bool,
    /// Overrides the configured retry count for this call.
    pub connection_error_retries: Option<u32>,
}

impl InvokeOptions {
    pub fn authentication() -> Self {
        Self {
            is_authentication_call: true,
            connection_error_retries: None,
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.connection_error_retries = Some(retries);
        self
    }
}

/// Stateful client owning one transport and at most one session.
///
/// Calls take `&mut self`, so a client never has more than one call in
/// flight; share it across tasks behind a mutex.
pub struct LoyaltyClient<T = HttpSoapTransport> {
    config: ClientConfig,
    transport: T,
    translator: FieldTranslator,
    classifier: FaultClassifier,
    session: Option<AuthSession>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for LoyaltyClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoyaltyClient")
            .field("config", &self.config)
            .field("transport", &self.transport)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl LoyaltyClient<HttpSoapTransport> {
    /// Build an HTTP-backed client.
    ///
    /// Authenticates before returning unless `lazy_authentication` is set.
    pub async fn connect(config: ClientConfig) -> LoyaltyResult<Self> {
        let transport =
            HttpSoapTransport::new(&config.endpoint, config.namespace.clone(), config.timeouts())
                .map_err(|e| LoyaltyError::InvalidConfig(e.to_string()))?;

        let mut client = Self::with_transport(config, transport);
        if !client.config.lazy_authentication {
            client.authenticate().await?;
        }
        Ok(client)
    }
}

impl<T: SoapTransport> LoyaltyClient<T> {
    /// Build a client over any transport. Never authenticates eagerly.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            translator: FieldTranslator::default(),
            classifier: FaultClassifier::default(),
            session: None,
        }
    }

    pub fn with_field_mappings(mut self, table: FieldMappingTable) -> Self {
        self.translator = FieldTranslator::new(table);
        self
    }

    pub fn with_fault_classifier(mut self, classifier: FaultClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.authenticated)
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    pub fn retailer_guid(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.retailer_guid.as_str())
    }

    /// Establish (or re-establish) the session with the configured credentials.
    ///
    /// On failure the previous session, if any, is left in place.
    #[instrument(level = "debug", skip_all)]
    pub async fn authenticate(&mut self) -> LoyaltyResult<()> {
        let mut params = Map::new();
        params.insert(
            "username".to_string(),
            json!(self.config.username.clone().unwrap_or_default()),
        );
        params.insert(
            "password".to_string(),
            json!(self.config.password.clone().unwrap_or_default()),
        );

        let retries = self.config.connection_error_retries;
        let result = self
            .dispatch(AUTHENTICATE_OPERATION, &params, true, retries)
            .await?;

        let session = AuthSession::from_response(&result)?;
        info!(retailer_guid = %session.retailer_guid, "authenticated with Loyalty Lab");
        self.session = Some(session);
        Ok(())
    }

    /// Call `operation` with default options.
    pub async fn call(
        &mut self,
        operation: &str,
        params: Map<String, JsonValue>,
    ) -> LoyaltyResult<JsonValue> {
        self.invoke(operation, params, InvokeOptions::default()).await
    }

    /// Call any remote operation by name.
    ///
    /// Returns the operation's result element, normalized. A missing result
    /// element yields `null`.
    #[instrument(level = "debug", skip_all, fields(operation = %operation))]
    pub async fn invoke(
        &mut self,
        operation: &str,
        params: Map<String, JsonValue>,
        options: InvokeOptions,
    ) -> LoyaltyResult<JsonValue> {
        let retries = options
            .connection_error_retries
            .unwrap_or(self.config.connection_error_retries);

        if !self.is_authenticated() && !options.is_authentication_call {
            self.authenticate().await?;
        }

        self.dispatch(operation, &params, options.is_authentication_call, retries)
            .await
    }

    async fn dispatch(
        &self,
        operation: &str,
        params: &Map<String, JsonValue>,
        is_authentication_call: bool,
        retries: u32,
    ) -> LoyaltyResult<JsonValue> {
        let mut remaining = retries;

        let response = loop {
            let request = self.build_request(operation, params, is_authentication_call);
            trace!("{}", create_debug_string("request body", &request.body));

            match self.transport.request(&request).await {
                Ok(response) => break response,
                Err(err) => {
                    debug!("communication exception during request: {}", err);
                    if remaining == 0 {
                        debug!("no retry attempts remaining");
                        return Err(LoyaltyError::Connection(err.to_string()));
                    }
                    debug!("{} retry attempt(s) remaining; retrying...", remaining);
                    remaining -= 1;
                }
            }
        };

        self.classifier.check(&response)?;

        let result = unwrap_result(operation, &response.body);
        Ok(self.translator.inbound(operation, &result))
    }

    fn build_request(
        &self,
        operation: &str,
        params: &Map<String, JsonValue>,
        is_authentication_call: bool,
    ) -> SoapRequest {
        let header = if is_authentication_call {
            None
        } else {
            self.session.as_ref().map(AuthSession::header)
        };

        SoapRequest {
            operation: operation.to_string(),
            soap_action: format!("{}{}", self.config.namespace, operation),
            header,
            body: JsonValue::Object(self.translator.outbound(params)),
        }
    }

    /// Default shopper record for the current retailer.
    pub fn build_default_shopper(&self, retailer_shopper_id: impl std::fmt::Display) -> JsonValue {
        builders::build_default_shopper(
            self.retailer_guid().unwrap_or_default(),
            retailer_shopper_id,
        )
    }

    pub fn build_default_card(&self, retailer_shopper_id: impl std::fmt::Display) -> JsonValue {
        builders::build_default_card(retailer_shopper_id)
    }
}

/// Pull `<Op>Response/<Op>Result` (or `<op>_response/<op>_result`) out of a body.
fn unwrap_result(operation: &str, body: &JsonValue) -> JsonValue {
    let snake = underscore(operation);

    let lookup = |value: &JsonValue, keys: [String; 2]| -> Option<JsonValue> {
        let fields = value.as_object()?;
        keys.iter().find_map(|key| fields.get(key)).cloned()
    };

    lookup(
        body,
        [format!("{operation}Response"), format!("{snake}_response")],
    )
    .and_then(|response| {
        lookup(
            &response,
            [format!("{operation}Result"), format!("{snake}_result")],
        )
    })
    .unwrap_or(JsonValue::Null)
}
