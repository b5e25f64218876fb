//! SOAP over HTTP transport backed by reqwest

use super::envelope::{decode_response, encode_envelope};
use super::{SoapRequest, SoapTransport, TimeoutConfig, TimeoutManager, TransportError, TransportResult};
use async_trait::async_trait;
use loyaltylab_core::SoapResponse;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, trace};
use url::Url;

const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Posts SOAP 1.1 envelopes to a single endpoint.
#[derive(Debug, Clone)]
pub struct HttpSoapTransport {
    client: Client,
    endpoint: Url,
    namespace: String,
    timeout_manager: TimeoutManager,
}

impl HttpSoapTransport {
    pub fn new(
        endpoint: &str,
        namespace: impl Into<String>,
        timeouts: TimeoutConfig,
    ) -> TransportResult<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            TransportError::InvalidConfig(format!("Invalid endpoint URL '{}': {}", endpoint, e))
        })?;

        let timeout_manager = TimeoutManager::new(timeouts);
        timeout_manager.validate()?;

        let client = timeout_manager
            .apply_to_client_builder(Client::builder())
            .build()?;

        Ok(Self {
            client,
            endpoint,
            namespace: namespace.into(),
            timeout_manager,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[async_trait]
impl SoapTransport for HttpSoapTransport {
    async fn request(&self, request: &SoapRequest) -> TransportResult<SoapResponse> {
        let envelope = encode_envelope(request, &self.namespace)?;

        debug!(
            operation = %request.operation,
            endpoint = %self.endpoint,
            "sending SOAP request"
        );

        let send = async {
            let response = self
                .client
                .post(self.endpoint.clone())
                .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
                .header("SOAPAction", format!("\"{}\"", request.soap_action))
                .body(envelope)
                .send()
                .await?;
            let status = response.status().as_u16();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        };

        let (status, raw) = self.timeout_manager.execute_with_timeout(send).await?;
        trace!(status, bytes = raw.len(), "received SOAP response");

        decode_response(status, raw)
    }
}
