//! Transport collaborator: performs one SOAP call and decodes the reply
//!
//! The client only depends on the [`SoapTransport`] trait. Any `Err` it
//! returns counts as a transport failure and is subject to the retry policy;
//! faults the service reports come back as `Ok` with a faulted
//! [`SoapResponse`].

pub mod envelope;
pub mod http;
pub mod timeout_manager;

use async_trait::async_trait;
use loyaltylab_core::SoapResponse;
use serde_json::Value as JsonValue;
use std::time::Duration;
use thiserror::Error;

pub use http::HttpSoapTransport;
pub use timeout_manager::TimeoutManager;

/// Open/read timeouts applied to every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    pub open: Duration,
    pub read: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            open: crate::config::DEFAULT_TIMEOUT,
            read: crate::config::DEFAULT_TIMEOUT,
        }
    }
}

/// A single SOAP call, already in wire form.
#[derive(Debug, Clone, PartialEq)]
pub struct SoapRequest {
    /// Operation name as the vendor defines it, e.g. `GetShopperByEmail`.
    pub operation: String,
    /// Value of the `SOAPAction` HTTP header.
    pub soap_action: String,
    /// Contents of the SOAP `Header`, absent for authentication calls.
    pub header: Option<JsonValue>,
    /// Namespace-prefixed parameters placed under the operation element.
    pub body: JsonValue,
}

impl SoapRequest {
    /// Qualified name of the operation element in the body.
    pub fn element_name(&self) -> String {
        loyaltylab_core::wire_key(&self.operation)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Envelope error: {0}")]
    Envelope(String),

    #[error("Invalid transport configuration: {0}")]
    InvalidConfig(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

#[async_trait]
pub trait SoapTransport: Send + Sync {
    async fn request(&self, request: &SoapRequest) -> TransportResult<SoapResponse>;
}

#[async_trait]
impl<T: SoapTransport + ?Sized> SoapTransport for Box<T> {
    async fn request(&self, request: &SoapRequest) -> TransportResult<SoapResponse> {
        (**self).request(request).await
    }
}

#[async_trait]
impl<T: SoapTransport + ?Sized> SoapTransport for std::sync::Arc<T> {
    async fn request(&self, request: &SoapRequest) -> TransportResult<SoapResponse> {
        (**self).request(request).await
    }
}
