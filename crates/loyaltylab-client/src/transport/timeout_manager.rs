//! Open/read timeout handling for SOAP requests

use super::{TimeoutConfig, TransportError, TransportResult};
use reqwest::ClientBuilder;
use std::time::Duration;
use tokio::time::timeout;

/// Applies the open timeout to the HTTP client and the read timeout per request
#[derive(Debug, Clone)]
pub struct TimeoutManager {
    config: TimeoutConfig,
}

impl TimeoutManager {
    pub fn new(config: TimeoutConfig) -> Self {
        Self { config }
    }

    /// Set the connection-establishment timeout on a client builder
    pub fn apply_to_client_builder(&self, builder: ClientBuilder) -> ClientBuilder {
        builder.connect_timeout(self.config.open)
    }

    pub fn get_request_timeout(&self) -> Duration {
        self.config.read
    }

    pub fn get_config(&self) -> &TimeoutConfig {
        &self.config
    }

    /// Run a request future under the read timeout, mapping reqwest failures
    /// onto transport errors
    pub async fn execute_with_timeout<F, T>(&self, operation: F) -> TransportResult<T>
    where
        F: std::future::Future<Output = Result<T, reqwest::Error>>,
    {
        let request_timeout = self.get_request_timeout();

        match timeout(request_timeout, operation).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) if err.is_timeout() => Err(TransportError::Timeout(format!(
                "Request timed out after {}ms",
                request_timeout.as_millis()
            ))),
            Ok(Err(err)) if err.is_connect() => Err(TransportError::Connection(err.to_string())),
            Ok(Err(err)) => Err(TransportError::Http(err)),
            Err(_) => Err(TransportError::Timeout(format!(
                "Request timed out after {}ms (read timeout)",
                request_timeout.as_millis()
            ))),
        }
    }

    pub fn validate(&self) -> TransportResult<()> {
        if self.config.open.is_zero() {
            return Err(TransportError::InvalidConfig(
                "Open timeout must be greater than 0".to_string(),
            ));
        }
        if self.config.read.is_zero() {
            return Err(TransportError::InvalidConfig(
                "Read timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
