//! Stateful client for the Loyalty Lab SOAP loyalty API.
//!
//! ```no_run
//! use loyaltylab_client::{ClientConfig, LoyaltyClient};
//! use serde_json::json;
//!
//! # async fn run() -> loyaltylab_client::LoyaltyResult<()> {
//! let mut client = LoyaltyClient::connect(ClientConfig::defaults()).await?;
//!
//! let params = json!({"email": "test@example.com"});
//! let shopper = client
//!     .call("GetShopperByEmail", params.as_object().cloned().unwrap_or_default())
//!     .await?;
//! println!("{}", shopper["shopperId"]);
//! # Ok(())
//! # }
//! ```

pub mod builders;
pub mod client;
pub mod config;
pub mod session;
pub mod transport;

pub use client::{InvokeOptions, LoyaltyClient};
pub use config::{ClientConfig, ConfigError, ConfigOverrides, ConfigResult};
pub use session::{AuthSession, AUTHENTICATE_OPERATION};
pub use transport::{
    HttpSoapTransport, SoapRequest, SoapTransport, TimeoutConfig, TransportError, TransportResult,
};

pub use loyaltylab_core::{
    FaultClassifier, FaultKind, FieldMappingTable, LoyaltyError, LoyaltyResult, SoapFault,
    SoapResponse,
};
