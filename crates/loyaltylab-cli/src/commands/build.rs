//! Default record builders

use crate::{cli::OutputFormat, error::CliResult};
use loyaltylab_client::{builders, ClientConfig, LoyaltyClient};
use serde_json::Value as JsonValue;

pub struct BuildCommand;

impl BuildCommand {
    /// Print a default shopper. Without an explicit retailer GUID the one
    /// from a fresh session is used.
    pub async fn shopper(
        config: ClientConfig,
        id: &str,
        retailer_guid: Option<String>,
        format: OutputFormat,
    ) -> CliResult<()> {
        let shopper = match retailer_guid {
            Some(guid) => builders::build_default_shopper(&guid, id),
            None => {
                let client = LoyaltyClient::connect(config.with_lazy_authentication(false)).await?;
                client.build_default_shopper(id)
            }
        };
        Self::print(&shopper, format)
    }

    pub fn card(id: &str, format: OutputFormat) -> CliResult<()> {
        Self::print(&builders::build_default_card(id), format)
    }

    fn print(record: &JsonValue, format: OutputFormat) -> CliResult<()> {
        println!("{}", format.format_json(record)?);
        Ok(())
    }
}
