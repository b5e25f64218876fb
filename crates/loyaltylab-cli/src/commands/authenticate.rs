//! Credential check command

use crate::{error::CliResult, utils::ColoredOutput};
use loyaltylab_client::{ClientConfig, LoyaltyClient};

pub struct AuthenticateCommand;

impl AuthenticateCommand {
    /// Authenticate and print who the session belongs to. The token is never shown.
    pub async fn run(config: ClientConfig) -> CliResult<()> {
        let mut client = LoyaltyClient::connect(config.with_lazy_authentication(true)).await?;
        client.authenticate().await?;

        println!("{}", ColoredOutput::success("✓ Authenticated"));
        if let Some(session) = client.session() {
            println!(
                "Retailer GUID: {}",
                ColoredOutput::highlight(&session.retailer_guid)
            );
            println!("ICS User ID: {}", ColoredOutput::dim(&session.ics_user_id));
        }
        Ok(())
    }
}
