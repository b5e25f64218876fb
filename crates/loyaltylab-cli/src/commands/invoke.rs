//! Operation invocation command

use crate::{cli::OutputFormat, error::CliResult, utils::read_input_data};
use loyaltylab_client::{ClientConfig, InvokeOptions, LoyaltyClient};
use tracing::info;

pub struct InvokeCommand;

impl InvokeCommand {
    pub async fn run(
        config: ClientConfig,
        operation: &str,
        input: Option<String>,
        input_file: Option<String>,
        format: OutputFormat,
    ) -> CliResult<()> {
        let params = read_input_data(input, input_file)?;

        info!("Invoking operation: {}", operation);

        let mut client = LoyaltyClient::connect(config).await?;
        let result = client
            .invoke(operation, params, InvokeOptions::default())
            .await?;

        println!("{}", format.format_json(&result)?);
        Ok(())
    }
}
