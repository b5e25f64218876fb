//! Loyalty Lab CLI main entry point

use clap::Parser;
use loyaltylab_cli::{
    cli::{Cli, Commands},
    commands::{client_config, AuthenticateCommand, BuildCommand, InvokeCommand},
    error::CliResult,
    utils::{init_tracing, ColoredOutput},
};
use tracing::debug;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", ColoredOutput::error("Error:"), e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    // Disable colored output if requested
    if cli.no_color {
        colored::control::set_override(false);
    }

    debug!("Loyalty Lab CLI v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Invoke {
            operation,
            input,
            input_file,
            format,
        } => {
            InvokeCommand::run(
                client_config(&cli)?,
                operation,
                input.clone(),
                input_file.clone(),
                *format,
            )
            .await
        }

        Commands::Authenticate => AuthenticateCommand::run(client_config(&cli)?).await,

        Commands::BuildShopper {
            id,
            retailer_guid,
            format,
        } => {
            let config = client_config(&cli)?;
            BuildCommand::shopper(config, id, retailer_guid.clone(), *format).await
        }

        Commands::BuildCard { id, format } => BuildCommand::card(id, *format),
    }
}
