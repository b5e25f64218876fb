pub mod authenticate;
pub mod build;
pub mod invoke;

// Re-export command handlers
pub use authenticate::AuthenticateCommand;
pub use build::BuildCommand;
pub use invoke::InvokeCommand;

use crate::cli::Cli;
use crate::error::{CliError, CliResult};
use loyaltylab_client::{ClientConfig, ConfigOverrides};
use std::time::Duration;
use tracing::debug;

/// Resolve the client configuration: environment defaults, then the config
/// file, then command line flags.
pub fn client_config(cli: &Cli) -> CliResult<ClientConfig> {
    let mut config = ClientConfig::defaults();

    if let Some(path) = &cli.config {
        crate::utils::validate_file_exists(path)?;
        config = config.merge(ConfigOverrides::from_file(path)?);
    }

    let config = config.merge(ConfigOverrides {
        username: cli.username.clone(),
        password: cli.password.clone(),
        open_timeout: cli.open_timeout.map(seconds).transpose()?,
        read_timeout: cli.read_timeout.map(seconds).transpose()?,
        connection_error_retries: cli.retries,
        endpoint: cli.endpoint.clone(),
        ..Default::default()
    });

    debug!(?config, "resolved client configuration");
    Ok(config)
}

fn seconds(value: f64) -> CliResult<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| CliError::InvalidArgument(format!("Invalid timeout '{}': {}", value, e)))
}
