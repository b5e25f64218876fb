//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use loyaltylab_client::config::{PASSWORD_ENV, USERNAME_ENV};
use serde_json::Value as JsonValue;

#[derive(Parser)]
#[command(
    name = "loyaltylab",
    about = "Loyalty Lab - call loyalty program operations from the command line",
    version,
    author = "TRS Team"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API username
    #[arg(long, env = USERNAME_ENV, help = "Loyalty Lab API username")]
    pub username: Option<String>,

    /// API password
    #[arg(
        long,
        env = PASSWORD_ENV,
        hide_env_values = true,
        help = "Loyalty Lab API password"
    )]
    pub password: Option<String>,

    /// Configuration overrides file
    #[arg(long, help = "Read client settings from a YAML or JSON file")]
    pub config: Option<String>,

    /// Service endpoint
    #[arg(long, help = "Override the SOAP endpoint URL")]
    pub endpoint: Option<String>,

    /// Connect timeout in seconds
    #[arg(long, help = "Connect timeout in seconds")]
    pub open_timeout: Option<f64>,

    /// Read timeout in seconds
    #[arg(long, help = "Read timeout in seconds")]
    pub read_timeout: Option<f64>,

    /// Retries after a transport failure
    #[arg(long, help = "Immediate retries after a transport failure")]
    pub retries: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Call any remote operation by name
    Invoke {
        /// Operation name
        #[arg(help = "Operation name (e.g., GetShopperByEmail)")]
        operation: String,

        /// Parameters as JSON string
        #[arg(short, long, help = "Parameters as a JSON object")]
        input: Option<String>,

        /// Parameters from file
        #[arg(
            long,
            conflicts_with = "input",
            help = "Read parameters from file (JSON or YAML)"
        )]
        input_file: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty", help = "Output format")]
        format: OutputFormat,
    },

    /// Authenticate and print the session identity
    Authenticate,

    /// Print a default shopper record
    BuildShopper {
        /// Retailer-side shopper id
        id: String,

        /// Use this retailer GUID instead of authenticating
        #[arg(long, help = "Retailer GUID (skips authentication)")]
        retailer_guid: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty", help = "Output format")]
        format: OutputFormat,
    },

    /// Print a default loyalty card record
    BuildCard {
        /// Retailer-side shopper id
        id: String,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty", help = "Output format")]
        format: OutputFormat,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Pretty,
    /// Compact JSON
    Json,
}

impl OutputFormat {
    /// Format a JSON value according to the output format
    pub fn format_json(&self, value: &JsonValue) -> Result<String, serde_json::Error> {
        match self {
            Self::Pretty => serde_json::to_string_pretty(value),
            Self::Json => serde_json::to_string(value),
        }
    }
}
