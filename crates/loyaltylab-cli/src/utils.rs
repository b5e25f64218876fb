//! Utility functions for the CLI

use crate::error::{CliError, CliResult};
use anyhow::Context;
use colored::{ColoredString, Colorize};
use serde_json::{Map, Value as JsonValue};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_FILTER: &str = "info";
const VERBOSE_FILTER: &str = "loyaltylab_client=debug,loyaltylab_cli=debug,info";

/// Initialize tracing with proper filtering
///
/// `RUST_LOG` wins when set. Logs go to stderr so command output stays
/// machine readable.
pub fn init_tracing(verbose: bool) -> CliResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CliError::General(format!("Failed to set tracing subscriber: {}", e)))?;

    Ok(())
}

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Utility for colored console output
pub struct ColoredOutput;

impl ColoredOutput {
    pub fn success(msg: &str) -> ColoredString {
        msg.green().bold()
    }

    pub fn error(msg: &str) -> ColoredString {
        msg.red().bold()
    }

    pub fn dim(msg: &str) -> ColoredString {
        msg.dimmed()
    }

    pub fn highlight(msg: &str) -> ColoredString {
        msg.cyan().bold()
    }
}

/// Validate file exists and is readable
pub fn validate_file_exists(path: &str) -> CliResult<()> {
    if !std::path::Path::new(path).exists() {
        return Err(CliError::FileNotFound(path.to_string()));
    }
    Ok(())
}

/// Read operation parameters from either a command line argument or a file
///
/// Parameters must form an object; no input at all means no parameters.
pub fn read_input_data(
    input: Option<String>,
    input_file: Option<String>,
) -> CliResult<Map<String, JsonValue>> {
    let value = match (input, input_file) {
        (Some(input_str), None) => serde_json::from_str(&input_str)
            .map_err(|e| CliError::InvalidArgument(format!("Invalid JSON input: {}", e)))?,
        (None, Some(file_path)) => {
            validate_file_exists(&file_path)?;
            let content = std::fs::read_to_string(&file_path)
                .with_context(|| format!("Failed to read input file '{}'", file_path))?;

            // Try to parse as JSON first, then YAML
            if let Ok(json_data) = serde_json::from_str::<JsonValue>(&content) {
                json_data
            } else {
                serde_yaml::from_str::<JsonValue>(&content).map_err(|e| {
                    CliError::InvalidArgument(format!(
                        "Invalid JSON/YAML input file '{}': {}",
                        file_path, e
                    ))
                })?
            }
        }
        (None, None) => JsonValue::Object(Map::new()),
        (Some(_), Some(_)) => {
            return Err(CliError::InvalidArgument(
                "Cannot specify both --input and --input-file".to_string(),
            ))
        }
    };

    match value {
        JsonValue::Object(params) => Ok(params),
        other => Err(CliError::InvalidArgument(format!(
            "Parameters must be a JSON object, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "info");
        assert!(default_filter(true).contains("loyaltylab_client=debug"));
    }

    #[test]
    fn test_read_input_json_string() {
        let params = read_input_data(Some(r#"{"email": "a@example.com"}"#.to_string()), None).unwrap();
        assert_eq!(JsonValue::Object(params), json!({"email": "a@example.com"}));
    }

    #[test]
    fn test_read_input_yaml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "shopperId: 5\npointChange: 100").unwrap();

        let params =
            read_input_data(None, Some(file.path().to_string_lossy().to_string())).unwrap();
        assert_eq!(
            JsonValue::Object(params),
            json!({"shopperId": 5, "pointChange": 100})
        );
    }

    #[test]
    fn test_read_input_defaults_to_empty() {
        assert!(read_input_data(None, None).unwrap().is_empty());
    }

    #[test]
    fn test_read_input_rejects_non_object() {
        assert!(matches!(
            read_input_data(Some("[1, 2]".to_string()), None),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_read_input_missing_file() {
        assert!(matches!(
            read_input_data(None, Some("/nonexistent/params.json".to_string())),
            Err(CliError::FileNotFound(_))
        ));
    }
}
