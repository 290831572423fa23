//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Fraudscope - terminal dashboard for fiscal fraud audit results
///
/// Fetches the suspect-property analysis from the audit backend and
/// presents risk distribution, top irregularity reasons, a market
/// scatter projection and a filterable detail table.
///
/// Examples:
///   fraudscope
///   fraudscope --endpoint http://auditoria.interna:8000/analisar-pasta
///   fraudscope --once --output relatorio.md
///   fraudscope --once --format json --output relatorio.json --fail-on high
///   fraudscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// URL of the analysis endpoint
    ///
    /// Defaults to the local audit backend. Can also be set via the
    /// FRAUDSCOPE_ENDPOINT env var or .fraudscope.toml config.
    #[arg(short, long, value_name = "URL", env = "FRAUDSCOPE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Write a report to this file after a successful fetch
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Run one fetch, print the dashboard, and exit
    ///
    /// Without this flag an interactive session starts.
    #[arg(long)]
    pub once: bool,

    /// Initial filter query for the detail table
    #[arg(short, long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum rows shown in the detail table
    #[arg(long, value_name = "COUNT")]
    pub max_rows: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .fraudscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Fail if any record is at or above this risk level
    ///
    /// Useful for CI pipelines. Exit code 2 when the threshold is hit.
    /// Values: critical, high, medium, low
    #[arg(long, value_name = "LEVEL")]
    pub fail_on: Option<FailOnLevel>,

    /// Generate a default .fraudscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Report format for --output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Risk level threshold for --fail-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum FailOnLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref endpoint) = self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err("Endpoint URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(max_rows) = self.max_rows {
            if max_rows == 0 {
                return Err("Max rows must be at least 1".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            endpoint: Some("http://localhost:8000/analisar-pasta".to_string()),
            output: None,
            format: OutputFormat::Markdown,
            once: false,
            filter: None,
            timeout: None,
            max_rows: None,
            config: None,
            verbose: false,
            quiet: false,
            fail_on: None,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_endpoint() {
        let mut args = make_args();
        args.endpoint = Some("localhost:8000".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.endpoint = Some("not-a-url".to_string());
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
