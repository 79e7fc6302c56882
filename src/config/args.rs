//! Command-line arguments for topicsync
//!
//! This module defines the CLI arguments structure using clap. Every flag
//! can also be set through its environment variable; a flag given on the
//! command line wins over the environment.

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::*;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human readable
    Text,
}

/// Command-line arguments for topicsync
#[derive(Parser, Debug, Clone)]
#[command(name = "topicsync")]
#[command(about = "Reconcile Kafka topics with a declarative YAML document")]
#[command(disable_version_flag = true)]
pub struct CliArgs {
    /// Use consul: true || false.
    #[arg(
        long,
        env = "CONSUL_ENABLED",
        default_value_t = DEFAULT_CONSUL_ENABLED,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub consul_enabled: bool,

    /// Set consul url.
    #[arg(long, env = "CONSUL_URL", default_value = DEFAULT_CONSUL_URL)]
    pub consul_url: String,

    /// Set consul acl token.
    #[arg(long, env = "CONSUL_TOKEN", hide_env_values = true)]
    pub consul_token: Option<String>,

    /// Set consul config path.
    #[arg(long, env = "CONSUL_CONFIG_PATH", default_value = DEFAULT_CONSUL_CONFIG_PATH)]
    pub consul_config_path: String,

    /// Set path to yaml config file.
    #[arg(long, env = "CONFIG_PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: PathBuf,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, env = "TOPICSYNC_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "TOPICSYNC_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// Describe and decide every topic without creating or altering anything
    #[arg(long, env = "TOPICSYNC_DRY_RUN")]
    pub dry_run: bool,

    /// Timeout for each broker or Consul request, in milliseconds
    #[arg(long, env = "TOPICSYNC_REQUEST_TIMEOUT_MS", default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    pub request_timeout_ms: u64,

    /// Print version information and quit
    #[arg(long)]
    pub version: bool,
}

impl CliArgs {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
