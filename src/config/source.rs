//! Where the topics document comes from
//!
//! The source is chosen once at startup from the CLI arguments and handed to
//! the driver; nothing downstream knows which variant produced the topics.

use super::args::CliArgs;
use super::document::TopicsConfig;
use crate::error::{Result, TopicSyncError};
use reqwest::StatusCode;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Header Consul reads the ACL token from
const CONSUL_TOKEN_HEADER: &str = "X-Consul-Token";

/// Topics document location
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Local YAML file
    File { path: PathBuf },
    /// Value of a Consul KV key
    Consul(ConsulSource),
}

/// Consul KV location of the topics document
#[derive(Debug, Clone)]
pub struct ConsulSource {
    /// Consul HTTP address, e.g. `http://127.0.0.1:8500`
    pub url: String,
    pub token: Option<String>,
    /// KV key, e.g. `kafka/topics`
    pub key: String,
    pub timeout: Duration,
}

impl ConfigSource {
    pub fn from_args(args: &CliArgs) -> Self {
        if args.consul_enabled {
            ConfigSource::Consul(ConsulSource {
                url: args.consul_url.clone(),
                token: args.consul_token.clone().filter(|t| !t.is_empty()),
                key: args.consul_config_path.clone(),
                timeout: args.request_timeout(),
            })
        } else {
            ConfigSource::File {
                path: args.config_path.clone(),
            }
        }
    }

    /// Fetch and parse the topics document
    pub fn load(&self) -> Result<TopicsConfig> {
        let raw = match self {
            ConfigSource::File { path } => std::fs::read_to_string(path).map_err(|e| {
                TopicSyncError::config_load(format!(
                    "Error while reading yaml-config {:?}: {}",
                    path, e
                ))
            })?,
            ConfigSource::Consul(consul) => consul.fetch()?,
        };
        debug!(source = %self, bytes = raw.len(), "Fetched topics document");
        TopicsConfig::from_yaml(&raw)
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File { path } => write!(f, "file:{}", path.display()),
            ConfigSource::Consul(consul) => write!(f, "consul:{}/{}", consul.url, consul.key),
        }
    }
}

impl ConsulSource {
    /// KV read endpoint returning the raw value
    pub fn kv_url(&self) -> String {
        format!(
            "{}/v1/kv/{}?raw",
            self.url.trim_end_matches('/'),
            self.key.trim_start_matches('/')
        )
    }

    fn fetch(&self) -> Result<String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                TopicSyncError::connection(format!("Couldn't build consul client: {}", e))
            })?;

        let mut request = client.get(self.kv_url());
        if let Some(token) = &self.token {
            request = request.header(CONSUL_TOKEN_HEADER, token);
        }

        let response = request.send().map_err(|e| {
            TopicSyncError::connection(format!("Couldn't connect to consul at {}: {}", self.url, e))
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TopicSyncError::config_load(format!(
                "Config not found in Consul at key '{}'",
                self.key
            )));
        }
        if !status.is_success() {
            return Err(TopicSyncError::connection(format!(
                "Failed to get config from Consul: HTTP {} for key '{}'",
                status, self.key
            )));
        }

        response.text().map_err(|e| {
            TopicSyncError::connection(format!("Failed to read Consul response body: {}", e))
        })
    }
}
