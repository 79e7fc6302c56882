//! Default constants for topicsync configuration
//!
//! These constants define the default values used when no flag or
//! environment variable is provided.

/// Default config source selection
pub const DEFAULT_CONSUL_ENABLED: bool = false;

/// Default Consul HTTP address
pub const DEFAULT_CONSUL_URL: &str = "http://127.0.0.1:8500";

/// Default Consul KV key holding the topics document
pub const DEFAULT_CONSUL_CONFIG_PATH: &str = "kafka/topics";

/// Default local topics document
pub const DEFAULT_CONFIG_PATH: &str = "./topics.yaml";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default broker/Consul request timeout in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Broker TCP connect timeout in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Client id sent in every Kafka request header
pub const DEFAULT_CLIENT_ID: &str = "topicsync";
