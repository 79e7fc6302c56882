//! Topics document schema
//!
//! ```yaml
//! kafka_brokers:
//!   - kafka-1:9092
//!   - kafka-2:9092
//! topics:
//!   - name: orders
//!     num.partitions: 6
//!     replication.factor: 3
//!     retention.ms: 604800000
//!     cleanup.policy: delete
//!   - name: logs
//!     cleanup.policy: compact
//! ```
//!
//! Every key of a topic entry other than `name`, `num.partitions` and
//! `replication.factor` is a broker config override.

use crate::error::{Result, TopicSyncError};
use crate::reconcile::ConfigEntries;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Root of the topics document
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TopicsConfig {
    /// Bootstrap brokers, "host:port"
    pub kafka_brokers: Vec<String>,
    /// Desired topics, processed in this order
    pub topics: Vec<RawTopicSpec>,
}

impl TopicsConfig {
    /// Parse and validate a YAML document.
    ///
    /// Merge keys (`<<: *defaults`) are expanded before the topics are read.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let parse_error = |e: serde_yaml::Error| {
            TopicSyncError::config_load(format!("Failed to parse YAML config: {}", e))
        };

        let mut value: Value = serde_yaml::from_str(yaml).map_err(parse_error)?;
        value.apply_merge().map_err(parse_error)?;
        let config: TopicsConfig = serde_yaml::from_value(value).map_err(parse_error)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.kafka_brokers.iter().all(|b| b.trim().is_empty()) {
            return Err(TopicSyncError::config_load(
                "no brokers configured in kafka_brokers",
            ));
        }
        if let Some(pos) = self.topics.iter().position(|t| t.name.is_empty()) {
            return Err(TopicSyncError::config_load(format!(
                "topic #{} has an empty name",
                pos + 1
            )));
        }
        Ok(())
    }
}

/// A desired topic as written by the operator, before resolution
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "TopicEntry")]
pub struct RawTopicSpec {
    pub name: String,
    pub partitions: Option<i32>,
    pub replication_factor: Option<i16>,
    pub config_entries: ConfigEntries,
}

impl RawTopicSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partitions: None,
            replication_factor: None,
            config_entries: ConfigEntries::new(),
        }
    }

    pub fn with_partitions(mut self, partitions: i32) -> Self {
        self.partitions = Some(partitions);
        self
    }

    pub fn with_replication_factor(mut self, replication_factor: i16) -> Self {
        self.replication_factor = Some(replication_factor);
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config_entries.insert(key.into(), Some(value.into()));
        self
    }
}

/// Wire shape of a topic entry; overrides are inlined next to the named keys
#[derive(Deserialize)]
struct TopicEntry {
    name: String,
    #[serde(rename = "num.partitions", default)]
    num_partitions: Option<i32>,
    #[serde(rename = "replication.factor", default)]
    replication_factor: Option<i16>,
    #[serde(flatten)]
    overrides: BTreeMap<String, Value>,
}

impl TryFrom<TopicEntry> for RawTopicSpec {
    type Error = String;

    fn try_from(entry: TopicEntry) -> std::result::Result<Self, Self::Error> {
        let mut config_entries = ConfigEntries::new();
        for (key, value) in entry.overrides {
            let rendered = render_scalar(&value).map_err(|kind| {
                format!(
                    "topic '{}': config '{}' must be a scalar, got a {}",
                    entry.name, key, kind
                )
            })?;
            config_entries.insert(key, rendered);
        }

        Ok(RawTopicSpec {
            name: entry.name,
            partitions: entry.num_partitions,
            replication_factor: entry.replication_factor,
            config_entries,
        })
    }
}

/// Render a YAML scalar the way the broker expects config values: as text.
/// `null` stays `None`.
fn render_scalar(value: &Value) -> std::result::Result<Option<String>, &'static str> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Sequence(_) => Err("sequence"),
        Value::Mapping(_) => Err("mapping"),
        Value::Tagged(tagged) => render_scalar(&tagged.value),
    }
}
