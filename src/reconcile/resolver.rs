//! Desired-topic normalization
//!
//! Fills the attributes an operator left unset with an explicit "unmanaged"
//! sentinel so that the rest of the pipeline never has to reason about
//! absent values.

use crate::config::RawTopicSpec;
use std::collections::BTreeMap;

/// Partition count meaning "not managed by topicsync". The broker applies its
/// default at creation time and the topic is never a shrink candidate.
pub const UNMANAGED_PARTITIONS: i32 = -1;

/// Replication factor meaning "not managed by topicsync".
pub const UNMANAGED_REPLICATION_FACTOR: i16 = -1;

/// Broker-level topic config overrides. A `None` value is sent as a null
/// config value.
pub type ConfigEntries = BTreeMap<String, Option<String>>;

/// Resolved desired state for one topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSpec {
    pub name: String,
    /// Desired partition count, or [`UNMANAGED_PARTITIONS`]
    pub partitions: i32,
    /// Desired replication factor, or [`UNMANAGED_REPLICATION_FACTOR`]
    pub replication_factor: i16,
    pub config_entries: ConfigEntries,
}

impl TopicSpec {
    /// Build a spec with no config overrides
    pub fn new(name: impl Into<String>, partitions: i32, replication_factor: i16) -> Self {
        Self {
            name: name.into(),
            partitions,
            replication_factor,
            config_entries: ConfigEntries::new(),
        }
    }

    /// Add a config override
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config_entries.insert(key.into(), Some(value.into()));
        self
    }

    pub fn manages_partitions(&self) -> bool {
        self.partitions != UNMANAGED_PARTITIONS
    }

    pub fn manages_replication_factor(&self) -> bool {
        self.replication_factor != UNMANAGED_REPLICATION_FACTOR
    }
}

/// Normalize a raw desired-topic entry. Pure, never fails.
pub fn resolve(raw: RawTopicSpec) -> TopicSpec {
    TopicSpec {
        name: raw.name,
        partitions: raw.partitions.unwrap_or(UNMANAGED_PARTITIONS),
        replication_factor: raw
            .replication_factor
            .unwrap_or(UNMANAGED_REPLICATION_FACTOR),
        config_entries: raw.config_entries,
    }
}
