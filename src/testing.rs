//! Testing utilities
//!
//! [`InMemoryCluster`] is a [`ClusterAdmin`] that keeps topics in memory,
//! records every call it receives and can be told to fail specific
//! operations. It lets the reconciliation pipeline be exercised without a
//! broker.
//!
//! # Example
//!
//! ```
//! use topicsync::testing::{AdminCall, InMemoryCluster};
//! use topicsync::reconcile::{ReconcileOptions, Reconciler};
//! use topicsync::config::RawTopicSpec;
//!
//! let cluster = InMemoryCluster::new().with_topic("orders", 6);
//! let mut reconciler = Reconciler::new(cluster, ReconcileOptions::default());
//! let report = reconciler
//!     .run(vec![RawTopicSpec::named("orders").with_partitions(6)])
//!     .unwrap();
//!
//! assert_eq!(report.updated(), vec!["orders"]);
//! ```

use crate::cluster::{ClusterAdmin, CreateOutcome};
use crate::error::{Result, TopicSyncError};
use crate::reconcile::{ClusterTopicState, ConfigEntries, TopicSpec};
use std::collections::{HashMap, HashSet};

/// A topic as stored by [`InMemoryCluster`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTopic {
    pub partitions: i32,
    pub replication_factor: i16,
    pub config_entries: ConfigEntries,
}

/// One call received by [`InMemoryCluster`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCall {
    Describe(String),
    Create(TopicSpec),
    Alter(String, ConfigEntries),
}

/// Broker defaults applied when a spec leaves a value unmanaged
const DEFAULT_PARTITIONS: i32 = 1;
const DEFAULT_REPLICATION_FACTOR: i16 = 1;

/// In-memory [`ClusterAdmin`] with call recording and failure injection
#[derive(Debug, Default)]
pub struct InMemoryCluster {
    topics: HashMap<String, StoredTopic>,
    calls: Vec<AdminCall>,
    hidden: HashSet<String>,
    fail_describe: HashSet<String>,
    fail_create: HashSet<String>,
    fail_alter: HashSet<String>,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing topic
    pub fn with_topic(mut self, name: &str, partitions: i32) -> Self {
        self.topics.insert(
            name.to_string(),
            StoredTopic {
                partitions,
                replication_factor: DEFAULT_REPLICATION_FACTOR,
                config_entries: ConfigEntries::new(),
            },
        );
        self
    }

    /// Make describe report an existing topic as absent, as when metadata
    /// lags behind a concurrent create
    pub fn hide_from_describe(mut self, name: &str) -> Self {
        self.hidden.insert(name.to_string());
        self
    }

    pub fn fail_describe_for(mut self, name: &str) -> Self {
        self.fail_describe.insert(name.to_string());
        self
    }

    pub fn fail_create_for(mut self, name: &str) -> Self {
        self.fail_create.insert(name.to_string());
        self
    }

    pub fn fail_alter_for(mut self, name: &str) -> Self {
        self.fail_alter.insert(name.to_string());
        self
    }

    pub fn topic(&self, name: &str) -> Option<&StoredTopic> {
        self.topics.get(name)
    }

    pub fn calls(&self) -> &[AdminCall] {
        &self.calls
    }

    /// Calls other than describe
    pub fn mutations(&self) -> Vec<&AdminCall> {
        self.calls
            .iter()
            .filter(|c| !matches!(c, AdminCall::Describe(_)))
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl ClusterAdmin for InMemoryCluster {
    fn describe_topic(&mut self, topic: &str) -> Result<ClusterTopicState> {
        self.calls.push(AdminCall::Describe(topic.to_string()));
        if self.fail_describe.contains(topic) {
            return Err(TopicSyncError::describe(topic, "injected describe failure"));
        }
        if self.hidden.contains(topic) {
            return Ok(ClusterTopicState::Absent);
        }
        Ok(match self.topics.get(topic) {
            Some(stored) => ClusterTopicState::Exists {
                partition_count: stored.partitions,
            },
            None => ClusterTopicState::Absent,
        })
    }

    fn create_topic(&mut self, spec: &TopicSpec) -> Result<CreateOutcome> {
        self.calls.push(AdminCall::Create(spec.clone()));
        if self.fail_create.contains(&spec.name) {
            return Err(TopicSyncError::create(
                &spec.name,
                "injected create failure",
            ));
        }
        if self.topics.contains_key(&spec.name) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        let partitions = if spec.manages_partitions() {
            spec.partitions
        } else {
            DEFAULT_PARTITIONS
        };
        let replication_factor = if spec.manages_replication_factor() {
            spec.replication_factor
        } else {
            DEFAULT_REPLICATION_FACTOR
        };
        self.topics.insert(
            spec.name.clone(),
            StoredTopic {
                partitions,
                replication_factor,
                config_entries: spec.config_entries.clone(),
            },
        );
        Ok(CreateOutcome::Created)
    }

    fn alter_topic_config(&mut self, topic: &str, entries: &ConfigEntries) -> Result<()> {
        self.calls.push(AdminCall::Alter(topic.to_string(), entries.clone()));
        if self.fail_alter.contains(topic) {
            return Err(TopicSyncError::alter(topic, "injected alter failure"));
        }
        match self.topics.get_mut(topic) {
            Some(stored) => {
                stored.config_entries = entries.clone();
                Ok(())
            }
            None => Err(TopicSyncError::alter(topic, "UnknownTopicOrPartition (3)")),
        }
    }
}
