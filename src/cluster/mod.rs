//! Broker cluster access
//!
//! The reconciliation core talks to the cluster only through [`ClusterAdmin`],
//! which covers the three admin calls topicsync needs: describe topic
//! metadata, create a topic, alter a topic's config entries.
//!
//! [`KafkaAdminClient`] implements it over the Kafka wire protocol.

pub mod client;
pub mod wire;

pub use client::{AdminClientConfig, KafkaAdminClient};

use crate::error::Result;
use crate::reconcile::{ClusterTopicState, ConfigEntries, TopicSpec};

/// Result of a create-topic request that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// The cluster reported the topic already exists
    AlreadyExists,
}

/// Admin operations against a broker cluster
pub trait ClusterAdmin {
    /// Query metadata for exactly one topic.
    ///
    /// Absence is `Ok(ClusterTopicState::Absent)`, not an error.
    fn describe_topic(&mut self, topic: &str) -> Result<ClusterTopicState>;

    /// Create a topic with the spec's partitions, replication factor and
    /// config entries. Sentinel values are sent as-is so the broker applies
    /// its defaults.
    fn create_topic(&mut self, spec: &TopicSpec) -> Result<CreateOutcome>;

    /// Replace the topic's config entries
    fn alter_topic_config(&mut self, topic: &str, entries: &ConfigEntries) -> Result<()>;
}

impl<T: ClusterAdmin + ?Sized> ClusterAdmin for &mut T {
    fn describe_topic(&mut self, topic: &str) -> Result<ClusterTopicState> {
        (**self).describe_topic(topic)
    }

    fn create_topic(&mut self, spec: &TopicSpec) -> Result<CreateOutcome> {
        (**self).create_topic(spec)
    }

    fn alter_topic_config(&mut self, topic: &str, entries: &ConfigEntries) -> Result<()> {
        (**self).alter_topic_config(topic, entries)
    }
}
