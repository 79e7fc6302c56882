//! Reconciliation decisions
//!
//! Given one resolved [`TopicSpec`] and the cluster's observed state for that
//! topic, decide whether to create it, push its config entries, or refuse.
//! Decisions are pure and independent of each other.

use super::resolver::TopicSpec;
use crate::error::TopicSyncError;
use std::fmt;

/// Observed state of one topic in the cluster.
///
/// Existence is carried explicitly: a topic that exists with zero partitions
/// is `Exists { partition_count: 0 }`, never `Absent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterTopicState {
    Absent,
    Exists { partition_count: i32 },
}

impl ClusterTopicState {
    pub fn exists(&self) -> bool {
        matches!(self, ClusterTopicState::Exists { .. })
    }

    /// Current partition count, only meaningful when the topic exists
    pub fn current_partition_count(&self) -> Option<i32> {
        match self {
            ClusterTopicState::Absent => None,
            ClusterTopicState::Exists { partition_count } => Some(*partition_count),
        }
    }
}

/// What the executor should do for a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    /// Topic already has the required capacity; only push config entries
    AlterConfigOnly,
    /// Desired partition count is below the current one
    Reject {
        desired: i32,
        current: i32,
    },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create => write!(f, "CREATE"),
            Action::AlterConfigOnly => write!(f, "ALTER CONFIG"),
            Action::Reject { .. } => write!(f, "REJECT"),
        }
    }
}

/// Engine output for one topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    pub reason: String,
}

impl Decision {
    pub fn is_reject(&self) -> bool {
        matches!(self.action, Action::Reject { .. })
    }
}

/// Decide the action for one topic.
///
/// Existence is checked first, then the partition comparison. The unmanaged
/// sentinel always counts as safe. Replication factor is never compared.
pub fn decide(spec: &TopicSpec, state: ClusterTopicState) -> Decision {
    let current = match state {
        ClusterTopicState::Absent => {
            return Decision {
                action: Action::Create,
                reason: format!("topic '{}' does not exist in the cluster", spec.name),
            };
        }
        ClusterTopicState::Exists { partition_count } => partition_count,
    };

    if !spec.manages_partitions() {
        return Decision {
            action: Action::AlterConfigOnly,
            reason: format!(
                "topic '{}' exists with {} partitions and its partition count is unmanaged",
                spec.name, current
            ),
        };
    }

    if spec.partitions >= current {
        Decision {
            action: Action::AlterConfigOnly,
            reason: format!(
                "topic '{}' exists with {} partitions, desired {} (no shrink)",
                spec.name, current, spec.partitions
            ),
        }
    } else {
        Decision {
            action: Action::Reject {
                desired: spec.partitions,
                current,
            },
            reason: TopicSyncError::shrink_rejected(&spec.name, spec.partitions, current)
                .to_string(),
        }
    }
}
