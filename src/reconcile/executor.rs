//! Applies a [`Decision`] to the cluster

use super::engine::{Action, Decision};
use super::resolver::TopicSpec;
use crate::cluster::{ClusterAdmin, CreateOutcome};
use crate::error::{Result, TopicSyncError};
use tracing::{debug, info};

/// What actually happened to a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Created,
    ConfigAltered,
    /// Create was answered with "already exists" and the config entries were
    /// pushed instead
    CreateFellBackToAlter,
    /// Dry run: nothing was sent to the cluster
    Planned(Action),
}

/// Carry out one decision.
///
/// `Reject` never touches the cluster and always returns
/// [`TopicSyncError::ShrinkRejected`].
pub fn apply<A: ClusterAdmin + ?Sized>(
    admin: &mut A,
    spec: &TopicSpec,
    decision: &Decision,
) -> Result<ApplyOutcome> {
    match decision.action {
        Action::Create => match admin.create_topic(spec)? {
            CreateOutcome::Created => {
                info!(
                    topic = %spec.name,
                    partitions = spec.partitions,
                    replication_factor = spec.replication_factor,
                    "Topic was successfully created"
                );
                Ok(ApplyOutcome::Created)
            }
            CreateOutcome::AlreadyExists => {
                debug!(
                    topic = %spec.name,
                    "Create reported topic already exists, updating config entries instead"
                );
                admin.alter_topic_config(&spec.name, &spec.config_entries)?;
                info!(
                    topic = %spec.name,
                    entries = spec.config_entries.len(),
                    "Successfully updated topic parameters"
                );
                Ok(ApplyOutcome::CreateFellBackToAlter)
            }
        },
        Action::AlterConfigOnly => {
            admin.alter_topic_config(&spec.name, &spec.config_entries)?;
            info!(
                topic = %spec.name,
                entries = spec.config_entries.len(),
                "Successfully updated topic parameters"
            );
            Ok(ApplyOutcome::ConfigAltered)
        }
        Action::Reject { desired, current } => reject(&spec.name, desired, current),
    }
}

/// Dry-run counterpart of [`apply`]: nothing is sent to the cluster, but a
/// `Reject` still fails with [`TopicSyncError::ShrinkRejected`].
pub fn plan(spec: &TopicSpec, decision: &Decision) -> Result<ApplyOutcome> {
    match decision.action {
        Action::Reject { desired, current } => reject(&spec.name, desired, current),
        action => Ok(ApplyOutcome::Planned(action)),
    }
}

fn reject(topic: &str, desired: i32, current: i32) -> Result<ApplyOutcome> {
    Err(TopicSyncError::shrink_rejected(topic, desired, current))
}
