//! Sequential reconciliation run
//!
//! Topics are processed one at a time, in input order. The first rejection
//! or cluster failure aborts the run. Topics applied earlier in the same run
//! stay applied, nothing is rolled back.

use super::engine::decide;
use super::executor::{apply, plan, ApplyOutcome};
use super::resolver::resolve;
use crate::cluster::ClusterAdmin;
use crate::config::RawTopicSpec;
use crate::error::Result;
use std::time::Instant;
use tracing::{info, warn};

/// Options for a reconciliation run
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Describe and decide, but send no create/alter requests
    pub dry_run: bool,
}

/// Per-topic result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicOutcome {
    pub topic: String,
    pub outcome: ApplyOutcome,
}

/// Summary of a run that completed without error
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub outcomes: Vec<TopicOutcome>,
    pub duration_ms: u64,
}

impl RunReport {
    /// Topics created in this run
    pub fn created(&self) -> Vec<&str> {
        self.topics_where(|o| matches!(o, ApplyOutcome::Created))
    }

    /// Topics whose config entries were pushed, including create fallbacks
    pub fn updated(&self) -> Vec<&str> {
        self.topics_where(|o| {
            matches!(
                o,
                ApplyOutcome::ConfigAltered | ApplyOutcome::CreateFellBackToAlter
            )
        })
    }

    /// Topics only planned (dry run)
    pub fn planned(&self) -> Vec<&str> {
        self.topics_where(|o| matches!(o, ApplyOutcome::Planned(_)))
    }

    fn topics_where(&self, pred: impl Fn(&ApplyOutcome) -> bool) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|t| pred(&t.outcome))
            .map(|t| t.topic.as_str())
            .collect()
    }
}

/// Drives Describe -> Decide -> Apply over a list of desired topics.
///
/// Owns the cluster handle for the duration of the run. Dropping the
/// reconciler releases the connection.
pub struct Reconciler<A: ClusterAdmin> {
    admin: A,
    options: ReconcileOptions,
}

impl<A: ClusterAdmin> Reconciler<A> {
    pub fn new(admin: A, options: ReconcileOptions) -> Self {
        Self { admin, options }
    }

    pub fn admin(&self) -> &A {
        &self.admin
    }

    pub fn into_admin(self) -> A {
        self.admin
    }

    /// Reconcile every topic in order, stopping at the first error
    pub fn run(&mut self, topics: Vec<RawTopicSpec>) -> Result<RunReport> {
        let start = Instant::now();
        let mut report = RunReport::default();

        info!(
            topics = topics.len(),
            dry_run = self.options.dry_run,
            "Starting topic reconciliation"
        );

        for raw in topics {
            let outcome = self.reconcile_one(raw)?;
            report.outcomes.push(outcome);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    fn reconcile_one(&mut self, raw: RawTopicSpec) -> Result<TopicOutcome> {
        let spec = resolve(raw);
        let state = self.admin.describe_topic(&spec.name)?;
        let decision = decide(&spec, state);

        info!(
            topic = %spec.name,
            action = %decision.action,
            partitions = spec.partitions,
            current = ?state.current_partition_count(),
            reason = %decision.reason,
            "Reconciliation decision"
        );

        let outcome = if self.options.dry_run {
            let planned = plan(&spec, &decision)?;
            warn!(topic = %spec.name, action = %decision.action, "Dry run, not applying");
            planned
        } else {
            apply(&mut self.admin, &spec, &decision)?
        };

        Ok(TopicOutcome {
            topic: spec.name,
            outcome,
        })
    }
}
