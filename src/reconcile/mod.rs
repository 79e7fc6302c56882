//! Topic reconciliation
//!
//! Converges the cluster toward a list of desired topics, one topic at a
//! time:
//!
//! 1. [`resolver`] fills unset partition count / replication factor with the
//!    unmanaged sentinel.
//! 2. The cluster reports the topic's current state
//!    ([`crate::cluster::ClusterAdmin::describe_topic`]).
//! 3. [`engine`] decides: create, alter config only, or reject a shrink.
//! 4. [`executor`] carries the decision out.
//!
//! [`driver`] strings these together and stops at the first failure.

pub mod driver;
pub mod engine;
pub mod executor;
pub mod resolver;

pub use driver::{ReconcileOptions, Reconciler, RunReport, TopicOutcome};
pub use engine::{decide, Action, ClusterTopicState, Decision};
pub use executor::{apply, plan, ApplyOutcome};
pub use resolver::{
    resolve, ConfigEntries, TopicSpec, UNMANAGED_PARTITIONS, UNMANAGED_REPLICATION_FACTOR,
};
