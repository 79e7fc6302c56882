#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

//! # topicsync
//!
//! Declarative management of Kafka topics. A YAML document lists the topics
//! a cluster should have; topicsync creates the missing ones and pushes the
//! declared config entries to the existing ones. Partition counts of existing
//! topics are left alone, and a topic declared with fewer partitions than it
//! has aborts the run.
//!
//! ## Document
//!
//! ```yaml
//! kafka_brokers:
//!   - kafka-1:9092
//!   - kafka-2:9092
//! topics:
//!   - name: orders
//!     num.partitions: 12
//!     replication.factor: 3
//!     retention.ms: 604800000
//!   - name: audit
//!     cleanup.policy: compact
//! ```
//!
//! Keys other than `name`, `num.partitions` and `replication.factor` are
//! topic config entries. Omitted partition count or replication factor is
//! left to the broker defaults.
//!
//! ## Library usage
//!
//! The reconciliation core only talks to the cluster through
//! [`cluster::ClusterAdmin`], so it can be driven against the in-memory
//! [`testing::InMemoryCluster`]:
//!
//! ```
//! use topicsync::config::RawTopicSpec;
//! use topicsync::reconcile::{ReconcileOptions, Reconciler};
//! use topicsync::testing::InMemoryCluster;
//!
//! let cluster = InMemoryCluster::new().with_topic("orders", 3);
//! let mut reconciler = Reconciler::new(cluster, ReconcileOptions::default());
//!
//! let report = reconciler
//!     .run(vec![
//!         RawTopicSpec::named("orders").with_partitions(6),
//!         RawTopicSpec::named("audit"),
//!     ])
//!     .unwrap();
//!
//! assert_eq!(report.created(), vec!["audit"]);
//! assert_eq!(report.updated(), vec!["orders"]);
//! ```

pub mod cluster;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod testing;
pub mod version;

pub use error::{Result, TopicSyncError};
