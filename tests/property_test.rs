//! Property-based tests for the reconciliation decisions
//!
//! Uses proptest to check that the decision rules hold for arbitrary
//! partition counts and cluster states.

use proptest::prelude::*;
use topicsync::config::RawTopicSpec;
use topicsync::reconcile::{
    decide, Action, ClusterTopicState, ReconcileOptions, Reconciler, TopicSpec,
    UNMANAGED_PARTITIONS,
};
use topicsync::testing::{AdminCall, InMemoryCluster};

/// Strategy for an observed cluster state
fn cluster_state() -> impl Strategy<Value = ClusterTopicState> {
    prop_oneof![
        Just(ClusterTopicState::Absent),
        (0..10_000i32).prop_map(|partition_count| ClusterTopicState::Exists { partition_count }),
    ]
}

/// Strategy for a desired partition count, unmanaged included
fn desired_partitions() -> impl Strategy<Value = i32> {
    prop_oneof![Just(UNMANAGED_PARTITIONS), 1..10_000i32]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: unmanaged partitions are never rejected
    #[test]
    fn unmanaged_partitions_never_reject(state in cluster_state(), rf in -1..5i16) {
        let spec = TopicSpec::new("t", UNMANAGED_PARTITIONS, rf);
        prop_assert!(!decide(&spec, state).is_reject());
    }

    /// Property: a managed count below the current count is always rejected
    #[test]
    fn shrink_is_always_rejected(current in 2..10_000i32, delta in 1..10_000i32) {
        let desired = (current - delta).max(0);
        prop_assume!(desired < current);

        let spec = TopicSpec::new("t", desired, 1);
        let decision = decide(&spec, ClusterTopicState::Exists { partition_count: current });

        prop_assert_eq!(decision.action, Action::Reject { desired, current });
        let expected = format!("{} < {}", desired, current);
        prop_assert!(decision.reason.contains(&expected));
    }

    /// Property: absent topics are always created
    #[test]
    fn absent_topic_always_created(partitions in desired_partitions(), rf in -1..5i16) {
        let spec = TopicSpec::new("t", partitions, rf);
        prop_assert_eq!(decide(&spec, ClusterTopicState::Absent).action, Action::Create);
    }

    /// Property: existing topics are never created
    #[test]
    fn existing_topic_never_created(partitions in desired_partitions(), current in 0..10_000i32) {
        let spec = TopicSpec::new("t", partitions, 1);
        let decision = decide(&spec, ClusterTopicState::Exists { partition_count: current });
        prop_assert_ne!(decision.action, Action::Create);
    }

    /// Property: a second run over the first run's result never creates
    #[test]
    fn reconciliation_is_idempotent(
        partitions in prop::collection::vec(prop::option::of(1..64i32), 1..8)
    ) {
        let topics: Vec<RawTopicSpec> = partitions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let spec = RawTopicSpec::named(format!("topic-{}", i));
                match p {
                    Some(p) => spec.with_partitions(*p),
                    None => spec,
                }
            })
            .collect();

        let mut reconciler = Reconciler::new(InMemoryCluster::new(), ReconcileOptions::default());
        reconciler.run(topics.clone()).unwrap();

        let mut cluster = reconciler.into_admin();
        cluster.clear_calls();
        let mut reconciler = Reconciler::new(cluster, ReconcileOptions::default());
        let report = reconciler.run(topics).unwrap();

        prop_assert!(report.created().is_empty());
        prop_assert!(!reconciler
            .admin()
            .calls()
            .iter()
            .any(|c| matches!(c, AdminCall::Create(_))));
    }
}
