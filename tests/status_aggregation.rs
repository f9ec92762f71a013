// tests/status_aggregation.rs

mod common;
use crate::common::MISSING_PROGRAM;

use proptest::prelude::*;

use sheepdog::process::ProcessNode;
use sheepdog::types::{GroupKind, Status};

fn rank(status: Status) -> u8 {
    match status {
        Status::Idle => 0,
        Status::Exited => 1,
        Status::Ready => 2,
        Status::Running => 3,
        Status::Errored => 4,
    }
}

fn any_status() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::Idle),
        Just(Status::Exited),
        Just(Status::Ready),
        Just(Status::Running),
        Just(Status::Errored),
    ]
}

/// A leaf that is `Errored` (started with a missing program) or `Idle`.
fn leaf(index: usize, errored: bool) -> ProcessNode {
    let mut node = ProcessNode::leaf(
        &format!("leaf-{index}"),
        vec![MISSING_PROGRAM.to_string()],
        None,
        None,
    );
    if errored {
        node.run();
    }
    node
}

#[test]
fn only_running_and_ready_are_active() {
    assert!(Status::Running.is_active());
    assert!(Status::Ready.is_active());
    assert!(!Status::Idle.is_active());
    assert!(!Status::Exited.is_active());
    assert!(!Status::Errored.is_active());
}

proptest! {
    #[test]
    fn max_follows_aggregation_order(statuses in proptest::collection::vec(any_status(), 1..12)) {
        let max = statuses.iter().copied().max().unwrap();
        let expected = statuses.iter().copied().max_by_key(|s| rank(*s)).unwrap();
        prop_assert_eq!(max, expected);
    }

    #[test]
    fn group_reports_errored_if_any_child_errored(
        errored in proptest::collection::vec(any::<bool>(), 0..6),
        sequential in any::<bool>(),
    ) {
        let children: Vec<_> = errored
            .iter()
            .enumerate()
            .map(|(i, e)| leaf(i, *e))
            .collect();
        let kind = if sequential { GroupKind::Sequential } else { GroupKind::Parallel };
        let group = ProcessNode::group("g", kind, children);

        let expected = if errored.iter().any(|e| *e) { Status::Errored } else { Status::Idle };
        prop_assert_eq!(group.status(), expected);
    }

    #[test]
    fn nesting_does_not_change_aggregation(errored in proptest::collection::vec(any::<bool>(), 1..5)) {
        let flat_children: Vec<_> = errored.iter().enumerate().map(|(i, e)| leaf(i, *e)).collect();
        let flat = ProcessNode::group("flat", GroupKind::Parallel, flat_children);

        let nested_children: Vec<_> = errored
            .iter()
            .enumerate()
            .map(|(i, e)| ProcessNode::group(&format!("wrap-{i}"), GroupKind::Parallel, vec![leaf(i, *e)]))
            .collect();
        let nested = ProcessNode::group("nested", GroupKind::Sequential, nested_children);

        prop_assert_eq!(flat.status(), nested.status());
    }
}
