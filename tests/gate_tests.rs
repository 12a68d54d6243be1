/// Flow gate integration tests: the in-order traversal contract.

use story_flow::core::gate::{authorize_in, Decision, FlowGate};
use story_flow::core::session::{MemoryStore, SessionStore, VisitedSet};
use story_flow::schema::stage::{FlowOrder, StageDescriptor, StageId, StageKind};

fn flow_of(ids: &[&str]) -> FlowOrder {
    let stages = ids
        .iter()
        .map(|id| StageDescriptor {
            id: StageId::from(*id),
            kind: StageKind::Custom("stage".to_string()),
            title: None,
            auto_advance_ms: None,
        })
        .collect();
    FlowOrder::new(stages).unwrap()
}

#[test]
fn first_stage_allowed_regardless_of_visited_contents() {
    let flow = flow_of(&["a", "b", "c"]);

    let empty = VisitedSet::new();
    assert!(authorize_in(&StageId::from("a"), &empty, &flow).is_allowed());

    let mut partial = VisitedSet::new();
    partial.insert(StageId::from("b"));
    partial.insert(StageId::from("c"));
    assert!(authorize_in(&StageId::from("a"), &partial, &flow).is_allowed());
}

#[test]
fn allowed_iff_full_prefix_visited() {
    let flow = flow_of(&["a", "b", "c", "d"]);
    let target = StageId::from("c");

    // every subset of {a, b} except the full prefix denies
    let cases: &[(&[&str], bool)] = &[
        (&[], false),
        (&["a"], false),
        (&["b"], false),
        (&["a", "b"], true),
        (&["a", "b", "d"], true),
    ];
    for (visited_ids, expected) in cases {
        let mut visited = VisitedSet::new();
        for id in *visited_ids {
            visited.insert(StageId::from(*id));
        }
        let decision = authorize_in(&target, &visited, &flow);
        assert_eq!(
            decision.is_allowed(),
            *expected,
            "visited {:?} should {} 'c'",
            visited_ids,
            if *expected { "allow" } else { "deny" }
        );
    }
}

#[test]
fn deny_redirects_to_the_first_stage() {
    let flow = flow_of(&["start", "middle", "end"]);
    let visited = VisitedSet::new();
    assert_eq!(
        authorize_in(&StageId::from("end"), &visited, &flow),
        Decision::Redirect(StageId::from("start"))
    );
}

#[test]
fn four_stage_walkthrough_scenario() {
    // Flow [A, B, C, D], visited {}.
    let mut gate = FlowGate::new(flow_of(&["A", "B", "C", "D"]), MemoryStore::new());

    // authorize(C) -> Deny, redirect A
    assert_eq!(
        gate.authorize(&StageId::from("C")),
        Decision::Redirect(StageId::from("A"))
    );
    // authorize(A) -> Allow, visited {A}
    assert!(gate.authorize(&StageId::from("A")).is_allowed());
    assert_eq!(gate.visited().len(), 1);
    // authorize(B) -> Allow, visited {A, B}
    assert!(gate.authorize(&StageId::from("B")).is_allowed());
    assert_eq!(gate.visited().len(), 2);
    // authorize(D) -> Deny (C not visited), redirect A
    assert_eq!(
        gate.authorize(&StageId::from("D")),
        Decision::Redirect(StageId::from("A"))
    );
    // authorize(C) -> Allow, visited {A, B, C}
    assert!(gate.authorize(&StageId::from("C")).is_allowed());
    // authorize(D) -> Allow
    assert!(gate.authorize(&StageId::from("D")).is_allowed());
}

#[test]
fn unknown_identifier_passes_through() {
    let mut gate = FlowGate::new(flow_of(&["A", "B", "C"]), MemoryStore::new());
    assert!(gate.authorize(&StageId::from("Z")).is_allowed());
    // membership semantics for gating are unchanged
    assert!(gate.visited().is_empty());
    assert!(!gate.authorize(&StageId::from("B")).is_allowed());
}

#[test]
fn authorize_is_idempotent_in_decision_and_state() {
    let mut gate = FlowGate::new(flow_of(&["a", "b"]), MemoryStore::new());
    gate.authorize(&StageId::from("a"));

    let first = gate.authorize(&StageId::from("b"));
    let after_one: Vec<String> = gate.visited().iter().map(|id| id.to_string()).collect();
    let second = gate.authorize(&StageId::from("b"));
    let after_two: Vec<String> = gate.visited().iter().map(|id| id.to_string()).collect();

    assert_eq!(first, second);
    assert_eq!(after_one, after_two);
}

#[test]
fn visited_grows_monotonically_until_reset() {
    let mut gate = FlowGate::new(flow_of(&["a", "b", "c"]), MemoryStore::new());
    gate.authorize(&StageId::from("a"));
    gate.authorize(&StageId::from("b"));

    // denials, unknown targets, and re-visits never shrink the set
    gate.authorize(&StageId::from("c"));
    gate.authorize(&StageId::from("nowhere"));
    gate.authorize(&StageId::from("a"));
    assert!(gate.visited().contains(&StageId::from("a")));
    assert!(gate.visited().contains(&StageId::from("b")));

    gate.reset();
    assert!(gate.visited().is_empty());
}

#[test]
fn reset_denies_every_non_first_stage() {
    let mut gate = FlowGate::new(flow_of(&["a", "b", "c", "d"]), MemoryStore::new());
    for id in ["a", "b", "c", "d"] {
        gate.authorize(&StageId::from(id));
    }
    gate.reset();
    for id in ["b", "c", "d"] {
        assert_eq!(
            gate.authorize(&StageId::from(id)),
            Decision::Redirect(StageId::from("a")),
            "'{}' should be denied after reset",
            id
        );
    }
}

#[test]
fn store_round_trip_preserves_progress() {
    let flow = flow_of(&["a", "b", "c"]);
    let mut gate = FlowGate::new(flow.clone(), MemoryStore::new());
    gate.authorize(&StageId::from("a"));
    gate.authorize(&StageId::from("b"));

    // simulate a reload: same store, fresh gate
    let store = gate.into_store();
    assert!(store.get().is_some());
    let mut restored = FlowGate::new(flow, store);
    assert!(restored.authorize(&StageId::from("c")).is_allowed());
}

#[test]
fn corrupt_persisted_state_recovers_as_empty() {
    let flow = flow_of(&["a", "b"]);
    for garbage in ["{{{", "42", "(not, a, list", "\"scalar\""] {
        let mut gate = FlowGate::new(flow.clone(), MemoryStore::with_value(garbage));
        assert!(
            !gate.authorize(&StageId::from("b")).is_allowed(),
            "garbage {:?} must not grant access",
            garbage
        );
    }
}

#[test]
fn duplicate_entries_in_persisted_state_are_tolerated() {
    let flow = flow_of(&["a", "b", "c"]);
    let store = MemoryStore::with_value(r#"["a", "a", "b", "a"]"#);
    let mut gate = FlowGate::new(flow, store);
    assert!(gate.authorize(&StageId::from("c")).is_allowed());
}
