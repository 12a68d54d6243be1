/// The flow gate — in-order traversal enforcement for a linear narrative.
///
/// A stage is enterable only once every stage before it in the flow order
/// has been visited this session. Denial is not an error: it is a normal
/// outcome, silently corrected by redirecting to the first stage.

use crate::core::session::{SessionStore, VisitedSet};
use crate::schema::stage::{FlowOrder, StageId};

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Render the requested stage.
    Allow,
    /// Refuse, sending the session to the given stage instead.
    Redirect(StageId),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Pure prefix-containment check: no store, no side effects.
///
/// Targets outside the flow pass through unconditionally; the gate only
/// has an opinion about stages it knows.
pub fn authorize_in(target: &StageId, visited: &VisitedSet, flow: &FlowOrder) -> Decision {
    let Some(idx) = flow.index_of(target) else {
        return Decision::Allow;
    };
    if idx == 0 {
        return Decision::Allow;
    }
    let prerequisites = flow.prerequisites(idx);
    if visited.contains_all(prerequisites.iter().map(|s| &s.id)) {
        Decision::Allow
    } else {
        Decision::Redirect(flow.first().id.clone())
    }
}

/// The gate plus its session state: restores the visited set from the
/// injected store and records allowed entries back into it.
pub struct FlowGate<S: SessionStore> {
    flow: FlowOrder,
    store: S,
    visited: VisitedSet,
}

impl<S: SessionStore> FlowGate<S> {
    /// Corrupt persisted state reads as empty, so a damaged session
    /// re-earns the flow from the start.
    pub fn new(flow: FlowOrder, store: S) -> Self {
        let visited = store.load_visited();
        Self {
            flow,
            store,
            visited,
        }
    }

    pub fn flow(&self) -> &FlowOrder {
        &self.flow
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Decides entry for `target`. An allowed flow stage is recorded as
    /// visited (idempotently) and the store updated; a denial mutates
    /// nothing. Targets outside the flow are waved through unrecorded.
    pub fn authorize(&mut self, target: &StageId) -> Decision {
        let decision = authorize_in(target, &self.visited, &self.flow);
        if decision.is_allowed()
            && self.flow.index_of(target).is_some()
            && self.visited.insert(target.clone())
        {
            self.store.save_visited(&self.visited);
        }
        decision
    }

    /// Wipes the session. Idempotent; afterwards only the first stage is
    /// enterable until the flow is re-earned.
    pub fn reset(&mut self) {
        self.visited.clear();
        self.store.clear();
    }

    /// Hands the store back, e.g. to carry session state into a rebuilt
    /// gate.
    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::MemoryStore;
    use crate::schema::stage::{StageDescriptor, StageKind};

    fn flow_abcd() -> FlowOrder {
        let stages = ["a", "b", "c", "d"]
            .iter()
            .map(|id| StageDescriptor {
                id: StageId::from(*id),
                kind: StageKind::Custom("test".to_string()),
                title: None,
                auto_advance_ms: None,
            })
            .collect();
        FlowOrder::new(stages).unwrap()
    }

    fn gate() -> FlowGate<MemoryStore> {
        FlowGate::new(flow_abcd(), MemoryStore::new())
    }

    #[test]
    fn first_stage_always_allowed() {
        let mut gate = gate();
        assert_eq!(gate.authorize(&StageId::from("a")), Decision::Allow);
        // still allowed with things visited
        assert_eq!(gate.authorize(&StageId::from("a")), Decision::Allow);
    }

    #[test]
    fn skipping_ahead_redirects_to_first() {
        let mut gate = gate();
        assert_eq!(
            gate.authorize(&StageId::from("c")),
            Decision::Redirect(StageId::from("a"))
        );
        // denial records nothing
        assert!(gate.visited().is_empty());
    }

    #[test]
    fn full_walk_scenario() {
        // Flow [a, b, c, d]: deny c, earn a and b, deny d, earn c, allow d.
        let mut gate = gate();
        assert!(!gate.authorize(&StageId::from("c")).is_allowed());
        assert!(gate.authorize(&StageId::from("a")).is_allowed());
        assert!(gate.authorize(&StageId::from("b")).is_allowed());
        assert_eq!(
            gate.authorize(&StageId::from("d")),
            Decision::Redirect(StageId::from("a"))
        );
        assert!(gate.authorize(&StageId::from("c")).is_allowed());
        assert!(gate.authorize(&StageId::from("d")).is_allowed());
        assert_eq!(gate.visited().len(), 4);
    }

    #[test]
    fn unknown_target_passes_through_unrecorded() {
        let mut gate = gate();
        assert_eq!(gate.authorize(&StageId::from("z")), Decision::Allow);
        assert!(gate.visited().is_empty());
        // and gating is unaffected afterwards
        assert!(!gate.authorize(&StageId::from("b")).is_allowed());
    }

    #[test]
    fn authorize_is_idempotent() {
        let mut gate = gate();
        gate.authorize(&StageId::from("a"));
        let first = gate.authorize(&StageId::from("b"));
        let second = gate.authorize(&StageId::from("b"));
        assert_eq!(first, second);
        assert_eq!(gate.visited().len(), 2);
    }

    #[test]
    fn backtracking_stays_allowed() {
        let mut gate = gate();
        gate.authorize(&StageId::from("a"));
        gate.authorize(&StageId::from("b"));
        gate.authorize(&StageId::from("c"));
        // going back never locks the user out
        assert!(gate.authorize(&StageId::from("a")).is_allowed());
        assert!(gate.authorize(&StageId::from("b")).is_allowed());
        // and forward progress is still intact
        assert!(gate.authorize(&StageId::from("d")).is_allowed());
    }

    #[test]
    fn reset_requires_re_earning() {
        let mut gate = gate();
        for id in ["a", "b", "c", "d"] {
            gate.authorize(&StageId::from(id));
        }
        gate.reset();
        assert!(gate.visited().is_empty());
        for id in ["b", "c", "d"] {
            assert_eq!(
                gate.authorize(&StageId::from(id)),
                Decision::Redirect(StageId::from("a"))
            );
        }
        // reset is idempotent
        gate.reset();
        assert!(gate.visited().is_empty());
    }

    #[test]
    fn visited_state_survives_gate_rebuild() {
        let mut gate = gate();
        gate.authorize(&StageId::from("a"));
        gate.authorize(&StageId::from("b"));
        let store = gate.into_store();

        let mut restored = FlowGate::new(flow_abcd(), store);
        assert!(restored.authorize(&StageId::from("c")).is_allowed());
    }

    #[test]
    fn corrupt_store_denies_deep_stages() {
        let store = MemoryStore::with_value("{{{definitely not ron");
        let mut gate = FlowGate::new(flow_abcd(), store);
        assert!(!gate.authorize(&StageId::from("b")).is_allowed());
        assert!(gate.authorize(&StageId::from("a")).is_allowed());
    }

    #[test]
    fn pure_check_has_no_side_effects() {
        let flow = flow_abcd();
        let mut visited = VisitedSet::new();
        visited.insert(StageId::from("a"));
        let before = visited.len();
        let decision = authorize_in(&StageId::from("b"), &visited, &flow);
        assert!(decision.is_allowed());
        assert_eq!(visited.len(), before);
    }
}
