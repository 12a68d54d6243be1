/// Deep-link demo — the flow gate on its own, without a presentation.
///
/// Shows the gate refusing out-of-order access, tolerating unknown
/// routes, surviving a session round-trip through its store, and
/// recovering from corrupt persisted state.
///
/// Run with: cargo run --example deep_link

use story_flow::core::gate::{Decision, FlowGate};
use story_flow::core::session::{MemoryStore, SessionStore};
use story_flow::schema::stage::{FlowOrder, StageId};

fn main() {
    let flow = FlowOrder::parse_ron(
        r#"[
            (id: "intro", kind: Intro),
            (id: "riddle", kind: Lock),
            (id: "story", kind: Story(0)),
            (id: "finale", kind: Finale),
        ]"#,
    )
    .expect("static flow parses");

    let mut gate = FlowGate::new(flow.clone(), MemoryStore::new());

    println!("=== Fresh session ===");
    check(&mut gate, "story"); // denied: nothing visited yet
    check(&mut gate, "intro"); // the first stage always opens
    check(&mut gate, "riddle");
    check(&mut gate, "finale"); // denied: "story" still unvisited
    check(&mut gate, "story");
    check(&mut gate, "finale"); // the whole prefix is earned now

    println!("\n=== Unknown routes pass through ===");
    check(&mut gate, "credits");

    println!("\n=== Session survives a reload ===");
    let store = gate.into_store();
    println!("persisted state: {}", store.get().unwrap_or_default());
    let mut restored = FlowGate::new(flow.clone(), store);
    check(&mut restored, "finale"); // still allowed after the round-trip

    println!("\n=== Corrupt state falls back to the start ===");
    let corrupt = MemoryStore::with_value("]]] this is not a visited list");
    let mut damaged = FlowGate::new(flow.clone(), corrupt);
    check(&mut damaged, "finale"); // denied: corrupt reads as empty
    check(&mut damaged, "intro"); // and the flow is re-earned from here

    println!("\n=== Reset wipes everything ===");
    restored.reset();
    check(&mut restored, "story"); // back to square one
}

fn check(gate: &mut FlowGate<MemoryStore>, target: &str) {
    let id = StageId::from(target);
    match gate.authorize(&id) {
        Decision::Allow => println!("  {:<8} -> allowed", target),
        Decision::Redirect(to) => println!("  {:<8} -> denied, redirected to '{}'", target, to),
    }
}
