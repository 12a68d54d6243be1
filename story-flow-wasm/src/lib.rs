//! WASM bindings for story-flow — powers the browser presentation.

use wasm_bindgen::prelude::*;

use story_flow::core::effects::Particle;
use story_flow::core::gate::Decision;
use story_flow::core::presentation::{LockOutcome, Presentation};
use story_flow::core::session::MemoryStore;
use story_flow::schema::content::StoryContent;
use story_flow::schema::stage::{FlowOrder, StageDescriptor, StageId, StageKind};

// ---------------------------------------------------------------------------
// Embedded story pack — compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const ANNIVERSARY_FLOW: &str = include_str!("../../story_data/anniversary/flow.ron");
    pub const ANNIVERSARY_CONTENT: &str = include_str!("../../story_data/anniversary/content.ron");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct DecisionInfo {
    allow: bool,
    redirect_to: Option<String>,
}

#[derive(serde::Serialize)]
struct StageInfo {
    id: String,
    kind: String,
    /// Index into the stage's content list, for story and choice stages.
    content_index: Option<usize>,
    title: Option<String>,
    visited: bool,
}

#[derive(serde::Serialize)]
struct LockResult {
    unlocked: bool,
    attempts: usize,
    hint: Option<String>,
}

#[derive(serde::Serialize)]
struct ParticleInfo {
    x: f32,
    y: f32,
    color: String,
}

fn decision_info(decision: &Decision) -> DecisionInfo {
    match decision {
        Decision::Allow => DecisionInfo {
            allow: true,
            redirect_to: None,
        },
        Decision::Redirect(id) => DecisionInfo {
            allow: false,
            redirect_to: Some(id.to_string()),
        },
    }
}

fn kind_label(kind: &StageKind) -> (String, Option<usize>) {
    match kind {
        StageKind::Intro => ("intro".to_string(), None),
        StageKind::Lock => ("lock".to_string(), None),
        StageKind::Story(i) => ("story".to_string(), Some(*i)),
        StageKind::Timeline => ("timeline".to_string(), None),
        StageKind::Choice(i) => ("choice".to_string(), Some(*i)),
        StageKind::Finale => ("finale".to_string(), None),
        StageKind::Custom(name) => (name.clone(), None),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

// ---------------------------------------------------------------------------
// FlowDemo — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct FlowDemo {
    presentation: Presentation<MemoryStore>,
}

#[wasm_bindgen]
impl FlowDemo {
    /// Create a demo instance over the embedded anniversary pack.
    ///
    /// `saved_state` is the opaque token a previous `saved_state()` call
    /// produced, typically kept in `sessionStorage`. Pass `None` (or a
    /// corrupted token) to start from scratch at the first stage.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, saved_state: Option<String>) -> Result<FlowDemo, JsError> {
        let flow = FlowOrder::parse_ron(data::ANNIVERSARY_FLOW)
            .map_err(|e| JsError::new(&format!("Flow parse error: {e}")))?;
        let content = StoryContent::parse_ron(data::ANNIVERSARY_CONTENT)
            .map_err(|e| JsError::new(&format!("Content parse error: {e}")))?;

        let store = match saved_state {
            Some(raw) => MemoryStore::with_value(raw),
            None => MemoryStore::new(),
        };
        let presentation = Presentation::builder()
            .flow(flow)
            .content(content)
            .seed(seed)
            .store(store)
            .build()
            .map_err(|e| JsError::new(&format!("Build error: {e}")))?;

        Ok(FlowDemo { presentation })
    }

    /// Opaque progress token for the host to persist across reloads.
    pub fn saved_state(&self) -> String {
        self.presentation.visited().to_ron()
    }

    /// Ask the gate for entry to a stage. Returns a JSON decision:
    /// `{"allow": bool, "redirect_to": string|null}`. On a redirect the
    /// presentation has already landed on the first stage.
    pub fn goto(&mut self, stage_id: &str) -> Result<String, JsError> {
        let decision = self.presentation.goto(&StageId::from(stage_id));
        to_json(&decision_info(&decision))
    }

    /// Advance to the stage after the current one.
    pub fn next(&mut self) -> Result<String, JsError> {
        let decision = self.presentation.next();
        to_json(&decision_info(&decision))
    }

    /// Wipe the session and return to the first stage.
    pub fn restart(&mut self) {
        self.presentation.restart();
    }

    /// Drive timers, the typewriter, and confetti forward by `ms`.
    /// Returns the JSON decision of a timed navigation if one fired.
    pub fn tick(&mut self, ms: u64) -> Result<Option<String>, JsError> {
        match self.presentation.tick(ms) {
            Some(decision) => Ok(Some(to_json(&decision_info(&decision))?)),
            None => Ok(None),
        }
    }

    /// Answer the lock riddle. Returns a JSON result:
    /// `{"unlocked": bool, "attempts": number, "hint": string|null}`.
    pub fn submit_answer(&mut self, attempt: &str) -> Result<String, JsError> {
        let outcome = self
            .presentation
            .submit_answer(attempt)
            .map_err(|e| JsError::new(&format!("Lock error: {e}")))?;
        let result = match outcome {
            LockOutcome::Unlocked => LockResult {
                unlocked: true,
                attempts: self.presentation.lock_attempts(),
                hint: None,
            },
            LockOutcome::Wrong { attempts, hint } => LockResult {
                unlocked: false,
                attempts,
                hint,
            },
        };
        to_json(&result)
    }

    /// Pick an option on the current choice stage. Returns the response
    /// message to display.
    pub fn choose(&mut self, option_id: &str) -> Result<String, JsError> {
        self.presentation
            .choose(option_id)
            .map(|response| response.message.clone())
            .map_err(|e| JsError::new(&format!("Choice error: {e}")))
    }

    /// JSON description of the current stage.
    pub fn current(&self) -> Result<String, JsError> {
        to_json(&self.stage_info(self.presentation.current_stage()))
    }

    /// JSON array describing every stage in flow order, with visited
    /// flags, for rendering navigation.
    pub fn stages(&self) -> Result<String, JsError> {
        let infos: Vec<StageInfo> = self
            .presentation
            .flow()
            .stages()
            .iter()
            .map(|stage| self.stage_info(stage))
            .collect();
        to_json(&infos)
    }

    /// JSON array of visited stage ids in first-visit order.
    pub fn visited(&self) -> Result<String, JsError> {
        let ids: Vec<&str> = self.presentation.visited().iter().map(|id| id.as_str()).collect();
        to_json(&ids)
    }

    /// The portion of the current stage's text the typewriter has
    /// revealed so far. Empty when the stage has no typed text.
    pub fn typewriter_visible(&self) -> String {
        self.presentation
            .typewriter()
            .map(|tw| tw.visible().to_string())
            .unwrap_or_default()
    }

    pub fn typewriter_done(&self) -> bool {
        self.presentation.typewriter().map_or(true, |tw| tw.is_done())
    }

    /// Reveal the rest of the current stage's text at once.
    pub fn skip_typewriter(&mut self) {
        if let Some(tw) = self.presentation.typewriter_mut() {
            tw.skip_to_end();
        }
    }

    /// JSON array of live confetti particles in unit viewport
    /// coordinates: `[{"x", "y", "color"}, ...]`.
    pub fn particles(&self) -> Result<String, JsError> {
        let particles: Vec<ParticleInfo> = match self.presentation.confetti() {
            Some(show) => show.particles().map(particle_info).collect(),
            None => Vec::new(),
        };
        to_json(&particles)
    }

    /// The full content pack as JSON, for the host to render prompts,
    /// options, timeline goals, and the finale gallery.
    pub fn content(&self) -> Result<String, JsError> {
        to_json(self.presentation.content())
    }
}

// Private helpers
impl FlowDemo {
    fn stage_info(&self, stage: &StageDescriptor) -> StageInfo {
        let (kind, content_index) = kind_label(&stage.kind);
        StageInfo {
            id: stage.id.to_string(),
            kind,
            content_index,
            title: stage.title.clone(),
            visited: self.presentation.visited().contains(&stage.id),
        }
    }
}

fn particle_info(p: &Particle) -> ParticleInfo {
    ParticleInfo {
        x: p.x,
        y: p.y,
        color: p.color.clone(),
    }
}
