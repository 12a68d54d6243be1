/// The presentation runner: stage navigation behind the flow gate, timed
/// auto-advance, and the per-stage effects the narrative uses.
///
/// Wires together the gate, session store, scheduler, typewriter, and
/// confetti. Built via `Presentation::builder()`.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

use crate::core::effects::ConfettiShow;
use crate::core::gate::{Decision, FlowGate};
use crate::core::sched::{Disposer, Scheduler};
use crate::core::session::{MemoryStore, SessionStore, VisitedSet};
use crate::core::typewriter::Typewriter;
use crate::schema::content::{ChoiceResponse, ContentError, StoryContent};
use crate::schema::stage::{FlowError, FlowOrder, StageDescriptor, StageId, StageKind};

#[derive(Debug, Error)]
pub enum PresentationError {
    #[error("flow error: {0}")]
    Flow(#[from] FlowError),
    #[error("content error: {0}")]
    Content(#[from] ContentError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no flow order configured")]
    MissingFlow,
    #[error("no content pack configured")]
    MissingContent,
    #[error("stage '{0}' wants {1} content the pack does not have")]
    ContentOutOfRange(StageId, &'static str),
    #[error("current stage '{0}' is not a lock stage")]
    NotALockStage(StageId),
    #[error("current stage '{0}' is not a choice stage")]
    NotAChoiceStage(StageId),
    #[error("unknown choice option: {0}")]
    UnknownOption(String),
}

/// Result of a lock-screen answer attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    /// Correct: a celebration burst fires and the flow advances after the
    /// unlock delay.
    Unlocked,
    Wrong {
        attempts: usize,
        hint: Option<String>,
    },
}

pub struct Presentation<S: SessionStore> {
    gate: FlowGate<S>,
    content: StoryContent,
    scheduler: Scheduler,
    /// Navigation requested by an expired timer; honored on the next tick.
    pending_nav: Rc<RefCell<Option<StageId>>>,
    /// Disposer for the in-flight auto-advance, if any.
    pending_transition: Option<Disposer>,
    current_idx: usize,
    typewriter: Option<Typewriter>,
    confetti: Option<ConfettiShow>,
    lock_attempts: usize,
    seed: u64,
}

/// Builder mirroring the engine's construction pattern: data can come
/// from RON packs on disk or be injected directly for tests.
pub struct PresentationBuilder<S: SessionStore> {
    flow: Option<FlowOrder>,
    content: Option<StoryContent>,
    store: S,
    seed: u64,
}

impl Presentation<MemoryStore> {
    pub fn builder() -> PresentationBuilder<MemoryStore> {
        PresentationBuilder {
            flow: None,
            content: None,
            store: MemoryStore::new(),
            seed: 0,
        }
    }
}

impl<S: SessionStore> PresentationBuilder<S> {
    pub fn flow(mut self, flow: FlowOrder) -> Self {
        self.flow = Some(flow);
        self
    }

    pub fn flow_ron(mut self, path: impl AsRef<Path>) -> Result<Self, PresentationError> {
        self.flow = Some(FlowOrder::load_from_ron(path.as_ref())?);
        Ok(self)
    }

    pub fn content(mut self, content: StoryContent) -> Self {
        self.content = Some(content);
        self
    }

    pub fn content_ron(mut self, path: impl AsRef<Path>) -> Result<Self, PresentationError> {
        self.content = Some(StoryContent::load_from_ron(path.as_ref())?);
        Ok(self)
    }

    /// Loads `story_data/<name>/flow.ron` and `content.ron`.
    pub fn template(self, name: &str) -> Result<Self, PresentationError> {
        let flow_path = format!("story_data/{}/flow.ron", name);
        let content_path = format!("story_data/{}/content.ron", name);
        self.flow_ron(&flow_path)?.content_ron(&content_path)
    }

    /// Swaps in a different session store, e.g. one backed by browser
    /// session storage.
    pub fn store<T: SessionStore>(self, store: T) -> PresentationBuilder<T> {
        PresentationBuilder {
            flow: self.flow,
            content: self.content,
            store,
            seed: self.seed,
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<Presentation<S>, PresentationError> {
        let flow = self.flow.ok_or(PresentationError::MissingFlow)?;
        let content = self.content.ok_or(PresentationError::MissingContent)?;
        validate(&flow, &content)?;
        let first = flow.first().id.clone();
        let mut presentation = Presentation {
            gate: FlowGate::new(flow, self.store),
            content,
            scheduler: Scheduler::new(),
            pending_nav: Rc::new(RefCell::new(None)),
            pending_transition: None,
            current_idx: 0,
            typewriter: None,
            confetti: None,
            lock_attempts: 0,
            seed: self.seed,
        };
        // entering the first stage is always allowed and marks it visited
        let _ = presentation.goto(&first);
        Ok(presentation)
    }
}

fn validate(flow: &FlowOrder, content: &StoryContent) -> Result<(), PresentationError> {
    for stage in flow.stages() {
        match stage.kind {
            StageKind::Story(i) if i >= content.stories.len() => {
                return Err(PresentationError::ContentOutOfRange(
                    stage.id.clone(),
                    "story",
                ));
            }
            StageKind::Choice(i) if i >= content.choices.len() => {
                return Err(PresentationError::ContentOutOfRange(
                    stage.id.clone(),
                    "choice",
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

impl<S: SessionStore> Presentation<S> {
    /// Delay between a correct lock answer and the advance past the lock.
    pub const UNLOCK_DELAY_MS: u64 = 2000;
    /// How long a choice response stays on screen before moving on.
    pub const CHOICE_RESPONSE_MS: u64 = 2500;

    /// Asks the gate for entry. On Allow the target becomes the current
    /// stage; on Redirect the first stage does. Either way any pending
    /// timed transition from the previous stage is disposed first.
    /// Targets outside the flow pass through without changing the stage.
    pub fn goto(&mut self, target: &StageId) -> Decision {
        let decision = self.gate.authorize(target);
        match decision.clone() {
            Decision::Allow => {
                if let Some(idx) = self.gate.flow().index_of(target) {
                    self.enter(idx);
                }
            }
            Decision::Redirect(first) => {
                // the first stage always passes; record it as visited
                let _ = self.gate.authorize(&first);
                self.enter(0);
            }
        }
        decision
    }

    /// Advances to the stage after the current one. At the end of the
    /// flow this is a no-op Allow.
    pub fn next(&mut self) -> Decision {
        match self.gate.flow().get(self.current_idx + 1) {
            Some(stage) => {
                let id = stage.id.clone();
                self.goto(&id)
            }
            None => Decision::Allow,
        }
    }

    /// The finale's "start over": wipes the session and re-enters the
    /// first stage with an empty visited set.
    pub fn restart(&mut self) {
        self.gate.reset();
        let first = self.gate.flow().first().id.clone();
        let _ = self.goto(&first);
    }

    fn enter(&mut self, idx: usize) {
        // a timer scheduled by the previous stage must not outlive it
        if let Some(disposer) = self.pending_transition.take() {
            disposer.dispose();
        }
        self.pending_nav.borrow_mut().take();
        self.current_idx = idx;
        self.lock_attempts = 0;
        self.typewriter = self.stage_text().map(Typewriter::with_default_speed);
        self.confetti = match self.current_stage().kind {
            StageKind::Finale => Some(ConfettiShow::new(self.seed)),
            _ => None,
        };
        if let Some(delay) = self.current_stage().auto_advance_ms {
            self.schedule_advance_to_next(delay);
        }
    }

    /// The text the current stage reveals through the typewriter, if any.
    fn stage_text(&self) -> Option<String> {
        match &self.current_stage().kind {
            StageKind::Intro => Some(self.content.intro.title.clone()),
            StageKind::Story(i) => self.content.stories.get(*i).map(|p| p.text.clone()),
            StageKind::Finale => Some(self.content.finale.message.clone()),
            _ => None,
        }
    }

    fn schedule_advance_to_next(&mut self, delay_ms: u64) {
        // only one transition may be in flight; rescheduling replaces it
        if let Some(disposer) = self.pending_transition.take() {
            disposer.dispose();
        }
        let Some(next) = self
            .gate
            .flow()
            .get(self.current_idx + 1)
            .map(|s| s.id.clone())
        else {
            return;
        };
        let pending = Rc::clone(&self.pending_nav);
        let disposer = self.scheduler.after(delay_ms, move || {
            *pending.borrow_mut() = Some(next.clone());
        });
        self.pending_transition = Some(disposer);
    }

    /// Drives timers, the typewriter, and confetti forward. Returns the
    /// decision of a navigation performed by an expired transition, if
    /// one fired.
    pub fn tick(&mut self, ms: u64) -> Option<Decision> {
        self.scheduler.advance(ms);
        if let Some(tw) = &mut self.typewriter {
            tw.advance(ms);
        }
        if let Some(show) = &mut self.confetti {
            show.step(ms);
        }
        let target = self.pending_nav.borrow_mut().take();
        target.map(|id| self.goto(&id))
    }

    /// Answers the lock riddle. A correct answer fires a celebration
    /// burst and schedules the advance past the lock; a wrong one counts
    /// the attempt and surfaces the matching hint.
    pub fn submit_answer(&mut self, attempt: &str) -> Result<LockOutcome, PresentationError> {
        if !matches!(self.current_stage().kind, StageKind::Lock) {
            return Err(PresentationError::NotALockStage(self.current_id().clone()));
        }
        if self.content.lock.matches(attempt) {
            self.confetti = Some(ConfettiShow::burst_once(self.seed));
            self.schedule_advance_to_next(Self::UNLOCK_DELAY_MS);
            Ok(LockOutcome::Unlocked)
        } else {
            self.lock_attempts += 1;
            let hint = self
                .content
                .lock
                .hint_for_attempt(self.lock_attempts)
                .map(str::to_string);
            Ok(LockOutcome::Wrong {
                attempts: self.lock_attempts,
                hint,
            })
        }
    }

    /// Picks an option on the current choice stage and schedules the
    /// advance once the response has been on screen long enough.
    pub fn choose(&mut self, option_id: &str) -> Result<&ChoiceResponse, PresentationError> {
        let StageKind::Choice(i) = self.current_stage().kind else {
            return Err(PresentationError::NotAChoiceStage(self.current_id().clone()));
        };
        let Some(opt_idx) = self.content.choices[i]
            .options
            .iter()
            .position(|o| o.id == option_id)
        else {
            return Err(PresentationError::UnknownOption(option_id.to_string()));
        };
        self.schedule_advance_to_next(Self::CHOICE_RESPONSE_MS);
        Ok(&self.content.choices[i].options[opt_idx].response)
    }

    pub fn current_stage(&self) -> &StageDescriptor {
        &self.gate.flow().stages()[self.current_idx]
    }

    pub fn current_id(&self) -> &StageId {
        &self.current_stage().id
    }

    pub fn flow(&self) -> &FlowOrder {
        self.gate.flow()
    }

    pub fn content(&self) -> &StoryContent {
        &self.content
    }

    pub fn visited(&self) -> &VisitedSet {
        self.gate.visited()
    }

    pub fn typewriter(&self) -> Option<&Typewriter> {
        self.typewriter.as_ref()
    }

    pub fn typewriter_mut(&mut self) -> Option<&mut Typewriter> {
        self.typewriter.as_mut()
    }

    pub fn confetti(&self) -> Option<&ConfettiShow> {
        self.confetti.as_ref()
    }

    pub fn lock_attempts(&self) -> usize {
        self.lock_attempts
    }

    /// Live timers waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now()
    }
}
