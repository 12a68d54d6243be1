use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Newtype wrapper for stage identifiers. Opaque to the gate; hosts
/// typically use route-like tokens ("intro", "story-1", "finale").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(pub String);

impl StageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a stage renders, binding it to a section of the content pack.
/// `Story` and `Choice` carry the index of their page or prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageKind {
    Intro,
    Lock,
    Story(usize),
    Timeline,
    Choice(usize),
    Finale,
    Custom(String),
}

/// One step of the narrative, as configuration data. The flow gate never
/// learns stage names from code; it is handed a list of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDescriptor {
    pub id: StageId,
    pub kind: StageKind,
    #[serde(default)]
    pub title: Option<String>,
    /// Milliseconds after entry before the flow advances on its own.
    #[serde(default)]
    pub auto_advance_ms: Option<u64>,
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("flow order is empty")]
    Empty,
    #[error("duplicate stage id: {0}")]
    DuplicateStage(StageId),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// The fixed traversal order of the narrative. Built once, never mutated;
/// a stage at position i is enterable only after every stage before it.
#[derive(Debug, Clone)]
pub struct FlowOrder {
    stages: Vec<StageDescriptor>,
}

impl FlowOrder {
    /// Builds a flow, rejecting empty sequences and duplicate ids.
    pub fn new(stages: Vec<StageDescriptor>) -> Result<Self, FlowError> {
        if stages.is_empty() {
            return Err(FlowError::Empty);
        }
        let mut seen = FxHashSet::default();
        for stage in &stages {
            if !seen.insert(stage.id.clone()) {
                return Err(FlowError::DuplicateStage(stage.id.clone()));
            }
        }
        Ok(Self { stages })
    }

    pub fn parse_ron(source: &str) -> Result<Self, FlowError> {
        let stages: Vec<StageDescriptor> = ron::from_str(source)?;
        Self::new(stages)
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, FlowError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// The entry stage. Denied navigation always lands here.
    pub fn first(&self) -> &StageDescriptor {
        &self.stages[0]
    }

    pub fn index_of(&self, id: &StageId) -> Option<usize> {
        self.stages.iter().position(|s| &s.id == id)
    }

    pub fn find(&self, id: &StageId) -> Option<&StageDescriptor> {
        self.stages.iter().find(|s| &s.id == id)
    }

    pub fn get(&self, idx: usize) -> Option<&StageDescriptor> {
        self.stages.get(idx)
    }

    /// The stage after `id`, or None at the end of the flow (or for ids
    /// outside it).
    pub fn next_after(&self, id: &StageId) -> Option<&StageDescriptor> {
        self.index_of(id).and_then(|i| self.stages.get(i + 1))
    }

    /// Every stage strictly before position `idx`.
    pub fn prerequisites(&self, idx: usize) -> &[StageDescriptor] {
        &self.stages[..idx]
    }

    pub fn stages(&self) -> &[StageDescriptor] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
