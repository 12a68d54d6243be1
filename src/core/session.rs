/// Session-visited tracking — the sole authority for gate decisions.

use rustc_hash::FxHashSet;

use crate::schema::stage::StageId;

/// The set of stages this session has entered. Grows monotonically until
/// an explicit reset; persisted as an ordered list of id strings.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    ids: FxHashSet<StageId>,
    /// First-visit order, for a stable persisted form.
    order: Vec<StageId>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent insert. Returns true if the stage was new.
    pub fn insert(&mut self, id: StageId) -> bool {
        if self.ids.insert(id.clone()) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: &StageId) -> bool {
        self.ids.contains(id)
    }

    /// True if every given stage has been visited.
    pub fn contains_all<'a>(&self, ids: impl IntoIterator<Item = &'a StageId>) -> bool {
        ids.into_iter().all(|id| self.ids.contains(id))
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Stages in first-visit order.
    pub fn iter(&self) -> impl Iterator<Item = &StageId> {
        self.order.iter()
    }

    /// Serialized form: an ordered RON list of id strings.
    pub fn to_ron(&self) -> String {
        let ids: Vec<&str> = self.order.iter().map(|id| id.as_str()).collect();
        ron::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    /// Decodes a persisted list. Duplicates collapse; anything unreadable
    /// yields the empty set, so a damaged session falls back to the start
    /// of the flow rather than to open access.
    pub fn from_ron(source: &str) -> Self {
        let ids: Vec<String> = ron::from_str(source).unwrap_or_default();
        let mut set = Self::default();
        for id in ids {
            set.insert(StageId(id));
        }
        set
    }
}

/// Persistence seam for the visited set. Browser hosts back this with
/// `sessionStorage`; tests, tools, and demos use `MemoryStore`.
pub trait SessionStore {
    fn get(&self) -> Option<String>;
    fn set(&mut self, value: &str);
    fn clear(&mut self);

    /// Loads the visited set, treating absent or corrupt state as empty.
    fn load_visited(&self) -> VisitedSet {
        self.get()
            .map(|raw| VisitedSet::from_ron(&raw))
            .unwrap_or_default()
    }

    fn save_visited(&mut self, visited: &VisitedSet) {
        self.set(&visited.to_ron());
    }
}

/// In-process store for non-browser hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with raw persisted state, as a restored browser
    /// session would present it.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }
}

impl SessionStore for MemoryStore {
    fn get(&self) -> Option<String> {
        self.value.clone()
    }

    fn set(&mut self, value: &str) {
        self.value = Some(value.to_string());
    }

    fn clear(&mut self) {
        self.value = None;
    }
}
