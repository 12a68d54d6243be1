use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid start date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// Title card shown before the narrative begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntroContent {
    pub title: String,
    pub subtitle: String,
    #[serde(default)]
    pub background_image: Option<String>,
}

/// The riddle standing between the intro and the story proper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockContent {
    pub prompt: String,
    pub answer: String,
    /// Shown per wrong attempt; the last hint repeats once exhausted.
    #[serde(default)]
    pub hints: Vec<String>,
}

impl LockContent {
    /// Case- and surrounding-whitespace-insensitive answer check.
    pub fn matches(&self, attempt: &str) -> bool {
        attempt.trim().to_lowercase() == self.answer.trim().to_lowercase()
    }

    /// Hint for the nth wrong attempt (1-based). None before the first
    /// wrong attempt or when no hints are configured.
    pub fn hint_for_attempt(&self, attempt: usize) -> Option<&str> {
        if attempt == 0 || self.hints.is_empty() {
            return None;
        }
        let idx = (attempt - 1).min(self.hints.len() - 1);
        self.hints.get(idx).map(String::as_str)
    }
}

/// One page of the story, revealed through the typewriter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryPage {
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
    pub image_alt: String,
}

/// One entry on the timeline screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineGoal {
    pub icon: String,
    pub text: String,
}

/// The reaction shown after an option is picked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceResponse {
    pub message: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: String,
    pub text: String,
    pub response: ChoiceResponse,
}

/// A quiz screen: a prompt and its selectable options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceContent {
    pub prompt: String,
    pub options: Vec<ChoiceOption>,
}

impl ChoiceContent {
    pub fn option(&self, id: &str) -> Option<&ChoiceOption> {
        self.options.iter().find(|o| o.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImage {
    pub src: String,
    pub caption: String,
}

/// The closing screen: headline, photo gallery, and the running
/// days-together counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinaleContent {
    pub message: String,
    #[serde(default)]
    pub submessage: Option<String>,
    #[serde(default)]
    pub gallery: Vec<GalleryImage>,
    /// ISO date (YYYY-MM-DD) the counter starts from.
    #[serde(default)]
    pub start_date: Option<String>,
}

impl FinaleContent {
    pub fn start_date(&self) -> Result<Option<NaiveDate>, ContentError> {
        match &self.start_date {
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| ContentError::InvalidDate(raw.clone())),
            None => Ok(None),
        }
    }

    /// Whole days between the configured start date and `today`. The
    /// library owns no clock; the host supplies the date.
    pub fn days_together(&self, today: NaiveDate) -> Result<Option<i64>, ContentError> {
        Ok(self.start_date()?.map(|start| (today - start).num_days().abs()))
    }
}

/// A complete narrative pack: everything one presentation needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryContent {
    pub intro: IntroContent,
    pub lock: LockContent,
    pub stories: Vec<StoryPage>,
    #[serde(default)]
    pub timeline_goals: Vec<TimelineGoal>,
    pub choices: Vec<ChoiceContent>,
    pub finale: FinaleContent,
}

impl StoryContent {
    pub fn parse_ron(source: &str) -> Result<Self, ContentError> {
        Ok(ron::from_str(source)?)
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, ContentError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }
}
