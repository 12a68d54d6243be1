pub mod content;
pub mod stage;
