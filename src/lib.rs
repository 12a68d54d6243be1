//! Story Flow — gated, linear interactive story presentations.
//!
//! Drives a fixed sequence of narrative stages (intro, lock riddle, story
//! pages, timeline, choice quizzes, finale) behind a session-scoped flow
//! gate that refuses out-of-order access, with cancelable timed
//! transitions, a typewriter reveal, and deterministic particle effects.

pub mod core;
pub mod schema;
