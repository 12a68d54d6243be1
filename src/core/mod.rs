pub mod effects;
pub mod gate;
pub mod presentation;
pub mod sched;
pub mod session;
pub mod typewriter;
