mod engine;

pub use engine::{FocusSession, SessionMode, TimerEngine, TimerSnapshot, TimerStatus};
