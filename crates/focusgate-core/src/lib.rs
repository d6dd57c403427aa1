//! # Focusgate Core Library
//!
//! Core business logic for Focusgate, a focus-session site blocker. The
//! library is UI-agnostic: popup, options and blocked-page surfaces are
//! thin clients over the same coordinator, and the CLI binary drives the
//! identical code paths.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick()` for phase transitions
//! - **Blocking**: per-navigation allow/block decisions from the rule
//!   lists, category presets and the auto-focus schedule
//! - **Coordinator**: the single owner of live state; UI surfaces talk to
//!   it over a message channel and hold no authoritative state
//! - **Storage**: SQLite-backed session history and TOML-based settings
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: focus session state machine
//! - [`Coordinator`]: command loop and state owner
//! - [`Settings`]: typed configuration with field-level defaults
//! - [`UsageStats`]: session history, daily aggregates and streaks

pub mod blocking;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod gate;
pub mod matcher;
pub mod quotes;
pub mod schedule;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod timer;
pub mod unlock;

pub use blocking::{BlockDecision, RuleMatch, RuleSource};
pub use coordinator::{Coordinator, CoordinatorHandle, Request, Response};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use gate::{FeatureGate, GateDecision, LicenseProvider, StaticLicense, Tier};
pub use quotes::Quote;
pub use settings::{
    BlockedPageConfig, CategoryPreset, PasswordConfig, PomodoroConfig, ScheduleConfig, Settings,
    SettingsPatch, SiteRule,
};
pub use stats::{DailyStats, UsageStats, SESSION_HISTORY_CAP};
pub use storage::{Database, SettingsStore};
pub use timer::{FocusSession, SessionMode, TimerEngine, TimerSnapshot, TimerStatus};
pub use unlock::{hash_password, PasswordVerifier, Sha256Verifier, UnlockGate, UnlockOutcome};
