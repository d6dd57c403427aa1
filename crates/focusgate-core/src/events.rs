use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::blocking::RuleMatch;
use crate::timer::{FocusSession, SessionMode};

/// Every state change in the coordinator produces an Event. UI surfaces
/// receive them as notification payloads; the recorder consumes the ones
/// that seal a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    FocusStarted {
        mode: SessionMode,
        /// `None` means indefinite.
        total_secs: Option<u64>,
        at: DateTime<Utc>,
    },
    FocusPaused {
        remaining_secs: Option<u64>,
        at: DateTime<Utc>,
    },
    FocusResumed {
        remaining_secs: Option<u64>,
        at: DateTime<Utc>,
    },
    /// A focus phase ran to its natural end. Carries the sealed session.
    FocusCompleted {
        session: Option<FocusSession>,
        at: DateTime<Utc>,
    },
    /// The session was stopped by hand. `session` is `None` when only a
    /// manual break was running.
    SessionStopped {
        session: Option<FocusSession>,
        at: DateTime<Utc>,
    },
    BreakStarted {
        long: bool,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    BreakCompleted {
        at: DateTime<Utc>,
    },
    BreakSkipped {
        at: DateTime<Utc>,
    },
    /// A navigation was redirected to the blocked page.
    NavigationBlocked {
        url: String,
        matched: RuleMatch,
        at: DateTime<Utc>,
    },
    /// An emergency unlock was granted; the session was ended.
    EmergencyUnlocked {
        at: DateTime<Utc>,
    },
}
