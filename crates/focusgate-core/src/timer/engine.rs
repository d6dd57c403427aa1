//! Focus session state machine.
//!
//! The engine is a wall-clock-based state machine. It does not use internal
//! threads -- the caller drives it by calling `tick()` periodically. Phase
//! progress is computed from the phase start timestamp rather than by
//! decrementing a counter, so a host that suspends the process between ticks
//! produces no drift: the next `tick()` reconciles against real elapsed time.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Focusing -> (Paused | Break) -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(config);
//! engine.start_focus(SessionMode::Pomodoro, None, Utc::now());
//! // In a loop:
//! engine.tick(Utc::now()); // Returns Some(Event) when a phase completes
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::Event;
use crate::settings::PomodoroConfig;

/// Custom-mode durations are clamped to this range, in minutes.
const CUSTOM_MIN_MINUTES: u32 = 5;
const CUSTOM_MAX_MINUTES: u32 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Focusing,
    Break,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Pomodoro,
    Custom,
    Indefinite,
}

impl SessionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pomodoro => "pomodoro",
            Self::Custom => "custom",
            Self::Indefinite => "indefinite",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "pomodoro" => Self::Pomodoro,
            "indefinite" => Self::Indefinite,
            _ => Self::Custom,
        }
    }
}

/// Sealed record of a finished focus session. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: Uuid,
    pub mode: SessionMode,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Whole minutes of focus actually accumulated, rounded down.
    pub actual_minutes: u32,
    /// True when the session reached its natural end.
    pub completed: bool,
}

/// The in-flight session, sealed into a [`FocusSession`] on termination.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ActiveSession {
    id: Uuid,
    mode: SessionMode,
    started_at: DateTime<Utc>,
    /// Focus seconds accumulated in completed run intervals (across pauses).
    focused_secs: u64,
}

impl ActiveSession {
    fn begin(mode: SessionMode, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode,
            started_at: at,
            focused_secs: 0,
        }
    }

    fn seal(self, ended_at: DateTime<Utc>, completed: bool) -> FocusSession {
        FocusSession {
            id: self.id,
            mode: self.mode,
            started_at: self.started_at,
            ended_at,
            actual_minutes: (self.focused_secs / 60) as u32,
            completed,
        }
    }
}

/// Point-in-time view of the engine, the `TimerState` every UI surface sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub mode: SessionMode,
    /// `None` means indefinite.
    pub remaining_secs: Option<u64>,
    /// Duration of the current phase; `None` means indefinite.
    pub total_secs: Option<u64>,
    /// Running total of completed focus phases. Display wrapping is
    /// `pomodoro_count % sessions_until_long_break`.
    pub pomodoro_count: u32,
    pub sessions_until_long_break: u32,
}

/// Focus session state machine.
///
/// Operates on wall-clock timestamps passed in by the caller -- no internal
/// clock, so every transition is deterministic under test. Serializable so
/// the coordinator can persist snapshots and survive a host restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    status: TimerStatus,
    mode: SessionMode,
    config: PomodoroConfig,
    /// Wall-clock instant the current run interval began. `None` unless
    /// focusing or on break.
    phase_started_at: Option<DateTime<Utc>>,
    /// Seconds the current run interval had left when it began. `None`
    /// means indefinite.
    remaining_at_phase_start: Option<u64>,
    /// Full duration of the current phase. `None` means indefinite.
    total_secs: Option<u64>,
    /// Remaining seconds frozen while paused.
    paused_remaining_secs: Option<u64>,
    /// Completed focus phases, running total. Survives restarts as part of
    /// a persisted snapshot; a fresh engine starts at zero.
    pomodoro_count: u32,
    session: Option<ActiveSession>,
}

impl TimerEngine {
    pub fn new(config: PomodoroConfig) -> Self {
        Self {
            status: TimerStatus::Idle,
            mode: SessionMode::Pomodoro,
            config,
            phase_started_at: None,
            remaining_at_phase_start: None,
            total_secs: None,
            paused_remaining_secs: None,
            pomodoro_count: 0,
            session: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn pomodoro_count(&self) -> u32 {
        self.pomodoro_count
    }

    /// Remaining seconds of the current phase at `now`. `None` = indefinite.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> Option<u64> {
        match self.status {
            TimerStatus::Idle => Some(0),
            TimerStatus::Paused => self.paused_remaining_secs,
            TimerStatus::Focusing | TimerStatus::Break => {
                let budget = self.remaining_at_phase_start?;
                Some(budget.saturating_sub(self.elapsed_this_run(now)))
            }
        }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> TimerSnapshot {
        TimerSnapshot {
            status: self.status,
            mode: self.mode,
            remaining_secs: self.remaining_secs(now),
            total_secs: match self.status {
                TimerStatus::Idle => Some(0),
                _ => self.total_secs,
            },
            pomodoro_count: self.pomodoro_count,
            sessions_until_long_break: self.config.sessions_until_long_break,
        }
    }

    /// Replace the pomodoro configuration. Takes effect from the next phase;
    /// the current phase keeps the duration it started with.
    pub fn set_config(&mut self, config: PomodoroConfig) {
        self.config = config;
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a focus session. A no-op returning `None` when a session is
    /// already active, so racing UI surfaces cannot reset a running phase.
    pub fn start_focus(
        &mut self,
        mode: SessionMode,
        duration_min: Option<u32>,
        now: DateTime<Utc>,
    ) -> Option<Event> {
        if self.status != TimerStatus::Idle {
            return None;
        }
        let total = match mode {
            // Durations are floored at one minute; a zero-length phase
            // would complete on the tick that started it.
            SessionMode::Pomodoro => Some(u64::from(self.config.focus_duration.max(1)) * 60),
            SessionMode::Custom => {
                let minutes = duration_min
                    .unwrap_or(self.config.focus_duration)
                    .clamp(CUSTOM_MIN_MINUTES, CUSTOM_MAX_MINUTES);
                Some(u64::from(minutes) * 60)
            }
            SessionMode::Indefinite => None,
        };
        self.status = TimerStatus::Focusing;
        self.mode = mode;
        self.total_secs = total;
        self.remaining_at_phase_start = total;
        self.phase_started_at = Some(now);
        self.paused_remaining_secs = None;
        self.session = Some(ActiveSession::begin(mode, now));
        Some(Event::FocusStarted {
            mode,
            total_secs: total,
            at: now,
        })
    }

    /// Freeze the countdown. Only valid while focusing.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.status != TimerStatus::Focusing {
            return None;
        }
        let remaining = self.remaining_secs(now);
        let ran = self.elapsed_this_run(now);
        if let Some(session) = self.session.as_mut() {
            session.focused_secs += ran;
        }
        self.status = TimerStatus::Paused;
        self.paused_remaining_secs = remaining;
        self.phase_started_at = None;
        Some(Event::FocusPaused {
            remaining_secs: remaining,
            at: now,
        })
    }

    /// Resume the countdown from the frozen value.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.status != TimerStatus::Paused {
            return None;
        }
        let remaining = self.paused_remaining_secs.take();
        self.status = TimerStatus::Focusing;
        self.remaining_at_phase_start = remaining;
        self.phase_started_at = Some(now);
        Some(Event::FocusResumed {
            remaining_secs: remaining,
            at: now,
        })
    }

    /// Unconditionally end the session. Always succeeds from
    /// focusing/paused/break; the sealed record (when a focus session was
    /// live) is carried in the returned event.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.status == TimerStatus::Idle {
            return None;
        }
        let ran = if self.status == TimerStatus::Focusing {
            self.elapsed_this_run(now)
        } else {
            0
        };
        let sealed = self.session.take().map(|mut s| {
            s.focused_secs += ran;
            s.seal(now, false)
        });
        self.go_idle();
        Some(Event::SessionStopped {
            session: sealed,
            at: now,
        })
    }

    /// Start a break without a preceding focus phase. Only valid from idle.
    pub fn start_break(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.status != TimerStatus::Idle {
            return None;
        }
        let total = u64::from(self.config.short_break_duration.max(1)) * 60;
        self.enter_break(total, now);
        Some(Event::BreakStarted {
            long: false,
            total_secs: total,
            at: now,
        })
    }

    /// End the break immediately; same transition as natural completion.
    pub fn skip_break(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.status != TimerStatus::Break {
            return None;
        }
        self.finish_break(now);
        Some(Event::BreakSkipped { at: now })
    }

    /// Call periodically. Applies at most one phase transition per call,
    /// anchored at the phase deadline rather than `now`, so a caller waking
    /// from suspension can invoke `tick` repeatedly to catch up losslessly.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.status {
            TimerStatus::Focusing => {
                let deadline = self.phase_deadline()?;
                if now < deadline {
                    return None;
                }
                Some(self.finish_focus(deadline))
            }
            TimerStatus::Break => {
                let deadline = self.phase_deadline()?;
                if now < deadline {
                    return None;
                }
                self.finish_break(deadline);
                Some(Event::BreakCompleted { at: deadline })
            }
            _ => None,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn elapsed_this_run(&self, now: DateTime<Utc>) -> u64 {
        let Some(started) = self.phase_started_at else {
            return 0;
        };
        let elapsed = (now - started).num_seconds().max(0) as u64;
        match self.remaining_at_phase_start {
            Some(budget) => elapsed.min(budget),
            None => elapsed,
        }
    }

    /// The instant the current phase runs out. `None` for indefinite.
    fn phase_deadline(&self) -> Option<DateTime<Utc>> {
        let started = self.phase_started_at?;
        let budget = self.remaining_at_phase_start?;
        Some(started + Duration::seconds(budget as i64))
    }

    /// Natural focus completion at `deadline`: seal the session and either
    /// enter a break (pomodoro) or go idle (custom).
    fn finish_focus(&mut self, deadline: DateTime<Utc>) -> Event {
        let budget = self.remaining_at_phase_start.unwrap_or(0);
        let sealed = self.session.take().map(|mut s| {
            s.focused_secs += budget;
            s.seal(deadline, true)
        });
        match self.mode {
            SessionMode::Pomodoro => {
                self.pomodoro_count += 1;
                let cycle = self.config.sessions_until_long_break.max(1);
                let long = self.pomodoro_count % cycle == 0;
                let minutes = if long {
                    self.config.long_break_duration
                } else {
                    self.config.short_break_duration
                };
                self.enter_break(u64::from(minutes.max(1)) * 60, deadline);
            }
            // Custom sessions end the cycle; indefinite never reaches here.
            _ => self.go_idle(),
        }
        Event::FocusCompleted {
            session: sealed,
            at: deadline,
        }
    }

    /// Break over at `at`: next focus phase when auto-start is on, else idle.
    fn finish_break(&mut self, at: DateTime<Utc>) {
        if self.config.auto_start_focus {
            let total = u64::from(self.config.focus_duration.max(1)) * 60;
            self.status = TimerStatus::Focusing;
            self.mode = SessionMode::Pomodoro;
            self.total_secs = Some(total);
            self.remaining_at_phase_start = Some(total);
            self.phase_started_at = Some(at);
            self.session = Some(ActiveSession::begin(SessionMode::Pomodoro, at));
        } else {
            self.go_idle();
        }
    }

    fn enter_break(&mut self, total_secs: u64, at: DateTime<Utc>) {
        self.status = TimerStatus::Break;
        self.total_secs = Some(total_secs);
        self.remaining_at_phase_start = Some(total_secs);
        self.phase_started_at = Some(at);
        self.paused_remaining_secs = None;
    }

    fn go_idle(&mut self) {
        self.status = TimerStatus::Idle;
        self.phase_started_at = None;
        self.remaining_at_phase_start = None;
        self.total_secs = None;
        self.paused_remaining_secs = None;
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
    }

    fn engine() -> TimerEngine {
        TimerEngine::new(PomodoroConfig::default())
    }

    #[test]
    fn start_pause_resume_stop() {
        let mut engine = engine();
        assert_eq!(engine.status(), TimerStatus::Idle);

        assert!(engine
            .start_focus(SessionMode::Pomodoro, None, t0())
            .is_some());
        assert_eq!(engine.status(), TimerStatus::Focusing);

        let paused_at = t0() + Duration::seconds(60);
        assert!(engine.pause(paused_at).is_some());
        assert_eq!(engine.status(), TimerStatus::Paused);
        assert_eq!(engine.remaining_secs(paused_at), Some(25 * 60 - 60));

        // Time passing while paused does not drain the clock.
        let resumed_at = paused_at + Duration::seconds(600);
        assert_eq!(engine.remaining_secs(resumed_at), Some(25 * 60 - 60));
        assert!(engine.resume(resumed_at).is_some());
        assert_eq!(engine.status(), TimerStatus::Focusing);

        assert!(engine.stop(resumed_at + Duration::seconds(10)).is_some());
        assert_eq!(engine.status(), TimerStatus::Idle);
    }

    #[test]
    fn start_while_active_is_a_no_op() {
        let mut engine = engine();
        engine.start_focus(SessionMode::Pomodoro, None, t0());
        let before = engine.remaining_secs(t0() + Duration::seconds(30));

        let racing = engine.start_focus(SessionMode::Custom, Some(60), t0() + Duration::seconds(30));
        assert!(racing.is_none());
        assert_eq!(engine.remaining_secs(t0() + Duration::seconds(30)), before);
        assert_eq!(engine.snapshot(t0()).mode, SessionMode::Pomodoro);
    }

    #[test]
    fn pomodoro_completion_enters_break_and_counts() {
        let mut engine = engine();
        engine.start_focus(SessionMode::Pomodoro, None, t0());

        // 1500 one-second ticks: still focusing until the very last one.
        let mut completion = None;
        for i in 1..=1500 {
            if let Some(event) = engine.tick(t0() + Duration::seconds(i)) {
                completion = Some((i, event));
                break;
            }
        }
        let (at, event) = completion.expect("pomodoro should complete");
        assert_eq!(at, 1500);
        assert_eq!(engine.status(), TimerStatus::Break);
        assert_eq!(engine.pomodoro_count(), 1);
        match event {
            Event::FocusCompleted { session, .. } => {
                let session = session.unwrap();
                assert!(session.completed);
                assert_eq!(session.actual_minutes, 25);
            }
            other => panic!("expected FocusCompleted, got {other:?}"),
        }
        // Short break, not long, after the first pomodoro.
        let snap = engine.snapshot(t0() + Duration::seconds(1500));
        assert_eq!(snap.total_secs, Some(5 * 60));
    }

    #[test]
    fn long_break_every_fourth_pomodoro() {
        let mut engine = engine();
        let mut now = t0();
        for round in 1..=4u32 {
            engine.start_focus(SessionMode::Pomodoro, None, now);
            // Force idle->focusing each round: skip the break after completion.
            now = now + Duration::seconds(25 * 60);
            engine.tick(now);
            assert_eq!(engine.pomodoro_count(), round);
            let expected = if round == 4 { 15 * 60 } else { 5 * 60 };
            assert_eq!(engine.snapshot(now).total_secs, Some(expected));
            // Drain the break without auto-starting the next focus phase.
            engine.config.auto_start_focus = false;
            engine.skip_break(now);
            engine.config.auto_start_focus = true;
        }
    }

    #[test]
    fn custom_session_completes_to_idle() {
        let mut engine = engine();
        engine.start_focus(SessionMode::Custom, Some(45), t0());
        assert_eq!(engine.snapshot(t0()).total_secs, Some(2700));

        let event = engine.tick(t0() + Duration::seconds(2700)).unwrap();
        assert_eq!(engine.status(), TimerStatus::Idle);
        match event {
            Event::FocusCompleted { session, .. } => {
                let session = session.unwrap();
                assert!(session.completed);
                assert_eq!(session.actual_minutes, 45);
            }
            other => panic!("expected FocusCompleted, got {other:?}"),
        }
    }

    #[test]
    fn custom_duration_is_clamped() {
        let mut engine = engine();
        engine.start_focus(SessionMode::Custom, Some(2), t0());
        assert_eq!(engine.snapshot(t0()).total_secs, Some(5 * 60));
        engine.stop(t0());

        engine.start_focus(SessionMode::Custom, Some(600), t0());
        assert_eq!(engine.snapshot(t0()).total_secs, Some(180 * 60));
    }

    #[test]
    fn indefinite_never_completes_on_tick() {
        let mut engine = engine();
        engine.start_focus(SessionMode::Indefinite, None, t0());
        assert_eq!(engine.remaining_secs(t0()), None);

        assert!(engine.tick(t0() + Duration::days(2)).is_none());
        assert_eq!(engine.status(), TimerStatus::Focusing);

        let event = engine.stop(t0() + Duration::seconds(3600)).unwrap();
        match event {
            Event::SessionStopped { session, .. } => {
                let session = session.unwrap();
                assert!(!session.completed);
                assert_eq!(session.actual_minutes, 60);
            }
            other => panic!("expected SessionStopped, got {other:?}"),
        }
    }

    #[test]
    fn stop_midway_seals_elapsed_minutes() {
        let mut engine = engine();
        engine.start_focus(SessionMode::Pomodoro, None, t0());
        // 1500 total, stopped with 900 left: 600s elapsed = 10 minutes.
        let event = engine.stop(t0() + Duration::seconds(600)).unwrap();
        match event {
            Event::SessionStopped { session, .. } => {
                let session = session.unwrap();
                assert!(!session.completed);
                assert_eq!(session.actual_minutes, 10);
            }
            other => panic!("expected SessionStopped, got {other:?}"),
        }
    }

    #[test]
    fn break_completion_auto_starts_focus() {
        let mut engine = engine();
        engine.start_focus(SessionMode::Pomodoro, None, t0());
        let after_focus = t0() + Duration::seconds(1500);
        engine.tick(after_focus);
        assert_eq!(engine.status(), TimerStatus::Break);

        let after_break = after_focus + Duration::seconds(5 * 60);
        let event = engine.tick(after_break).unwrap();
        assert!(matches!(event, Event::BreakCompleted { .. }));
        assert_eq!(engine.status(), TimerStatus::Focusing);
        assert_eq!(engine.snapshot(after_break).total_secs, Some(25 * 60));
    }

    #[test]
    fn break_completion_without_auto_start_goes_idle() {
        let mut config = PomodoroConfig::default();
        config.auto_start_focus = false;
        let mut engine = TimerEngine::new(config);
        engine.start_focus(SessionMode::Pomodoro, None, t0());
        engine.tick(t0() + Duration::seconds(1500));
        engine.tick(t0() + Duration::seconds(1500 + 300));
        assert_eq!(engine.status(), TimerStatus::Idle);
    }

    #[test]
    fn suspension_is_reconciled_against_wall_clock() {
        let mut engine = engine();
        engine.start_focus(SessionMode::Pomodoro, None, t0());

        // Host suspends for 40 minutes. A single late tick completes the
        // focus phase at its deadline, a second one completes the break.
        let wake = t0() + Duration::seconds(40 * 60);
        let first = engine.tick(wake).unwrap();
        match first {
            Event::FocusCompleted { at, .. } => {
                assert_eq!(at, t0() + Duration::seconds(1500));
            }
            other => panic!("expected FocusCompleted, got {other:?}"),
        }
        let second = engine.tick(wake).unwrap();
        assert!(matches!(second, Event::BreakCompleted { .. }));
        // Breaks over at t0+30min; next auto-started focus has 10 minutes
        // of real time already behind it.
        assert_eq!(
            engine.remaining_secs(wake),
            Some(25 * 60 - 10 * 60)
        );
    }

    #[test]
    fn snapshot_survives_serialization() {
        let mut engine = engine();
        engine.start_focus(SessionMode::Pomodoro, None, t0());
        let json = serde_json::to_string(&engine).unwrap();
        let restored: TimerEngine = serde_json::from_str(&json).unwrap();

        let later = t0() + Duration::seconds(300);
        assert_eq!(restored.remaining_secs(later), Some(25 * 60 - 300));
        assert_eq!(restored.status(), TimerStatus::Focusing);
    }

    #[test]
    fn manual_break_from_idle() {
        let mut engine = engine();
        let event = engine.start_break(t0()).unwrap();
        assert!(matches!(event, Event::BreakStarted { long: false, .. }));
        assert_eq!(engine.status(), TimerStatus::Break);
        // No focus session is live during a manual break.
        let stopped = engine.stop(t0() + Duration::seconds(60)).unwrap();
        match stopped {
            Event::SessionStopped { session, .. } => assert!(session.is_none()),
            other => panic!("expected SessionStopped, got {other:?}"),
        }
    }

    #[test]
    fn pomodoro_count_survives_snapshot_restore() {
        let mut engine = engine();
        engine.start_focus(SessionMode::Pomodoro, None, t0());
        engine.tick(t0() + Duration::seconds(1500));
        assert_eq!(engine.pomodoro_count(), 1);

        // Mid-cycle restart: the running count rides along in the snapshot.
        let json = serde_json::to_string(&engine).unwrap();
        let restored: TimerEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.pomodoro_count(), 1);
    }
}
