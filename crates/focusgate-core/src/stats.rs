//! Usage statistics: session history, daily aggregates and streaks.
//!
//! [`UsageStats`] has a single writer (the coordinator's recorder path);
//! everything else reads snapshots of it.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::timer::{FocusSession, SessionMode};

/// Most recent sessions kept in history; older ones are evicted.
pub const SESSION_HISTORY_CAP: usize = 100;

/// Aggregates for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub focus_minutes: u32,
    pub sessions: u32,
    pub pomodoros: u32,
    pub sites_blocked: u32,
}

impl DailyStats {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            focus_minutes: 0,
            sessions: 0,
            pomodoros: 0,
            sites_blocked: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_focus_minutes: u64,
    pub total_sessions: u64,
    pub total_sites_blocked: u64,
    pub total_pomodoros_completed: u64,
    /// Consecutive days with non-zero focus time, up to the latest one.
    pub current_streak: u32,
    /// Never decreases.
    pub longest_streak: u32,
    /// Ordered by date, one entry per day that saw any activity.
    pub daily: Vec<DailyStats>,
    /// Bounded history, most recent last.
    pub sessions: Vec<FocusSession>,
}

impl UsageStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sealed session ending on calendar day `day`.
    pub fn record_session(&mut self, session: FocusSession, day: NaiveDate) {
        self.total_sessions += 1;
        self.total_focus_minutes += u64::from(session.actual_minutes);
        if session.completed && session.mode == SessionMode::Pomodoro {
            self.total_pomodoros_completed += 1;
        }

        let had_focus_before = self.day_has_focus(day);
        let entry = self.day_entry(day);
        entry.sessions += 1;
        entry.focus_minutes += session.actual_minutes;
        if session.completed && session.mode == SessionMode::Pomodoro {
            entry.pomodoros += 1;
        }

        // Streaks move on the first focus minute of the day.
        if !had_focus_before && self.day_has_focus(day) {
            let yesterday = day - Duration::days(1);
            self.current_streak = if self.day_has_focus(yesterday) {
                self.current_streak + 1
            } else {
                1
            };
            self.longest_streak = self.longest_streak.max(self.current_streak);
        }

        self.sessions.push(session);
        if self.sessions.len() > SESSION_HISTORY_CAP {
            let excess = self.sessions.len() - SESSION_HISTORY_CAP;
            self.sessions.drain(..excess);
        }
    }

    /// Count one blocked navigation on `day`. Independent of session state.
    pub fn record_blocked(&mut self, day: NaiveDate) {
        self.total_sites_blocked += 1;
        self.day_entry(day).sites_blocked += 1;
    }

    pub fn today(&self, day: NaiveDate) -> Option<&DailyStats> {
        self.daily.iter().find(|d| d.date == day)
    }

    fn day_has_focus(&self, day: NaiveDate) -> bool {
        self.today(day).map(|d| d.focus_minutes > 0).unwrap_or(false)
    }

    fn day_entry(&mut self, day: NaiveDate) -> &mut DailyStats {
        if let Some(idx) = self.daily.iter().position(|d| d.date == day) {
            return &mut self.daily[idx];
        }
        // Keep the list ordered by date even if a stale day arrives late.
        let idx = self
            .daily
            .iter()
            .position(|d| d.date > day)
            .unwrap_or(self.daily.len());
        self.daily.insert(idx, DailyStats::empty(day));
        &mut self.daily[idx]
    }
}
