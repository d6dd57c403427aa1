//! License tier and daily feature limits.
//!
//! The free tier caps how many focus sessions can be started per calendar
//! day. Limit hits are ordinary `{allowed, reason}` outcomes the UI turns
//! into an upgrade prompt, never errors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Pro,
}

/// External license collaborator: where the current tier comes from.
pub trait LicenseProvider {
    fn tier(&self) -> Tier;
}

/// Fixed-tier provider; the default when no license backend is wired up.
#[derive(Debug, Clone, Copy)]
pub struct StaticLicense(pub Tier);

impl LicenseProvider for StaticLicense {
    fn tier(&self) -> Tier {
        self.0
    }
}

/// Feature id for starting a focus session.
pub const FEATURE_SESSION_START: &str = "session_start";

/// Free-tier cap on focus-session starts per day.
pub const FREE_DAILY_SESSION_LIMIT: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Per-feature daily usage counter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DailyUsage {
    day: Option<NaiveDate>,
    count: u32,
}

/// Tier-aware daily usage limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureGate {
    tier: Tier,
    usage: HashMap<String, DailyUsage>,
}

impl FeatureGate {
    pub fn new(tier: Tier) -> Self {
        Self {
            tier,
            usage: HashMap::new(),
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn set_tier(&mut self, tier: Tier) {
        self.tier = tier;
    }

    /// May `feature_id` be used (again) on `day`?
    pub fn check(&self, feature_id: &str, day: NaiveDate) -> GateDecision {
        let Some(limit) = self.limit_for(feature_id) else {
            return GateDecision {
                allowed: true,
                reason: None,
            };
        };
        let used = self.used_today(feature_id, day);
        if used >= limit {
            return GateDecision {
                allowed: false,
                reason: Some(format!(
                    "Daily limit reached ({limit} per day on the free tier)"
                )),
            };
        }
        GateDecision {
            allowed: true,
            reason: None,
        }
    }

    /// Count one use of `feature_id` on `day`. Rolls the counter over when
    /// the day changes.
    pub fn record_usage(&mut self, feature_id: &str, day: NaiveDate) {
        let entry = self.usage.entry(feature_id.to_string()).or_default();
        if entry.day != Some(day) {
            entry.day = Some(day);
            entry.count = 0;
        }
        entry.count += 1;
    }

    fn used_today(&self, feature_id: &str, day: NaiveDate) -> u32 {
        self.usage
            .get(feature_id)
            .filter(|u| u.day == Some(day))
            .map(|u| u.count)
            .unwrap_or(0)
    }

    fn limit_for(&self, feature_id: &str) -> Option<u32> {
        match (self.tier, feature_id) {
            (Tier::Free, FEATURE_SESSION_START) => Some(FREE_DAILY_SESSION_LIMIT),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn free_tier_allows_up_to_the_limit() {
        let mut gate = FeatureGate::new(Tier::Free);
        for _ in 0..FREE_DAILY_SESSION_LIMIT {
            assert!(gate.check(FEATURE_SESSION_START, day(2)).allowed);
            gate.record_usage(FEATURE_SESSION_START, day(2));
        }
        let over = gate.check(FEATURE_SESSION_START, day(2));
        assert!(!over.allowed);
        assert!(over.reason.unwrap().contains("Daily limit"));
    }

    #[test]
    fn counter_rolls_over_at_midnight() {
        let mut gate = FeatureGate::new(Tier::Free);
        for _ in 0..FREE_DAILY_SESSION_LIMIT {
            gate.record_usage(FEATURE_SESSION_START, day(2));
        }
        assert!(!gate.check(FEATURE_SESSION_START, day(2)).allowed);
        assert!(gate.check(FEATURE_SESSION_START, day(3)).allowed);
    }

    #[test]
    fn pro_tier_is_unlimited() {
        let mut gate = FeatureGate::new(Tier::Pro);
        for _ in 0..100 {
            gate.record_usage(FEATURE_SESSION_START, day(2));
        }
        assert!(gate.check(FEATURE_SESSION_START, day(2)).allowed);
    }

    #[test]
    fn unknown_features_are_not_limited() {
        let gate = FeatureGate::new(Tier::Free);
        assert!(gate.check("export_stats", day(2)).allowed);
    }
}
