//! Per-navigation blocking decisions.
//!
//! Evaluation order is a policy, not an accident: whitelist is an absolute
//! override (the user's safety valve for required sites), then custom
//! blocklist rules, then category presets. First match wins.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matcher;
use crate::schedule;
use crate::settings::Settings;
use crate::timer::TimerStatus;

/// Which list produced the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSource {
    Whitelist,
    Blocklist,
    Category,
}

/// The rule a decision was made on, for UI display and accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleMatch {
    pub source: RuleSource,
    pub pattern: String,
    /// Set for list rules; `None` for category preset patterns.
    pub rule_id: Option<Uuid>,
    /// Set for category preset patterns.
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDecision {
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<RuleMatch>,
}

impl BlockDecision {
    fn allow() -> Self {
        Self {
            blocked: false,
            matched: None,
        }
    }
}

/// Decide whether navigating to `url` must be blocked right now.
///
/// Blocking applies only while a focus session is running or the auto-focus
/// schedule window is active; idle, paused and break states allow
/// everything.
pub fn evaluate(
    url: &str,
    settings: &Settings,
    timer_status: TimerStatus,
    local_now: NaiveDateTime,
) -> BlockDecision {
    let focusing = timer_status == TimerStatus::Focusing;
    if !focusing && !schedule::is_active(&settings.schedule, local_now) {
        return BlockDecision::allow();
    }

    // Whitelist wins over everything that follows.
    for rule in settings.whitelist.iter().filter(|r| r.enabled) {
        if matcher::matches(url, &rule.pattern, rule.is_regex) {
            return BlockDecision {
                blocked: false,
                matched: Some(RuleMatch {
                    source: RuleSource::Whitelist,
                    pattern: rule.pattern.clone(),
                    rule_id: Some(rule.id),
                    category: None,
                }),
            };
        }
    }

    for rule in settings.blocklist.iter().filter(|r| r.enabled) {
        if matcher::matches(url, &rule.pattern, rule.is_regex) {
            return BlockDecision {
                blocked: true,
                matched: Some(RuleMatch {
                    source: RuleSource::Blocklist,
                    pattern: rule.pattern.clone(),
                    rule_id: Some(rule.id),
                    category: rule.category.clone(),
                }),
            };
        }
    }

    for preset in settings.categories.iter().filter(|c| c.enabled) {
        for pattern in &preset.patterns {
            if matcher::matches(url, pattern, false) {
                return BlockDecision {
                    blocked: true,
                    matched: Some(RuleMatch {
                        source: RuleSource::Category,
                        pattern: pattern.clone(),
                        rule_id: None,
                        category: Some(preset.name.clone()),
                    }),
                };
            }
        }
    }

    BlockDecision::allow()
}
