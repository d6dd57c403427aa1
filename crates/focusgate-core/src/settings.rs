//! Typed settings model.
//!
//! Every field carries a serde default so a partially-shaped stored document
//! merges over defaults field-by-field instead of failing to parse. The
//! coordinator is the only writer; UI surfaces read through it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// A single site rule, used by both the blocklist and the whitelist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRule {
    /// Unique within its list, generated at creation.
    pub id: Uuid,
    /// Hostname (`facebook.com`) or, when `is_regex`, a pattern matched
    /// against the full URL.
    pub pattern: String,
    #[serde(default)]
    pub is_regex: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Optional category tag for rules created from a preset.
    #[serde(default)]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SiteRule {
    /// Create a new enabled rule. Empty patterns are rejected.
    pub fn new(pattern: &str, is_regex: bool) -> Result<Self, ValidationError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(ValidationError::EmptyPattern);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            pattern: pattern.to_string(),
            is_regex,
            enabled: true,
            category: None,
            created_at: Utc::now(),
        })
    }
}

/// A named, curated group of URL patterns toggle-able as a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPreset {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl CategoryPreset {
    /// The built-in presets shipped with the app. All start disabled.
    pub fn builtin() -> Vec<Self> {
        let preset = |name: &str, patterns: &[&str]| CategoryPreset {
            name: name.to_string(),
            enabled: false,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        };
        vec![
            preset(
                "Social Media",
                &[
                    "facebook.com",
                    "instagram.com",
                    "twitter.com",
                    "x.com",
                    "tiktok.com",
                    "reddit.com",
                    "linkedin.com",
                ],
            ),
            preset(
                "Video",
                &["youtube.com", "netflix.com", "twitch.tv", "hulu.com"],
            ),
            preset(
                "News",
                &["cnn.com", "bbc.com", "nytimes.com", "theguardian.com"],
            ),
            preset(
                "Shopping",
                &["amazon.com", "ebay.com", "aliexpress.com", "etsy.com"],
            ),
        ]
    }
}

/// Pomodoro cycle durations, all in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PomodoroConfig {
    #[serde(default = "default_focus_duration")]
    pub focus_duration: u32,
    #[serde(default = "default_short_break")]
    pub short_break_duration: u32,
    #[serde(default = "default_long_break")]
    pub long_break_duration: u32,
    #[serde(default = "default_sessions_until_long_break")]
    pub sessions_until_long_break: u32,
    /// Start the next focus phase automatically when a break ends.
    #[serde(default = "default_true")]
    pub auto_start_focus: bool,
}

/// Auto-focus window: blocking is active during these hours even without a
/// running session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Days of week, 0 = Sunday .. 6 = Saturday.
    #[serde(default = "default_weekdays")]
    pub days: Vec<u8>,
    /// Local time of day, "HH:MM".
    #[serde(default = "default_start_time")]
    pub start_time: String,
    #[serde(default = "default_end_time")]
    pub end_time: String,
}

/// Password protection for settings changes and emergency unlock.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PasswordConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Hex-encoded salted SHA-256 digest; empty when no password is set.
    #[serde(default)]
    pub password_hash: String,
}

/// Behavior of the page shown in place of a blocked site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedPageConfig {
    #[serde(default = "default_true")]
    pub show_timer: bool,
    #[serde(default = "default_true")]
    pub show_quote: bool,
    #[serde(default = "default_true")]
    pub allow_emergency_unlock: bool,
    #[serde(default = "default_cooldown_minutes")]
    pub emergency_cooldown_minutes: u32,
}

/// Application settings.
///
/// Serialized to/from TOML at `~/.config/focusgate/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub blocklist: Vec<SiteRule>,
    #[serde(default)]
    pub whitelist: Vec<SiteRule>,
    #[serde(default = "CategoryPreset::builtin")]
    pub categories: Vec<CategoryPreset>,
    #[serde(default)]
    pub pomodoro: PomodoroConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub blocked_page: BlockedPageConfig,
}

// Default functions
fn default_focus_duration() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_sessions_until_long_break() -> u32 {
    4
}
fn default_cooldown_minutes() -> u32 {
    30
}
fn default_weekdays() -> Vec<u8> {
    vec![1, 2, 3, 4, 5]
}
fn default_start_time() -> String {
    "09:00".into()
}
fn default_end_time() -> String {
    "17:00".into()
}
fn default_true() -> bool {
    true
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            focus_duration: default_focus_duration(),
            short_break_duration: default_short_break(),
            long_break_duration: default_long_break(),
            sessions_until_long_break: default_sessions_until_long_break(),
            auto_start_focus: true,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            days: default_weekdays(),
            start_time: default_start_time(),
            end_time: default_end_time(),
        }
    }
}

impl Default for BlockedPageConfig {
    fn default() -> Self {
        Self {
            show_timer: true,
            show_quote: true,
            allow_emergency_unlock: true,
            emergency_cooldown_minutes: default_cooldown_minutes(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            blocklist: Vec::new(),
            whitelist: Vec::new(),
            categories: CategoryPreset::builtin(),
            pomodoro: PomodoroConfig::default(),
            schedule: ScheduleConfig::default(),
            password: PasswordConfig::default(),
            blocked_page: BlockedPageConfig::default(),
        }
    }
}

/// Partial settings update. Present sections replace the stored ones; rule
/// lists are edited through the dedicated add/remove commands instead so ids
/// and creation timestamps survive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default)]
    pub categories: Option<Vec<CategoryPreset>>,
    #[serde(default)]
    pub pomodoro: Option<PomodoroConfig>,
    #[serde(default)]
    pub schedule: Option<ScheduleConfig>,
    #[serde(default)]
    pub password: Option<PasswordConfig>,
    #[serde(default)]
    pub blocked_page: Option<BlockedPageConfig>,
}

impl SettingsPatch {
    /// Apply the present sections to `settings`.
    pub fn apply(self, settings: &mut Settings) {
        if let Some(categories) = self.categories {
            settings.categories = categories;
        }
        if let Some(pomodoro) = self.pomodoro {
            settings.pomodoro = pomodoro;
        }
        if let Some(schedule) = self.schedule {
            settings.schedule = schedule;
        }
        if let Some(password) = self.password {
            settings.password = password;
        }
        if let Some(blocked_page) = self.blocked_page {
            settings.blocked_page = blocked_page;
        }
    }
}

impl Settings {
    /// Add a blocklist rule, returning the created rule.
    pub fn add_block_rule(
        &mut self,
        pattern: &str,
        is_regex: bool,
    ) -> Result<SiteRule, ValidationError> {
        let rule = SiteRule::new(pattern, is_regex)?;
        self.blocklist.push(rule.clone());
        Ok(rule)
    }

    /// Add a whitelist rule, returning the created rule.
    pub fn add_whitelist_rule(
        &mut self,
        pattern: &str,
        is_regex: bool,
    ) -> Result<SiteRule, ValidationError> {
        let rule = SiteRule::new(pattern, is_regex)?;
        self.whitelist.push(rule.clone());
        Ok(rule)
    }

    /// Remove a blocklist rule by id.
    pub fn remove_block_rule(&mut self, id: Uuid) -> Result<(), ValidationError> {
        remove_rule(&mut self.blocklist, id)
    }

    /// Remove a whitelist rule by id.
    pub fn remove_whitelist_rule(&mut self, id: Uuid) -> Result<(), ValidationError> {
        remove_rule(&mut self.whitelist, id)
    }
}

fn remove_rule(rules: &mut Vec<SiteRule>, id: Uuid) -> Result<(), ValidationError> {
    let before = rules.len();
    rules.retain(|r| r.id != id);
    if rules.len() == before {
        return Err(ValidationError::UnknownRule(id.to_string()));
    }
    Ok(())
}
