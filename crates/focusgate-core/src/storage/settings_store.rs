//! TOML-backed settings persistence.
//!
//! Stored at `~/.config/focusgate/config.toml`. Loading never fails the
//! caller: a missing, truncated or partially-shaped document merges over
//! defaults field-by-field (every settings field carries a serde default).

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::settings::Settings;

use super::data_dir;

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at the default location.
    pub fn open() -> Result<Self, ConfigError> {
        Ok(Self {
            path: data_dir()?.join("config.toml"),
        })
    }

    /// Store at an explicit path.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load settings, falling back to defaults on any failure. A corrupt
    /// document is logged and replaced by defaults rather than propagated.
    pub fn load(&self) -> Settings {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e,
                        "settings file is corrupt, using defaults");
                    Settings::default()
                }
            },
            Err(_) => Settings::default(),
        }
    }

    /// Persist to disk as one atomic read-modify-write from the caller's
    /// point of view: callers mutate a loaded copy and save it back through
    /// the coordinator, which serializes writers.
    ///
    /// # Errors
    /// Returns an error if the settings cannot be serialized or written.
    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(settings).map_err(|e| ConfigError::SaveFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, content).map_err(|e| ConfigError::SaveFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

/// Get a settings value as string by dot-separated key (`pomodoro.focus_duration`).
pub fn get_value(settings: &Settings, key: &str) -> Option<String> {
    let json = serde_json::to_value(settings).ok()?;
    let mut current = &json;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    match current {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Set a settings value by dot-separated key, preserving the field's type.
///
/// # Errors
/// Returns an error if the key is unknown or the value does not parse as
/// the field's type.
pub fn set_value(settings: &mut Settings, key: &str, value: &str) -> Result<(), ConfigError> {
    let mut json = serde_json::to_value(&*settings).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })?;

    set_json_by_path(&mut json, key, value)?;

    *settings = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}

fn set_json_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let mut parts = key.split('.').peekable();
    if parts.peek().is_none() {
        return Err(ConfigError::UnknownKey(key.to_string()));
    }

    let mut current = root;
    while let Some(part) = parts.next() {
        let is_leaf = parts.peek().is_none();
        if is_leaf {
            let obj = current
                .as_object_mut()
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            let existing = obj
                .get(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                    serde_json::Value::Number(n.into())
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        current = current
            .get_mut(part)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    }

    Err(ConfigError::UnknownKey(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("config.toml"));
        let settings = store.load();
        assert_eq!(settings.pomodoro.focus_duration, 25);
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("config.toml"));

        let mut settings = Settings::default();
        settings.add_block_rule("facebook.com", false).unwrap();
        settings.pomodoro.focus_duration = 50;
        store.save(&settings).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.pomodoro.focus_duration, 50);
        assert_eq!(loaded.blocklist.len(), 1);
        assert_eq!(loaded.blocklist[0].pattern, "facebook.com");
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "pomodoro = \"not a table\"").unwrap();
        let settings = SettingsStore::at(path).load();
        assert_eq!(settings.pomodoro.focus_duration, 25);
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[schedule]\nenabled = true\n").unwrap();
        let settings = SettingsStore::at(path).load();
        assert!(settings.schedule.enabled);
        assert_eq!(settings.pomodoro.focus_duration, 25);
        assert!(settings.blocked_page.allow_emergency_unlock);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let settings = Settings::default();
        assert_eq!(
            get_value(&settings, "pomodoro.focus_duration").as_deref(),
            Some("25")
        );
        assert_eq!(
            get_value(&settings, "schedule.start_time").as_deref(),
            Some("09:00")
        );
        assert!(get_value(&settings, "pomodoro.missing").is_none());
    }

    #[test]
    fn set_updates_nested_number_and_bool() {
        let mut settings = Settings::default();
        set_value(&mut settings, "pomodoro.focus_duration", "50").unwrap();
        assert_eq!(settings.pomodoro.focus_duration, 50);

        set_value(&mut settings, "schedule.enabled", "true").unwrap();
        assert!(settings.schedule.enabled);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_type() {
        let mut settings = Settings::default();
        assert!(set_value(&mut settings, "pomodoro.nonexistent", "1").is_err());
        assert!(set_value(&mut settings, "schedule.enabled", "not_a_bool").is_err());
    }
}
