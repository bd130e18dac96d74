//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Focus and break interval lengths
//! - Phrase interpreter tuning (default priority, escalation, extra keywords)
//! - Display preferences
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, CoreError, Result, ValidationError};
use crate::parser::TaskParser;
use crate::timer::SessionDurations;

/// Interval lengths in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
}

/// Phrase interpreter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Priority (1-5) when no urgency keyword matches.
    #[serde(default = "default_priority")]
    pub default_priority: u8,
    /// Raise priority for tasks due within one or three days.
    #[serde(default = "default_true")]
    pub escalate_by_due_date: bool,
    /// Extra keywords per category name, e.g. `Work = ["standup", "sprint"]`.
    #[serde(default)]
    pub extra_keywords: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Print a pep talk when an interval completes.
    #[serde(default = "default_true")]
    pub show_motivation: bool,
    /// Overrides the mood-based task list length.
    #[serde(default)]
    pub task_display_limit: Option<usize>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

fn default_focus_minutes() -> u32 {
    25
}
fn default_break_minutes() -> u32 {
    5
}
fn default_priority() -> u8 {
    3
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            break_minutes: default_break_minutes(),
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_priority: default_priority(),
            escalate_by_due_date: true,
            extra_keywords: BTreeMap::new(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_motivation: true,
            task_display_limit: None,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                ),
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                // Optional values: "none" clears, anything else is read as JSON
                // (numbers, bools) and falls back to a plain string.
                serde_json::Value::Null => match value {
                    "none" | "null" | "" => serde_json::Value::Null,
                    other => serde_json::from_str(other)
                        .unwrap_or_else(|_| serde_json::Value::String(other.into())),
                },
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                serde_json::Value::String(_) => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. The result is validated
    /// before it replaces `self`; nothing is written to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting configuration is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| {
            CoreError::Config(ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check values that serde alone cannot.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.durations()?;
        self.task_parser()?;
        if self.ui.task_display_limit == Some(0) {
            return Err(ValidationError::InvalidValue {
                field: "ui.task_display_limit".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn durations(&self) -> Result<SessionDurations, ValidationError> {
        SessionDurations::from_minutes(self.timer.focus_minutes, self.timer.break_minutes)
    }

    pub fn task_parser(&self) -> Result<TaskParser, ValidationError> {
        TaskParser::from_config(&self.parser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str(
            "[timer]\nfocus_minutes = 50\n\n[parser.extra_keywords]\nWork = [\"standup\"]\n",
        )
        .unwrap();
        assert_eq!(parsed.timer.focus_minutes, 50);
        assert_eq!(parsed.timer.break_minutes, 5);
        assert_eq!(parsed.parser.default_priority, 3);
        assert_eq!(parsed.parser.extra_keywords["Work"], vec!["standup"]);
        assert!(parsed.ui.show_motivation);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.focus_minutes").as_deref(), Some("25"));
        assert_eq!(cfg.get("parser.escalate_by_due_date").as_deref(), Some("true"));
        assert_eq!(cfg.get("ui.task_display_limit").as_deref(), Some("null"));
        assert!(cfg.get("ui.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("timer.break_minutes", "10").unwrap();
        cfg.set("ui.show_motivation", "false").unwrap();
        cfg.set("ui.task_display_limit", "4").unwrap();
        cfg.set("parser.extra_keywords", r#"{"Travel": ["road trip"]}"#)
            .unwrap();
        assert_eq!(cfg.timer.break_minutes, 10);
        assert!(!cfg.ui.show_motivation);
        assert_eq!(cfg.ui.task_display_limit, Some(4));
        assert_eq!(cfg.parser.extra_keywords["Travel"], vec!["road trip"]);

        cfg.set("ui.task_display_limit", "none").unwrap();
        assert_eq!(cfg.ui.task_display_limit, None);
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut cfg = Config::default();
        assert!(cfg.set("timer.nonexistent", "1").is_err());
        assert!(cfg.set("ui.show_motivation", "sometimes").is_err());
        assert!(cfg.set("timer.focus_minutes", "-5").is_err());
        // Parses, but fails validation; config is left untouched.
        assert!(cfg.set("timer.focus_minutes", "0").is_err());
        assert!(cfg.set("parser.default_priority", "9").is_err());
        assert!(cfg
            .set("parser.extra_keywords", r#"{"Chores": ["dishes"]}"#)
            .is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn durations_follow_minutes() {
        let mut cfg = Config::default();
        cfg.timer.focus_minutes = 50;
        let d = cfg.durations().unwrap();
        assert_eq!(d.focus_secs(), 3000);
        assert_eq!(d.break_secs(), 300);
    }

    #[test]
    fn load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("timer.focus_minutes", "45").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().timer.focus_minutes, 45);

        std::fs::write(&path, "timer = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
