//! TOML-based plugin configuration.
//!
//! Holds the four Twitter credentials handed to the care library and the
//! length of a break in minutes. The file lives at
//! `~/.config/tinycare/config.toml` and is read once at startup; nothing in
//! the scheduler mutates it afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

const CONFIG_FILE: &str = "config.toml";
const MS_PER_MINUTE: u64 = 60 * 1000;

/// Smallest accepted value for `break_time`.
pub const MIN_BREAK_TIME: i64 = 1;

/// Twitter API credentials. Empty strings are allowed here; the care
/// library decides whether they are usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitterConfig {
    /// Consumer Key (API Key)
    #[serde(default)]
    pub consumer_key: String,
    /// Consumer Secret (API Secret)
    #[serde(default)]
    pub consumer_secret: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub access_token_secret: String,
}

/// Plugin configuration.
///
/// Serialized to/from TOML. `break_time` is signed so that zero and negative
/// values survive parsing and are rejected by [`Config::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// The amount of minutes that constitutes a break.
    #[serde(default = "default_break_time")]
    pub break_time: i64,
    #[serde(default)]
    pub twitter: TwitterConfig,
}

fn default_break_time() -> i64 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            break_time: default_break_time(),
            twitter: TwitterConfig::default(),
        }
    }
}

/// Returns the configuration directory.
///
/// `TINYCARE_CONFIG_DIR` wins if set. Otherwise `~/.config/tinycare[-dev]/`
/// based on `TINYCARE_ENV` (set it to `dev` for a development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn config_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("TINYCARE_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TINYCARE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tinycare-dev")
            } else {
                base_dir.join("tinycare")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
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
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Number(_) => value
                        .trim()
                        .parse::<i64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| ConfigError::InvalidValue {
                            key: key.to_string(),
                            message: format!("cannot parse '{value}' as an integer"),
                        })?,
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Path of the config file inside `dir`.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    /// Path of the config file in the default config directory.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be created.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::path_in(&config_dir()?))
    }

    /// Load from the default config directory, writing defaults if absent.
    ///
    /// # Errors
    /// See [`Config::load_from`].
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir()?)
    }

    /// Load and validate `config.toml` from `dir`.
    ///
    /// A missing file is replaced by the defaults, which are written back.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed,
    /// if `break_time` is out of range, or if the defaults cannot be saved.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let cfg = Self::load_unchecked_from(dir)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from the default config directory without validating.
    ///
    /// # Errors
    /// See [`Config::load_unchecked_from`].
    pub fn load_unchecked() -> Result<Self> {
        Self::load_unchecked_from(&config_dir()?)
    }

    /// Like [`Config::load_from`] but keeps out-of-range values, so that
    /// [`Config::set`] can repair a file holding one.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if the defaults cannot be saved.
    pub fn load_unchecked_from(dir: &Path) -> Result<Self> {
        let path = Self::path_in(dir);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config not found, writing defaults");
            let cfg = Self::default();
            cfg.save_to(dir)?;
            return Ok(cfg);
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content).map_err(ConfigError::from)?;
        Ok(cfg)
    }

    /// Persist to the default config directory.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_dir()?)
    }

    /// Persist to `dir/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, dir: &Path) -> Result<()> {
        let path = Self::path_in(dir);
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.clone(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Reject values the schema does not allow.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] when `break_time` is below
    /// [`MIN_BREAK_TIME`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.break_time < MIN_BREAK_TIME {
            return Err(ConfigError::InvalidValue {
                key: "break_time".to_string(),
                message: format!(
                    "must be at least {MIN_BREAK_TIME} minute, got {}",
                    self.break_time
                ),
            });
        }
        Ok(())
    }

    /// Break length in milliseconds.
    ///
    /// Zero for a negative `break_time`; run [`Config::validate`] first.
    pub fn break_duration_ms(&self) -> u64 {
        let minutes = u64::try_from(self.break_time).unwrap_or_default();
        minutes.saturating_mul(MS_PER_MINUTE)
    }

    pub fn break_duration(&self) -> Duration {
        Duration::from_millis(self.break_duration_ms())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and re-validate.
    ///
    /// The in-memory config is left untouched when the key is unknown or the
    /// new value is invalid. Call [`Config::save`] to persist.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Every settable key, in schema order.
    pub fn keys() -> &'static [&'static str] {
        &[
            "twitter.consumer_key",
            "twitter.consumer_secret",
            "twitter.access_token",
            "twitter.access_token_secret",
            "break_time",
        ]
    }
}
