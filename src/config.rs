use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::store::AiMode;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const MIN_POLL_INTERVAL_MS: u64 = 250;
const MIN_TIMEOUT_SECS: u64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub ai_mode: AiMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_ms: 2000,
            request_timeout_secs: 8,
            log_level: "info".to_string(),
            ai_mode: AiMode::Copilot,
        }
    }
}

impl Settings {
    pub fn path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("wechat-copilot.toml"))
    }

    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path().ok_or(ConfigError::NoConfigDir)?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = toml::from_str(&text)?;
        Ok(settings.normalized())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn normalized(mut self) -> Self {
        self.base_url = if self.base_url.trim().is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            crate::utils::normalize_url(&self.base_url)
        };
        self.poll_interval_ms = self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS);
        self.request_timeout_secs = self.request_timeout_secs.max(MIN_TIMEOUT_SECS);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_backend() {
        let s = Settings::default();
        assert_eq!(s.base_url, "http://127.0.0.1:8000");
        assert_eq!(s.poll_interval(), Duration::from_secs(2));
        assert_eq!(s.ai_mode, AiMode::Copilot);
    }

    #[test]
    fn partial_file_fills_defaults_and_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wechat-copilot.toml");
        fs::write(&path, "base_url = \"localhost:9000\"\npoll_interval_ms = 10\nai_mode = \"auto\"\n").unwrap();

        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.base_url, "http://localhost:9000");
        assert_eq!(s.poll_interval_ms, MIN_POLL_INTERVAL_MS);
        assert_eq!(s.request_timeout_secs, 8);
        assert_eq!(s.ai_mode, AiMode::Auto);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("wechat-copilot.toml");
        let s = Settings {
            base_url: "http://10.0.0.5:8000".into(),
            poll_interval_ms: 1500,
            request_timeout_secs: 5,
            log_level: "debug".into(),
            ai_mode: AiMode::Auto,
        };
        s.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), s);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "poll_interval_ms = \"soon\"").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
