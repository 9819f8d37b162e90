use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, YieldGapError};

/// Substituted when the Treasury feed cannot be read.
pub const DEFAULT_FALLBACK_RATE: &str = "0.035";

const DEFAULT_PROFILE_BASE_URL: &str = "https://projects.propublica.org/nonprofits";
const DEFAULT_TREASURY_URL: &str =
    "https://home.treasury.gov/resource-center/data-chart-center/interest-rates/pages/xml";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_fallback_rate")]
    pub fallback_rate: Decimal,
    #[serde(default = "default_profile_base_url")]
    pub profile_base_url: String,
    #[serde(default = "default_treasury_url")]
    pub treasury_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_fallback_rate() -> Decimal {
    Decimal::from_str(DEFAULT_FALLBACK_RATE).unwrap_or(Decimal::ZERO)
}

fn default_profile_base_url() -> String {
    DEFAULT_PROFILE_BASE_URL.to_string()
}

fn default_treasury_url() -> String {
    DEFAULT_TREASURY_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fallback_rate: default_fallback_rate(),
            profile_base_url: default_profile_base_url(),
            treasury_url: default_treasury_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("yieldgap")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

fn load_settings_from(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &settings_path())
}

fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| YieldGapError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

/// Parse a non-negative annual rate given as a fraction, e.g. `0.04`.
pub fn parse_rate(raw: &str) -> Result<Decimal> {
    let rate = Decimal::from_str(raw.trim())
        .map_err(|_| YieldGapError::Settings(format!("not a decimal rate: {raw}")))?;
    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(YieldGapError::Settings(format!("rate must not be negative: {raw}")));
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            fallback_rate: Decimal::from_str("0.0425").unwrap(),
            timeout_secs: 5,
            ..Settings::default()
        };
        save_settings_to(&settings, &path).unwrap();
        let loaded = load_settings_from(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("nope.json"));
        assert_eq!(s, Settings::default());
        assert_eq!(s.fallback_rate, Decimal::from_str("0.035").unwrap());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"fallback_rate": "0.05", "timeout_secs": 10}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.fallback_rate, Decimal::from_str("0.05").unwrap());
        assert_eq!(s.timeout_secs, 10);
        assert_eq!(s.profile_base_url, DEFAULT_PROFILE_BASE_URL);
    }

    #[test]
    fn test_load_ignores_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(load_settings_from(&path), Settings::default());
    }

    #[test]
    fn test_save_creates_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("settings.json");
        save_settings_to(&Settings::default(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate("0.04").unwrap(), Decimal::from_str("0.04").unwrap());
        assert_eq!(parse_rate(" 0 ").unwrap(), Decimal::ZERO);
        assert!(parse_rate("-0.01").is_err());
        assert!(parse_rate("four percent").is_err());
    }
}
