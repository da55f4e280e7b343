//! Run settings
//!
//! Settings come from TOML files merged in XDG order, then environment
//! overrides, then whatever the CLI sets explicitly.
//!
//! ```toml
//! # $XDG_CONFIG_HOME/wheel-acquire/config.toml
//! package = "debugpy"
//! index_url = "https://pypi.org"
//! python = "python3"
//! pip_args = ["--index-url", "https://mirror.example/simple"]
//! http_timeout_secs = 60
//! abis = ["cp313", "cp312"]
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::{AcquireError, Result};
use crate::artifact::AbiTag;

pub const DEFAULT_PACKAGE: &str = "debugpy";
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org";
pub const DEFAULT_PYTHON: &str = "python";

/// Default HTTP timeout in seconds
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Interpreter ABIs bundled by default, newest first.
pub const DEFAULT_ABIS: [&str; 5] = ["cp314", "cp313", "cp312", "cp311", "cp310"];

const CONFIG_DIR_NAME: &str = "wheel-acquire";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    package: Option<String>,
    index_url: Option<String>,
    python: Option<String>,
    pip_args: Option<Vec<String>>,
    http_timeout_secs: Option<u64>,
    abis: Option<Vec<String>>,
}

impl SettingsToml {
    fn merge(&mut self, other: SettingsToml) {
        if other.package.is_some() {
            self.package = other.package;
        }
        if other.index_url.is_some() {
            self.index_url = other.index_url;
        }
        if other.python.is_some() {
            self.python = other.python;
        }
        if other.pip_args.is_some() {
            self.pip_args = other.pip_args;
        }
        if other.http_timeout_secs.is_some() {
            self.http_timeout_secs = other.http_timeout_secs;
        }
        if other.abis.is_some() {
            self.abis = other.abis;
        }
    }
}

/// Resolved settings for one acquisition run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Distribution name to acquire
    pub package: String,
    /// Base URL of the package index JSON API
    pub index_url: String,
    /// Interpreter used to run `pip download`
    pub python: String,
    /// Extra arguments appended to every `pip download`
    pub pip_args: Vec<String>,
    pub http_timeout: Duration,
    /// Interpreter ABIs to bundle, newest first
    pub abis: Vec<AbiTag>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_string(),
            index_url: DEFAULT_INDEX_URL.to_string(),
            python: DEFAULT_PYTHON.to_string(),
            pip_args: Vec::new(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            abis: DEFAULT_ABIS.iter().filter_map(|a| AbiTag::parse(a)).collect(),
        }
    }
}

impl Settings {
    /// Load settings from the XDG config locations plus environment overrides.
    ///
    /// Missing files are fine; a file that exists but does not parse is an error.
    pub fn load() -> Result<Self> {
        let mut merged = SettingsToml::default();
        for path in find_config_files() {
            if path.exists() {
                merged.merge(read_toml(&path)?);
            }
        }
        let mut settings = Self::from_toml(merged)?;
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Load settings from one explicit file plus environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = Self::from_toml(read_toml(path)?)?;
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Parse settings from TOML text (no environment overrides).
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let parsed = toml::from_str::<SettingsToml>(text)
            .map_err(|e| AcquireError::Configuration(format!("invalid settings: {e}")))?;
        Self::from_toml(parsed)
    }

    fn from_toml(cfg: SettingsToml) -> Result<Self> {
        let mut settings = Self::default();
        if let Some(package) = cfg.package {
            settings.package = package;
        }
        if let Some(index_url) = cfg.index_url {
            settings.index_url = index_url;
        }
        if let Some(python) = cfg.python {
            settings.python = python;
        }
        if let Some(pip_args) = cfg.pip_args {
            settings.pip_args = pip_args;
        }
        if let Some(secs) = cfg.http_timeout_secs {
            settings.http_timeout = clamp_timeout(secs);
        }
        if let Some(abis) = cfg.abis {
            settings.abis = parse_abis(&abis)?;
        }
        Ok(settings)
    }

    /// Apply `WHEEL_ACQUIRE_*` overrides using the given variable lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("WHEEL_ACQUIRE_INDEX_URL").filter(|s| !s.trim().is_empty()) {
            self.index_url = url.trim().to_string();
        }
        if let Some(python) = lookup("WHEEL_ACQUIRE_PYTHON").filter(|s| !s.trim().is_empty()) {
            self.python = python.trim().to_string();
        }
        if let Some(secs) = lookup("WHEEL_ACQUIRE_HTTP_TIMEOUT").and_then(|s| s.parse().ok()) {
            self.http_timeout = clamp_timeout(secs);
        }
    }

    /// Build a blocking HTTP agent honoring the configured timeout.
    pub fn http_agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(self.http_timeout)
            .user_agent(concat!("wheel-acquire/", env!("CARGO_PKG_VERSION")))
            .build()
    }
}

// Clamp to reasonable range (5-300 seconds)
fn clamp_timeout(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(5, 300))
}

fn parse_abis(raw: &[String]) -> Result<Vec<AbiTag>> {
    if raw.is_empty() {
        return Err(AcquireError::Configuration(
            "`abis` must list at least one interpreter ABI".to_string(),
        ));
    }
    let mut abis = raw
        .iter()
        .map(|s| {
            AbiTag::parse(s).ok_or_else(|| {
                AcquireError::Configuration(format!(
                    "invalid interpreter ABI '{s}' (expected e.g. cp312)"
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    abis.sort_by(|a, b| b.cmp(a));
    abis.dedup();
    Ok(abis)
}

fn split_xdg_config_dirs() -> Vec<PathBuf> {
    let raw = std::env::var("XDG_CONFIG_DIRS").unwrap_or_else(|_| "/etc/xdg".to_owned());
    raw.split(':')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn xdg_config_home() -> PathBuf {
    if let Ok(raw) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".").join(".config"))
}

fn find_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for dir in split_xdg_config_dirs() {
        paths.push(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    paths.push(xdg_config_home().join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    paths
}

fn read_toml(path: &Path) -> Result<SettingsToml> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        AcquireError::Configuration(format!("failed to read {}: {e}", path.display()))
    })?;
    toml::from_str::<SettingsToml>(&text).map_err(|e| {
        AcquireError::Configuration(format!("invalid TOML in {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.package, "debugpy");
        assert_eq!(settings.index_url, "https://pypi.org");
        assert_eq!(settings.http_timeout, Duration::from_secs(30));
        let abis: Vec<&str> = settings.abis.iter().map(|a| a.abi.as_str()).collect();
        assert_eq!(abis, ["cp314", "cp313", "cp312", "cp311", "cp310"]);
    }

    #[test]
    fn test_merge_later_file_wins_per_field() {
        let mut base: SettingsToml =
            toml::from_str("python = \"python3.12\"\nhttp_timeout_secs = 60\n").unwrap();
        let user: SettingsToml = toml::from_str("python = \"/opt/py/bin/python\"\n").unwrap();
        base.merge(user);

        let settings = Settings::from_toml(base).unwrap();
        assert_eq!(settings.python, "/opt/py/bin/python");
        assert_eq!(settings.http_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_abis_sorted_newest_first() {
        let settings = Settings::from_toml_str("abis = [\"cp310\", \"cp312\", \"cp311\"]").unwrap();
        let abis: Vec<&str> = settings.abis.iter().map(|a| a.abi.as_str()).collect();
        assert_eq!(abis, ["cp312", "cp311", "cp310"]);
    }

    #[test]
    fn test_invalid_abi_rejected() {
        let err = Settings::from_toml_str("abis = [\"py3\"]").unwrap_err();
        assert!(err.to_string().contains("invalid interpreter ABI"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Settings::from_toml_str("pakage = \"typo\"").is_err());
    }

    #[test]
    fn test_timeout_clamped() {
        let settings = Settings::from_toml_str("http_timeout_secs = 1").unwrap();
        assert_eq!(settings.http_timeout, Duration::from_secs(5));
        let settings = Settings::from_toml_str("http_timeout_secs = 9000").unwrap();
        assert_eq!(settings.http_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut settings = Settings::from_toml_str("index_url = \"https://file.example\"").unwrap();
        let env: HashMap<&str, &str> = [
            ("WHEEL_ACQUIRE_INDEX_URL", "https://env.example"),
            ("WHEEL_ACQUIRE_HTTP_TIMEOUT", "120"),
        ]
        .into_iter()
        .collect();
        settings.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.index_url, "https://env.example");
        assert_eq!(settings.http_timeout, Duration::from_secs(120));
        assert_eq!(settings.python, "python");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "package = \"other-pkg\"\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.package, "other-pkg");
    }
}
