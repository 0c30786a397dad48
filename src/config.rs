use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the configured base URL at runtime
pub const BASE_URL_ENV: &str = "CHATDESK_BASE_URL";

/// Base URL compiled into the binary, used when nothing else is configured
pub fn default_base_url() -> String {
    option_env!("CHATDESK_DEFAULT_BASE_URL")
        .unwrap_or("http://localhost:8000")
        .to_string()
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root URL of the assistant service (`/health` and `/chat` live under it)
    pub base_url: String,

    /// Per-request timeout for the HTTP client
    pub request_timeout_secs: u64,

    /// UI preferences
    pub ui: UiConfig,

    /// chatdesk home directory
    #[serde(skip)]
    pub home: PathBuf,

    /// File this configuration was loaded from and is saved to
    #[serde(skip)]
    pub path: PathBuf,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Show response time and token badges under assistant replies
    pub show_metrics: bool,
    pub tick_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_metrics: true,
            tick_rate_ms: 250,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("~"))
            .join(".chatdesk");

        Config {
            base_url: default_base_url(),
            request_timeout_secs: 60,
            ui: UiConfig::default(),
            path: home.join("config.toml"),
            home,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or `~/.chatdesk/config.toml` when none is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let home = dirs::home_dir()
            .context("Could not find home directory")?
            .join(".chatdesk");
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| home.join("config.toml"));

        let mut config = Self::from_file(&config_path)?;
        config.home = home;
        Ok(config)
    }

    /// Parse a config file; a missing file yields the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Config::default()
        };
        config.path = path.to_path_buf();
        Ok(config)
    }

    /// Save configuration to the file it was loaded from
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write config file {}", self.path.display()))?;
        Ok(())
    }

    /// Apply the environment override, reading variables through `lookup`
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        self
    }

    /// Apply command line overrides
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        self
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.home.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.base_url, default_base_url());
        assert_eq!(config.request_timeout_secs, 60);
        assert!(config.ui.show_metrics);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"https://chat.example.com\"").unwrap();
        writeln!(file, "[ui]").unwrap();
        writeln!(file, "show_metrics = false").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, "https://chat.example.com");
        assert!(!config.ui.show_metrics);
        assert_eq!(config.ui.tick_rate_ms, 250);
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = [").unwrap();
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn explicit_path_is_remembered_and_saved_to() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("nested").join("custom.toml");

        let mut config = Config::load(Some(&custom)).unwrap();
        assert_eq!(config.path, custom);

        config.base_url = "http://saved:3".to_string();
        config.save().unwrap();
        assert!(custom.exists());

        let reloaded = Config::load(Some(&custom)).unwrap();
        assert_eq!(reloaded.base_url, "http://saved:3");
        assert_eq!(reloaded.path, custom);
    }

    #[test]
    fn cli_flag_beats_env_which_beats_file() {
        let config = Config::default()
            .with_env(|key| (key == BASE_URL_ENV).then(|| "http://env:1".to_string()));
        assert_eq!(config.base_url, "http://env:1");

        let config = config.with_base_url(Some("http://flag:2".to_string()));
        assert_eq!(config.base_url, "http://flag:2");

        let config = Config::default().with_env(|_| Some("  ".to_string()));
        assert_eq!(config.base_url, default_base_url());
    }
}
