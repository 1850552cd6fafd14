use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crawlboard_core::Locale;
use crawlboard_engine::{ClientSettings, RECONNECT_BACKOFF};
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

pub const CONFIG_FILENAME: &str = "crawlboard.ron";

/// Startup settings read from `crawlboard.ron`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base: String,
    pub locale: String,
    pub log_destination: LogDestination,
    /// `log` level name such as `debug` or `warn`.
    pub log_level: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8000".to_string(),
            locale: Locale::Persian.tag().to_string(),
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.api_base.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            reconnect_backoff: RECONNECT_BACKOFF,
        }
    }

    /// The configured display locale, if it is one the dashboard supports.
    pub fn locale(&self) -> Option<Locale> {
        Locale::from_tag(&self.locale)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "crawlboard")]
#[command(about = "Terminal dashboard for crawl jobs")]
#[command(version)]
pub struct Cli {
    /// Path to the RON config file
    #[arg(default_value = CONFIG_FILENAME)]
    pub config: PathBuf,
}

/// Reads the config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    ron::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.locale(), Some(Locale::Persian));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(api_base: "http://panel.local:9000", locale: "en-US", log_destination: Both)"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.api_base, "http://panel.local:9000");
        assert_eq!(config.locale(), Some(Locale::English));
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.request_timeout_secs, 30);

        let settings = config.client_settings();
        assert_eq!(settings.connect_timeout, Duration::from_secs(10));
        assert_eq!(settings.reconnect_backoff, RECONNECT_BACKOFF);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "(api_base: 42").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn config_argument_overrides_the_path() {
        let cli = Cli::try_parse_from(["crawlboard", "/etc/crawl.ron"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/crawl.ron"));

        let cli = Cli::try_parse_from(["crawlboard"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILENAME));
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(Cli::try_parse_from(["crawlboard", "--verbose"]).is_err());
        assert!(Cli::try_parse_from(["crawlboard", "a.ron", "b.ron"]).is_err());
    }
}
