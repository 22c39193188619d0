use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use notes_engine::{TrackerSettings, TransportSettings};
use notes_logging::LogDestination;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) const DEFAULT_CONFIG_FILENAME: &str = "notes_cli.ron";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unknown log level {0:?}")]
    LogLevel(String),
}

/// Settings read from the RON config file. Absent fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: Option<u32>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        let transport = TransportSettings::default();
        let tracker = TrackerSettings::default();
        Self {
            base_url: transport.base_url,
            api_prefix: transport.api_prefix,
            poll_interval_ms: millis(tracker.poll_interval),
            max_poll_attempts: tracker.max_poll_attempts,
            connect_timeout_secs: transport.connect_timeout.as_secs(),
            request_timeout_secs: transport.request_timeout.as_secs(),
            log_file: None,
            log_level: "info".to_string(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub(crate) struct Overrides {
    pub base_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub max_poll_attempts: Option<u32>,
    pub log_file: Option<PathBuf>,
}

impl CliConfig {
    /// Loads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(interval) = overrides.poll_interval_ms {
            self.poll_interval_ms = interval;
        }
        if overrides.max_poll_attempts.is_some() {
            self.max_poll_attempts = overrides.max_poll_attempts;
        }
        if overrides.log_file.is_some() {
            self.log_file = overrides.log_file;
        }
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            base_url: self.base_url.clone(),
            api_prefix: self.api_prefix.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(100)),
            max_poll_attempts: self.max_poll_attempts.filter(|max| *max > 0),
        }
    }

    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    /// Where logs go and at which level; the level applies to either destination.
    pub fn log_target(&self) -> Result<(LogDestination, LevelFilter), ConfigError> {
        let level = self.log_level()?;
        let destination = match &self.log_file {
            Some(path) => LogDestination::File(path.clone()),
            None => LogDestination::Terminal,
        };
        Ok((destination, level))
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load(&dir.path().join(DEFAULT_CONFIG_FILENAME)).unwrap();

        assert_eq!(config, CliConfig::default());
        assert_eq!(config.tracker_settings(), TrackerSettings::default());
        assert_eq!(config.transport_settings().base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"(base_url: "http://notes.internal:9000", max_poll_attempts: Some(40))"#
        )
        .unwrap();

        let config = CliConfig::load(file.path()).unwrap();

        assert_eq!(config.base_url, "http://notes.internal:9000");
        assert_eq!(config.max_poll_attempts, Some(40));
        assert_eq!(config.poll_interval_ms, 5000);
        assert_eq!(config.api_prefix, "/api/v1");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "(base_url: 12, ").unwrap();

        let err = CliConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut config = CliConfig {
            max_poll_attempts: Some(10),
            ..CliConfig::default()
        };
        config.apply(Overrides {
            base_url: Some("http://localhost:1234".to_string()),
            poll_interval_ms: Some(250),
            max_poll_attempts: None,
            log_file: Some(PathBuf::from("tracker.log")),
        });

        assert_eq!(config.base_url, "http://localhost:1234");
        assert_eq!(
            config.tracker_settings(),
            TrackerSettings {
                poll_interval: Duration::from_millis(250),
                max_poll_attempts: Some(10),
            }
        );
        assert_eq!(config.log_file, Some(PathBuf::from("tracker.log")));
    }

    #[test]
    fn zero_attempt_cap_means_unlimited() {
        let config = CliConfig {
            max_poll_attempts: Some(0),
            poll_interval_ms: 0,
            ..CliConfig::default()
        };
        let settings = config.tracker_settings();
        assert_eq!(settings.max_poll_attempts, None);
        assert_eq!(settings.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn log_level_is_validated() {
        let mut config = CliConfig::default();
        assert_eq!(config.log_level().unwrap(), LevelFilter::Info);
        config.log_level = "chatty".to_string();
        assert!(matches!(config.log_level(), Err(ConfigError::LogLevel(_))));
    }

    #[test]
    fn configured_level_applies_to_terminal_and_file() {
        let mut config = CliConfig {
            log_level: "debug".to_string(),
            ..CliConfig::default()
        };
        assert_eq!(
            config.log_target().unwrap(),
            (LogDestination::Terminal, LevelFilter::Debug)
        );

        config.log_file = Some(PathBuf::from("tracker.log"));
        assert_eq!(
            config.log_target().unwrap(),
            (
                LogDestination::File(PathBuf::from("tracker.log")),
                LevelFilter::Debug
            )
        );
    }
}
