use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::state::DEFAULT_TRANSCRIPT_CAPACITY;

pub const ENV_SENTINEL_CONFIG: &str = "SENTINEL_CONFIG";

const DEFAULT_DISPATCH_MS: u64 = 300;
const DEFAULT_HANDOFF_MS: u64 = 500;
const DEFAULT_SUBAGENT_MS: u64 = 800;
const DEFAULT_CLI_MS: u64 = 300;
const DEFAULT_CHECK_INTERVAL_MS: u64 = 30_000;
const DEFAULT_LOSS_PROBABILITY: f64 = 0.05;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub timing: TimingConfig,
    pub connection: ConnectionConfig,
    pub chat: ChatConfig,
}

/// Simulated latencies for the response chains, in milliseconds.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    pub dispatch_ms: u64,
    pub handoff_ms: u64,
    pub subagent_ms: u64,
    pub cli_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            dispatch_ms: DEFAULT_DISPATCH_MS,
            handoff_ms: DEFAULT_HANDOFF_MS,
            subagent_ms: DEFAULT_SUBAGENT_MS,
            cli_ms: DEFAULT_CLI_MS,
        }
    }
}

impl TimingConfig {
    pub fn branch_offset(&self) -> u64 {
        self.dispatch_ms.saturating_add(self.handoff_ms)
    }

    pub fn payload_offset(&self) -> u64 {
        self.branch_offset().saturating_add(self.subagent_ms)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ConnectionConfig {
    pub check_interval_ms: u64,
    pub loss_probability: f64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: DEFAULT_CHECK_INTERVAL_MS,
            loss_probability: DEFAULT_LOSS_PROBABILITY,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ChatConfig {
    pub start_open: bool,
    pub transcript_capacity: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            start_open: true,
            transcript_capacity: DEFAULT_TRANSCRIPT_CAPACITY,
        }
    }
}

impl Config {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.connection.loss_probability) {
            return Err(ConfigError::Invalid(format!(
                "connection.loss_probability must be within 0..=1, got {}",
                self.connection.loss_probability
            )));
        }
        if self.connection.check_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "connection.check_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.chat.transcript_capacity == 0 {
            return Err(ConfigError::Invalid(
                "chat.transcript_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.timing.dispatch_ms, 300);
        assert_eq!(config.timing.branch_offset(), 800);
        assert_eq!(config.timing.payload_offset(), 1_600);
        assert_eq!(config.connection.check_interval_ms, 30_000);
        assert!(config.chat.start_open, "console opens with the chat panel visible");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = Config::from_toml_str(
            r#"
            [timing]
            subagent_ms = 50

            [connection]
            loss_probability = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.timing.subagent_ms, 50);
        assert_eq!(config.timing.handoff_ms, 500);
        assert_eq!(config.connection.loss_probability, 0.5);
        assert_eq!(config.connection.check_interval_ms, 30_000);
    }

    #[test]
    fn probability_out_of_range_is_rejected() {
        let err = Config::from_toml_str("[connection]\nloss_probability = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = Config::from_toml_str("[connection]\ncheck_interval_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("check_interval_ms"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::from_toml_str("[timing\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file_and_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config, Config::default());

        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[chat]\nstart_open = false").unwrap();
        let config = Config::load_or_default(&path).unwrap();
        assert!(!config.chat.start_open);

        let err = Config::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
