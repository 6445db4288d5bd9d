//! Registry and front-end configuration.
//!
//! Loaded from an optional YAML file; every field has a default so an empty
//! or partial file is valid.

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use chrono::TimeDelta;
use serde::Deserialize;

use crate::registry::session_registry::UnknownSessionPolicy;
use crate::session::opponent::{Opponent, RandomOpponent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpponentKind {
    /// Both sides are played through the front end.
    #[default]
    None,
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RegistryConfig {
    pub idle_timeout_secs: u64,
    pub unknown_session: UnknownSessionPolicy,
    pub opponent: OpponentKind,
    pub opponent_seed: Option<u64>,
    pub start_fen: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 30 * 60,
            unknown_session: UnknownSessionPolicy::CreateOnFirstReference,
            opponent: OpponentKind::None,
            opponent_seed: None,
            start_fen: None,
        }
    }
}

impl RegistryConfig {
    /// Reads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Idle timeout as a duration; saturates for absurdly large values.
    pub fn idle_timeout(&self) -> TimeDelta {
        i64::try_from(self.idle_timeout_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }

    /// The configured automated opponent, if any.
    pub fn build_opponent(&self) -> Option<Box<dyn Opponent>> {
        match self.opponent {
            OpponentKind::None => None,
            OpponentKind::Random => Some(Box::new(match self.opponent_seed {
                Some(seed) => RandomOpponent::with_seed(seed),
                None => RandomOpponent::new(),
            })),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: String, source: std::io::Error },
    Parse(serde_yaml::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "failed to read config {path}: {source}"),
            ConfigError::Parse(err) => write!(f, "failed to parse config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(err) => Some(err),
        }
    }
}
