use std::path::PathBuf;
use thiserror::Error;

use crate::core::constants::{GRID_SIZE, OUTCOME_COUNT};

/// Engine error types
#[derive(Debug, Error)]
pub enum EngineError {
    /// Round record failed structural validation
    #[error("Invalid round {date}: {reason}")]
    InvalidRound { date: String, reason: String },

    /// Odds value that would make the probability model divide by zero
    #[error("Invalid odds in round {date} at position {position}: {value}")]
    InvalidOdds {
        date: String,
        position: usize,
        value: f64,
    },

    /// Round has fewer matches than the grid needs
    #[error("Round {date} has {available} matches, grid needs {required}")]
    NotEnoughMatches {
        date: String,
        available: usize,
        required: usize,
    },

    #[error("Unknown parameter '{name}' for strategy '{strategy}'")]
    UnknownParameter { strategy: String, name: String },

    /// Run or sweep configuration that cannot be used as given
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Parameter space is empty: {0}")]
    EmptySearchSpace(String),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse TOML in {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Validation functions
pub fn validate_odds_value(date: &str, position: usize, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EngineError::InvalidOdds {
            date: date.to_string(),
            position,
            value,
        });
    }
    Ok(())
}

pub fn validate_odds_length(date: &str, len: usize) -> Result<()> {
    if len == 0 || len % OUTCOME_COUNT != 0 {
        return Err(EngineError::InvalidRound {
            date: date.to_string(),
            reason: format!("odds length {} is not a positive multiple of 3", len),
        });
    }
    Ok(())
}

pub fn validate_match_count(date: &str, available: usize) -> Result<()> {
    if available < GRID_SIZE {
        return Err(EngineError::NotEnoughMatches {
            date: date.to_string(),
            available,
            required: GRID_SIZE,
        });
    }
    Ok(())
}
