//! Run configuration
//!
//! `EngineConfig` describes one backtest run and `SweepSpec` a grid search.
//! Both load from TOML and fall back to defaults for missing fields.
//!
//! ```toml
//! rounds_dir = "data/rounds"
//!
//! [backtest]
//! grid_policy = "confidence"
//!
//! [backtest.generator]
//! target_count = 50
//!
//! [strategy]
//! kind = "linear"
//! draw_boost = 1.1
//! ```

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backtesting::simulator::BacktestConfig;
use crate::error::{EngineError, Result};
use crate::optimizer::{GridSearch, ParameterAxis, ParameterSpace, SearchConfig};
use crate::strategy::Strategy;

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| EngineError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Backtest run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory of round JSON files
    pub rounds_dir: Option<PathBuf>,
    /// Directory of team history JSON files
    pub teams_dir: Option<PathBuf>,
    pub backtest: BacktestConfig,
    pub strategy: Strategy,
}

impl EngineConfig {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = read_toml(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Date window bounds must be `YYYY-MM-DD` dates with start <= end
    pub fn validate(&self) -> Result<()> {
        let start = parse_bound("start_date", self.backtest.start_date.as_deref())?;
        let end = parse_bound("end_date", self.backtest.end_date.as_deref())?;
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(EngineError::InvalidConfig(format!(
                    "start_date {} is after end_date {}",
                    start, end
                )));
            }
        }
        Ok(())
    }
}

fn parse_bound(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|date| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                EngineError::InvalidConfig(format!("{} '{}' is not a YYYY-MM-DD date", field, date))
            })
        })
        .transpose()
}

/// Grid search specification
///
/// ```toml
/// [strategy]
/// kind = "draw_bias"
///
/// [[axes]]
/// name = "draw_factor"
/// values = [0.8, 0.85, 0.9, 0.95]
///
/// [search]
/// top_k = 5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSpec {
    pub strategy: Strategy,
    pub axes: Vec<ParameterAxis>,
    pub search: SearchConfig,
}

impl SweepSpec {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_toml(path.as_ref())
    }

    pub fn space(&self) -> ParameterSpace {
        ParameterSpace::new(self.axes.clone())
    }

    pub fn into_search(self) -> GridSearch {
        let space = ParameterSpace::new(self.axes);
        GridSearch::new(self.strategy, space, self.search)
    }
}
