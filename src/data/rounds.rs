//! Round record loading
//!
//! One JSON file per historical date:
//!
//! ```json
//! {
//!   "odds": [2.10, 3.20, 3.60, ...],
//!   "result": ["0", "2", "1", ...],
//!   "teams": [{"home": "Alpha", "away": "Beta"}, ...]
//! }
//! ```
//!
//! The date comes from a `YYYY-MM-DD` pattern in the file name, falling back
//! to the file stem.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::error::{EngineError, Result};
use crate::models::{Round, TeamPair};

/// Result code as it appears in source files ("0" or 0)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultCode {
    Text(String),
    Number(i64),
}

impl ResultCode {
    fn into_code(self) -> String {
        match self {
            ResultCode::Text(s) => s,
            ResultCode::Number(n) => n.to_string(),
        }
    }
}

/// Raw round record before date extraction and validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub odds: Vec<f64>,
    #[serde(default)]
    pub result: Option<Vec<ResultCode>>,
    #[serde(default)]
    pub teams: Option<Vec<TeamPair>>,
}

impl RoundRecord {
    /// Convert into a validated round
    pub fn into_round(self, identifier: &str) -> Result<Round> {
        let round = Round {
            date: extract_date(identifier),
            odds: self.odds,
            result: self
                .result
                .map(|codes| codes.into_iter().map(ResultCode::into_code).collect()),
            teams: self.teams,
        };
        round.validate()?;
        Ok(round)
    }
}

/// Extract a `YYYY-MM-DD` date from a source identifier
///
/// First pattern match wins, even when it is not a calendar date. Falls back
/// to the identifier itself when nothing matches.
pub fn extract_date(identifier: &str) -> String {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    let re = DATE_RE.get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid date pattern"));

    re.find(identifier)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| identifier.to_string())
}

/// Loaded rounds sorted by date, indexed for O(1) lookup
#[derive(Debug, Clone, Default)]
pub struct RoundDataset {
    rounds: Vec<Round>,
    by_date: HashMap<String, usize>,
}

impl RoundDataset {
    /// Build from already validated rounds
    ///
    /// A later round with the same date replaces the earlier one.
    pub fn new(rounds: Vec<Round>) -> Self {
        let mut unique: HashMap<String, Round> = HashMap::new();
        for round in rounds {
            unique.insert(round.date.clone(), round);
        }
        let mut rounds: Vec<Round> = unique.into_values().collect();
        rounds.sort_by(|a, b| a.date.cmp(&b.date));

        let by_date = rounds
            .iter()
            .enumerate()
            .map(|(i, r)| (r.date.clone(), i))
            .collect();

        Self { rounds, by_date }
    }

    /// Get a round by date - O(1)
    pub fn get(&self, date: &str) -> Option<&Round> {
        self.by_date.get(date).map(|&i| &self.rounds[i])
    }

    /// Iterate rounds in date order
    pub fn iter(&self) -> impl Iterator<Item = &Round> {
        self.rounds.iter()
    }

    pub fn settled(&self) -> impl Iterator<Item = &Round> {
        self.rounds.iter().filter(|r| r.is_settled())
    }

    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.rounds.iter().map(|r| r.date.as_str())
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

/// Parse one round file
pub fn load_round_file<P: AsRef<Path>>(path: P) -> Result<Round> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let record: RoundRecord = serde_json::from_str(&content).map_err(|source| EngineError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let identifier = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    record.into_round(&identifier)
}

/// Load every `*.json` round in a directory
///
/// All-or-nothing: the first unreadable, malformed or invalid file aborts
/// the load.
pub fn load_rounds_dir<P: AsRef<Path>>(dir: P) -> Result<RoundDataset> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|source| EngineError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<_> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut rounds = Vec::with_capacity(paths.len());
    for path in &paths {
        let round = load_round_file(path)?;
        debug!("Loaded round {} ({} matches)", round.date, round.match_count());
        rounds.push(round);
    }

    let dataset = RoundDataset::new(rounds);
    info!(
        "Loaded {} rounds ({} settled) from {:?}",
        dataset.len(),
        dataset.settled().count(),
        dir
    );
    Ok(dataset)
}
