//! Team History Index
//!
//! Provides O(1) lookup of a team's past results for computing form signals
//! used by the team-aware strategies.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{EngineError, Result};

/// Number of recent matches used for recency-weighted and venue form
const FORM_WINDOW: usize = 10;

/// Matches per half when comparing recent vs prior form
const MOMENTUM_WINDOW: usize = 5;

/// Number of matches used for the draw rate, and the most `TeamForm::matches` can report
pub const DRAW_RATE_WINDOW: usize = 20;

/// Minimum-history requirement capped at what a form lookup can report
pub fn capped_min_matches(value: f64) -> usize {
    (value.max(0.0).round() as usize).min(DRAW_RATE_WINDOW)
}

/// Weight multiplier per step back in time
const RECENCY_DECAY: f64 = 0.85;

/// Single-match result from the team's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "L")]
    Loss,
}

/// Single historical match entry for a team
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMatch {
    pub date: String,
    pub opponent: String,
    pub is_home: bool,
    pub result: MatchResult,
    #[serde(default)]
    pub goals_for: u32,
    #[serde(default)]
    pub goals_against: u32,
}

/// Team history file content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamHistoryRecord {
    /// Display name; the file stem is used when absent
    #[serde(default)]
    pub team: Option<String>,
    pub matches: Vec<TeamMatch>,
}

/// Current run of identical results
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Streak {
    pub kind: MatchResult,
    pub length: usize,
}

/// Form signals for one team as of a date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamForm {
    /// Matches available before the as-of date, at most `DRAW_RATE_WINDOW`
    pub matches: usize,
    pub weighted_win_rate: f64,
    pub home_win_rate: f64,
    pub away_win_rate: f64,
    /// Recent-half win rate minus prior-half win rate
    pub momentum: f64,
    pub streak: Streak,
    pub draw_rate: f64,
}

impl TeamForm {
    /// Win rate at the given venue
    pub fn venue_win_rate(&self, is_home: bool) -> f64 {
        if is_home {
            self.home_win_rate
        } else {
            self.away_win_rate
        }
    }
}

/// Normalize a team name into its lookup key
///
/// Lowercases, strips punctuation, and joins words with single hyphens:
/// "F.C. Porto" -> "fc-porto".
pub fn normalize_team_name(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut pending_sep = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !key.is_empty() {
                key.push('-');
            }
            pending_sep = false;
            key.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_sep = true;
        }
    }

    key
}

/// Team histories indexed by normalized team name
#[derive(Debug, Default)]
pub struct TeamHistoryIndex {
    /// team key -> matches sorted by date descending
    history: HashMap<String, Vec<TeamMatch>>,
}

impl TeamHistoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) one team's history
    pub fn insert(&mut self, team: &str, mut matches: Vec<TeamMatch>) {
        // Most recent first
        matches.sort_by(|a, b| b.date.cmp(&a.date));
        self.history.insert(normalize_team_name(team), matches);
    }

    /// Matches strictly before a date, most recent first
    pub fn matches_before(
        &self,
        team_key: &str,
        before_date: &str,
        limit: usize,
    ) -> Vec<&TeamMatch> {
        self.history
            .get(team_key)
            .map(|matches| {
                matches
                    .iter()
                    .filter(|m| m.date.as_str() < before_date)
                    .take(limit)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Compute form signals for a team before a date
    ///
    /// Returns `None` when the team is unknown or has no prior match.
    pub fn form_before(&self, team_key: &str, before_date: &str) -> Option<TeamForm> {
        let recent = self.matches_before(team_key, before_date, DRAW_RATE_WINDOW);
        if recent.is_empty() {
            return None;
        }

        let window = &recent[..recent.len().min(FORM_WINDOW)];

        // Recency-weighted win rate
        let mut weight_sum = 0.0;
        let mut weighted_wins = 0.0;
        let mut weight = 1.0;
        for m in window {
            weight_sum += weight;
            if m.result == MatchResult::Win {
                weighted_wins += weight;
            }
            weight *= RECENCY_DECAY;
        }
        let weighted_win_rate = weighted_wins / weight_sum;
        let overall_win_rate = win_rate(window.iter().copied());

        let home_win_rate = venue_rate(window, true).unwrap_or(overall_win_rate);
        let away_win_rate = venue_rate(window, false).unwrap_or(overall_win_rate);

        let momentum = if window.len() >= 2 * MOMENTUM_WINDOW {
            win_rate(window[..MOMENTUM_WINDOW].iter().copied())
                - win_rate(window[MOMENTUM_WINDOW..2 * MOMENTUM_WINDOW].iter().copied())
        } else {
            0.0
        };

        let kind = recent[0].result;
        let length = recent.iter().take_while(|m| m.result == kind).count();

        let draws = recent.iter().filter(|m| m.result == MatchResult::Draw).count();
        let draw_rate = draws as f64 / recent.len() as f64;

        Some(TeamForm {
            matches: recent.len(),
            weighted_win_rate,
            home_win_rate,
            away_win_rate,
            momentum,
            streak: Streak { kind, length },
            draw_rate,
        })
    }

    /// Number of teams in the index
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

fn win_rate<'a>(matches: impl Iterator<Item = &'a TeamMatch>) -> f64 {
    let mut total = 0usize;
    let mut wins = 0usize;
    for m in matches {
        total += 1;
        if m.result == MatchResult::Win {
            wins += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64
    }
}

fn venue_rate(window: &[&TeamMatch], is_home: bool) -> Option<f64> {
    let mut at_venue = window.iter().copied().filter(|m| m.is_home == is_home).peekable();
    at_venue.peek()?;
    Some(win_rate(at_venue))
}

/// Memoizing form lookup keyed by (team key, as-of date)
///
/// Built once from the loaded histories and shared read-only across trials;
/// the cache is safe to fill from several threads.
#[derive(Debug)]
pub struct TeamFormLookup {
    index: TeamHistoryIndex,
    cache: DashMap<(String, String), Option<TeamForm>>,
}

impl TeamFormLookup {
    pub fn new(index: TeamHistoryIndex) -> Self {
        Self {
            index,
            cache: DashMap::new(),
        }
    }

    /// Form of a team (display name) before a date
    pub fn form(&self, team_name: &str, as_of: &str) -> Option<TeamForm> {
        let key = (normalize_team_name(team_name), as_of.to_string());
        if let Some(hit) = self.cache.get(&key) {
            return *hit;
        }
        let form = self.index.form_before(&key.0, as_of);
        self.cache.insert(key, form);
        form
    }

    pub fn index(&self) -> &TeamHistoryIndex {
        &self.index
    }

    /// Number of memoized (team, date) entries
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

/// Load every `*.json` team history in a directory
///
/// Any unreadable or malformed file aborts the load.
pub fn load_team_histories<P: AsRef<Path>>(dir: P) -> Result<TeamHistoryIndex> {
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

    let mut index = TeamHistoryIndex::new();
    for path in paths {
        let content = fs::read_to_string(&path).map_err(|source| EngineError::Io {
            path: path.clone(),
            source,
        })?;
        let record: TeamHistoryRecord =
            serde_json::from_str(&content).map_err(|source| EngineError::Json {
                path: path.clone(),
                source,
            })?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let name = record.team.unwrap_or(stem);
        index.insert(&name, record.matches);
    }

    info!("Loaded history for {} teams from {:?}", index.len(), dir);
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(date: &str, is_home: bool, result: MatchResult) -> TeamMatch {
        TeamMatch {
            date: date.to_string(),
            opponent: "rival".to_string(),
            is_home,
            result,
            goals_for: 0,
            goals_against: 0,
        }
    }

    fn sample_index() -> TeamHistoryIndex {
        use MatchResult::*;
        let mut index = TeamHistoryIndex::new();
        index.insert(
            "Real Club",
            vec![
                m("2024-01-01", true, Loss),
                m("2024-01-08", false, Loss),
                m("2024-01-15", true, Draw),
                m("2024-01-22", false, Loss),
                m("2024-01-29", true, Loss),
                m("2024-02-05", true, Win),
                m("2024-02-12", false, Win),
                m("2024-02-19", true, Draw),
                m("2024-02-26", false, Win),
                m("2024-03-04", true, Win),
                m("2024-03-11", true, Win),
            ],
        );
        index
    }

    #[test]
    fn test_normalize_team_name() {
        assert_eq!(normalize_team_name("F.C. Porto"), "fc-porto");
        assert_eq!(normalize_team_name("  Real   Madrid "), "real-madrid");
        assert_eq!(normalize_team_name("Inter_Milan"), "inter-milan");
        assert_eq!(normalize_team_name("St. Pauli-Hamburg"), "st-pauli-hamburg");
    }

    #[test]
    fn test_unknown_team_has_no_form() {
        let index = sample_index();
        assert!(index.form_before("nobody", "2024-05-01").is_none());
    }

    #[test]
    fn test_only_prior_matches_count() {
        let index = sample_index();
        assert!(index.form_before("real-club", "2024-01-01").is_none());
        let form = index.form_before("real-club", "2024-01-10").unwrap();
        assert_eq!(form.matches, 2);
        assert_eq!(form.streak.kind, MatchResult::Loss);
        assert_eq!(form.streak.length, 2);
    }

    #[test]
    fn test_form_signals() {
        let index = sample_index();
        let form = index.form_before("real-club", "2024-04-01").unwrap();

        assert_eq!(form.matches, 11);
        assert_eq!(form.streak.kind, MatchResult::Win);
        assert_eq!(form.streak.length, 3);
        // latest 5: W W W D W = 0.8; prior 5: W L L D L = 0.2
        assert!((form.momentum - 0.6).abs() < 1e-9);
        assert!((form.draw_rate - 2.0 / 11.0).abs() < 1e-9);
        assert!(form.weighted_win_rate > 0.5);
        assert!(form.home_win_rate > 0.0 && form.away_win_rate > 0.0);
    }

    #[test]
    fn test_match_count_capped_at_window() {
        let long: Vec<TeamMatch> = (1..=28)
            .map(|day| m(&format!("2024-02-{:02}", day), day % 2 == 0, MatchResult::Draw))
            .collect();
        let mut index = TeamHistoryIndex::new();
        index.insert("Veterans", long);
        let form = index.form_before("veterans", "2024-03-01").unwrap();
        assert_eq!(form.matches, DRAW_RATE_WINDOW);

        assert_eq!(capped_min_matches(30.0), DRAW_RATE_WINDOW);
        assert_eq!(capped_min_matches(4.6), 5);
        assert_eq!(capped_min_matches(-2.0), 0);
    }

    #[test]
    fn test_lookup_memoizes() {
        let lookup = TeamFormLookup::new(sample_index());
        let a = lookup.form("Real Club", "2024-04-01");
        let b = lookup.form("real club", "2024-04-01");
        assert_eq!(a, b);
        assert_eq!(lookup.cached_entries(), 1);

        assert!(lookup.form("Unknown FC", "2024-04-01").is_none());
        assert_eq!(lookup.cached_entries(), 2);
    }

    #[test]
    fn test_team_match_json_fields() {
        let json = r#"{"date":"2024-01-01","opponent":"x","isHome":true,
            "result":"W","goalsFor":2,"goalsAgainst":1}"#;
        let parsed: TeamMatch = serde_json::from_str(json).unwrap();
        assert!(parsed.is_home);
        assert_eq!(parsed.result, MatchResult::Win);
        assert_eq!(parsed.goals_for, 2);
    }
}
