use serde::{Deserialize, Serialize};

use crate::core::constants::{GRID_SIZE, OUTCOME_COUNT};
use crate::core::grid::GridSelection;
use crate::error::{
    validate_match_count, validate_odds_length, validate_odds_value, EngineError, Result,
};

/// Match outcome in fixed home, draw, away order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    pub const ALL: [Outcome; OUTCOME_COUNT] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    /// Map a result code: "0" home, "1" draw, anything else away
    pub fn from_result_code(code: &str) -> Self {
        match code.trim() {
            "0" => Outcome::Home,
            "1" => Outcome::Draw,
            _ => Outcome::Away,
        }
    }

    /// Single-character code used in bet keys
    pub fn code(&self) -> char {
        match self {
            Outcome::Home => '0',
            Outcome::Draw => '1',
            Outcome::Away => '2',
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Outcome::Home => 0,
            Outcome::Draw => 1,
            Outcome::Away => 2,
        }
    }
}

/// Home and away team names of one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamPair {
    pub home: String,
    pub away: String,
}

/// One historical betting date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub date: String,
    /// [home, draw, away] per match
    pub odds: Vec<f64>,
    /// One result code per match, present once settled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<TeamPair>>,
}

impl Round {
    pub fn match_count(&self) -> usize {
        self.odds.len() / OUTCOME_COUNT
    }

    /// Odds triple of a match
    pub fn match_odds(&self, index: usize) -> [f64; OUTCOME_COUNT] {
        let base = index * OUTCOME_COUNT;
        [self.odds[base], self.odds[base + 1], self.odds[base + 2]]
    }

    /// Odd of a specific outcome of a match
    pub fn outcome_odds(&self, index: usize, outcome: Outcome) -> f64 {
        self.odds[index * OUTCOME_COUNT + outcome.index()]
    }

    pub fn is_settled(&self) -> bool {
        self.result.is_some()
    }

    /// Actual outcome of a match, if the round is settled
    pub fn actual_outcome(&self, index: usize) -> Option<Outcome> {
        self.result
            .as_ref()
            .and_then(|codes| codes.get(index))
            .map(|code| Outcome::from_result_code(code))
    }

    pub fn teams_at(&self, index: usize) -> Option<&TeamPair> {
        self.teams.as_ref().and_then(|t| t.get(index))
    }

    /// Check the structural invariants the engine relies on
    pub fn validate(&self) -> Result<()> {
        validate_odds_length(&self.date, self.odds.len())?;
        for (position, &value) in self.odds.iter().enumerate() {
            validate_odds_value(&self.date, position, value)?;
        }
        let matches = self.match_count();
        validate_match_count(&self.date, matches)?;

        if let Some(result) = &self.result {
            if result.len() != matches {
                return Err(EngineError::InvalidRound {
                    date: self.date.clone(),
                    reason: format!("{} result codes for {} matches", result.len(), matches),
                });
            }
        }
        if let Some(teams) = &self.teams {
            if teams.len() != matches {
                return Err(EngineError::InvalidRound {
                    date: self.date.clone(),
                    reason: format!("{} team pairs for {} matches", teams.len(), matches),
                });
            }
        }
        Ok(())
    }
}

/// Full 9-position prediction vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bet {
    pub picks: [Outcome; GRID_SIZE],
}

impl Bet {
    pub fn new(picks: [Outcome; GRID_SIZE]) -> Self {
        Self { picks }
    }

    /// Identity key: the joined outcome codes
    pub fn key(&self) -> String {
        self.picks.iter().map(Outcome::code).collect()
    }
}

/// De-duplicated bets generated for one round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetSet {
    pub date: String,
    pub grid: GridSelection,
    pub bets: Vec<Bet>,
    /// Requested number of bets
    pub target: usize,
}

impl BetSet {
    pub fn len(&self) -> usize {
        self.bets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    /// Attempt budget ran out before reaching the target
    pub fn is_underfilled(&self) -> bool {
        self.bets.len() < self.target
    }
}
