//! Implied Probability Model
//!
//! Convert bookmaker odds triples into normalized outcome probabilities.
//!
//! For a match with odds (h, d, a):
//!     raw = (1/h, 1/d, 1/a)
//!     p   = raw / sum(raw)
//!
//! Normalization removes the bookmaker margin (overround).

use serde::{Deserialize, Serialize};

use crate::core::constants::OUTCOME_COUNT;
use crate::models::Outcome;

/// Home/draw/away probability triple for one match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probability {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl Probability {
    /// Implied probability of an odds triple
    ///
    /// Odds must be finite and positive; rounds are validated at load time.
    pub fn from_odds(odds: &[f64; OUTCOME_COUNT]) -> Self {
        let raw = [1.0 / odds[0], 1.0 / odds[1], 1.0 / odds[2]];
        let total: f64 = raw.iter().sum();
        Self {
            home: raw[0] / total,
            draw: raw[1] / total,
            away: raw[2] / total,
        }
    }

    /// Normalize non-negative weights into a probability triple
    ///
    /// Returns `None` when the weights cannot be normalized (negative
    /// component, non-finite or non-positive sum).
    pub fn normalized(weights: [f64; OUTCOME_COUNT]) -> Option<Self> {
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return None;
        }
        let total: f64 = weights.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return None;
        }
        Some(Self {
            home: weights[0] / total,
            draw: weights[1] / total,
            away: weights[2] / total,
        })
    }

    /// Uniform 1/3 triple
    pub fn uniform() -> Self {
        Self {
            home: 1.0 / 3.0,
            draw: 1.0 / 3.0,
            away: 1.0 / 3.0,
        }
    }

    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    pub fn as_array(&self) -> [f64; OUTCOME_COUNT] {
        [self.home, self.draw, self.away]
    }

    /// Most likely outcome, ties resolved in home, draw, away order
    pub fn favorite(&self) -> Outcome {
        favorite_of(&self.as_array())
    }

    /// Highest component
    pub fn max(&self) -> f64 {
        self.home.max(self.draw).max(self.away)
    }

    /// Component sum (1.0 within floating tolerance)
    pub fn total(&self) -> f64 {
        self.home + self.draw + self.away
    }
}

/// Argmax over a weight triple with home, draw, away tie order
pub fn favorite_of(weights: &[f64; OUTCOME_COUNT]) -> Outcome {
    let mut best = 0;
    for i in 1..OUTCOME_COUNT {
        if weights[i] > weights[best] {
            best = i;
        }
    }
    Outcome::ALL[best]
}

/// Implied probabilities for every match of an odds sequence
///
/// The sequence is grouped as [home, draw, away] per match. A trailing
/// partial triple is ignored; validated rounds never have one.
pub fn implied_probabilities(odds: &[f64]) -> Vec<Probability> {
    odds.chunks_exact(OUTCOME_COUNT)
        .map(|c| Probability::from_odds(&[c[0], c[1], c[2]]))
        .collect()
}
