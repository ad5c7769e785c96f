//! Bet-set generator
//!
//! Emits the favorite bet first, then samples candidate bets by inverse-CDF
//! over each position's adjusted probability until the target count of
//! distinct bets is reached or the attempt budget runs out.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::core::constants::{DEFAULT_ATTEMPT_MULTIPLIER, DEFAULT_TARGET_BETS, GRID_SIZE};
use crate::core::grid::GridSelection;
use crate::core::probability::Probability;
use crate::core::rng::{DrawStreams, SeededStream};
use crate::models::{Bet, BetSet, Outcome};

/// Forced upsets: sample among the non-favorite outcomes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpsetConfig {
    /// Chance per position of forcing an upset
    pub probability: f64,
    pub max_per_bet: usize,
}

impl Default for UpsetConfig {
    fn default() -> Self {
        Self {
            probability: 0.15,
            max_per_bet: 2,
        }
    }
}

/// Generator configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub target_count: usize,
    /// Attempt budget = target_count × attempt_multiplier
    pub attempt_multiplier: usize,
    pub upsets: Option<UpsetConfig>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_BETS,
            attempt_multiplier: DEFAULT_ATTEMPT_MULTIPLIER,
            upsets: None,
        }
    }
}

impl GeneratorConfig {
    pub fn attempt_budget(&self) -> usize {
        self.target_count.saturating_mul(self.attempt_multiplier)
    }
}

/// Bet-set generator
#[derive(Debug, Clone, Copy, Default)]
pub struct BetSetGenerator {
    pub config: GeneratorConfig,
}

impl BetSetGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Favorite bet: argmax per position, ties in home, draw, away order
    pub fn favorite_bet(probabilities: &[Probability; GRID_SIZE]) -> Bet {
        let mut picks = [Outcome::Home; GRID_SIZE];
        for (pick, p) in picks.iter_mut().zip(probabilities) {
            *pick = p.favorite();
        }
        Bet::new(picks)
    }

    /// Generate a de-duplicated bet set for one round
    ///
    /// # Arguments
    /// * `date` - Round date the bet set belongs to
    /// * `grid` - Grid selection the probabilities were computed from
    /// * `probabilities` - Adjusted probability per grid position
    /// * `streams` - Seeded streams for this round
    pub fn generate(
        &self,
        date: &str,
        grid: GridSelection,
        probabilities: &[Probability; GRID_SIZE],
        streams: &mut DrawStreams,
    ) -> BetSet {
        let target = self.config.target_count;
        let mut bets = Vec::with_capacity(target);
        let mut seen: HashSet<Bet> = HashSet::with_capacity(target);

        if target > 0 {
            let favorite = Self::favorite_bet(probabilities);
            seen.insert(favorite);
            bets.push(favorite);
        }

        let budget = self.config.attempt_budget();
        let mut attempts = 0usize;
        while bets.len() < target && attempts < budget {
            attempts += 1;
            let candidate = self.sample_bet(probabilities, streams);
            if seen.insert(candidate) {
                bets.push(candidate);
            }
        }

        let set = BetSet {
            date: date.to_string(),
            grid,
            bets,
            target,
        };
        if set.is_underfilled() {
            debug!(
                "Round {}: {} of {} bets after {} attempts",
                date,
                set.len(),
                target,
                attempts
            );
        }
        set
    }

    fn sample_bet(
        &self,
        probabilities: &[Probability; GRID_SIZE],
        streams: &mut DrawStreams,
    ) -> Bet {
        let mut picks = [Outcome::Home; GRID_SIZE];
        let mut upsets = 0usize;

        for (pick, p) in picks.iter_mut().zip(probabilities) {
            let forced = match self.config.upsets {
                Some(upset) if upsets < upset.max_per_bet => {
                    streams.upset.next_f64() < upset.probability
                }
                _ => false,
            };

            *pick = match forced.then(|| sample_upset(p, &mut streams.outcome)).flatten() {
                Some(outcome) => {
                    upsets += 1;
                    outcome
                }
                None => sample_outcome(p, streams.outcome.next_f64()),
            };
        }

        Bet::new(picks)
    }
}

/// Inverse-CDF pick for a uniform draw `r`
pub fn sample_outcome(p: &Probability, r: f64) -> Outcome {
    if r < p.home {
        Outcome::Home
    } else if r < p.home + p.draw {
        Outcome::Draw
    } else {
        Outcome::Away
    }
}

/// Sample among the two non-favorite outcomes, renormalized
///
/// Returns `None` when the non-favorite outcomes carry no probability mass.
fn sample_upset(p: &Probability, rng: &mut SeededStream) -> Option<Outcome> {
    let favorite = p.favorite();
    let others: Vec<Outcome> = Outcome::ALL.into_iter().filter(|&o| o != favorite).collect();
    let mass: f64 = others.iter().map(|&o| p.get(o)).sum();
    if mass <= 0.0 {
        return None;
    }
    let r = rng.next_f64();
    if r < p.get(others[0]) / mass {
        Some(others[0])
    } else {
        Some(others[1])
    }
}
