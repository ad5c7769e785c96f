//! Grid and Line Combinatorics
//!
//! The grid is 9 positions laid out as three columns:
//!
//! ```text
//!   0 1 2
//!   3 4 5
//!   6 7 8
//! ```
//!
//! A line takes one position from each column group {0,3,6} × {1,4,7} × {2,5,8},
//! which gives 27 lines. Each line is scored independently.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::core::constants::{GRID_SIZE, LINE_COUNT};
use crate::core::probability::{implied_probabilities, Probability};
use crate::error::{validate_match_count, Result};
use crate::models::Round;

/// Column groups the lines are drawn from
const POSITION_GROUPS: [[usize; 3]; 3] = [[0, 3, 6], [1, 4, 7], [2, 5, 8]];

/// One scoring line: three grid positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line(pub [usize; 3]);

impl Line {
    pub fn positions(&self) -> &[usize; 3] {
        &self.0
    }
}

/// The 27 fixed lines, built once per process
pub fn lines() -> &'static [Line; LINE_COUNT] {
    static LINES: OnceLock<[Line; LINE_COUNT]> = OnceLock::new();
    LINES.get_or_init(|| {
        let mut out = [Line([0, 0, 0]); LINE_COUNT];
        let mut n = 0;
        for &a in &POSITION_GROUPS[0] {
            for &b in &POSITION_GROUPS[1] {
                for &c in &POSITION_GROUPS[2] {
                    out[n] = Line([a, b, c]);
                    n += 1;
                }
            }
        }
        out
    })
}

/// Policy for choosing which matches occupy the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridPolicy {
    /// First 9 matches in original order
    #[default]
    Fixed,
    /// 9 matches with the highest max-probability, stable on ties
    Confidence,
}

impl GridPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            GridPolicy::Fixed => "fixed",
            GridPolicy::Confidence => "confidence",
        }
    }
}

/// Match indices placed on the grid, together with the policy that chose them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSelection {
    pub policy: GridPolicy,
    /// indices[position] = match index within the round
    pub indices: [usize; GRID_SIZE],
}

impl GridSelection {
    /// Select the grid from precomputed per-match probabilities
    pub fn from_probabilities(
        date: &str,
        probabilities: &[Probability],
        policy: GridPolicy,
    ) -> Result<Self> {
        validate_match_count(date, probabilities.len())?;

        let mut indices = [0usize; GRID_SIZE];
        match policy {
            GridPolicy::Fixed => {
                for (pos, slot) in indices.iter_mut().enumerate() {
                    *slot = pos;
                }
            }
            GridPolicy::Confidence => {
                let mut order: Vec<usize> = (0..probabilities.len()).collect();
                // sort_by is stable: equal confidence keeps original index order
                order.sort_by(|&a, &b| probabilities[b].max().total_cmp(&probabilities[a].max()));
                indices.copy_from_slice(&order[..GRID_SIZE]);
            }
        }

        Ok(Self { policy, indices })
    }

    /// Match index at a grid position
    pub fn match_index(&self, position: usize) -> usize {
        self.indices[position]
    }
}

/// Select the grid for a round under the given policy
pub fn select_grid(round: &Round, policy: GridPolicy) -> Result<GridSelection> {
    let probabilities = implied_probabilities(&round.odds);
    GridSelection::from_probabilities(&round.date, &probabilities, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn round_with_odds(odds: Vec<f64>) -> Round {
        Round {
            date: "2024-03-02".to_string(),
            odds,
            result: None,
            teams: None,
        }
    }

    #[test]
    fn test_exactly_27_distinct_lines() {
        let all = lines();
        assert_eq!(all.len(), 27);
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), 27);
    }

    #[test]
    fn test_lines_take_one_position_per_group() {
        for line in lines() {
            let [a, b, c] = *line.positions();
            assert!(POSITION_GROUPS[0].contains(&a));
            assert!(POSITION_GROUPS[1].contains(&b));
            assert!(POSITION_GROUPS[2].contains(&c));
        }
        assert_eq!(lines()[0], Line([0, 1, 2]));
        assert_eq!(lines()[26], Line([6, 7, 8]));
    }

    #[test]
    fn test_fixed_policy_first_nine() {
        let round = round_with_odds(vec![2.0; 36]);
        let grid = select_grid(&round, GridPolicy::Fixed).unwrap();
        assert_eq!(grid.indices, [0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(grid.policy, GridPolicy::Fixed);
    }

    #[test]
    fn test_confidence_policy_orders_by_max_probability() {
        // 10 matches; match 9 is the strongest favorite, match 0 is even
        let mut odds = vec![2.9, 3.0, 3.1];
        for _ in 1..9 {
            odds.extend_from_slice(&[2.0, 3.4, 4.0]);
        }
        odds.extend_from_slice(&[1.1, 8.0, 15.0]);
        let round = round_with_odds(odds);

        let grid = select_grid(&round, GridPolicy::Confidence).unwrap();
        assert_eq!(grid.indices[0], 9);
        // ties among matches 1..=8 keep original order
        assert_eq!(&grid.indices[1..], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(!grid.indices.contains(&0));
    }

    #[test]
    fn test_too_few_matches() {
        let round = round_with_odds(vec![2.0; 24]);
        assert!(select_grid(&round, GridPolicy::Fixed).is_err());
        assert!(select_grid(&round, GridPolicy::Confidence).is_err());
    }
}
