//! Strategy transform layer
//!
//! A strategy turns the implied probability of a match (plus its odds and,
//! optionally, team form) into the adjusted probability the bet-set
//! generator samples from. Strategies are a tagged enum so they can be
//! selected from configuration and composed without touching the
//! generator or evaluator.

pub mod draw_bias;
pub mod linear;
pub mod team_blend;
pub mod value_edge;

use serde::{Deserialize, Serialize};

use crate::core::constants::OUTCOME_COUNT;
use crate::core::probability::Probability;
use crate::data::history::TeamFormLookup;
use crate::error::{EngineError, Result};
use crate::models::TeamPair;

pub use draw_bias::{DrawBiasParams, TeamDrawParams};
pub use linear::LinearParams;
pub use team_blend::TeamBlendParams;
pub use value_edge::{FavoriteClass, ValueEdgeParams};

/// Everything a transform may look at for one match
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub probability: Probability,
    /// Effective odds, possibly rescaled by an earlier step
    pub odds: [f64; OUTCOME_COUNT],
    pub teams: Option<&'a TeamPair>,
    /// Round date, used as the as-of date for team form
    pub date: &'a str,
    pub lookup: Option<&'a TeamFormLookup>,
}

impl<'a> MatchContext<'a> {
    /// Context with implied probabilities and no team data
    pub fn from_odds(odds: [f64; OUTCOME_COUNT], date: &'a str) -> Self {
        Self {
            probability: Probability::from_odds(&odds),
            odds,
            teams: None,
            date,
            lookup: None,
        }
    }

    pub fn with_teams(
        mut self,
        teams: Option<&'a TeamPair>,
        lookup: Option<&'a TeamFormLookup>,
    ) -> Self {
        self.teams = teams;
        self.lookup = lookup;
        self
    }

    fn advance(self, adjustment: Adjustment) -> Self {
        Self {
            probability: adjustment.probability,
            odds: adjustment.odds,
            ..self
        }
    }
}

/// Output of one transform step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub probability: Probability,
    pub odds: [f64; OUTCOME_COUNT],
}

/// A single probability adjustment step
pub trait ProbabilityTransform {
    fn adjust(&self, ctx: &MatchContext<'_>) -> Adjustment;

    /// Set a named numeric parameter, returning false when the name is unknown
    fn set_param(&mut self, name: &str, value: f64) -> bool;
}

/// Configured strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    Linear(LinearParams),
    ValueEdge(ValueEdgeParams),
    TeamBlend(TeamBlendParams),
    DrawBias(DrawBiasParams),
    TeamDraw(TeamDrawParams),
    Composite { steps: Vec<Strategy> },
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Linear(LinearParams::default())
    }
}

impl Strategy {
    pub fn kind(&self) -> &'static str {
        match self {
            Strategy::Linear(_) => "linear",
            Strategy::ValueEdge(_) => "value_edge",
            Strategy::TeamBlend(_) => "team_blend",
            Strategy::DrawBias(_) => "draw_bias",
            Strategy::TeamDraw(_) => "team_draw",
            Strategy::Composite { .. } => "composite",
        }
    }

    /// Human readable name, listing composite steps
    pub fn name(&self) -> String {
        match self {
            Strategy::Composite { steps } => {
                let inner: Vec<String> = steps.iter().map(Strategy::name).collect();
                format!("composite[{}]", inner.join(" > "))
            }
            other => other.kind().to_string(),
        }
    }

    /// Adjusted probability for one match
    pub fn apply(&self, ctx: &MatchContext<'_>) -> Probability {
        self.adjust(ctx).probability
    }

    /// Whether any step reads team form
    pub fn requires_team_data(&self) -> bool {
        match self {
            Strategy::TeamBlend(_) | Strategy::TeamDraw(_) => true,
            Strategy::Composite { steps } => steps.iter().any(Strategy::requires_team_data),
            _ => false,
        }
    }

    /// Set a named parameter in place
    pub fn with_override(&mut self, name: &str, value: f64) -> Result<()> {
        if self.set_param(name, value) {
            Ok(())
        } else {
            Err(EngineError::UnknownParameter {
                strategy: self.kind().to_string(),
                name: name.to_string(),
            })
        }
    }

    /// Copy of this strategy with every override applied
    pub fn with_overrides(&self, overrides: &[(String, f64)]) -> Result<Strategy> {
        let mut strategy = self.clone();
        for (name, value) in overrides {
            strategy.with_override(name, *value)?;
        }
        Ok(strategy)
    }
}

impl ProbabilityTransform for Strategy {
    fn adjust(&self, ctx: &MatchContext<'_>) -> Adjustment {
        match self {
            Strategy::Linear(p) => p.adjust(ctx),
            Strategy::ValueEdge(p) => p.adjust(ctx),
            Strategy::TeamBlend(p) => p.adjust(ctx),
            Strategy::DrawBias(p) => p.adjust(ctx),
            Strategy::TeamDraw(p) => p.adjust(ctx),
            Strategy::Composite { steps } => {
                let mut current = *ctx;
                let mut adjustment = Adjustment {
                    probability: ctx.probability,
                    odds: ctx.odds,
                };
                for step in steps {
                    adjustment = step.adjust(&current);
                    current = current.advance(adjustment);
                }
                adjustment
            }
        }
    }

    fn set_param(&mut self, name: &str, value: f64) -> bool {
        match self {
            Strategy::Linear(p) => p.set_param(name, value),
            Strategy::ValueEdge(p) => p.set_param(name, value),
            Strategy::TeamBlend(p) => p.set_param(name, value),
            Strategy::DrawBias(p) => p.set_param(name, value),
            Strategy::TeamDraw(p) => p.set_param(name, value),
            Strategy::Composite { steps } => {
                // every step that knows the name receives the value
                let mut known = false;
                for step in steps.iter_mut() {
                    known |= step.set_param(name, value);
                }
                known
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_tagged_round_trip() {
        let toml_src = r#"
kind = "composite"

[[steps]]
kind = "draw_bias"
draw_factor = 0.8

[[steps]]
kind = "linear"
home_boost = 1.2
"#;
        let strategy: Strategy = toml::from_str(toml_src).unwrap();
        match &strategy {
            Strategy::Composite { steps } => {
                assert_eq!(steps.len(), 2);
                assert!(matches!(
                    steps[0],
                    Strategy::DrawBias(p) if (p.draw_factor - 0.8).abs() < 1e-12
                ));
                assert!(matches!(
                    steps[1],
                    Strategy::Linear(p) if (p.home_boost - 1.2).abs() < 1e-12
                ));
            }
            other => panic!("unexpected strategy {:?}", other),
        }
        assert_eq!(strategy.name(), "composite[draw_bias > linear]");

        let json = serde_json::to_string(&Strategy::default()).unwrap();
        assert!(json.contains(r#""kind":"linear""#));
    }

    #[test]
    fn test_with_override_unknown_parameter() {
        let mut strategy = Strategy::default();
        assert!(strategy.with_override("home_boost", 1.5).is_ok());
        let err = strategy.with_override("bogus", 1.0).unwrap_err();
        assert!(matches!(err, EngineError::UnknownParameter { ref name, .. } if name == "bogus"));
    }

    #[test]
    fn test_composite_forwards_override_to_all_steps() {
        let base = Strategy::Composite {
            steps: vec![
                Strategy::Linear(LinearParams::default()),
                Strategy::TeamBlend(TeamBlendParams::default()),
                Strategy::DrawBias(DrawBiasParams::default()),
            ],
        };
        let tuned = base
            .with_overrides(&[("draw_boost".to_string(), 1.3), ("draw_factor".to_string(), 0.7)])
            .unwrap();
        let Strategy::Composite { steps } = tuned else {
            panic!("composite expected");
        };
        assert!(matches!(steps[0], Strategy::Linear(p) if (p.draw_boost - 1.3).abs() < 1e-12));
        assert!(matches!(
            &steps[1],
            Strategy::TeamBlend(p) if (p.linear.draw_boost - 1.3).abs() < 1e-12
        ));
        assert!(matches!(steps[2], Strategy::DrawBias(p) if (p.draw_factor - 0.7).abs() < 1e-12));
    }

    #[test]
    fn test_identity_linear_keeps_implied_probability() {
        let ctx = MatchContext::from_odds([2.0, 3.0, 4.0], "2024-01-06");
        let p = Strategy::default().apply(&ctx);
        assert!((p.home - 0.461538).abs() < 1e-4);
        assert!((p.draw - 0.307692).abs() < 1e-4);
        assert!((p.away - 0.230769).abs() < 1e-4);
    }

    #[test]
    fn test_composite_threads_adjusted_odds() {
        let strategy = Strategy::Composite {
            steps: vec![
                Strategy::DrawBias(DrawBiasParams {
                    draw_factor: 0.5,
                    ..Default::default()
                }),
                Strategy::Linear(LinearParams::default()),
            ],
        };
        let ctx = MatchContext::from_odds([2.0, 3.0, 4.0], "2024-01-06");
        let adjustment = strategy.adjust(&ctx);
        assert_eq!(adjustment.odds, [2.0, 1.5, 4.0]);
        let expected = Probability::from_odds(&[2.0, 1.5, 4.0]);
        assert!((adjustment.probability.draw - expected.draw).abs() < 1e-12);
    }

    #[test]
    fn test_requires_team_data() {
        assert!(!Strategy::default().requires_team_data());
        let composite = Strategy::Composite {
            steps: vec![Strategy::TeamDraw(TeamDrawParams::default())],
        };
        assert!(composite.requires_team_data());
    }
}
