//! Team-form blending
//!
//! Builds a probability estimate from each side's recent form and blends it
//! with the odds-implied probability before the linear reweighting.

use serde::{Deserialize, Serialize};

use super::{Adjustment, MatchContext, ProbabilityTransform};
use crate::core::probability::Probability;
use crate::data::history::{capped_min_matches, MatchResult, TeamForm, DRAW_RATE_WINDOW};

/// Strength floor so a side with no wins still gets some share
const MIN_STRENGTH: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamBlendParams {
    /// Weight of the team estimate, clamped to [0, 1]
    pub blend: f64,
    /// Reweighting applied after blending
    pub linear: super::LinearParams,
    pub recent_weight: f64,
    pub venue_weight: f64,
    pub momentum_weight: f64,
    /// Per-match streak contribution, positive for wins, negative for losses
    pub streak_weight: f64,
    /// Prior matches each team needs before its form is trusted
    pub min_matches: usize,
}

impl Default for TeamBlendParams {
    fn default() -> Self {
        Self {
            blend: 0.3,
            linear: super::LinearParams::default(),
            recent_weight: 0.5,
            venue_weight: 0.3,
            momentum_weight: 0.2,
            streak_weight: 0.02,
            min_matches: 5,
        }
    }
}

impl TeamBlendParams {
    /// Form strength of one side
    pub fn strength(&self, form: &TeamForm, is_home: bool) -> f64 {
        let streak_sign = match form.streak.kind {
            MatchResult::Win => 1.0,
            MatchResult::Loss => -1.0,
            MatchResult::Draw => 0.0,
        };
        let s = self.recent_weight * form.weighted_win_rate
            + self.venue_weight * form.venue_win_rate(is_home)
            + self.momentum_weight * form.momentum
            + self.streak_weight * form.streak.length as f64 * streak_sign;
        s.max(MIN_STRENGTH)
    }

    /// Probability implied by the two teams' form alone
    pub fn team_estimate(&self, home: &TeamForm, away: &TeamForm) -> Probability {
        let s_home = self.strength(home, true);
        let s_away = self.strength(away, false);
        let share = s_home / (s_home + s_away);
        let draw = ((home.draw_rate + away.draw_rate) / 2.0).clamp(0.0, 1.0);
        Probability {
            home: (1.0 - draw) * share,
            draw,
            away: (1.0 - draw) * (1.0 - share),
        }
    }

    fn blended(&self, ctx: &MatchContext<'_>) -> Option<Probability> {
        let lookup = ctx.lookup?;
        let teams = ctx.teams?;
        let home = lookup.form(&teams.home, ctx.date)?;
        let away = lookup.form(&teams.away, ctx.date)?;
        let required = self.min_matches.min(DRAW_RATE_WINDOW);
        if home.matches < required || away.matches < required {
            return None;
        }

        let estimate = self.team_estimate(&home, &away);
        let b = self.blend.clamp(0.0, 1.0);
        let p = ctx.probability;
        Probability::normalized([
            (1.0 - b) * p.home + b * estimate.home,
            (1.0 - b) * p.draw + b * estimate.draw,
            (1.0 - b) * p.away + b * estimate.away,
        ])
    }
}

impl ProbabilityTransform for TeamBlendParams {
    fn adjust(&self, ctx: &MatchContext<'_>) -> Adjustment {
        let base = self.blended(ctx).unwrap_or(ctx.probability);
        Adjustment {
            probability: self.linear.reweight(&base),
            odds: ctx.odds,
        }
    }

    fn set_param(&mut self, name: &str, value: f64) -> bool {
        match name {
            "blend" => self.blend = value,
            "recent_weight" => self.recent_weight = value,
            "venue_weight" => self.venue_weight = value,
            "momentum_weight" => self.momentum_weight = value,
            "streak_weight" => self.streak_weight = value,
            "min_matches" => self.min_matches = capped_min_matches(value),
            other => return self.linear.set_param(other, value),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::history::{TeamFormLookup, TeamHistoryIndex, TeamMatch};
    use crate::models::TeamPair;

    fn history(results: &[MatchResult], is_home: bool) -> Vec<TeamMatch> {
        results
            .iter()
            .enumerate()
            .map(|(i, &result)| TeamMatch {
                date: format!("2024-01-{:02}", 20 - i),
                opponent: "someone".to_string(),
                is_home,
                result,
                goals_for: 0,
                goals_against: 0,
            })
            .collect()
    }

    fn lookup() -> TeamFormLookup {
        let mut index = TeamHistoryIndex::new();
        index.insert("strong-fc", history(&[MatchResult::Win; 8], true));
        index.insert("weak-united", history(&[MatchResult::Loss; 8], false));
        index.insert("newcomers", history(&[MatchResult::Win; 2], true));
        TeamFormLookup::new(index)
    }

    fn teams(home: &str, away: &str) -> TeamPair {
        TeamPair {
            home: home.to_string(),
            away: away.to_string(),
        }
    }

    #[test]
    fn test_blend_moves_toward_stronger_team() {
        let lookup = lookup();
        let pair = teams("Strong FC", "Weak United");
        let ctx = MatchContext::from_odds([2.8, 3.2, 2.6], "2024-02-01")
            .with_teams(Some(&pair), Some(&lookup));
        let params = TeamBlendParams::default();
        let adjusted = params.adjust(&ctx).probability;
        assert!(adjusted.home > ctx.probability.home);
        assert!(adjusted.away < ctx.probability.away);
        assert!((adjusted.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_insufficient_history_is_no_blend() {
        let lookup = lookup();
        let pair = teams("Newcomers", "Weak United");
        let ctx = MatchContext::from_odds([2.8, 3.2, 2.6], "2024-02-01")
            .with_teams(Some(&pair), Some(&lookup));
        let adjusted = TeamBlendParams::default().adjust(&ctx).probability;
        assert!((adjusted.home - ctx.probability.home).abs() < 1e-12);

        let unknown = teams("Nobody", "Weak United");
        let ctx = ctx.with_teams(Some(&unknown), Some(&lookup));
        let adjusted = TeamBlendParams::default().adjust(&ctx).probability;
        assert!((adjusted.home - ctx.probability.home).abs() < 1e-12);
    }

    #[test]
    fn test_missing_lookup_still_applies_linear() {
        let params = TeamBlendParams {
            linear: super::super::LinearParams {
                home_boost: 2.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let ctx = MatchContext::from_odds([3.0, 3.0, 3.0], "2024-02-01");
        let adjusted = params.adjust(&ctx).probability;
        assert!((adjusted.home - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_form_before_date_only() {
        let lookup = lookup();
        let pair = teams("Strong FC", "Weak United");
        // every history entry is on or after this date
        let ctx = MatchContext::from_odds([2.8, 3.2, 2.6], "2024-01-13")
            .with_teams(Some(&pair), Some(&lookup));
        let adjusted = TeamBlendParams::default().adjust(&ctx).probability;
        assert!((adjusted.home - ctx.probability.home).abs() < 1e-12);
    }

    #[test]
    fn test_linear_fields_addressed_directly() {
        let mut params = TeamBlendParams::default();
        assert!(params.set_param("away_boost", 0.8));
        assert!(params.set_param("min_matches", 3.0));
        assert!(!params.set_param("draw_factor", 1.0));
        assert!((params.linear.away_boost - 0.8).abs() < 1e-12);
        assert_eq!(params.min_matches, 3);

        assert!(params.set_param("min_matches", 50.0));
        assert_eq!(params.min_matches, DRAW_RATE_WINDOW);
    }
}
