//! Skill balance between two teams
//!
//! Pass/fail only: a pair of teams is accepted when their average ratings
//! are no further apart than the threshold.

use crate::types::Player;
use crate::utils::{average_gap_parts, average_rating, averages_within_tolerance};

/// Outcome of comparing two teams
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceReport {
    pub avg_mmr_a: f64,
    pub avg_mmr_b: f64,
    pub gap: f64,
    pub balanced: bool,
}

/// Mean rating of a team, 0 for an empty team
pub fn average_mmr(team: &[Player]) -> f64 {
    average_rating(team)
}

/// Absolute difference between the two team averages
pub fn balance_gap(team_a: &[Player], team_b: &[Player]) -> f64 {
    let (diff, divisor) = average_gap_parts(team_a, team_b);
    diff as f64 / divisor as f64
}

/// Whether the gap between the teams is at most `threshold`
pub fn is_balanced(team_a: &[Player], team_b: &[Player], threshold: f64) -> bool {
    evaluate(team_a, team_b, threshold).balanced
}

/// Averages, gap and verdict for a pair of teams.
///
/// The verdict comes from integer rating sums, not from the rounded averages.
pub fn evaluate(team_a: &[Player], team_b: &[Player], threshold: f64) -> BalanceReport {
    BalanceReport {
        avg_mmr_a: average_mmr(team_a),
        avg_mmr_b: average_mmr(team_b),
        gap: balance_gap(team_a, team_b),
        balanced: averages_within_tolerance(team_a, team_b, threshold),
    }
}
