//! Utility functions for the matchmaking engine

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::Player;

/// Generate a new unique match ID
pub fn generate_match_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Mean rating of a group of players, 0 for an empty group
pub fn average_rating(players: &[Player]) -> f64 {
    if players.is_empty() {
        return 0.0;
    }
    let total: f64 = players.iter().map(|p| f64::from(p.mmr)).sum();
    total / players.len() as f64
}

/// Sum of ratings across a group of players
pub fn rating_sum(players: &[Player]) -> u64 {
    players.iter().map(|p| u64::from(p.mmr)).sum()
}

/// Difference between the mean ratings of two groups, computed from integer
/// sums so that averages like 2000.8 vs 2100.8 give exactly 100.
///
/// Returns the cross-multiplied difference `|sum_a * len_b - sum_b * len_a|`
/// and its divisor `len_a * len_b`. An empty group counts as mean 0.
pub fn average_gap_parts(group_a: &[Player], group_b: &[Player]) -> (u128, u128) {
    match (group_a.len() as u128, group_b.len() as u128) {
        (0, 0) => (0, 1),
        (0, len_b) => (u128::from(rating_sum(group_b)), len_b),
        (len_a, 0) => (u128::from(rating_sum(group_a)), len_a),
        (len_a, len_b) => {
            let scaled_a = u128::from(rating_sum(group_a)) * len_b;
            let scaled_b = u128::from(rating_sum(group_b)) * len_a;
            (scaled_a.abs_diff(scaled_b), len_a * len_b)
        }
    }
}

/// Check if the mean ratings of two groups are within `tolerance` (inclusive)
pub fn averages_within_tolerance(group_a: &[Player], group_b: &[Player], tolerance: f64) -> bool {
    let (diff, divisor) = average_gap_parts(group_a, group_b);
    diff as f64 <= tolerance * divisor as f64
}
