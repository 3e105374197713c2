//! Error types for the matchmaking engine
//!
//! Plumbing errors (configuration, catalog I/O, locks) flow through anyhow.
//! Formation outcomes have their own enum: a queue without enough supply is
//! an expected result, so callers get it back as a value and decide what to do.

use crate::types::Role;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for collaborator and service failures
#[derive(Debug, thiserror::Error)]
pub enum MatchmakingError {
    #[error("Unknown character: {character_id}")]
    UnknownCharacter { character_id: u32 },

    #[error("Failed to load character catalog from {path}: {reason}")]
    CatalogLoadFailed { path: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

/// Why a team or match could not be formed.
///
/// Every variant leaves the queues exactly as they were before the attempt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormationError {
    #[error("Not enough players queued: {available} available, {required} required")]
    InsufficientPlayers { required: usize, available: usize },

    #[error("No {role} available")]
    MissingRequiredRole { role: Role },

    #[error("Flex slots could not be filled: {filled} of {required}")]
    InsufficientFlexPlayers { filled: usize, required: usize },

    #[error("Teams are unbalanced: rating gap {gap:.1} exceeds {threshold:.1}")]
    UnbalancedTeams { gap: f64, threshold: f64 },
}

impl FormationError {
    /// Short label used for metrics and stats
    pub fn reason(&self) -> &'static str {
        match self {
            FormationError::InsufficientPlayers { .. } => "insufficient_players",
            FormationError::MissingRequiredRole { .. } => "missing_required_role",
            FormationError::InsufficientFlexPlayers { .. } => "insufficient_flex_players",
            FormationError::UnbalancedTeams { .. } => "unbalanced_teams",
        }
    }
}
