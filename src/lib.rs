//! Role Matchmaker - role-based team and match formation
//!
//! This crate holds waiting players in one queue per role, assembles
//! five-player teams with one tank, one healer and three flex players, and
//! pairs two teams into a match when their average ratings are close enough.
//! Failed attempts put every player back exactly where they were.

pub mod config;
pub mod error;
pub mod formation;
pub mod metrics;
pub mod queue;
pub mod roster;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{FormationError, MatchmakingError, Result};
pub use types::*;

// Re-export key components
pub use config::FormationConfig;
pub use formation::FormationEngine;
pub use queue::RoleQueues;
pub use roster::{CharacterCatalog, CharacterRoster, PlayerFactory, RatingRange};
pub use service::Matchmaker;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
