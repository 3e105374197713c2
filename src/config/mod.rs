//! Configuration management for the role-matchmaker service
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and the formation policy constants.

pub mod app;
pub mod formation;

// Re-export commonly used types
pub use app::{
    parse_role_list, validate_config, AppConfig, MatchmakingSettings, RosterSettings,
    ServiceSettings,
};
pub use formation::FormationConfig;
