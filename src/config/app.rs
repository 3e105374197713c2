//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! role-matchmaker service, including environment variable loading,
//! TOML file loading and validation.

use crate::config::formation::FormationConfig;
use crate::roster::RatingRange;
use crate::types::Role;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub matchmaking: MatchmakingSettings,
    pub roster: RosterSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Matchmaking-specific settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchmakingSettings {
    /// Maximum average rating gap between two teams
    pub balance_threshold: f64,
    /// Flex sources in priority order
    pub flex_roles: Vec<Role>,
    /// How often the simulation loop attempts a match
    pub match_interval_ms: u64,
}

/// Character catalog and player generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterSettings {
    /// JSON file holding the character templates
    pub catalog_path: PathBuf,
    /// Lowest generated rating
    pub mmr_min: u32,
    /// Highest generated rating
    pub mmr_max: u32,
    /// How often the simulation loop queues a new player
    pub player_spawn_interval_ms: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "role-matchmaker".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for MatchmakingSettings {
    fn default() -> Self {
        let formation = FormationConfig::default();
        Self {
            balance_threshold: formation.balance_threshold,
            flex_roles: formation.flex_roles,
            match_interval_ms: 1000,
        }
    }
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("data/characters.json"),
            mmr_min: 1500,
            mmr_max: 3500,
            player_spawn_interval_ms: 100,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Matchmaking settings
        if let Ok(threshold) = env::var("BALANCE_THRESHOLD") {
            self.matchmaking.balance_threshold = threshold
                .parse()
                .map_err(|_| anyhow!("Invalid BALANCE_THRESHOLD value: {}", threshold))?;
        }
        if let Ok(roles) = env::var("FLEX_ROLES") {
            self.matchmaking.flex_roles = parse_role_list(&roles)
                .map_err(|e| anyhow!("Invalid FLEX_ROLES value: {}: {}", roles, e))?;
        }
        if let Ok(interval) = env::var("MATCH_INTERVAL_MS") {
            self.matchmaking.match_interval_ms = interval
                .parse()
                .map_err(|_| anyhow!("Invalid MATCH_INTERVAL_MS value: {}", interval))?;
        }

        // Roster settings
        if let Ok(path) = env::var("CHARACTER_CATALOG_PATH") {
            self.roster.catalog_path = PathBuf::from(path);
        }
        if let Ok(min) = env::var("MMR_MIN") {
            self.roster.mmr_min = min
                .parse()
                .map_err(|_| anyhow!("Invalid MMR_MIN value: {}", min))?;
        }
        if let Ok(max) = env::var("MMR_MAX") {
            self.roster.mmr_max = max
                .parse()
                .map_err(|_| anyhow!("Invalid MMR_MAX value: {}", max))?;
        }
        if let Ok(interval) = env::var("PLAYER_SPAWN_INTERVAL_MS") {
            self.roster.player_spawn_interval_ms = interval
                .parse()
                .map_err(|_| anyhow!("Invalid PLAYER_SPAWN_INTERVAL_MS value: {}", interval))?;
        }

        Ok(())
    }

    /// Formation policy derived from the matchmaking settings
    pub fn formation_config(&self) -> FormationConfig {
        FormationConfig::default()
            .with_balance_threshold(self.matchmaking.balance_threshold)
            .with_flex_roles(self.matchmaking.flex_roles.clone())
    }

    /// Rating range for generated players
    pub fn rating_range(&self) -> Result<RatingRange> {
        RatingRange::new(self.roster.mmr_min, self.roster.mmr_max)
    }

    /// Get match attempt interval as Duration
    pub fn match_interval(&self) -> Duration {
        Duration::from_millis(self.matchmaking.match_interval_ms)
    }

    /// Get player spawn interval as Duration
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.roster.player_spawn_interval_ms)
    }
}

/// Parse a comma separated role list such as `ASSASSIN,BRUISER`
pub fn parse_role_list(value: &str) -> Result<Vec<Role>> {
    value
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    // Validate intervals
    if config.matchmaking.match_interval_ms == 0 {
        return Err(anyhow!("Match interval must be greater than 0"));
    }
    if config.roster.player_spawn_interval_ms == 0 {
        return Err(anyhow!("Player spawn interval must be greater than 0"));
    }

    // Validate roster settings
    if config.roster.catalog_path.as_os_str().is_empty() {
        return Err(anyhow!("Character catalog path cannot be empty"));
    }
    config.rating_range()?;

    config.formation_config().validate()?;

    Ok(())
}
