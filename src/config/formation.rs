//! Team formation policy

use crate::error::{MatchmakingError, Result};
use crate::types::Role;
use serde::{Deserialize, Serialize};

/// Policy constants for the formation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    /// Players per team
    pub team_size: usize,
    /// Players per match (two teams)
    pub match_size: usize,
    /// Roles every team must contain exactly once, filled in this order
    pub required_roles: Vec<Role>,
    /// Slots filled from `flex_roles` after the required roles
    pub flex_slots: usize,
    /// Flex sources in priority order
    pub flex_roles: Vec<Role>,
    /// Largest accepted gap between team averages (inclusive)
    pub balance_threshold: f64,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            team_size: 5,
            match_size: 10,
            required_roles: vec![Role::Tank, Role::Healer],
            flex_slots: 3,
            flex_roles: vec![Role::Assassin, Role::Bruiser],
            balance_threshold: 100.0,
        }
    }
}

impl FormationConfig {
    /// Variant where flex slots may also draw surplus healers and tanks
    pub fn with_overflow_flex() -> Self {
        Self {
            flex_roles: vec![Role::Assassin, Role::Bruiser, Role::Healer, Role::Tank],
            ..Self::default()
        }
    }

    pub fn with_balance_threshold(mut self, threshold: f64) -> Self {
        self.balance_threshold = threshold;
        self
    }

    pub fn with_flex_roles(mut self, flex_roles: Vec<Role>) -> Self {
        self.flex_roles = flex_roles;
        self
    }

    /// Check the constants are consistent with each other
    pub fn validate(&self) -> Result<()> {
        if self.team_size == 0 {
            return Err(config_error("Team size must be greater than 0"));
        }

        if self.required_roles.len() + self.flex_slots != self.team_size {
            return Err(config_error(format!(
                "Team size {} does not equal {} required roles plus {} flex slots",
                self.team_size,
                self.required_roles.len(),
                self.flex_slots
            )));
        }

        if self.match_size != self.team_size * 2 {
            return Err(config_error(format!(
                "Match size {} must be twice the team size {}",
                self.match_size, self.team_size
            )));
        }

        if has_duplicates(&self.required_roles) {
            return Err(config_error("Required roles cannot repeat"));
        }

        if self.flex_slots > 0 && self.flex_roles.is_empty() {
            return Err(config_error("Flex roles cannot be empty"));
        }

        if has_duplicates(&self.flex_roles) {
            return Err(config_error("Flex roles cannot repeat"));
        }

        if !self.balance_threshold.is_finite() || self.balance_threshold < 0.0 {
            return Err(config_error(
                "Balance threshold must be a non-negative number",
            ));
        }

        Ok(())
    }
}

fn has_duplicates(roles: &[Role]) -> bool {
    let mut seen = [false; Role::COUNT];
    for role in roles {
        if std::mem::replace(&mut seen[role.index()], true) {
            return true;
        }
    }
    false
}

fn config_error(message: impl Into<String>) -> anyhow::Error {
    MatchmakingError::ConfigurationError {
        message: message.into(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FormationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.flex_roles, vec![Role::Assassin, Role::Bruiser]);
    }

    #[test]
    fn test_overflow_variant() {
        let config = FormationConfig::with_overflow_flex();
        assert!(config.validate().is_ok());
        assert_eq!(config.flex_roles.last(), Some(&Role::Tank));
    }

    #[test]
    fn test_inconsistent_sizes_rejected() {
        let config = FormationConfig {
            team_size: 6,
            ..FormationConfig::default()
        };
        assert!(config.validate().is_err());

        let config = FormationConfig {
            match_size: 12,
            ..FormationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_roles_rejected() {
        let config = FormationConfig::default().with_flex_roles(vec![]);
        assert!(config.validate().is_err());

        let config =
            FormationConfig::default().with_flex_roles(vec![Role::Assassin, Role::Assassin]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_threshold_rejected() {
        assert!(FormationConfig::default()
            .with_balance_threshold(-1.0)
            .validate()
            .is_err());
        assert!(FormationConfig::default()
            .with_balance_threshold(f64::NAN)
            .validate()
            .is_err());
        assert!(FormationConfig::default()
            .with_balance_threshold(0.0)
            .validate()
            .is_ok());
    }
}
