//! Common types used throughout the matchmaking engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::average_rating;

/// Unique identifier for players
pub type PlayerId = u64;

/// Identifier of a character template in the catalog
pub type CharacterId = u32;

/// Unique identifier for matches
pub type MatchId = Uuid;

/// Role a player fills on a team, also the key of its waiting queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Tank,
    Healer,
    Assassin,
    Bruiser,
}

impl Role {
    /// All roles in canonical order
    pub const ALL: [Role; 4] = [Role::Tank, Role::Healer, Role::Assassin, Role::Bruiser];

    /// Number of roles
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index into per-role tables
    pub fn index(self) -> usize {
        match self {
            Role::Tank => 0,
            Role::Healer => 1,
            Role::Assassin => 2,
            Role::Bruiser => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Tank => "TANK",
            Role::Healer => "HEALER",
            Role::Assassin => "ASSASSIN",
            Role::Bruiser => "BRUISER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TANK" => Ok(Role::Tank),
            "HEALER" => Ok(Role::Healer),
            "ASSASSIN" => Ok(Role::Assassin),
            "BRUISER" => Ok(Role::Bruiser),
            other => Err(anyhow::anyhow!(
                "Invalid role '{}'. Use TANK, HEALER, ASSASSIN or BRUISER",
                other
            )),
        }
    }
}

/// Catalog record a player is created from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterTemplate {
    pub id: CharacterId,
    pub name: String,
    pub role: Role,
}

/// Player waiting for a match. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub mmr: u32,
}

/// A fully formed team, produced only by the formation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    players: Vec<Player>,
}

impl Team {
    pub(crate) fn new(players: Vec<Player>) -> Self {
        Self { players }
    }

    /// Players in slot order (required roles first, then flex)
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Arithmetic mean of member ratings
    pub fn average_mmr(&self) -> f64 {
        average_rating(&self.players)
    }

    /// Number of members playing `role`
    pub fn count_role(&self, role: Role) -> usize {
        self.players.iter().filter(|p| p.role == role).count()
    }

    pub fn into_players(self) -> Vec<Player> {
        self.players
    }
}

/// Two balanced teams ready to play. Its players have left the queues for good.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub team_a: Team,
    pub team_b: Team,
    pub avg_mmr_a: f64,
    pub avg_mmr_b: f64,
    pub formed_at: DateTime<Utc>,
}

impl Match {
    /// Absolute difference between the two team averages
    pub fn mmr_gap(&self) -> f64 {
        crate::formation::balance_gap(self.team_a.players(), self.team_b.players())
    }

    pub fn player_count(&self) -> usize {
        self.team_a.len() + self.team_b.len()
    }
}

/// Snapshot of every role queue, front first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub tank: Vec<Player>,
    pub healer: Vec<Player>,
    pub assassin: Vec<Player>,
    pub bruiser: Vec<Player>,
}

impl QueueStatus {
    pub fn role(&self, role: Role) -> &[Player] {
        match role {
            Role::Tank => &self.tank,
            Role::Healer => &self.healer,
            Role::Assassin => &self.assassin,
            Role::Bruiser => &self.bruiser,
        }
    }

    pub(crate) fn role_mut(&mut self, role: Role) -> &mut Vec<Player> {
        match role {
            Role::Tank => &mut self.tank,
            Role::Healer => &mut self.healer,
            Role::Assassin => &mut self.assassin,
            Role::Bruiser => &mut self.bruiser,
        }
    }

    pub fn total(&self) -> usize {
        Role::ALL.iter().map(|r| self.role(*r).len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: PlayerId, role: Role, mmr: u32) -> Player {
        Player {
            id,
            name: format!("player{}", id),
            role,
            mmr,
        }
    }

    #[test]
    fn test_role_serde_uses_uppercase() {
        let json = serde_json::to_string(&Role::Assassin).unwrap();
        assert_eq!(json, "\"ASSASSIN\"");

        let role: Role = serde_json::from_str("\"HEALER\"").unwrap();
        assert_eq!(role, Role::Healer);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("tank".parse::<Role>().unwrap(), Role::Tank);
        assert_eq!(" Bruiser ".parse::<Role>().unwrap(), Role::Bruiser);
        assert!("support".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_indices_are_dense() {
        for (i, role) in Role::ALL.iter().enumerate() {
            assert_eq!(role.index(), i);
        }
    }

    #[test]
    fn test_team_helpers() {
        let team = Team::new(vec![
            player(1, Role::Tank, 2000),
            player(2, Role::Healer, 2200),
            player(3, Role::Assassin, 1800),
        ]);

        assert_eq!(team.len(), 3);
        assert_eq!(team.count_role(Role::Tank), 1);
        assert_eq!(team.count_role(Role::Bruiser), 0);
        assert_eq!(team.average_mmr(), 2000.0);
    }
}
