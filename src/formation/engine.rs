//! Team and match formation
//!
//! The engine pulls players off the role queues through an `Allocation`.
//! Required roles fill the first slots in configured order, then each flex
//! slot takes the front player of the first non-empty flex role. A failure
//! at any step leaves the queues exactly as they were.

use crate::config::FormationConfig;
use crate::error::{FormationError, Result};
use crate::formation::balance;
use crate::queue::{Allocation, RoleQueues};
use crate::types::{Match, Team};
use crate::utils::{current_timestamp, generate_match_id};
use tracing::debug;

/// Role-filling and balance policy applied to a set of queues
#[derive(Debug, Clone)]
pub struct FormationEngine {
    config: FormationConfig,
}

impl FormationEngine {
    /// Create an engine, rejecting inconsistent policy constants
    pub fn new(config: FormationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FormationConfig {
        &self.config
    }

    /// Pull one team off the queues, or leave them untouched
    pub fn form_team(&self, queues: &mut RoleQueues) -> std::result::Result<Team, FormationError> {
        let mut allocation = Allocation::begin(queues);
        self.draw_team(&mut allocation)?;
        Ok(Team::new(allocation.commit()))
    }

    /// Pull two balanced teams off the queues, or leave them untouched
    pub fn try_create_match(
        &self,
        queues: &mut RoleQueues,
    ) -> std::result::Result<Match, FormationError> {
        let available = queues.total_count();
        if available < self.config.match_size {
            return Err(FormationError::InsufficientPlayers {
                required: self.config.match_size,
                available,
            });
        }

        // Dropping the allocation on any early return puts team B back,
        // then team A, so the queues end up as if nothing was taken.
        let mut allocation = Allocation::begin(queues);
        self.draw_team(&mut allocation)?;
        self.draw_team(&mut allocation)?;

        let (team_a, team_b) = allocation.taken().split_at(self.config.team_size);
        let report = balance::evaluate(team_a, team_b, self.config.balance_threshold);
        if !report.balanced {
            debug!(
                "Rejecting match - team averages {:.1} vs {:.1}, gap {:.1}",
                report.avg_mmr_a, report.avg_mmr_b, report.gap
            );
            return Err(FormationError::UnbalancedTeams {
                gap: report.gap,
                threshold: self.config.balance_threshold,
            });
        }

        let mut players = allocation.commit();
        let team_b = Team::new(players.split_off(self.config.team_size));
        let team_a = Team::new(players);

        Ok(Match {
            id: generate_match_id(),
            team_a,
            team_b,
            avg_mmr_a: report.avg_mmr_a,
            avg_mmr_b: report.avg_mmr_b,
            formed_at: current_timestamp(),
        })
    }

    /// Take one team's worth of players into `allocation`.
    ///
    /// On failure only this team's players are returned; anything the
    /// allocation held beforehand stays taken.
    fn draw_team(&self, allocation: &mut Allocation<'_>) -> std::result::Result<(), FormationError> {
        let available = allocation.queues().total_count();
        if available < self.config.team_size {
            return Err(FormationError::InsufficientPlayers {
                required: self.config.team_size,
                available,
            });
        }

        for &role in &self.config.required_roles {
            if allocation.queues().len(role) == 0 {
                return Err(FormationError::MissingRequiredRole { role });
            }
        }

        let savepoint = allocation.savepoint();
        for &role in &self.config.required_roles {
            if allocation.take(role).is_none() {
                allocation.rollback_to(savepoint);
                return Err(FormationError::MissingRequiredRole { role });
            }
        }

        for filled in 0..self.config.flex_slots {
            if !self.take_flex(allocation) {
                debug!(
                    "Flex fill stopped after {} of {} slots, returning players",
                    filled, self.config.flex_slots
                );
                allocation.rollback_to(savepoint);
                return Err(FormationError::InsufficientFlexPlayers {
                    filled,
                    required: self.config.flex_slots,
                });
            }
        }

        debug!(
            "Drew team: {:?}",
            allocation
                .since(savepoint)
                .iter()
                .map(|p| (p.id, p.role))
                .collect::<Vec<_>>()
        );
        Ok(())
    }

    /// Take the front player of the first non-empty flex role
    fn take_flex(&self, allocation: &mut Allocation<'_>) -> bool {
        for &role in &self.config.flex_roles {
            if allocation.take(role).is_some() {
                return true;
            }
        }
        false
    }
}

impl Default for FormationEngine {
    fn default() -> Self {
        Self {
            config: FormationConfig::default(),
        }
    }
}
