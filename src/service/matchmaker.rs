//! Thread-safe matchmaking facade
//!
//! The `Matchmaker` owns one queue store behind a single mutex. A formation
//! attempt holds that lock for all of its dequeues, so no other caller ever
//! sees a half-formed team.

use crate::config::FormationConfig;
use crate::error::{FormationError, Result};
use crate::formation::FormationEngine;
use crate::metrics::MetricsCollector;
use crate::queue::RoleQueues;
use crate::types::{Match, Player, QueueStatus, Role, Team};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Statistics about matchmaker operations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchmakerStats {
    /// Total number of players queued
    pub players_queued: u64,
    /// Total number of standalone teams formed
    pub teams_formed: u64,
    /// Total number of matches formed
    pub matches_formed: u64,
    /// Total number of players that left the queues in a team or match
    pub players_matched: u64,
    /// Failed attempts keyed by reason
    pub failures: BTreeMap<String, u64>,
    /// Current queue length per role, indexed by `Role::index`
    pub players_waiting: [usize; Role::COUNT],
}

impl MatchmakerStats {
    /// Players currently waiting across all roles
    pub fn total_waiting(&self) -> usize {
        self.players_waiting.iter().sum()
    }

    /// Failed attempts for one reason label
    pub fn failures_for(&self, reason: &str) -> u64 {
        self.failures.get(reason).copied().unwrap_or(0)
    }
}

/// The main matchmaker
#[derive(Clone)]
pub struct Matchmaker {
    /// Waiting players; the lock spans every multi-step formation attempt
    queues: Arc<Mutex<RoleQueues>>,
    /// Role-filling and balance policy
    engine: Arc<FormationEngine>,
    /// Matchmaker statistics
    stats: Arc<RwLock<MatchmakerStats>>,
    /// Metrics collector for recording performance data
    metrics_collector: Arc<MetricsCollector>,
}

impl Matchmaker {
    /// Create a new matchmaker
    pub fn new(config: FormationConfig) -> Result<Self> {
        let metrics_collector = Arc::new(MetricsCollector::new().unwrap_or_else(|_| {
            warn!("Failed to create metrics collector, using default");
            MetricsCollector::default()
        }));

        Self::with_metrics(config, metrics_collector)
    }

    /// Create a new matchmaker with metrics collector
    pub fn with_metrics(
        config: FormationConfig,
        metrics_collector: Arc<MetricsCollector>,
    ) -> Result<Self> {
        let engine = FormationEngine::new(config)?;
        info!(
            "Matchmaker ready - team size {}, flex roles {:?}, balance threshold {:.1}",
            engine.config().team_size,
            engine.config().flex_roles,
            engine.config().balance_threshold
        );

        Ok(Self {
            queues: Arc::new(Mutex::new(RoleQueues::new())),
            engine: Arc::new(engine),
            stats: Arc::new(RwLock::new(MatchmakerStats::default())),
            metrics_collector,
        })
    }

    pub fn config(&self) -> &FormationConfig {
        self.engine.config()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics_collector.clone()
    }

    // A panic mid-formation unwinds through the allocation, which returns
    // its players before the lock is released, so a poisoned store is
    // still consistent.
    fn lock_queues(&self) -> MutexGuard<'_, RoleQueues> {
        self.queues.lock().unwrap_or_else(|poisoned| {
            warn!("Queue lock was poisoned, continuing with recovered state");
            PoisonError::into_inner(poisoned)
        })
    }

    fn update_stats(&self, update: impl FnOnce(&mut MatchmakerStats)) {
        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut stats);
    }

    fn publish_waiting(&self, queues: &RoleQueues) {
        for role in Role::ALL {
            self.metrics_collector.update_waiting(role, queues.len(role));
        }
    }

    fn log_queue_lengths(queues: &RoleQueues) {
        for role in Role::ALL {
            debug!(" - {:<10}: {} waiting", role.as_str(), queues.len(role));
        }
    }

    /// Add a player to the back of its role queue
    pub fn add_player(&self, player: Player) {
        let role = player.role;
        info!(
            "Player {} '{}' joined the {} queue (mmr {})",
            player.id, player.name, role, player.mmr
        );

        let mut queues = self.lock_queues();
        queues.enqueue(player);
        self.publish_waiting(&queues);
        drop(queues);

        self.metrics_collector.record_player_queued(role);
        self.update_stats(|stats| stats.players_queued += 1);
    }

    /// Try to pull one team of players off the queues
    pub fn try_create_team(&self) -> std::result::Result<Team, FormationError> {
        let timer = self.metrics_collector.start_timer();
        let mut queues = self.lock_queues();

        info!("Attempting to form a team from {} waiting players", queues.total_count());
        Self::log_queue_lengths(&queues);

        let result = self.engine.form_team(&mut queues);
        self.publish_waiting(&queues);
        drop(queues);

        let duration = timer.stop();
        match &result {
            Ok(team) => {
                info!(
                    "Team formed: {:?} (avg mmr {:.1})",
                    team.players().iter().map(|p| p.id).collect::<Vec<_>>(),
                    team.average_mmr()
                );
                self.metrics_collector.record_team_formed(duration);
                self.update_stats(|stats| {
                    stats.teams_formed += 1;
                    stats.players_matched += team.len() as u64;
                });
            }
            Err(e) => self.record_failure("team", e, duration),
        }
        result
    }

    /// Try to pull a balanced match off the queues
    pub fn try_create_match(&self) -> std::result::Result<Match, FormationError> {
        let timer = self.metrics_collector.start_timer();
        let mut queues = self.lock_queues();

        info!("Attempting to form a match from {} waiting players", queues.total_count());
        Self::log_queue_lengths(&queues);

        let result = self.engine.try_create_match(&mut queues);
        self.publish_waiting(&queues);
        drop(queues);

        let duration = timer.stop();
        match &result {
            Ok(game) => {
                info!(
                    "Match {} formed - team A avg {:.1}, team B avg {:.1}, gap {:.1}",
                    game.id,
                    game.avg_mmr_a,
                    game.avg_mmr_b,
                    game.mmr_gap()
                );
                self.metrics_collector.record_match_formed(game, duration);
                self.update_stats(|stats| {
                    stats.matches_formed += 1;
                    stats.players_matched += game.player_count() as u64;
                });
            }
            Err(e) => self.record_failure("match", e, duration),
        }
        result
    }

    fn record_failure(&self, operation: &str, error: &FormationError, duration: std::time::Duration) {
        info!("No {} formed: {}", operation, error);
        self.metrics_collector
            .record_formation_failure(operation, error, duration);
        self.update_stats(|stats| {
            *stats.failures.entry(error.reason().to_string()).or_insert(0) += 1;
        });
    }

    /// Snapshot of every role queue, front first
    pub fn queue_status(&self) -> QueueStatus {
        self.lock_queues().status()
    }

    /// Players waiting across all roles
    pub fn total_queued(&self) -> usize {
        self.lock_queues().total_count()
    }

    /// Current statistics, including live queue lengths
    pub fn stats(&self) -> MatchmakerStats {
        let mut stats = self
            .stats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let queues = self.lock_queues();
        for role in Role::ALL {
            stats.players_waiting[role.index()] = queues.len(role);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayerId;
    use std::thread;

    fn player(id: PlayerId, role: Role, mmr: u32) -> Player {
        Player {
            id,
            name: format!("player{}", id),
            role,
            mmr,
        }
    }

    fn create_test_matchmaker() -> Matchmaker {
        Matchmaker::new(FormationConfig::default()).unwrap()
    }

    fn full_match_roles() -> Vec<Role> {
        vec![
            Role::Tank,
            Role::Tank,
            Role::Healer,
            Role::Healer,
            Role::Assassin,
            Role::Assassin,
            Role::Assassin,
            Role::Assassin,
            Role::Bruiser,
            Role::Bruiser,
        ]
    }

    #[test]
    fn test_add_player() {
        let matchmaker = create_test_matchmaker();
        matchmaker.add_player(player(1, Role::Tank, 2000));

        let status = matchmaker.queue_status();
        assert_eq!(status.tank.len(), 1);
        assert_eq!(status.tank[0].id, 1);
        assert_eq!(matchmaker.total_queued(), 1);
        assert_eq!(matchmaker.stats().players_queued, 1);
    }

    #[test]
    fn test_team_then_failure_stats() {
        let matchmaker = create_test_matchmaker();
        for (i, role) in [
            Role::Tank,
            Role::Healer,
            Role::Assassin,
            Role::Assassin,
        ]
        .into_iter()
        .enumerate()
        {
            matchmaker.add_player(player(i as PlayerId + 1, role, 2000));
        }

        assert!(matches!(
            matchmaker.try_create_team(),
            Err(FormationError::InsufficientPlayers { .. })
        ));

        matchmaker.add_player(player(5, Role::Bruiser, 2000));
        let team = matchmaker.try_create_team().unwrap();
        assert_eq!(team.len(), 5);

        let stats = matchmaker.stats();
        assert_eq!(stats.teams_formed, 1);
        assert_eq!(stats.players_matched, 5);
        assert_eq!(stats.failures_for("insufficient_players"), 1);
        assert_eq!(stats.total_waiting(), 0);
    }

    #[test]
    fn test_match_flow() {
        let matchmaker = create_test_matchmaker();
        for (i, role) in full_match_roles().into_iter().enumerate() {
            matchmaker.add_player(player(i as PlayerId + 1, role, 2000 + i as u32));
        }

        let game = matchmaker.try_create_match().unwrap();
        assert_eq!(game.player_count(), 10);
        assert_eq!(matchmaker.total_queued(), 0);

        let stats = matchmaker.stats();
        assert_eq!(stats.matches_formed, 1);
        assert_eq!(stats.players_matched, 10);

        let formed = matchmaker
            .metrics()
            .formation()
            .matches_formed_total
            .get();
        assert_eq!(formed, 1);
    }

    #[test]
    fn test_concurrent_callers_never_split_players() {
        let matchmaker = create_test_matchmaker();
        let mut next_id = 1;
        for _ in 0..5 {
            for role in full_match_roles() {
                matchmaker.add_player(player(next_id, role, 2000));
                next_id += 1;
            }
        }

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let matchmaker = matchmaker.clone();
                thread::spawn(move || matchmaker.try_create_match().ok())
            })
            .collect();

        let matches: Vec<Match> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(matches.len(), 5);
        assert_eq!(matchmaker.total_queued(), 0);

        let mut ids: Vec<_> = matches
            .iter()
            .flat_map(|m| m.team_a.players().iter().chain(m.team_b.players()))
            .map(|p| p.id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 50);

        let stats = matchmaker.stats();
        assert_eq!(stats.matches_formed, 5);
        assert_eq!(stats.failures_for("insufficient_players"), 3);
    }
}
