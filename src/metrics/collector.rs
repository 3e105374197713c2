//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the role-matchmaker engine
//! using Prometheus metrics.

use crate::error::FormationError;
use crate::types::{Match, Role};
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the matchmaking engine
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Queue-related metrics
    queue_metrics: QueueMetrics,

    /// Team and match formation metrics
    formation_metrics: FormationMetrics,

    /// Performance metrics
    performance_metrics: PerformanceMetrics,
}

/// Queue-related metrics
#[derive(Clone)]
pub struct QueueMetrics {
    /// Total players queued by role
    pub players_queued_total: IntCounterVec,

    /// Players currently waiting by role
    pub players_waiting: IntGaugeVec,
}

/// Team and match formation metrics
#[derive(Clone)]
pub struct FormationMetrics {
    /// Total teams formed outside of matches
    pub teams_formed_total: IntCounter,

    /// Total matches formed
    pub matches_formed_total: IntCounter,

    /// Failed formation attempts by operation and reason
    pub formation_failures_total: IntCounterVec,

    /// Average rating gap of formed matches
    pub match_mmr_gap: Histogram,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// Time spent inside a formation attempt, lock included
    pub formation_duration: HistogramVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let queue_metrics = QueueMetrics::new(&registry)?;
        let formation_metrics = FormationMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            queue_metrics,
            formation_metrics,
            performance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get queue metrics
    pub fn queue(&self) -> &QueueMetrics {
        &self.queue_metrics
    }

    /// Get formation metrics
    pub fn formation(&self) -> &FormationMetrics {
        &self.formation_metrics
    }

    /// Get performance metrics
    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Record a player joining its role queue
    pub fn record_player_queued(&self, role: Role) {
        self.queue_metrics
            .players_queued_total
            .with_label_values(&[role.as_str()])
            .inc();
    }

    /// Set the waiting gauges from per-role queue lengths
    pub fn update_waiting(&self, role: Role, waiting: usize) {
        self.queue_metrics
            .players_waiting
            .with_label_values(&[role.as_str()])
            .set(waiting as i64);
    }

    /// Record a team formed on its own
    pub fn record_team_formed(&self, duration: Duration) {
        self.formation_metrics.teams_formed_total.inc();
        self.record_duration("team", duration);
    }

    /// Record a match formed
    pub fn record_match_formed(&self, game: &Match, duration: Duration) {
        self.formation_metrics.matches_formed_total.inc();
        self.formation_metrics.match_mmr_gap.observe(game.mmr_gap());
        self.record_duration("match", duration);
    }

    /// Record a failed formation attempt
    pub fn record_formation_failure(
        &self,
        operation: &str,
        error: &FormationError,
        duration: Duration,
    ) {
        self.formation_metrics
            .formation_failures_total
            .with_label_values(&[operation, error.reason()])
            .inc();
        self.record_duration(operation, duration);
    }

    fn record_duration(&self, operation: &str, duration: Duration) {
        self.performance_metrics
            .formation_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Render every registered metric in the text exposition format
    pub fn gather_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl QueueMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let players_queued_total = IntCounterVec::new(
            Opts::new(
                "role_matchmaker_players_queued_total",
                "Total players queued",
            ),
            &["role"],
        )?;
        registry.register(Box::new(players_queued_total.clone()))?;

        let players_waiting = IntGaugeVec::new(
            Opts::new(
                "role_matchmaker_players_waiting",
                "Players currently waiting in queue",
            ),
            &["role"],
        )?;
        registry.register(Box::new(players_waiting.clone()))?;

        Ok(Self {
            players_queued_total,
            players_waiting,
        })
    }
}

impl FormationMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let teams_formed_total = IntCounter::new(
            "role_matchmaker_teams_formed_total",
            "Total standalone teams formed",
        )?;
        registry.register(Box::new(teams_formed_total.clone()))?;

        let matches_formed_total = IntCounter::new(
            "role_matchmaker_matches_formed_total",
            "Total matches formed",
        )?;
        registry.register(Box::new(matches_formed_total.clone()))?;

        let formation_failures_total = IntCounterVec::new(
            Opts::new(
                "role_matchmaker_formation_failures_total",
                "Failed formation attempts",
            ),
            &["operation", "reason"],
        )?;
        registry.register(Box::new(formation_failures_total.clone()))?;

        let match_mmr_gap = Histogram::with_opts(
            HistogramOpts::new(
                "role_matchmaker_match_mmr_gap",
                "Gap between team average ratings in formed matches",
            )
            .buckets(vec![0.0, 10.0, 25.0, 50.0, 75.0, 100.0, 250.0, 500.0]),
        )?;
        registry.register(Box::new(match_mmr_gap.clone()))?;

        Ok(Self {
            teams_formed_total,
            matches_formed_total,
            formation_failures_total,
            match_mmr_gap,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let formation_duration = HistogramVec::new(
            HistogramOpts::new(
                "role_matchmaker_formation_duration_seconds",
                "Formation attempt duration",
            )
            .buckets(vec![0.00001, 0.0001, 0.001, 0.01, 0.1]),
            &["operation"],
        )?;
        registry.register(Box::new(formation_duration.clone()))?;

        Ok(Self { formation_duration })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        // Test that we can access all metric groups
        let _queue = collector.queue();
        let _formation = collector.formation();
        let _performance = collector.performance();
    }

    #[test]
    fn test_queue_recording() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_player_queued(Role::Tank);
        collector.record_player_queued(Role::Tank);
        collector.update_waiting(Role::Tank, 2);

        let queued = collector
            .queue()
            .players_queued_total
            .with_label_values(&["TANK"])
            .get();
        assert_eq!(queued, 2);
        assert_eq!(
            collector
                .queue()
                .players_waiting
                .with_label_values(&["TANK"])
                .get(),
            2
        );
    }

    #[test]
    fn test_failure_recording() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_formation_failure(
            "match",
            &FormationError::MissingRequiredRole { role: Role::Healer },
            Duration::from_micros(20),
        );

        let failures = collector
            .formation()
            .formation_failures_total
            .with_label_values(&["match", "missing_required_role"])
            .get();
        assert_eq!(failures, 1);

        let text = collector.gather_text().unwrap();
        assert!(text.contains("role_matchmaker_formation_failures_total"));
    }

    #[test]
    fn test_metrics_timer() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        let timer = collector.start_timer();

        std::thread::sleep(Duration::from_millis(10));
        let duration = timer.elapsed();

        assert!(duration >= Duration::from_millis(10));

        let final_duration = timer.stop();
        assert!(final_duration >= Duration::from_millis(10));
    }
}
