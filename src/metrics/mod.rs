//! Metrics for the role-matchmaker engine
//!
//! Prometheus counters, gauges and histograms for queue supply and
//! formation outcomes.

pub mod collector;

pub use collector::{
    FormationMetrics, MetricsCollector, MetricsTimer, PerformanceMetrics, QueueMetrics,
};
