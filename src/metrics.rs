//! Well-formed statistics snapshots, queryable at any time including after
//! a unit has closed.

use crate::scheduler::SchedulerStats;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Health snapshot reported upward via
/// [`crate::callbacks::NeuronCallbacks::report_health`] and queryable
/// directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthMetrics {
    /// Observed firing rate in Hz over the unit's activity window
    pub activity_level: f64,
    /// Number of outward synapses currently wired
    pub connection_count: usize,
    /// Total fires since construction
    pub total_fires: u64,
    /// Total inbound signals dropped (capacity or numerical)
    pub total_dropped_signals: u64,
    /// Total outward `Transmit` callback failures
    pub total_failed_transmits: u64,
    /// Total `ApplyPlasticity` callback failures
    pub total_failed_plasticity: u64,
}

/// Inbound/outbound queue occupancy and drop counters, always readable
/// even on a closed unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueStats {
    /// Current inbound queue occupancy
    pub input_queue_size: usize,
    /// Inbound queue capacity
    pub input_queue_capacity: usize,
    /// Total inbound signals dropped because the queue was full
    pub input_queue_dropped: u64,
    /// The scheduler's own stats
    pub scheduler: SchedulerStats,
}

/// Atomic counters a [`crate::unit::Unit`] updates on its hot path without
/// taking the unit's own lock.
#[derive(Debug, Default)]
pub struct UnitMetrics {
    total_fires: AtomicU64,
    total_dropped_signals: AtomicU64,
    total_dropped_input_queue: AtomicU64,
    total_failed_transmits: AtomicU64,
    total_failed_plasticity: AtomicU64,
    connection_count: AtomicUsize,
}

impl UnitMetrics {
    /// Construct a fresh, zeroed metrics block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fire.
    pub fn record_fire(&self) {
        self.total_fires.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dropped inbound signal (numerical or capacity failure on
    /// the operator ingestion path, not the queue itself).
    pub fn record_dropped_signal(&self) {
        self.total_dropped_signals.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a signal dropped because the inbound queue was full.
    pub fn record_dropped_input_queue(&self) {
        self.total_dropped_input_queue
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed `Transmit` call.
    pub fn record_failed_transmit(&self) {
        self.total_failed_transmits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed `ApplyPlasticity` call.
    pub fn record_failed_plasticity(&self) {
        self.total_failed_plasticity
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Set the current outward connection count.
    pub fn set_connection_count(&self, count: usize) {
        self.connection_count.store(count, Ordering::Relaxed);
    }

    /// Total fires recorded so far.
    pub fn total_fires(&self) -> u64 {
        self.total_fires.load(Ordering::Relaxed)
    }

    /// Total signals dropped, across both numerical and queue-capacity
    /// reasons.
    pub fn total_dropped_signals(&self) -> u64 {
        self.total_dropped_signals.load(Ordering::Relaxed)
            + self.total_dropped_input_queue.load(Ordering::Relaxed)
    }

    /// Total failed `Transmit` callback invocations.
    pub fn total_failed_transmits(&self) -> u64 {
        self.total_failed_transmits.load(Ordering::Relaxed)
    }

    /// Total failed `ApplyPlasticity` callback invocations.
    pub fn total_failed_plasticity(&self) -> u64 {
        self.total_failed_plasticity.load(Ordering::Relaxed)
    }

    /// Build a [`HealthMetrics`] snapshot given the current observed rate.
    pub fn health_snapshot(&self, activity_level: f64) -> HealthMetrics {
        HealthMetrics {
            activity_level,
            connection_count: self.connection_count.load(Ordering::Relaxed),
            total_fires: self.total_fires(),
            total_dropped_signals: self.total_dropped_signals(),
            total_failed_transmits: self.total_failed_transmits(),
            total_failed_plasticity: self.total_failed_plasticity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_start_at_zero() {
        let metrics = UnitMetrics::new();
        let snapshot = metrics.health_snapshot(0.0);
        assert_eq!(snapshot.total_fires, 0);
        assert_eq!(snapshot.total_dropped_signals, 0);
    }

    #[test]
    fn test_fires_and_drops_accumulate() {
        let metrics = UnitMetrics::new();
        metrics.record_fire();
        metrics.record_fire();
        metrics.record_dropped_signal();
        metrics.record_dropped_input_queue();

        let snapshot = metrics.health_snapshot(5.0);
        assert_eq!(snapshot.total_fires, 2);
        assert_eq!(snapshot.total_dropped_signals, 2);
        assert_eq!(snapshot.activity_level, 5.0);
    }

    #[test]
    fn test_failed_callbacks_are_observable() {
        let metrics = UnitMetrics::new();
        metrics.record_failed_transmit();
        metrics.record_failed_transmit();
        metrics.record_failed_plasticity();

        assert_eq!(metrics.total_failed_transmits(), 2);
        assert_eq!(metrics.total_failed_plasticity(), 1);

        let snapshot = metrics.health_snapshot(0.0);
        assert_eq!(snapshot.total_failed_transmits, 2);
        assert_eq!(snapshot.total_failed_plasticity, 1);
    }

    #[test]
    fn test_connection_count_reported() {
        let metrics = UnitMetrics::new();
        metrics.set_connection_count(3);
        assert_eq!(metrics.health_snapshot(0.0).connection_count, 3);
    }
}
