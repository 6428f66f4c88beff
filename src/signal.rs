//! Wire-shape value types: the signals units exchange, the potentials the
//! dendritic operators emit, and the scheduled-delivery envelope the
//! [`crate::scheduler::SignalScheduler`] orders on.

use crate::ids::UnitId;
use crate::time::Time;
use std::cmp::Ordering;

/// A timed input event delivered to a unit, as produced by an upstream synapse.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Signal magnitude
    pub value: f64,
    /// When the signal was emitted
    pub timestamp: Time,
    /// The synapse/unit that produced this signal
    pub source_id: UnitId,
    /// The unit this signal is addressed to
    pub target_id: UnitId,
    /// Optional neuromodulator/ligand tag carried alongside the value
    pub ligand_tag: Option<String>,
}

impl Signal {
    /// Construct a new signal
    pub fn new(value: f64, timestamp: Time, source_id: UnitId, target_id: UnitId) -> Self {
        Self {
            value,
            timestamp,
            source_id,
            target_id,
            ligand_tag: None,
        }
    }

    /// Attach a ligand tag to this signal
    pub fn with_ligand_tag(mut self, tag: impl Into<String>) -> Self {
        self.ligand_tag = Some(tag.into());
        self
    }

    /// A signal is numerically well-formed when its value is finite.
    /// Callers on the ingestion path  drop signals that fail this check rather than forwarding
    /// them to a dendritic operator.
    pub fn is_finite(&self) -> bool {
        self.value.is_finite()
    }
}

/// The integrated potential a dendritic operator emits for one tick, or for
/// one inbound event in the passive operator's case. `None` means "no
/// result this call" — distinct from `Some(IntegratedPotential { net_input:
/// 0.0, .. })`, which the temporal-summation operator relies on to signal
/// that a tick touched the buffer even though the sum came out to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratedPotential {
    /// The net integrated input to add to the unit's accumulator
    pub net_input: f64,
    /// The time this potential was computed
    pub timestamp: Time,
}

impl IntegratedPotential {
    /// Construct a new integrated potential
    pub fn new(net_input: f64, timestamp: Time) -> Self {
        Self {
            net_input,
            timestamp,
        }
    }
}

/// Read-only view of a unit's integration state, passed to a dendritic
/// operator's `process` call so it can make threshold-aware decisions
/// (e.g. the active-nonlinear operator's dendritic-spike boost) without
/// being granted write access to unit state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MembraneSnapshot {
    /// Current accumulator value
    pub accumulator: f64,
    /// Current firing threshold
    pub current_threshold: f64,
}

/// Upper bound on any value flowing through the integration pipeline.
/// "`|netInput| <= 1e12` is the documented sanity bound;
/// results above are clamped and tagged."
pub const SANITY_BOUND: f64 = 1e12;

/// Clamp a value to `[-SANITY_BOUND, SANITY_BOUND]`, returning whether
/// clamping was necessary (the caller uses this to tag a metric, per
/// : "the clamp triggers a metric but not an error").
pub fn clamp_to_sanity_bound(value: f64) -> (f64, bool) {
    if value > SANITY_BOUND {
        (SANITY_BOUND, true)
    } else if value < -SANITY_BOUND {
        (-SANITY_BOUND, true)
    } else {
        (value, false)
    }
}

/// A handle an entry in the scheduler delivers to once its `delivery_time`
/// has passed. Implemented by whatever owns the recipient unit's inbound
/// channel; kept as a trait object so the scheduler never needs to know
/// about `Unit` directly.
pub trait DeliveryTarget: Send + Sync {
    /// Deliver a signal that has reached its scheduled time.
    /// Failures are counted by the caller, never propagated.
    fn receive(&self, signal: Signal) -> Result<(), String>;
}

/// An entry awaiting delivery in a [`crate::scheduler::SignalScheduler`].
///
/// Ordered primarily by `delivery_time` ascending, then by `priority`
/// descending, then by insertion order ascending . `std::collections::BinaryHeap` is
/// a max-heap, so [`Ord`] is implemented to make the *smallest*
/// `delivery_time` compare as the *greatest* element.
pub struct ScheduledDelivery {
    /// The signal to deliver
    pub message: Signal,
    /// Where to deliver it
    pub target: std::sync::Arc<dyn DeliveryTarget>,
    /// When it should be delivered
    pub delivery_time: Time,
    /// Tie-break priority; higher fires first among equal delivery times
    pub priority: i32,
    /// Monotonic insertion sequence, the final tie-break (FIFO of insertion)
    pub(crate) sequence: u64,
}

impl ScheduledDelivery {
    /// Construct a new scheduled delivery. `sequence` is assigned by the
    /// scheduler at `schedule()` time, not by the caller.
    pub fn new(
        message: Signal,
        target: std::sync::Arc<dyn DeliveryTarget>,
        delivery_time: Time,
        priority: i32,
    ) -> Self {
        Self {
            message,
            target,
            delivery_time,
            priority,
            sequence: 0,
        }
    }
}

impl PartialEq for ScheduledDelivery {
    fn eq(&self, other: &Self) -> bool {
        self.delivery_time == other.delivery_time
            && self.priority == other.priority
            && self.sequence == other.sequence
    }
}

impl Eq for ScheduledDelivery {}

impl Ord for ScheduledDelivery {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse delivery_time so BinaryHeap (a max-heap) pops the
        // earliest delivery_time first.
        other
            .delivery_time
            .cmp(&self.delivery_time)
            .then_with(|| self.priority.cmp(&other.priority))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for ScheduledDelivery {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UnitId {
        UnitId::new(s)
    }

    #[test]
    fn test_signal_finiteness() {
        let ok = Signal::new(1.0, Time::ZERO, uid("a"), uid("b"));
        assert!(ok.is_finite());

        let nan = Signal::new(f64::NAN, Time::ZERO, uid("a"), uid("b"));
        assert!(!nan.is_finite());

        let inf = Signal::new(f64::INFINITY, Time::ZERO, uid("a"), uid("b"));
        assert!(!inf.is_finite());
    }

    #[test]
    fn test_clamp_to_sanity_bound() {
        let (v, clamped) = clamp_to_sanity_bound(1e13);
        assert_eq!(v, SANITY_BOUND);
        assert!(clamped);

        let (v, clamped) = clamp_to_sanity_bound(-1e13);
        assert_eq!(v, -SANITY_BOUND);
        assert!(clamped);

        let (v, clamped) = clamp_to_sanity_bound(5.0);
        assert_eq!(v, 5.0);
        assert!(!clamped);
    }

    struct NullTarget;
    impl DeliveryTarget for NullTarget {
        fn receive(&self, _signal: Signal) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn test_scheduled_delivery_ordering_by_time() {
        let target: std::sync::Arc<dyn DeliveryTarget> = std::sync::Arc::new(NullTarget);
        let mut a = ScheduledDelivery::new(
            Signal::new(1.0, Time::ZERO, uid("a"), uid("b")),
            target.clone(),
            Time::from_millis(100),
            0,
        );
        let mut b = ScheduledDelivery::new(
            Signal::new(1.0, Time::ZERO, uid("a"), uid("b")),
            target,
            Time::from_millis(50),
            0,
        );
        a.sequence = 0;
        b.sequence = 1;

        // Earlier delivery_time compares greater, so BinaryHeap pops it first.
        assert!(b > a);
    }

    #[test]
    fn test_scheduled_delivery_priority_tiebreak() {
        let target: std::sync::Arc<dyn DeliveryTarget> = std::sync::Arc::new(NullTarget);
        let low_priority = ScheduledDelivery::new(
            Signal::new(1.0, Time::ZERO, uid("a"), uid("b")),
            target.clone(),
            Time::from_millis(100),
            1,
        );
        let high_priority = ScheduledDelivery::new(
            Signal::new(1.0, Time::ZERO, uid("a"), uid("b")),
            target,
            Time::from_millis(100),
            5,
        );

        // Same delivery_time: higher priority compares greater (pops first).
        assert!(high_priority > low_priority);
    }
}
