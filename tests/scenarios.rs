//! Cross-cutting properties that don't belong to any one module's own
//! test file.

use proptest::prelude::*;
use tneuron_core::signal::{DeliveryTarget, Signal, ScheduledDelivery};
use tneuron_core::{SignalScheduler, Time, UnitId};
use std::sync::Arc;

struct NullTarget;
impl DeliveryTarget for NullTarget {
    fn receive(&self, _signal: Signal) -> Result<(), String> {
        Ok(())
    }
}

proptest! {
    /// A rejected schedule leaves size == capacity and bumps total_dropped
    /// by exactly one.
    #[test]
    fn overflow_bookkeeping_tracks_size_and_drop_count(capacity in 1usize..20, extra in 0usize..20) {
        let scheduler = SignalScheduler::new(capacity);
        let target: Arc<dyn DeliveryTarget> = Arc::new(NullTarget);

        for i in 0..capacity {
            let accepted = scheduler.schedule(ScheduledDelivery::new(
                Signal::new(i as f64, Time::ZERO, UnitId::new("a"), UnitId::new("b")),
                target.clone(),
                Time::from_millis(i as u64),
                0,
            ));
            prop_assert!(accepted);
        }

        let mut expected_dropped = 0u64;
        for i in 0..extra {
            let accepted = scheduler.schedule(ScheduledDelivery::new(
                Signal::new(i as f64, Time::ZERO, UnitId::new("a"), UnitId::new("b")),
                target.clone(),
                Time::from_millis((capacity + i) as u64),
                0,
            ));
            prop_assert!(!accepted);
            expected_dropped += 1;
            let stats = scheduler.stats();
            prop_assert_eq!(stats.size, capacity);
            prop_assert_eq!(stats.total_dropped, expected_dropped);
        }
    }

    /// Every accepted entry is delivered exactly once, at or after its
    /// delivery time.
    #[test]
    fn every_accepted_entry_delivered_exactly_once(
        delivery_times in prop::collection::vec(0u64..1000, 1..30),
    ) {
        let received = Arc::new(std::sync::Mutex::new(Vec::new()));
        struct RecordingTarget(Arc<std::sync::Mutex<Vec<f64>>>);
        impl DeliveryTarget for RecordingTarget {
            fn receive(&self, signal: Signal) -> Result<(), String> {
                self.0.lock().unwrap().push(signal.value);
                Ok(())
            }
        }

        let scheduler = SignalScheduler::new(delivery_times.len() + 1);
        let target: Arc<dyn DeliveryTarget> = Arc::new(RecordingTarget(received.clone()));

        for (i, &ms) in delivery_times.iter().enumerate() {
            let accepted = scheduler.schedule(ScheduledDelivery::new(
                Signal::new(i as f64, Time::ZERO, UnitId::new("a"), UnitId::new("b")),
                target.clone(),
                Time::from_millis(ms),
                0,
            ));
            prop_assert!(accepted);
        }

        let max_time = delivery_times.iter().max().copied().unwrap_or(0);
        let delivered = scheduler.drain(Time::from_millis(max_time));
        prop_assert_eq!(delivered, delivery_times.len());
        prop_assert_eq!(received.lock().unwrap().len(), delivery_times.len());
    }
}
