//! Homeostatic stabilization, plus the disable-snaps-to-base and
//! threshold-bounds invariants.

use tneuron_core::homeostatic::HomeostaticController;
use tneuron_core::{Duration, Time};

#[test]
fn homeostatic_stabilization_raises_threshold_above_base() {
    let base_threshold = 1.0;
    let mut ctrl = HomeostaticController::new(5.0, 0.3, base_threshold, Duration::from_millis(1000));

    let mut threshold = base_threshold;
    let mut now = Time::ZERO;
    let tick = Duration::from_millis(10);

    // Simulate a stream that would otherwise produce roughly 20 Hz
    // (one fire every ~50ms) across 5 simulated seconds.
    for i in 0..500u64 {
        now = now.advance(tick);
        if i % 5 == 0 {
            ctrl.on_fire(now);
        }
        threshold = ctrl.advance(now, tick, threshold);
    }

    assert!(threshold > base_threshold, "expected threshold to rise above base, got {threshold}");
    let rate = ctrl.current_rate();
    assert!((rate - 5.0).abs() <= 2.0, "expected rate within 2Hz of target, got {rate}");
}

#[test]
fn disabling_then_reading_threshold_returns_base_exactly() {
    let base_threshold = 1.5;
    let mut ctrl = HomeostaticController::new(0.0, 0.0, base_threshold, Duration::from_millis(5000));
    let updated = ctrl.advance(Time::from_millis(100), Duration::from_millis(10), 9.0);
    assert_eq!(updated, base_threshold);
}

#[test]
fn threshold_stays_within_bounds_when_enabled() {
    let base_threshold = 1.0;
    let mut ctrl = HomeostaticController::new(100.0, 5.0, base_threshold, Duration::from_millis(100));
    let (min, max) = ctrl.bounds();

    let mut threshold = base_threshold;
    let mut now = Time::ZERO;
    for i in 0..200u64 {
        now = now.advance(Duration::from_millis(5));
        if i % 2 == 0 {
            ctrl.on_fire(now);
        }
        threshold = ctrl.advance(now, Duration::from_millis(5), threshold);
        assert!(threshold >= min && threshold <= max);
    }
}
