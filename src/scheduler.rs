//! Per-unit signal scheduler: a bounded priority queue of scheduled
//! deliveries, modelling axonal propagation delay.

use crate::signal::ScheduledDelivery;
use crate::time::Time;
use parking_lot::Mutex;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// A point-in-time snapshot of scheduler statistics, always well-formed
/// even on an empty or closed scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerStats {
    /// Number of entries currently resident
    pub size: usize,
    /// Delivery time of the head entry, if any
    pub next_delivery_time: Option<Time>,
    /// Total entries ever accepted by `schedule`
    pub total_scheduled: u64,
    /// Total entries ever delivered by `drain`
    pub total_delivered: u64,
    /// Total entries rejected because the queue was full
    pub total_dropped: u64,
    /// Average nanoseconds between scheduling and delivery, across all
    /// delivered entries
    pub avg_latency_ns: u64,
}

/// Bounded min-heap of [`ScheduledDelivery`] entries, keyed on
/// `delivery_time` ascending with `priority` descending as the tie-break.
///
/// Single-owner in intent (a unit's own tick loop drives `drain`), but
/// `schedule` may be called concurrently from any thread :
/// the heap is guarded by a `parking_lot::Mutex`, while the hot-path
/// counters are plain atomics so `stats()` never has to contend with a
/// concurrent `schedule`/`drain` for the common case of just reading
/// counters.
pub struct SignalScheduler {
    heap: Mutex<BinaryHeap<ScheduledDelivery>>,
    max_queue_size: usize,
    next_sequence: AtomicU64,
    size: AtomicUsize,
    total_scheduled: AtomicU64,
    total_delivered: AtomicU64,
    total_dropped: AtomicU64,
    total_latency_ns: AtomicU64,
}

impl SignalScheduler {
    /// Create a new scheduler bounded to `max_queue_size` resident entries.
    pub fn new(max_queue_size: usize) -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            max_queue_size,
            next_sequence: AtomicU64::new(0),
            size: AtomicUsize::new(0),
            total_scheduled: AtomicU64::new(0),
            total_delivered: AtomicU64::new(0),
            total_dropped: AtomicU64::new(0),
            total_latency_ns: AtomicU64::new(0),
        }
    }

    /// Enqueue a delivery. Rejects and counts a drop if the queue is at
    /// `max_queue_size` — the newly arriving entry is dropped, not the
    /// oldest resident one.
    pub fn schedule(&self, mut entry: ScheduledDelivery) -> bool {
        let mut heap = self.heap.lock();
        if heap.len() >= self.max_queue_size {
            self.total_dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        entry.sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        heap.push(entry);
        self.size.store(heap.len(), Ordering::Relaxed);
        self.total_scheduled.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Pop and deliver every entry whose `delivery_time <= now`, in
    /// `(delivery_time ASC, priority DESC, insertion FIFO)` order. A
    /// `target.receive` failure is counted but does not stop the drain.
    /// Returns the number delivered.
    pub fn drain(&self, now: Time) -> usize {
        let mut due = Vec::new();
        {
            let mut heap = self.heap.lock();
            while let Some(head) = heap.peek() {
                if head.delivery_time > now {
                    break;
                }
                due.push(heap.pop().expect("peeked entry must pop"));
            }
            self.size.store(heap.len(), Ordering::Relaxed);
        }

        let delivered = due.len();
        for entry in due {
            let latency_ns = now.as_nanos().saturating_sub(entry.delivery_time.as_nanos());
            self.total_latency_ns.fetch_add(latency_ns, Ordering::Relaxed);
            self.total_delivered.fetch_add(1, Ordering::Relaxed);

            if let Err(err) = entry.target.receive(entry.message) {
                log::warn!("scheduled delivery failed: {err}");
            }
        }

        delivered
    }

    /// Current resident entry count
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    /// True if no entries are resident
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A well-formed statistics snapshot, safe to call at any time
    /// including after the owning unit has closed.
    pub fn stats(&self) -> SchedulerStats {
        let next_delivery_time = self.heap.lock().peek().map(|e| e.delivery_time);
        let total_delivered = self.total_delivered.load(Ordering::Relaxed);
        let total_latency_ns = self.total_latency_ns.load(Ordering::Relaxed);
        let avg_latency_ns = if total_delivered > 0 {
            total_latency_ns / total_delivered
        } else {
            0
        };

        SchedulerStats {
            size: self.len(),
            next_delivery_time,
            total_scheduled: self.total_scheduled.load(Ordering::Relaxed),
            total_delivered,
            total_dropped: self.total_dropped.load(Ordering::Relaxed),
            avg_latency_ns,
        }
    }
}
