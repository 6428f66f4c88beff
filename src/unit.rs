//! The per-unit actor: inbound queue, decay-tick loop, dendritic
//! integration, firing, and the homeostatic/STDP/scheduler advance steps
//! that run on each tick.

use crate::callbacks::{NeuronCallbacks, OutputCallback};
use crate::config::{DendriticKind, UnitConfig};
use crate::dendrite::{
    ActiveNonlinearOperator, DendriticOperator, PassiveOperator, ShuntingOperator,
    TemporalSummationOperator,
};
use crate::homeostatic::HomeostaticController;
use crate::ids::UnitId;
use crate::metrics::{HealthMetrics, QueueStats, UnitMetrics};
use crate::scheduler::SignalScheduler;
use crate::signal::{DeliveryTarget, MembraneSnapshot, Signal};
use crate::stdp::StdpController;
use crate::time::{Clock, Duration, Time};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Lifecycle state of a [`Unit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    /// Constructed but not yet started
    Initialized,
    /// The loop thread is running
    Running,
    /// `Close` was requested; draining in-flight work
    Closing,
    /// Fully stopped; all further inbound signals are dropped
    Closed,
}

impl UnitState {
    fn label(self) -> &'static str {
        match self {
            UnitState::Initialized => "Initialized",
            UnitState::Running => "Running",
            UnitState::Closing => "Closing",
            UnitState::Closed => "Closed",
        }
    }
}

/// A control message sent to a running unit's loop thread.
enum Control {
    /// Reconfigure the fire threshold
    SetThreshold(f64),
    /// Cooperative shutdown request
    Close,
}

/// Mutable state owned exclusively by the unit's loop thread, guarded by
/// a single lock so outside queries (health, firing rate) can take a
/// consistent snapshot without racing the loop.
struct UnitInner {
    accumulator: f64,
    threshold: f64,
    decay_rate: f64,
    last_fire_time: Option<Time>,
    operator: Box<dyn DendriticOperator>,
    homeostatic: HomeostaticController,
    stdp: StdpController,
    outputs: Vec<Arc<dyn OutputCallback>>,
    state: UnitState,
}

/// An actor-per-unit runtime instance. Owns a dedicated OS thread that
/// drives its own tick loop with `std::thread` + `crossbeam_channel::select!`
/// rather than an async runtime; all outside interaction happens through a
/// cloneable [`UnitHandle`].
pub struct Unit {
    handle: UnitHandle,
    join_handle: Option<JoinHandle<()>>,
}

/// The outward-facing, cloneable handle to a running [`Unit`]. Safe to
/// share across producer threads; never owns the unit's loop thread
/// directly.
#[derive(Clone)]
pub struct UnitHandle {
    id: UnitId,
    inbound: Sender<Signal>,
    control: Sender<Control>,
    inner: Arc<Mutex<UnitInner>>,
    scheduler: Arc<SignalScheduler>,
    metrics: Arc<UnitMetrics>,
    clock: Arc<dyn Clock>,
    input_queue_capacity: usize,
    input_queue_size: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl Unit {
    /// Construct and start a unit. Spawns its dedicated loop thread
    /// immediately, transitioning `Initialized -> Running`.
    pub fn spawn(
        config: UnitConfig,
        callbacks: Arc<dyn NeuronCallbacks>,
        outputs: Vec<Arc<dyn OutputCallback>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let operator: Box<dyn DendriticOperator> = match config.dendritic {
            DendriticKind::Passive => Box::new(PassiveOperator::new()),
            DendriticKind::TemporalSummation => Box::new(TemporalSummationOperator::new()),
            DendriticKind::Shunting(shunting, bio) => {
                Box::new(ShuntingOperator::new(shunting, bio))
            }
            DendriticKind::Active(active, bio) => {
                Box::new(ActiveNonlinearOperator::new(active, bio))
            }
        };

        let homeostatic = HomeostaticController::new(
            config.target_firing_rate,
            config.homeostasis_strength,
            config.threshold,
            config.activity_window,
        );
        let stdp = StdpController::new(config.stdp_config);

        let inner = Arc::new(Mutex::new(UnitInner {
            accumulator: 0.0,
            threshold: config.threshold,
            decay_rate: config.decay_rate,
            last_fire_time: None,
            operator,
            homeostatic,
            stdp,
            outputs,
            state: UnitState::Initialized,
        }));

        let (inbound_tx, inbound_rx) = channel::bounded::<Signal>(config.input_buffer_capacity);
        let (control_tx, control_rx) = channel::unbounded::<Control>();
        let scheduler = Arc::new(SignalScheduler::new(config.max_scheduled_signals));
        let metrics = Arc::new(UnitMetrics::new());

        let handle = UnitHandle {
            id: config.id.clone(),
            inbound: inbound_tx,
            control: control_tx,
            inner: inner.clone(),
            scheduler: scheduler.clone(),
            metrics: metrics.clone(),
            clock: clock.clone(),
            input_queue_capacity: config.input_buffer_capacity,
            input_queue_size: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        };

        inner.lock().state = UnitState::Running;
        callbacks.report_state_change(UnitState::Initialized.label(), UnitState::Running.label());

        let loop_handle = handle.clone();
        let decay_interval = config.decay_interval;
        let fire_factor = config.fire_factor;
        let refractory_period = config.refractory_period;
        let close_drain_deadline = config.close_drain_deadline;
        let callbacks_for_loop = callbacks;

        let join_handle = std::thread::Builder::new()
            .name(format!("unit-{}", config.id))
            .spawn(move || {
                run_loop(
                    loop_handle,
                    inbound_rx,
                    control_rx,
                    decay_interval,
                    fire_factor,
                    refractory_period,
                    close_drain_deadline,
                    callbacks_for_loop,
                )
            })
            .expect("failed to spawn unit loop thread");

        Self {
            handle,
            join_handle: Some(join_handle),
        }
    }

    /// A cloneable handle to this unit, for wiring into synapses/producers.
    pub fn handle(&self) -> UnitHandle {
        self.handle.clone()
    }

    /// Request a cooperative close and block until the loop thread exits.
    pub fn close_and_join(mut self) {
        self.handle.close();
        if let Some(join_handle) = self.join_handle.take() {
            let _ = join_handle.join();
        }
    }
}

impl UnitHandle {
    /// This unit's identity.
    pub fn id(&self) -> &UnitId {
        &self.id
    }

    /// Deliver a signal. Post-`Close`, signals are silently dropped and
    /// counted. Uses a non-blocking `try_send`; a full queue is also
    /// dropped and counted.
    pub fn deliver(&self, signal: Signal) {
        if self.closed.load(Ordering::Acquire) {
            self.metrics.record_dropped_input_queue();
            return;
        }

        match self.inbound.try_send(signal) {
            Ok(()) => {
                self.input_queue_size.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.metrics.record_dropped_input_queue();
            }
        }
    }

    /// Request the unit reconfigure its fire threshold.
    pub fn set_threshold(&self, threshold: f64) {
        let _ = self.control.send(Control::SetThreshold(threshold));
    }

    /// Request a cooperative, idempotent close.
    pub fn close(&self) {
        let _ = self.control.send(Control::Close);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> UnitState {
        self.inner.lock().state
    }

    /// Current fire threshold.
    pub fn threshold(&self) -> f64 {
        self.inner.lock().threshold
    }

    /// A well-formed health snapshot, safe to call at any time including
    /// after `Close`.
    pub fn health_metrics(&self) -> HealthMetrics {
        let inner = self.inner.lock();
        let rate = inner.homeostatic.current_rate();
        self.metrics.health_snapshot(rate)
    }

    /// A well-formed queue-occupancy snapshot, safe to call at any time.
    pub fn queue_stats(&self) -> QueueStats {
        QueueStats {
            input_queue_size: self.input_queue_size.load(Ordering::Relaxed),
            input_queue_capacity: self.input_queue_capacity,
            input_queue_dropped: self.metrics.total_dropped_signals(),
            scheduler: self.scheduler.stats(),
        }
    }

    /// Current observed firing rate in Hz.
    pub fn current_firing_rate(&self) -> f64 {
        self.inner.lock().homeostatic.current_rate()
    }
}

#[allow(clippy::too_many_arguments)]
fn run_loop(
    handle: UnitHandle,
    inbound_rx: Receiver<Signal>,
    control_rx: Receiver<Control>,
    decay_interval: Duration,
    fire_factor: f64,
    refractory_period: Duration,
    close_drain_deadline: Duration,
    callbacks: Arc<dyn NeuronCallbacks>,
) {
    let tick = channel::tick(std::time::Duration::from(decay_interval));
    let mut last_tick_time = handle.clock.now();

    loop {
        channel::select! {
            recv(inbound_rx) -> msg => {
                if let Ok(signal) = msg {
                    handle.input_queue_size.fetch_sub(1, Ordering::Relaxed);
                    handle_inbound_signal(&handle, signal);
                }
            }
            recv(tick) -> _ => {
                let now = handle.clock.now();
                let elapsed = now.saturating_since(last_tick_time);
                last_tick_time = now;
                run_decay_tick(&handle, now, elapsed, fire_factor, refractory_period, &callbacks);
            }
            recv(control_rx) -> msg => {
                match msg {
                    Ok(Control::SetThreshold(threshold)) => {
                        let mut inner = handle.inner.lock();
                        inner.threshold = threshold;
                    }
                    Ok(Control::Close) | Err(_) => {
                        close_loop(&handle, close_drain_deadline, &callbacks);
                        return;
                    }
                }
            }
        }

        if handle.inner.lock().state == UnitState::Closed {
            return;
        }
    }
}

fn handle_inbound_signal(handle: &UnitHandle, signal: Signal) {
    if handle.inner.lock().state == UnitState::Closed {
        handle.metrics.record_dropped_input_queue();
        return;
    }

    if !signal.is_finite() {
        handle.metrics.record_dropped_signal();
        return;
    }

    let source_id = signal.source_id.clone();
    let timestamp = signal.timestamp;

    let immediate = {
        let mut inner = handle.inner.lock();
        let result = panic::catch_unwind(AssertUnwindSafe(|| inner.operator.handle(&signal)));
        match result {
            Ok(potential) => {
                inner.stdp.handle(&source_id, timestamp);
                potential
            }
            Err(_) => {
                log::error!("dendritic operator panicked handling an inbound signal");
                None
            }
        }
    };

    if let Some(potential) = immediate {
        let mut inner = handle.inner.lock();
        inner.accumulator += potential.net_input;
    }
}

fn run_decay_tick(
    handle: &UnitHandle,
    now: Time,
    elapsed: Duration,
    fire_factor: f64,
    refractory_period: Duration,
    callbacks: &Arc<dyn NeuronCallbacks>,
) {
    let mut inner = handle.inner.lock();
    if inner.state == UnitState::Closed {
        return;
    }

    inner.accumulator *= inner.decay_rate;

    let snapshot = MembraneSnapshot {
        accumulator: inner.accumulator,
        current_threshold: inner.threshold,
    };
    let processed = panic::catch_unwind(AssertUnwindSafe(|| inner.operator.process(snapshot)));
    match processed {
        Ok(Some(potential)) => inner.accumulator += potential.net_input,
        Ok(None) => {}
        Err(_) => log::error!("dendritic operator panicked during process()"),
    }

    let in_refractory = inner
        .last_fire_time
        .map(|last| now.saturating_since(last) < refractory_period)
        .unwrap_or(false);

    if !in_refractory && inner.accumulator >= inner.threshold {
        fire(&mut inner, handle, now, fire_factor, callbacks);
    }

    if !inner.homeostatic.is_disabled() {
        inner.threshold = inner.homeostatic.advance(now, elapsed, inner.threshold);
    } else {
        inner.threshold = inner.homeostatic.base_threshold();
    }

    drop(inner);
    handle.scheduler.drain(now);
}

fn fire(
    inner: &mut UnitInner,
    handle: &UnitHandle,
    now: Time,
    fire_factor: f64,
    callbacks: &Arc<dyn NeuronCallbacks>,
) {
    inner.last_fire_time = Some(now);
    inner.homeostatic.on_fire(now);
    handle.metrics.record_fire();

    let magnitude = inner.accumulator * fire_factor;

    let adjustments = inner.stdp.on_fire(now);
    for adjustment in &adjustments {
        let synapse_id = crate::ids::SynapseId::new(adjustment.source_id.as_str().to_string());
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            callbacks.apply_plasticity(&synapse_id, adjustment)
        }));
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                log::warn!("plasticity callback failed: {err}");
                handle.metrics.record_failed_plasticity();
            }
            Err(_) => {
                log::error!("plasticity callback panicked");
                handle.metrics.record_failed_plasticity();
            }
        }
    }

    handle.metrics.set_connection_count(inner.outputs.len());

    for output in inner.outputs.clone() {
        let delay = output.delay();
        if delay == Duration::ZERO {
            let result = panic::catch_unwind(AssertUnwindSafe(|| output.transmit(magnitude)));
            match result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    log::warn!("transmit failed: {err}");
                    handle.metrics.record_failed_transmit();
                }
                Err(_) => {
                    log::error!("output callback panicked on transmit");
                    handle.metrics.record_failed_transmit();
                }
            }
        } else {
            let target_id = output.target_id();
            let delivery_target: Arc<dyn DeliveryTarget> = Arc::new(DeferredTransmit { output });
            let entry = crate::signal::ScheduledDelivery::new(
                Signal::new(magnitude, now, handle.id.clone(), target_id),
                delivery_target,
                now.advance(delay),
                0,
            );
            handle.scheduler.schedule(entry);
        }
    }

    callbacks.report_health(
        inner.homeostatic.current_rate(),
        inner.outputs.len(),
    );

    inner.accumulator = 0.0;
}

/// Adapts an [`OutputCallback`] to the scheduler's [`DeliveryTarget`]
/// contract, for outputs whose synapse delay routes them through the
/// scheduler instead of an immediate transmit.
struct DeferredTransmit {
    output: Arc<dyn OutputCallback>,
}

impl DeliveryTarget for DeferredTransmit {
    fn receive(&self, signal: Signal) -> Result<(), String> {
        self.output
            .transmit(signal.value)
            .map_err(|err| err.to_string())
    }
}

fn close_loop(handle: &UnitHandle, drain_deadline: Duration, callbacks: &Arc<dyn NeuronCallbacks>) {
    let previous_state = {
        let mut inner = handle.inner.lock();
        if inner.state == UnitState::Closed {
            return;
        }
        let previous = inner.state;
        inner.state = UnitState::Closing;
        previous
    };
    callbacks.report_state_change(previous_state.label(), UnitState::Closing.label());
    handle.closed.store(true, Ordering::Release);

    let deadline = handle.clock.now().advance(drain_deadline);
    loop {
        let now = handle.clock.now();
        handle.scheduler.drain(now);
        if handle.scheduler.is_empty() || now >= deadline {
            break;
        }
    }

    handle.inner.lock().state = UnitState::Closed;
    callbacks.report_state_change(UnitState::Closing.label(), UnitState::Closed.label());
}

/// Blocks on a channel for up to a timeout, used only where `select!`
/// isn't appropriate. Kept as a thin wrapper so call sites read as an
/// ordinary blocking receive (retained for future suspension points that
/// don't fit the `select!` shape used in `run_loop`).
#[allow(dead_code)]
fn recv_with_timeout<T>(rx: &Receiver<T>, timeout: std::time::Duration) -> Option<T> {
    match rx.recv_timeout(timeout) {
        Ok(value) => Some(value),
        Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
    }
}
