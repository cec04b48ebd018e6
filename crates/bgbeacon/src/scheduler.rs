//! Duty cycle scheduling
//!
//! The scheduler turns advertising on at the start of every period and off
//! again after the configured duration. Cycles are anchored to when they
//! began, so command latency never pushes later cycles back.

use crate::beacon::BeaconParameters;
use crate::bgapi::transport::{ResponseValidator, Transport};
use crate::radio::{RadioController, RadioState};
use chrono::{DateTime, Local};
use log::{debug, info, warn};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Longest stretch the scheduler sleeps before checking for cancellation
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Wait before retrying a failed start when not duty cycling
pub const RUN_ONCE_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Source of time for the scheduler
pub trait Clock {
    fn now(&self) -> Instant;

    /// Local wall clock time, used to timestamp events
    fn wall_time(&self) -> DateTime<Local>;

    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn wall_time(&self) -> DateTime<Local> {
        (**self).wall_time()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// The real clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_time(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Shared flag asking the scheduler to wind down
#[derive(Debug, Default, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Duty cycle transitions reported to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEvent {
    Start,
    Stop,
}

impl fmt::Display for CycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleEvent::Start => write!(f, "Start"),
            CycleEvent::Stop => write!(f, "Stop"),
        }
    }
}

/// Notified every time advertising starts or stops
pub trait CycleObserver {
    fn on_event(&mut self, at: DateTime<Local>, event: CycleEvent);
}

/// Observer that writes each transition to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl CycleObserver for LogObserver {
    fn on_event(&mut self, at: DateTime<Local>, event: CycleEvent) {
        match event {
            CycleEvent::Start => info!("-> [{}] iBeacon advertisements started", at),
            CycleEvent::Stop => info!("<- [{}] iBeacon advertisements stopped", at),
        }
    }
}

/// What the scheduler is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
    Advertising,
    Idle,
}

/// Counters from one scheduler run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles where advertising actually started
    pub cycles: u64,
    /// Cycles where a start or stop sequence failed
    pub failed_cycles: u64,
}

/// Repeats the advertising window until cancelled
pub struct DutyCycleScheduler<'a, C: Clock> {
    params: &'a BeaconParameters,
    clock: C,
    token: CancellationToken,
    observers: Vec<Box<dyn CycleObserver + 'a>>,
    poll_interval: Duration,
    state: SchedulerState,
}

impl<'a, C: Clock> DutyCycleScheduler<'a, C> {
    pub fn new(params: &'a BeaconParameters, clock: C, token: CancellationToken) -> Self {
        Self {
            params,
            clock,
            token,
            observers: Vec::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            state: SchedulerState::Stopped,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn add_observer(&mut self, observer: impl CycleObserver + 'a) {
        self.observers.push(Box::new(observer));
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Run cycles until the token is cancelled.
    ///
    /// Transport failures inside a cycle are logged and the radio is forced
    /// idle; the next cycle starts on schedule. On cancellation the radio is
    /// stopped before returning unless it is already idle.
    pub fn run<T: Transport, V: ResponseValidator>(
        &mut self,
        radio: &mut RadioController<T, V>,
    ) -> RunSummary {
        let duty_cycle = self.params.duty_cycle();
        let mut summary = RunSummary::default();
        self.state = SchedulerState::Running;

        if duty_cycle.is_run_once() {
            info!("Advertising until interrupted");
        } else {
            info!(
                "Duty cycle: advertise {}s every {}s",
                duty_cycle.duration().as_secs(),
                duty_cycle.period().as_secs()
            );
        }

        while !self.token.is_cancelled() {
            let cycle_start = self.clock.now();

            self.state = SchedulerState::Advertising;
            let started = radio.start(self.params);
            self.warn_if_cancelled_mid_sequence();

            if let Err(e) = started {
                warn!("Failed to start advertising: {}", e);
                summary.failed_cycles += 1;
                self.recover(radio);

                self.state = SchedulerState::Idle;
                let retry_at = if duty_cycle.is_run_once() {
                    cycle_start.checked_add(RUN_ONCE_RETRY_DELAY)
                } else {
                    cycle_start.checked_add(duty_cycle.period())
                };
                if !self.wait_until(retry_at) {
                    break;
                }
                continue;
            }

            summary.cycles += 1;
            self.notify(CycleEvent::Start);

            // A deadline past the end of the clock means advertise until cancelled
            let advertise_until = if duty_cycle.is_run_once() {
                None
            } else {
                cycle_start.checked_add(duty_cycle.duration())
            };
            let finished = self.wait_until(advertise_until);

            let stopped = radio.stop();
            if finished {
                self.warn_if_cancelled_mid_sequence();
            }
            match stopped {
                Ok(()) => self.notify(CycleEvent::Stop),
                Err(e) => {
                    warn!("Failed to stop advertising: {}", e);
                    summary.failed_cycles += 1;
                    self.recover(radio);
                }
            }

            self.state = SchedulerState::Idle;
            if !finished || !self.wait_until(cycle_start.checked_add(duty_cycle.period())) {
                break;
            }
        }

        if radio.state() != RadioState::Idle {
            info!("Stopping advertising before exit");
            if let Err(e) = radio.stop() {
                warn!("Radio may still be advertising: {}", e);
            }
        }

        self.state = SchedulerState::Stopped;
        debug!(
            "Scheduler stopped after {} cycles ({} failed)",
            summary.cycles, summary.failed_cycles
        );
        summary
    }

    /// One fresh stop attempt after a failed sequence
    fn recover<T: Transport, V: ResponseValidator>(&self, radio: &mut RadioController<T, V>) {
        if let Err(e) = radio.stop() {
            warn!("Recovery stop failed, radio state is {}: {}", radio.state(), e);
        }
    }

    fn warn_if_cancelled_mid_sequence(&self) {
        if self.token.is_cancelled() {
            warn!("Interrupted during a command sequence; the radio may not be idle");
        }
    }

    /// Sleep until `deadline`, or until cancelled when there is none.
    ///
    /// Returns false if cancelled first.
    fn wait_until(&self, deadline: Option<Instant>) -> bool {
        loop {
            if self.token.is_cancelled() {
                return false;
            }

            let step = match deadline {
                Some(deadline) => {
                    let now = self.clock.now();
                    if now >= deadline {
                        return true;
                    }
                    (deadline - now).min(self.poll_interval)
                }
                None => self.poll_interval,
            };
            self.clock.sleep(step);
        }
    }

    fn notify(&mut self, event: CycleEvent) {
        let at = self.clock.wall_time();
        for observer in self.observers.iter_mut() {
            observer.on_event(at, event);
        }
    }
}
