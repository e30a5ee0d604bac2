//! Time sources for the session engine.
//!
//! Wall-clock timestamps come from a [`Clock`]; the once-per-second driving
//! signal comes from a [`TickSource`]. Both are injected so tests can step
//! time without sleeping.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, time: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = time;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Periodic driving signal for an active session
///
/// A session is only ticked while it is active; pausing simply stops
/// asking the source for ticks.
pub trait TickSource {
    /// Block until the next tick is due. Returns false once the source is exhausted.
    fn wait_for_tick(&mut self) -> bool;

    /// Forget any pending schedule so the next tick is a full interval away
    fn reset(&mut self) {}
}

/// Real-time ticker with drift-free scheduling
///
/// Each deadline is computed from the previous one rather than from the
/// time the caller returned, so slow handlers do not accumulate lag.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: std::time::Duration,
    next_deadline: Option<Instant>,
}

impl IntervalTicker {
    pub fn new(interval: std::time::Duration) -> Self {
        Self {
            interval,
            next_deadline: None,
        }
    }

    pub fn every_second() -> Self {
        Self::new(std::time::Duration::from_secs(1))
    }
}

impl TickSource for IntervalTicker {
    fn wait_for_tick(&mut self) -> bool {
        let interval = self.interval;
        let deadline = *self
            .next_deadline
            .get_or_insert_with(|| Instant::now() + interval);

        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }

        self.next_deadline = Some(deadline + self.interval);
        true
    }

    fn reset(&mut self) {
        self.next_deadline = None;
    }
}

/// Delivers ticks immediately, optionally up to a fixed count
#[derive(Clone, Debug, Default)]
pub struct StepTicker {
    limit: Option<u64>,
    delivered: u64,
}

impl StepTicker {
    /// Never runs out
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Delivers exactly `count` ticks, then reports exhaustion
    pub fn bounded(count: u64) -> Self {
        Self {
            limit: Some(count),
            delivered: 0,
        }
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

impl TickSource for StepTicker {
    fn wait_for_tick(&mut self) -> bool {
        if self.limit.is_some_and(|limit| self.delivered >= limit) {
            return false;
        }
        self.delivered += 1;
        true
    }
}
