use std::{cmp::Ordering, time::Instant};

use serde::{Deserialize, Serialize};

/// Source of the current time in seconds, supplied by the host.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Manually advanced clock. Deterministic, so tests and offline simulation
/// drive indicators with it.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    pub time_seconds: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.time_seconds = 0.0;
    }

    pub fn advance(&mut self, delta: f64) {
        self.time_seconds = (self.time_seconds + delta).max(0.0);
    }

    pub fn set(&mut self, time_seconds: f64) {
        self.time_seconds = time_seconds.max(0.0);
    }
}

impl Clock for FrameClock {
    fn now(&self) -> f64 {
        self.time_seconds
    }
}

/// Monotonic wall clock measured from its creation.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::start()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Cancellation token. Work scheduled under an older generation is ignored.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// Continuation that should run once the clock reaches `due`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTick {
    pub due: f64,
    pub generation: Generation,
}

impl ScheduledTick {
    pub fn new(due: f64, generation: Generation) -> Self {
        Self { due, generation }
    }
}

/// Time-ordered queue of pending continuations.
#[derive(Debug, Default)]
pub struct Scheduler {
    ticks: Vec<ScheduledTick>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, tick: ScheduledTick) {
        // Insert after every tick due at the same time so equal deadlines keep
        // their scheduling order.
        let index = self.ticks.partition_point(|queued| {
            queued.due.partial_cmp(&tick.due).unwrap_or(Ordering::Less) != Ordering::Greater
        });
        self.ticks.insert(index, tick);
    }

    pub fn schedule_after(&mut self, now: f64, delay: f64, generation: Generation) {
        self.schedule(ScheduledTick::new(now + delay.max(0.0), generation));
    }

    /// Removes and returns the earliest tick due at `now` that belongs to
    /// `current`. Stale ticks encountered on the way are discarded.
    pub fn pop_due(&mut self, now: f64, current: Generation) -> Option<ScheduledTick> {
        while let Some(tick) = self.ticks.first().copied() {
            if tick.due > now {
                return None;
            }
            self.ticks.remove(0);
            if tick.generation == current {
                return Some(tick);
            }
            tracing::trace!(
                due = tick.due,
                generation = tick.generation.value(),
                "dropping stale tick"
            );
        }
        None
    }

    pub fn next_due(&self) -> Option<f64> {
        self.ticks.first().map(|tick| tick.due)
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn clear(&mut self) {
        self.ticks.clear();
    }
}
