// Copyright (c) 2024 Mike Tsao

use crate::traits::Clock;
use core::{cell::Cell, time::Duration};
use std::time::Instant;

/// A [Clock] that reads the system's monotonic clock.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}
impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}
impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn yield_now(&self) {
        std::thread::yield_now();
    }
}

/// A [Clock] that only moves when it's read or asked to sleep, so that
/// real-time playback runs instantly and identically every time.
///
/// Each call to [Clock::now()] moves time forward by `step` and then reports
/// it. [Clock::sleep()] moves time forward by exactly the requested amount.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Duration>,
    step: Cell<Duration>,
}
impl Default for ManualClock {
    fn default() -> Self {
        Self::new_with_step(Self::DEFAULT_STEP)
    }
}
impl ManualClock {
    /// How far [Clock::now()] advances unless told otherwise.
    pub const DEFAULT_STEP: Duration = Duration::from_millis(1);

    /// Creates a clock at time zero that advances `step` per read.
    pub fn new_with_step(step: Duration) -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            step: Cell::new(step),
        }
    }

    /// The current time, without advancing it.
    pub fn peek(&self) -> Duration {
        self.now.get()
    }

    /// Moves time forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }

    /// Changes how far each read advances time.
    pub fn set_step(&self, step: Duration) {
        self.step.set(step);
    }
}
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.advance(self.step.get());
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
