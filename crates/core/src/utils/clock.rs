//! Injectable wall-clock abstraction.
//!
//! Everything in the engine that compares against "now" (due plans,
//! days-until-due, execution timestamps) goes through [`Clock`], so tests can
//! drive the calendar deterministically instead of depending on wall-clock
//! timing.

use std::sync::Mutex;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Source of the current instant for the engine.
pub trait Clock: Send + Sync {
    /// The current instant as a naive UTC timestamp.
    fn now(&self) -> NaiveDateTime;

    /// The current calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// The current time of day.
    fn time_of_day(&self) -> NaiveTime {
        self.now().time()
    }
}

/// Production clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// A clock pinned to a fixed instant, adjustable from tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Pins the clock to a new instant.
    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap() = now;
    }

    /// Moves the clock forward by the given duration.
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += duration;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}
