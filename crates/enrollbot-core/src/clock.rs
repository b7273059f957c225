//! Wall-clock abstraction.
//!
//! Every suspension point in the pipeline (countdown tiers, backoff,
//! settle pause) goes through [`Clock`] so tests can drive time
//! deterministically instead of sleeping for real.

use chrono::{Local, NaiveDateTime};
use std::time::Duration;

/// Local wall clock plus thread suspension.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
    fn sleep(&self, duration: Duration);
}

/// Real local-time clock backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
