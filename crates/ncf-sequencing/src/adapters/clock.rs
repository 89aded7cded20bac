//! Clock adapters for [`TimeSource`].

use chrono::{Local, NaiveDate};
use parking_lot::RwLock;

use crate::ports::outbound::TimeSource;

/// Local calendar date of the host.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Settable clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    today: RwLock<NaiveDate>,
}

impl FixedClock {
    /// Clock pinned to `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: RwLock::new(today),
        }
    }

    /// Move the clock to `today`.
    pub fn set(&self, today: NaiveDate) {
        *self.today.write() = today;
    }
}

impl TimeSource for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.read()
    }
}
