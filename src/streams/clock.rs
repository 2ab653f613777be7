//! Wall-clock access
//!
//! The cost stream derives its month filter and synthetic fields from the
//! current date, so the date source is injectable.

use chrono::{NaiveDate, Utc};

/// Source of the current date
pub trait Clock: Send + Sync {
    /// Today's date in UTC
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock frozen at one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
