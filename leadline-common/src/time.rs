//! Operating-day utilities
//!
//! The operating day is the local calendar date: daily counters reset at
//! local midnight, not at a fixed UTC offset.

use chrono::{Local, NaiveDate};

/// Current operating day (local calendar date)
pub fn operating_day() -> NaiveDate {
    Local::now().date_naive()
}
