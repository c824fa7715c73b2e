//! Wall-clock reassignment windows.
//!
//! A `TimeBlock` is the composite `YYYYMMDDHHmm` with the minute rounded down
//! to the window width, so later windows always compare greater.

use chrono::{Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TimeBlock(pub u64);

impl TimeBlock {
    pub fn from_datetime<T: Datelike + Timelike>(at: &T, bucket_minutes: u32) -> Self {
        let width = bucket_minutes.clamp(1, 60);
        let minute = (at.minute() / width) * width;
        let year = u64::from(at.year().max(0) as u32);
        Self(
            year * 100_000_000
                + u64::from(at.month()) * 1_000_000
                + u64::from(at.day()) * 10_000
                + u64::from(at.hour()) * 100
                + u64::from(minute),
        )
    }

    pub fn now(bucket_minutes: u32) -> Self {
        Self::from_datetime(&Local::now(), bucket_minutes)
    }

    /// Never-assigned sentinel; every real window is after it.
    pub fn is_unset(self) -> bool {
        self.0 == 0
    }
}
