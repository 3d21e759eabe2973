//! Wall-clock access and calendar keys.
//!
//! The engine never reads the system time directly. Every operation asks a
//! [`Clock`] once, at the start of each attempt, and derives the day and
//! month keys from that single reading. Tests drive time with
//! [`ManualClock`].

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, FixedOffset, Utc};

/// Errors that can occur while deriving calendar keys.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The configured UTC offset is not a valid timezone offset.
    #[error("invalid UTC offset: {minutes} minutes")]
    InvalidOffset {
        /// The rejected offset.
        minutes: i32,
    },
}

/// A source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can hold one handle while the
/// engine owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(start.timestamp_millis())),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }

    /// Move forward (or backward, for a negative delta).
    pub fn advance(&self, by: Duration) {
        let delta = by.num_milliseconds();
        let _ = self
            .millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |ms| {
                Some(ms.saturating_add(delta))
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

/// Day and month keys for one instant in the configured timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarKeys {
    /// `YYYY-MM-DD`.
    pub day_key: String,
    /// `YYYY-MM`.
    pub month_key: String,
}

impl CalendarKeys {
    /// Derive the keys for `now` shifted by `utc_offset_minutes`.
    pub fn at(now: DateTime<Utc>, utc_offset_minutes: i32) -> Result<Self, ClockError> {
        Ok(Self::in_offset(now, utc_offset(utc_offset_minutes)?))
    }

    /// Derive the keys for `now` in a resolved offset.
    pub fn in_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local = now.with_timezone(&offset);
        Self {
            day_key: local.format("%Y-%m-%d").to_string(),
            month_key: local.format("%Y-%m").to_string(),
        }
    }
}

/// Resolve a minute offset into a timezone offset.
pub fn utc_offset(minutes: i32) -> Result<FixedOffset, ClockError> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or(ClockError::InvalidOffset { minutes })
}
