use chrono::{DateTime, Duration, Utc};

/// Where the services layer reads the current time from.
///
/// The engine itself never asks for the time: mastery updates, selection and
/// session turns all receive `now` from the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// Wall-clock UTC.
    #[default]
    System,
    /// Always reports the same instant.
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match *self {
            Self::System => Utc::now(),
            Self::Fixed(at) => at,
        }
    }
}

/// Seconds since the Unix epoch of the instant used throughout the tests.
pub const TEST_EPOCH_SECS: i64 = 1_700_000_000;

/// 2023-11-14T22:13:20Z.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(TEST_EPOCH_SECS)
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
