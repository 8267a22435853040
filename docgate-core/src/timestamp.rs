//! Fixed-timezone timestamps and the clocks that produce them.
//!
//! Every system timestamp written through the access layer is computed for UTC+9,
//! regardless of the caller's local timezone, truncated to millisecond precision,
//! and stored as the backend's native timestamp type ([`bson::DateTime`]).
//!
//! The stored value is the true instant. The `+09:00` offset lives on [`Timestamp`]
//! and decides its calendar fields and display, never the persisted value.

use bson::Bson;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
};

/// Offset applied to every system timestamp (UTC+9).
pub const FIXED_OFFSET_SECONDS: i32 = 9 * 3600;

/// The fixed `+09:00` offset.
pub fn fixed_offset() -> FixedOffset {
    FixedOffset::east_opt(FIXED_OFFSET_SECONDS).expect("UTC+9 is within the valid offset range")
}

/// A point in time presented in the fixed `+09:00` offset, millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// Current wall-clock time.
    pub fn now() -> Self {
        SystemClock.now()
    }

    /// Converts a UTC instant, dropping sub-millisecond precision.
    pub fn from_utc(at: DateTime<Utc>) -> Self {
        let truncated = DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at);

        Self(truncated.with_timezone(&fixed_offset()))
    }

    /// Builds a timestamp from milliseconds since the Unix epoch.
    ///
    /// Returns `None` when the value is outside the representable range.
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self::from_utc)
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    pub fn to_bson_datetime(&self) -> bson::DateTime {
        bson::DateTime::from_millis(self.timestamp_millis())
    }

    pub fn from_bson_datetime(value: bson::DateTime) -> Option<Self> {
        Self::from_millis(value.timestamp_millis())
    }

    /// Reads a native timestamp out of a raw field value.
    pub fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::DateTime(dt) => Self::from_bson_datetime(*dt),
            _ => None,
        }
    }
}

impl From<Timestamp> for Bson {
    fn from(value: Timestamp) -> Self {
        Bson::DateTime(value.to_bson_datetime())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_bson_datetime().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = bson::DateTime::deserialize(deserializer)?;

        Timestamp::from_bson_datetime(value)
            .ok_or_else(|| D::Error::custom("timestamp out of range"))
    }
}

/// Source of "now" for timestamp stamping.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Timestamp;
}

/// Reads the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_utc(Utc::now())
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a clone handed to a store can be
/// advanced from the test that owns the original.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn starting_at(at: Timestamp) -> Self {
        Self { millis: Arc::new(AtomicI64::new(at.timestamp_millis())) }
    }

    pub fn set(&self, at: Timestamp) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance_millis(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let millis = self.millis.load(Ordering::SeqCst);

        Timestamp::from_millis(millis)
            .unwrap_or_else(|| Timestamp::from_utc(DateTime::<Utc>::UNIX_EPOCH))
    }
}

/// Shared, type-erased clock handle.
pub type SharedClock = Arc<dyn Clock>;
