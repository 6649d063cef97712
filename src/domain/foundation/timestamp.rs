//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC, at microsecond precision.
///
/// PostgreSQL `timestamptz` keeps microseconds, so every constructor
/// truncates to that precision. A value then compares equal before and
/// after a database round trip, in either session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "DateTime<Utc>", into = "DateTime<Utc>")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>, dropping sub-microsecond digits.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_micros(dt))
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Creates a new timestamp by adding the specified number of seconds.
    pub fn plus_secs(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }
}

fn truncate_to_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(dt.timestamp_micros()).unwrap_or(dt)
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn fixed(rfc3339: &str) -> Timestamp {
        Timestamp::from_datetime(
            DateTime::parse_from_rfc3339(rfc3339)
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Timestamp::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts >= before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn timestamp_ordering_works() {
        let t0 = fixed("2024-01-15T10:30:00Z");
        let t1 = fixed("2024-01-15T10:45:00Z");

        assert!(t0 < t1);
        assert!(t1 > t0);
    }

    #[test]
    fn duration_since_is_signed() {
        let t0 = fixed("2024-01-15T10:30:00Z");
        let t1 = t0.plus_secs(90);

        assert_eq!(t1.duration_since(&t0).num_seconds(), 90);
        assert_eq!(t0.duration_since(&t1).num_seconds(), -90);
    }

    #[test]
    fn deserializes_offset_timestamps_to_utc() {
        let ts: Timestamp = serde_json::from_str("\"2024-01-15T12:30:00+02:00\"").unwrap();
        assert_eq!(ts.as_datetime().hour(), 10);
        assert_eq!(ts.as_datetime().year(), 2024);
    }

    #[test]
    fn construction_drops_sub_microsecond_digits() {
        let ts = fixed("2024-01-15T10:30:00.123456789Z");
        assert_eq!(ts.as_datetime().nanosecond(), 123_456_000);
    }

    #[test]
    fn now_is_microsecond_precise() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond() % 1_000, 0);
    }

    #[test]
    fn deserialization_truncates_to_micros() {
        let ts: Timestamp = serde_json::from_str("\"2024-01-15T10:30:00.654321987Z\"").unwrap();
        assert_eq!(ts.as_datetime().nanosecond(), 654_321_000);
        assert_eq!(
            serde_json::to_string(&ts).unwrap(),
            "\"2024-01-15T10:30:00.654321Z\""
        );
    }
}
