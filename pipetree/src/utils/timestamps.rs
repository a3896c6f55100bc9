//! Timestamp utilities.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Represents a timestamp that can be serialized/deserialized.
pub type Timestamp = DateTime<Utc>;

/// Returns the current UTC time as an ISO 8601 formatted string.
///
/// Format: `YYYY-MM-DDTHH:MM:SS.ffffff+00:00`
///
/// # Examples
///
/// ```
/// use pipetree::utils::iso_timestamp;
///
/// let ts = iso_timestamp();
/// assert!(ts.contains('T'));
/// assert!(ts.ends_with("+00:00"));
/// ```
#[must_use]
pub fn iso_timestamp() -> String {
    format_iso8601(&Utc::now())
}

/// Formats a timestamp as ISO 8601 with microsecond precision.
#[must_use]
pub fn format_iso8601(dt: &Timestamp) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

/// Converts a filesystem time (e.g. a modification time) into a UTC timestamp.
#[must_use]
pub fn from_system_time(time: SystemTime) -> Timestamp {
    DateTime::<Utc>::from(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_format_iso8601() {
        let ts = from_system_time(UNIX_EPOCH + Duration::from_millis(1_500));
        assert_eq!(format_iso8601(&ts), "1970-01-01T00:00:01.500000+00:00");
    }

    #[test]
    fn test_iso_timestamp_shape() {
        let ts = iso_timestamp();
        assert!(ts.contains('T'));
        assert!(ts.ends_with("+00:00"));
    }
}
