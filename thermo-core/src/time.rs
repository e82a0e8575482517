//! Timestamp parsing and formatting at the request boundary.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::ForecastError;

/// Output format: ISO-8601 without timezone or sub-second precision.
pub const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an inbound timestamp.
///
/// Offset-qualified inputs keep the wall-clock time of their own offset, so
/// `2024-03-15T10:00:00+02:00` yields `2024-03-15T10:00:00`. A bare date is
/// taken as midnight.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ForecastError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Ok(dt.naive_local());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ForecastError::InvalidInput(format!("unparseable timestamp '{value}'")))
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(OUTPUT_FORMAT).to_string()
}

/// Human label for a forecast horizon: `"1h 20min"` from an hour up, `"40min"` below.
pub fn interval_label(offset_minutes: i64) -> String {
    if offset_minutes >= 60 {
        format!("{}h {}min", offset_minutes / 60, offset_minutes % 60)
    } else {
        format!("{offset_minutes}min")
    }
}

/// Serde adapter for [`NaiveDateTime`] in [`OUTPUT_FORMAT`].
pub mod iso_seconds {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::OUTPUT_FORMAT;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&ts.format(OUTPUT_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, OUTPUT_FORMAT).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, OUTPUT_FORMAT).unwrap()
    }

    #[test]
    fn parses_naive_iso() {
        assert_eq!(parse_timestamp("2024-03-15T10:00:00").unwrap(), ts("2024-03-15T10:00:00"));
        assert_eq!(parse_timestamp("2024-03-15 10:00:00").unwrap(), ts("2024-03-15T10:00:00"));
        assert_eq!(parse_timestamp("2024-03-15T10:05").unwrap(), ts("2024-03-15T10:05:00"));
    }

    #[test]
    fn parses_date_only_as_midnight() {
        assert_eq!(parse_timestamp("2024-03-15").unwrap(), ts("2024-03-15T00:00:00"));
    }

    #[test]
    fn offset_inputs_keep_their_wall_clock() {
        assert_eq!(
            parse_timestamp("2024-03-15T10:00:00+02:00").unwrap(),
            ts("2024-03-15T10:00:00")
        );
        assert_eq!(parse_timestamp("2024-03-15T10:00:00Z").unwrap(), ts("2024-03-15T10:00:00"));
    }

    #[test]
    fn accepts_offsets_without_colon() {
        assert_eq!(
            parse_timestamp("2024-03-15T10:00:00+0200").unwrap(),
            ts("2024-03-15T10:00:00")
        );
        assert_eq!(
            parse_timestamp("2024-03-15 10:00:00.250-0300").unwrap(),
            ts("2024-03-15T10:00:00") + chrono::Duration::milliseconds(250)
        );
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_timestamp("not a date").unwrap_err();
        assert!(matches!(err, ForecastError::InvalidInput(_)));
        assert!(err.to_string().contains("not a date"));
    }

    #[test]
    fn formatting_drops_sub_seconds() {
        let parsed = parse_timestamp("2024-03-15T10:00:07.345").unwrap();
        assert_eq!(format_timestamp(&parsed), "2024-03-15T10:00:07");
    }

    #[test]
    fn interval_labels() {
        assert_eq!(interval_label(20), "20min");
        assert_eq!(interval_label(40), "40min");
        assert_eq!(interval_label(60), "1h 0min");
        assert_eq!(interval_label(80), "1h 20min");
    }
}
