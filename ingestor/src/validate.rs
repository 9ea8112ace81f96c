use crate::errors::{Error, Result};
use crate::model::{NewReading, ReadingInput};
use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Readings are stamped in India Standard Time (UTC+05:30).
pub const IST_OFFSET_MINUTES: i64 = 330;

pub const MISSING_FIELDS: &str = "Missing one or more sensor fields.";

/// Ingestion timestamp for a reading received at `now`.
///
/// The wall clock is shifted forward by [`IST_OFFSET_MINUTES`] and written in
/// `Z` notation with millisecond precision. The fixed width keeps lexical
/// order equal to chronological order.
pub fn ingest_timestamp(now: DateTime<Utc>) -> String {
    (now + Duration::minutes(IST_OFFSET_MINUTES)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Validates an incoming reading and stamps it for storage
pub fn validate(input: &ReadingInput, now: DateTime<Utc>) -> Result<NewReading> {
    match (input.temperature, input.humidity, input.air_quality) {
        (Some(temperature), Some(humidity), Some(air_quality)) => Ok(NewReading {
            temperature,
            humidity,
            air_quality,
            timestamp: ingest_timestamp(now),
        }),
        _ => Err(Error::Validation(MISSING_FIELDS.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn input(temperature: Option<f64>, humidity: Option<f64>, air_quality: Option<f64>) -> ReadingInput {
        ReadingInput {
            temperature,
            humidity,
            air_quality,
        }
    }

    #[test]
    fn test_valid_reading() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
        let reading = validate(&input(Some(25.5), Some(60.2), Some(95.0)), now).unwrap();

        assert_eq!(reading.temperature, 25.5);
        assert_eq!(reading.humidity, 60.2);
        assert_eq!(reading.air_quality, 95.0);
        assert_eq!(reading.timestamp, "2024-03-10T13:30:00.000Z");
    }

    #[test]
    fn test_zero_values_are_present() {
        let reading = validate(&input(Some(0.0), Some(0.0), Some(0.0)), Utc::now());

        assert!(reading.is_ok());
    }

    #[test]
    fn test_missing_temperature() {
        let result = validate(&input(None, Some(60.0), Some(95.0)), Utc::now());

        assert!(matches!(result, Err(Error::Validation(msg)) if msg == MISSING_FIELDS));
    }

    #[test]
    fn test_missing_humidity() {
        assert!(validate(&input(Some(25.0), None, Some(95.0)), Utc::now()).is_err());
    }

    #[test]
    fn test_missing_air_quality() {
        assert!(validate(&input(Some(25.0), Some(60.0), None), Utc::now()).is_err());
    }

    #[test]
    fn test_null_fields_deserialize_as_missing() {
        let parsed: ReadingInput =
            serde_json::from_str(r#"{"temperature": null, "humidity": 0, "air_quality": 90}"#)
                .unwrap();

        assert_eq!(parsed.temperature, None);
        assert_eq!(parsed.humidity, Some(0.0));
        assert!(validate(&parsed, Utc::now()).is_err());
    }

    #[test]
    fn test_timestamp_crosses_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 20, 45, 10).unwrap()
            + Duration::milliseconds(7);

        assert_eq!(ingest_timestamp(now), "2025-01-01T02:15:10.007Z");
    }
}
