use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Display format for the date of a reading (en-NG style)
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Display format for the time of a reading
pub const TIME_FORMAT: &str = "%H:%M";

/// Domain model for a blood pressure reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Unique, creation-ordered identifier
    pub id: i64,

    /// Systolic blood pressure (the higher number)
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: u16,

    /// Pulse rate in beats per minute
    pub pulse: u16,

    /// Optional notes about the reading
    pub notes: Option<String>,

    /// Whether medication was taken
    pub medication: bool,

    /// When the reading was created
    pub timestamp: DateTime<Utc>,

    /// Display date, fixed at creation
    pub date: String,

    /// Display time, fixed at creation
    pub time: String,
}

impl Reading {
    /// Timestamp as stored: RFC 3339 UTC with millisecond precision
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Sum of systolic and diastolic pressure
    pub fn combined_pressure(&self) -> u32 {
        u32::from(self.systolic) + u32::from(self.diastolic)
    }
}

/// Input for a new reading as entered on the form.
///
/// The numeric fields are optional so that a missing value is reported as a
/// validation error instead of a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewReading {
    /// Systolic blood pressure (the higher number)
    #[validate(
        required(message = "Systolic value is required"),
        range(min = 1, message = "Systolic must be a positive number")
    )]
    pub systolic: Option<u16>,

    /// Diastolic blood pressure (the lower number)
    #[validate(
        required(message = "Diastolic value is required"),
        range(min = 1, message = "Diastolic must be a positive number")
    )]
    pub diastolic: Option<u16>,

    /// Pulse rate in beats per minute
    #[validate(
        required(message = "Pulse value is required"),
        range(min = 1, message = "Pulse must be a positive number")
    )]
    pub pulse: Option<u16>,

    /// Optional notes about the reading
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    /// Whether medication was taken
    #[serde(default)]
    pub medication: bool,
}

/// Render the display date for an instant in the given offset
pub fn display_date(timestamp: DateTime<Utc>, offset: FixedOffset) -> String {
    timestamp.with_timezone(&offset).format(DATE_FORMAT).to_string()
}

/// Render the display time for an instant in the given offset
pub fn display_time(timestamp: DateTime<Utc>, offset: FixedOffset) -> String {
    timestamp.with_timezone(&offset).format(TIME_FORMAT).to_string()
}

/// Normalize free text: blank notes are no notes
pub fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.and_then(|n| {
        let trimmed = n.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_strings_use_offset() {
        let ts = Utc.with_ymd_and_hms(2025, 12, 31, 23, 30, 0).unwrap();
        let wat = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(display_date(ts, wat), "01/01/2026");
        assert_eq!(display_time(ts, wat), "00:30");
    }

    #[test]
    fn test_missing_fields_fail_validation() {
        let input = NewReading {
            systolic: Some(120),
            diastolic: None,
            pulse: Some(70),
            ..NewReading::default()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("diastolic"));
    }

    #[test]
    fn test_zero_values_fail_validation() {
        let input = NewReading {
            systolic: Some(0),
            diastolic: Some(80),
            pulse: Some(70),
            ..NewReading::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_complete_input_passes_validation() {
        let input = NewReading {
            systolic: Some(120),
            diastolic: Some(80),
            pulse: Some(70),
            notes: Some("morning".to_string()),
            medication: true,
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_normalize_notes() {
        assert_eq!(normalize_notes(Some("  ".to_string())), None);
        assert_eq!(normalize_notes(Some(" tired ".to_string())), Some("tired".to_string()));
        assert_eq!(normalize_notes(None), None);
    }

    #[test]
    fn test_timestamp_iso_matches_browser_format() {
        let reading = Reading {
            id: 1,
            systolic: 120,
            diastolic: 80,
            pulse: 70,
            notes: None,
            medication: false,
            timestamp: Utc.with_ymd_and_hms(2025, 10, 16, 9, 20, 0).unwrap(),
            date: String::new(),
            time: String::new(),
        };
        assert_eq!(reading.timestamp_iso(), "2025-10-16T09:20:00.000Z");
        assert_eq!(reading.combined_pressure(), 200);
    }
}
