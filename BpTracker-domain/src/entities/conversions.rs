use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use bp_tracker_data::models::{ReadingRecord, StoredTimestamp};

use crate::entities::reading::{display_date, display_time, normalize_notes, Reading};

/// Conversion functions between domain entities and storage records
/// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Helper function to parse a stored timestamp into a UTC instant
///
/// Accepts RFC 3339 text or epoch milliseconds.
pub fn parse_stored_timestamp(timestamp: &StoredTimestamp) -> Result<DateTime<Utc>, String> {
    match timestamp {
        StoredTimestamp::Millis(ms) => Utc
            .timestamp_millis_opt(*ms)
            .single()
            .ok_or_else(|| format!("Invalid epoch milliseconds: {}", ms)),
        StoredTimestamp::Text(text) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| format!("Invalid timestamp format {}: {}", text, e)),
    }
}

/// Convert from storage record to domain entity.
///
/// Records with non-positive measurements or an unreadable timestamp are
/// rejected. Missing display strings are derived from the timestamp.
pub fn convert_to_domain_reading(record: ReadingRecord, offset: FixedOffset) -> Result<Reading, String> {
    let systolic = measurement(record.id, "systolic", record.systolic)?;
    let diastolic = measurement(record.id, "diastolic", record.diastolic)?;
    let pulse = measurement(record.id, "pulse", record.pulse)?;
    let timestamp = parse_stored_timestamp(&record.timestamp)?;

    let date = if record.date.is_empty() {
        display_date(timestamp, offset)
    } else {
        record.date
    };
    let time = if record.time.is_empty() {
        display_time(timestamp, offset)
    } else {
        record.time
    };

    Ok(Reading {
        id: record.id,
        systolic,
        diastolic,
        pulse,
        notes: normalize_notes(Some(record.notes)),
        medication: record.medication,
        timestamp,
        date,
        time,
    })
}

fn measurement(id: i64, name: &str, value: i64) -> Result<u16, String> {
    match u16::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(format!("Reading {} has an out-of-range {}: {}", id, name, value)),
    }
}

/// Convert from domain entity to storage record
pub fn convert_to_data_record(reading: &Reading) -> ReadingRecord {
    ReadingRecord {
        id: reading.id,
        systolic: i64::from(reading.systolic),
        diastolic: i64::from(reading.diastolic),
        pulse: i64::from(reading.pulse),
        notes: reading.notes.clone().unwrap_or_default(),
        medication: reading.medication,
        timestamp: StoredTimestamp::Text(reading.timestamp_iso()),
        date: reading.date.clone(),
        time: reading.time.clone(),
    }
}
