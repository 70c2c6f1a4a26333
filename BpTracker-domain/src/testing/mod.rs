// Testing utilities for the domain layer
// This module is only available when the "mock" feature is enabled

// Re-export useful test mocks from the data layer
pub use bp_tracker_data::storage::tests::MockKeyValueStore;

use bp_tracker_data::models::encode_readings;
use bp_tracker_data::storage::READINGS_KEY;
use chrono::{FixedOffset, Offset, TimeZone, Utc};

use crate::entities::conversions::convert_to_data_record;
use crate::entities::reading::{display_date, display_time, NewReading, Reading};

/// Valid form input
pub fn sample_input(systolic: u16, diastolic: u16, pulse: u16) -> NewReading {
    NewReading {
        systolic: Some(systolic),
        diastolic: Some(diastolic),
        pulse: Some(pulse),
        notes: None,
        medication: false,
    }
}

/// A reading created at epoch millisecond `id`, displayed in West Africa Time
pub fn sample_reading(id: i64, systolic: u16, diastolic: u16, pulse: u16) -> Reading {
    let timestamp = Utc.timestamp_millis_opt(id).single().unwrap_or_default();
    let offset = FixedOffset::east_opt(3600).unwrap_or(Utc.fix());
    Reading {
        id,
        systolic,
        diastolic,
        pulse,
        notes: None,
        medication: false,
        timestamp,
        date: display_date(timestamp, offset),
        time: display_time(timestamp, offset),
    }
}

/// Mock store already holding `readings` under the readings key
pub fn seeded_store(readings: &[Reading]) -> MockKeyValueStore {
    let records: Vec<_> = readings.iter().map(convert_to_data_record).collect();
    let raw = encode_readings(&records).unwrap_or_else(|_| "[]".to_string());
    MockKeyValueStore::with_entries(&[(READINGS_KEY, raw.as_str())])
}
