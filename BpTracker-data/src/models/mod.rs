// Storage models
pub mod reading;

pub use reading::{decode_readings, encode_readings, ReadingRecord, StoredTimestamp};
