use serde::{Deserialize, Serialize};

/// Storage model for a blood pressure reading, as serialized under `bp_readings`.
///
/// Measurements are kept as signed integers so an out-of-range stored value
/// rejects only its own record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingRecord {
    /// Creation-time derived identifier (epoch milliseconds)
    pub id: i64,

    /// Systolic blood pressure (the higher number)
    pub systolic: i64,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: i64,

    /// Pulse rate in beats per minute
    pub pulse: i64,

    /// Free-text notes; empty when none were entered
    #[serde(default)]
    pub notes: String,

    /// Whether medication was taken
    #[serde(default)]
    pub medication: bool,

    /// When the reading was created
    pub timestamp: StoredTimestamp,

    /// Display date captured at creation
    #[serde(default)]
    pub date: String,

    /// Display time captured at creation
    #[serde(default)]
    pub time: String,
}

/// A creation instant as found in storage: an ISO-8601 string or epoch milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredTimestamp {
    /// Epoch milliseconds
    Millis(i64),
    /// ISO-8601 / RFC 3339 text
    Text(String),
}

/// Serialize the full reading list for storage
pub fn encode_readings(records: &[ReadingRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string(records)
}

/// Parse a stored reading list.
///
/// Fails only when the text is not a JSON array. Each element is decoded on
/// its own so one malformed record does not hide the rest.
pub fn decode_readings(raw: &str) -> Result<Vec<Result<ReadingRecord, serde_json::Error>>, serde_json::Error> {
    let values: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    Ok(values.into_iter().map(serde_json::from_value).collect())
}
