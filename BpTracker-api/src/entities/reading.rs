use bp_tracker_domain::entities::{BloodPressureCategory, Classification, NewReading, Reading};
use serde::{Deserialize, Serialize};

/// Category and advice for a pair of pressures
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassificationResponse {
    /// Category label, e.g. "Stage 1"
    pub level: BloodPressureCategory,
    pub advice: String,
    /// Style hook for the badge
    pub css_class: String,
}

impl From<Classification> for ClassificationResponse {
    fn from(classification: Classification) -> Self {
        Self {
            level: classification.level,
            advice: classification.advice.to_string(),
            css_class: classification.level.css_class().to_string(),
        }
    }
}

/// Public representation of a blood pressure reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingResponse {
    pub id: i64,
    pub systolic: u16,
    pub diastolic: u16,
    pub pulse: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Omitted when the medication capability is switched off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication: Option<bool>,

    /// RFC 3339 UTC with milliseconds
    pub timestamp: String,
    pub date: String,
    pub time: String,
    pub classification: ClassificationResponse,
}

/// Request payload for creating a new reading.
///
/// Pressures arrive as signed integers so that zero or negative input is a
/// validation error rather than a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateReadingRequest {
    pub systolic: Option<i64>,
    pub diastolic: Option<i64>,
    pub pulse: Option<i64>,
    pub notes: Option<String>,
    #[serde(default)]
    pub medication: bool,
}

/// Query for the classify endpoint
#[derive(Debug, Deserialize)]
pub struct ClassifyQuery {
    pub systolic: i32,
    pub diastolic: i32,
}

fn to_measurement(field: &str, value: Option<i64>) -> Result<Option<u16>, String> {
    match value {
        None => Ok(None),
        Some(v) if v <= 0 => Ok(Some(0)),
        Some(v) => u16::try_from(v)
            .map(Some)
            .map_err(|_| format!("{}: value {} is out of range", field, v)),
    }
}

/// Convert the public request to domain input
pub fn convert_to_domain_input(request: CreateReadingRequest) -> Result<NewReading, String> {
    Ok(NewReading {
        systolic: to_measurement("systolic", request.systolic)?,
        diastolic: to_measurement("diastolic", request.diastolic)?,
        pulse: to_measurement("pulse", request.pulse)?,
        notes: request.notes,
        medication: request.medication,
    })
}

/// Convert a domain reading to the public representation
pub fn convert_to_public_reading(
    reading: &Reading,
    classification: Classification,
    show_medication: bool,
) -> ReadingResponse {
    ReadingResponse {
        id: reading.id,
        systolic: reading.systolic,
        diastolic: reading.diastolic,
        pulse: reading.pulse,
        notes: reading.notes.clone(),
        medication: show_medication.then_some(reading.medication),
        timestamp: reading.timestamp_iso(),
        date: reading.date.clone(),
        time: reading.time.clone(),
        classification: classification.into(),
    }
}
