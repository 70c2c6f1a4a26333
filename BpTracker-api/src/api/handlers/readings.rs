use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use bp_tracker_domain::entities::{category_legend, DISCLAIMER};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::SharedTracker;
use crate::entities::common::ErrorResponse;
use crate::entities::reading::{
    convert_to_domain_input, convert_to_public_reading, ClassificationResponse, ClassifyQuery,
    CreateReadingRequest, ReadingResponse,
};

/// List all readings, newest first, each with its classification
#[instrument(skip(tracker))]
pub async fn list_readings(State(tracker): State<SharedTracker>) -> Json<Vec<ReadingResponse>> {
    let tracker = tracker.lock().await;
    let show_medication = tracker.capabilities().show_medication_flag;

    let readings = tracker
        .readings()
        .iter()
        .map(|r| convert_to_public_reading(r, tracker.classify_reading(r), show_medication))
        .collect();

    Json(readings)
}

/// Create a new reading
#[instrument(skip(tracker, request))]
pub async fn create_reading(
    State(tracker): State<SharedTracker>,
    Json(request): Json<CreateReadingRequest>,
) -> Result<(StatusCode, Json<ReadingResponse>), ErrorResponse> {
    let input = convert_to_domain_input(request).map_err(|message| {
        warn!("Rejected reading: {}", message);
        ErrorResponse::validation_error(&message, None)
    })?;

    let mut tracker = tracker.lock().await;
    let reading = tracker.add_reading(input).await.map_err(|e| {
        warn!("Invalid reading: {}", e);
        ErrorResponse::from(e)
    })?;
    info!("Reading created with ID: {}", reading.id);

    let classification = tracker.classify_reading(&reading);
    let show_medication = tracker.capabilities().show_medication_flag;
    Ok((
        StatusCode::CREATED,
        Json(convert_to_public_reading(&reading, classification, show_medication)),
    ))
}

/// Delete a reading by id
#[instrument(skip(tracker))]
pub async fn delete_reading(
    State(tracker): State<SharedTracker>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ErrorResponse> {
    let mut tracker = tracker.lock().await;
    tracker.delete_reading(id).await?;
    info!("Reading {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Classify a pair of pressures without storing anything
#[instrument(skip(tracker))]
pub async fn classify_pressure(
    State(tracker): State<SharedTracker>,
    Query(query): Query<ClassifyQuery>,
) -> Json<ClassificationResponse> {
    let tracker = tracker.lock().await;
    Json(tracker.classify(query.systolic, query.diastolic).into())
}

/// Category legend and disclaimer
pub async fn list_categories() -> Json<Value> {
    Json(json!({
        "categories": category_legend(),
        "disclaimer": DISCLAIMER,
    }))
}
