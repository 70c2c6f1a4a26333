use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use bp_tracker_domain::services::{TrackerOptions, TrackerService};
use bp_tracker_domain::testing::{sample_reading, seeded_store, MockKeyValueStore};

use crate::api::handlers::{self, shared, SharedTracker};
use crate::entities::reading::{ClassifyQuery, CreateReadingRequest};

async fn tracker_with(store: MockKeyValueStore) -> SharedTracker {
    shared(TrackerService::load(Arc::new(store), TrackerOptions::default()).await)
}

#[tokio::test]
async fn test_list_readings_newest_first() {
    let store = seeded_store(&[
        sample_reading(1_000, 120, 80, 70),
        sample_reading(3_000, 150, 95, 80),
        sample_reading(2_000, 118, 76, 66),
    ]);
    let tracker = tracker_with(store).await;

    let Json(readings) = handlers::list_readings(State(tracker)).await;
    let ids: Vec<i64> = readings.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![3_000, 2_000, 1_000]);
    assert_eq!(readings[0].classification.css_class, "stage2");
}

#[tokio::test]
async fn test_create_reading_persists() {
    let store = Arc::new(MockKeyValueStore::new());
    let tracker = shared(TrackerService::load(store.clone(), TrackerOptions::default()).await);

    let request = CreateReadingRequest {
        systolic: Some(119),
        diastolic: Some(79),
        pulse: Some(64),
        notes: Some("   ".to_string()),
        medication: false,
    };
    let (status, Json(reading)) = handlers::create_reading(State(tracker), Json(request))
        .await
        .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reading.notes, None);
    assert_eq!(reading.classification.advice, "Keep up the good work!");
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn test_create_reading_validation_error() {
    let tracker = tracker_with(MockKeyValueStore::new()).await;

    let err = handlers::create_reading(State(tracker.clone()), Json(CreateReadingRequest::default()))
        .await
        .unwrap_err();
    assert_eq!(err.error, "validation_error");
    assert!(tracker.lock().await.readings().is_empty());
}

#[tokio::test]
async fn test_create_reading_survives_write_failure() {
    let tracker = tracker_with(MockKeyValueStore::new().with_write_failure()).await;

    let request = CreateReadingRequest {
        systolic: Some(120),
        diastolic: Some(80),
        pulse: Some(70),
        ..CreateReadingRequest::default()
    };
    let result = handlers::create_reading(State(tracker.clone()), Json(request)).await;

    assert!(result.is_ok());
    let tracker = tracker.lock().await;
    assert_eq!(tracker.readings().len(), 1);
    assert!(tracker.save_status().is_failed());
}

#[tokio::test]
async fn test_delete_unknown_reading() {
    let tracker = tracker_with(MockKeyValueStore::new()).await;
    let err = handlers::delete_reading(State(tracker), Path(99)).await.unwrap_err();
    assert_eq!(err.error, "not_found");
}

#[tokio::test]
async fn test_classify_pressure() {
    let tracker = tracker_with(MockKeyValueStore::new()).await;
    let Json(result) = handlers::classify_pressure(
        State(tracker),
        Query(ClassifyQuery {
            systolic: 180,
            diastolic: 120,
        }),
    )
    .await;
    assert_eq!(result.css_class, "crisis");
    assert_eq!(result.advice, "GO TO HOSPITAL NOW! Emergency!");
}
