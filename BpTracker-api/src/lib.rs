// BpTracker-api lib.rs
//
// HTTP presentation layer for the BP tracker.

// Public modules
pub mod api;
pub mod config;
pub mod entities;

use std::sync::Arc;

use axum::Router;
use bp_tracker_data::storage::KeyValueStore;
use bp_tracker_domain::services::{TrackerOptions, TrackerService};

/// Load the tracker from `storage` and build the application router
pub async fn create_application(storage: Arc<dyn KeyValueStore>, options: TrackerOptions) -> Router {
    let tracker = TrackerService::load(storage, options).await;
    api::create_app(api::shared(tracker))
}
