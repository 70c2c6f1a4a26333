use axum::extract::{Json, State};
use tracing::{info, instrument};

use super::SharedTracker;
use crate::entities::settings::{SettingsResponse, UpdateSettingsRequest};

/// Current settings and capabilities
#[instrument(skip(tracker))]
pub async fn get_settings(State(tracker): State<SharedTracker>) -> Json<SettingsResponse> {
    let tracker = tracker.lock().await;
    Json(SettingsResponse::new(tracker.settings(), tracker.capabilities()))
}

/// Replace the settings
#[instrument(skip(tracker, request))]
pub async fn update_settings(
    State(tracker): State<SharedTracker>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Json<SettingsResponse> {
    let mut tracker = tracker.lock().await;
    tracker.update_settings(request.into()).await;
    info!("Settings updated");
    Json(SettingsResponse::new(tracker.settings(), tracker.capabilities()))
}

/// Flip dark mode
#[instrument(skip(tracker))]
pub async fn toggle_dark_mode(State(tracker): State<SharedTracker>) -> Json<SettingsResponse> {
    let mut tracker = tracker.lock().await;
    let dark_mode = tracker.toggle_dark_mode().await;
    info!("Dark mode is now {}", if dark_mode { "on" } else { "off" });
    Json(SettingsResponse::new(tracker.settings(), tracker.capabilities()))
}
