use axum::extract::{Json, Query, State};
use bp_tracker_domain::services::{ChartSeries, ChartWindow, StatisticsSummary};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::SharedTracker;
use crate::entities::common::ErrorResponse;

/// Query parameters for the chart endpoint
#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    /// Window in days: 7, 30 or 90 (default 7)
    pub window: Option<u32>,
}

/// Summary statistics over all readings
#[instrument(skip(tracker))]
pub async fn get_statistics(State(tracker): State<SharedTracker>) -> Json<StatisticsSummary> {
    let tracker = tracker.lock().await;
    Json(tracker.statistics())
}

/// Chart series for the requested window
#[instrument(skip(tracker))]
pub async fn get_chart(
    State(tracker): State<SharedTracker>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartSeries>, ErrorResponse> {
    let window = ChartWindow::try_from(query.window.unwrap_or(7))
        .map_err(|message| ErrorResponse::bad_request(&message))?;

    let tracker = tracker.lock().await;
    let series = tracker.chart(window, Utc::now())?;
    debug!("Chart has {} points", series.points.len());
    Ok(Json(series))
}
