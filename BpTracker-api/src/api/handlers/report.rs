use axum::{
    extract::{Query, State},
    response::Html,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};

use super::SharedTracker;

/// Query parameters for the report
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// Open the print dialog once the page loads
    #[serde(default)]
    pub print: bool,
}

/// Printable HTML report
#[instrument(skip(tracker))]
pub async fn get_report(
    State(tracker): State<SharedTracker>,
    Query(query): Query<ReportQuery>,
) -> Html<String> {
    let tracker = tracker.lock().await;
    info!("Rendering report for {} readings", tracker.readings().len());
    Html(tracker.render_report(Utc::now(), query.print))
}
