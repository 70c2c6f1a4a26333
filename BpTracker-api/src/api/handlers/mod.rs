use std::sync::Arc;

use bp_tracker_domain::services::TrackerService;
use tokio::sync::Mutex;

pub mod health;
pub mod readings;
pub mod report;
pub mod settings;
pub mod statistics;

// Tests module
#[cfg(test)]
mod tests;

/// Shared tracker state; one lock serializes every request touching it
pub type SharedTracker = Arc<Mutex<TrackerService>>;

/// Wrap a loaded tracker for the router
pub fn shared(tracker: TrackerService) -> SharedTracker {
    Arc::new(Mutex::new(tracker))
}

// Re-export handlers for easier imports
pub use health::health_check;
pub use readings::{classify_pressure, create_reading, delete_reading, list_categories, list_readings};
pub use report::get_report;
pub use settings::{get_settings, toggle_dark_mode, update_settings};
pub use statistics::{get_chart, get_statistics};
