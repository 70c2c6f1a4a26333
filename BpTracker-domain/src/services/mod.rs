// Domain services
// This module contains business logic implementations.
pub mod classifier;
pub mod errors;
pub mod report;
pub mod settings;
pub mod statistics;
pub mod store;
pub mod tracker;

// Re-export the types callers reach for most
pub use classifier::{classify, ClassificationPolicy, Classify, RuleClassifier};
pub use errors::TrackerError;
pub use report::{escape_html, render_report, ReportOptions};
pub use settings::SettingsStore;
pub use statistics::{ChartSeries, ChartWindow, StatisticsSummary, Trend};
pub use store::{ReadingStore, SaveStatus};
pub use tracker::{TrackerOptions, TrackerService};
