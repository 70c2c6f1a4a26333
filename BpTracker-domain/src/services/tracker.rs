use std::sync::Arc;
use std::time::Duration;

use bp_tracker_data::storage::{KeyValueStore, StorageError, READINGS_KEY};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use tracing::{error, info, instrument};

use crate::entities::category::Classification;
use crate::entities::reading::{NewReading, Reading};
use crate::entities::settings::{Capabilities, Settings};
use crate::services::classifier::{ClassificationPolicy, Classify, RuleClassifier};
use crate::services::errors::TrackerError;
use crate::services::report::{render_report, ReportOptions, DEFAULT_PRINT_DELAY};
use crate::services::settings::SettingsStore;
use crate::services::statistics::{chart_series, summarize, ChartSeries, ChartWindow, StatisticsSummary};
use crate::services::store::{ReadingStore, SaveStatus};

/// West Africa Time, the default display offset
pub const DEFAULT_DISPLAY_OFFSET_MINUTES: i32 = 60;

/// Options fixed for the lifetime of a tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerOptions {
    pub capabilities: Capabilities,
    pub policy: ClassificationPolicy,
    pub display_offset: FixedOffset,
    pub print_delay: Duration,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::default(),
            policy: ClassificationPolicy::default(),
            display_offset: FixedOffset::east_opt(DEFAULT_DISPLAY_OFFSET_MINUTES * 60)
                .unwrap_or_else(|| Utc.fix()),
            print_delay: DEFAULT_PRINT_DELAY,
        }
    }
}

/// The tracker: readings, settings and everything derived from them.
///
/// All state lives here. Callers serialize access; the HTTP layer keeps it
/// behind a single mutex.
#[derive(Debug)]
pub struct TrackerService {
    storage: Arc<dyn KeyValueStore>,
    readings: ReadingStore<dyn KeyValueStore>,
    settings_store: SettingsStore<dyn KeyValueStore>,
    settings: Settings,
    settings_status: SaveStatus,
    classifier: RuleClassifier,
    options: TrackerOptions,
}

impl TrackerService {
    /// Load readings and settings from storage
    #[instrument(skip(storage))]
    pub async fn load(storage: Arc<dyn KeyValueStore>, options: TrackerOptions) -> Self {
        info!("Loading tracker from {}", storage.describe());

        let readings = ReadingStore::load(storage.clone(), options.display_offset).await;
        let settings_store = SettingsStore::new(storage.clone());
        let settings = settings_store.load().await;

        Self {
            storage,
            readings,
            settings_store,
            settings,
            settings_status: SaveStatus::NotSaved,
            classifier: RuleClassifier::new(options.policy),
            options,
        }
    }

    pub fn options(&self) -> &TrackerOptions {
        &self.options
    }

    pub fn capabilities(&self) -> Capabilities {
        self.options.capabilities
    }

    pub fn classifier(&self) -> &dyn Classify {
        &self.classifier
    }

    /// Readings, newest first
    pub fn readings(&self) -> &[Reading] {
        self.readings.all()
    }

    pub fn classify(&self, systolic: i32, diastolic: i32) -> Classification {
        self.classifier.classify(systolic, diastolic)
    }

    pub fn classify_reading(&self, reading: &Reading) -> Classification {
        self.classify(i32::from(reading.systolic), i32::from(reading.diastolic))
    }

    /// Record a new reading taken now
    pub async fn add_reading(&mut self, input: NewReading) -> Result<Reading, TrackerError> {
        self.readings.add(input).await
    }

    /// Record a new reading taken at `now`
    pub async fn add_reading_at(&mut self, input: NewReading, now: DateTime<Utc>) -> Result<Reading, TrackerError> {
        self.readings.add_at(input, now).await
    }

    /// Delete a reading by id
    pub async fn delete_reading(&mut self, id: i64) -> Result<(), TrackerError> {
        if self.readings.remove(id).await {
            Ok(())
        } else {
            Err(TrackerError::NotFound(id.to_string()))
        }
    }

    pub fn statistics(&self) -> StatisticsSummary {
        summarize(self.readings.all(), &self.classifier)
    }

    /// Chart series for a window ending at `now`
    pub fn chart(&self, window: ChartWindow, now: DateTime<Utc>) -> Result<ChartSeries, TrackerError> {
        if !self.options.capabilities.show_charts {
            return Err(TrackerError::FeatureDisabled("charts"));
        }
        Ok(chart_series(self.readings.all(), window, now))
    }

    /// HTML report generated at `now`, optionally opening the print dialog
    pub fn render_report(&self, now: DateTime<Utc>, print: bool) -> String {
        let options = ReportOptions {
            capabilities: self.options.capabilities,
            print_delay: print.then_some(self.options.print_delay),
        };
        render_report(
            self.readings.all(),
            &self.settings,
            &self.classifier,
            now.with_timezone(&self.options.display_offset),
            &options,
        )
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings and persist them
    pub async fn update_settings(&mut self, settings: Settings) -> &Settings {
        self.settings = Settings {
            patient_name: settings.patient_name().map(str::to_string),
            dark_mode: settings.dark_mode,
        };
        self.persist_settings().await;
        &self.settings
    }

    /// Flip dark mode and persist; returns the new value
    pub async fn toggle_dark_mode(&mut self) -> bool {
        self.settings.dark_mode = !self.settings.dark_mode;
        self.persist_settings().await;
        self.settings.dark_mode
    }

    async fn persist_settings(&mut self) {
        self.settings_status = match self.settings_store.save(&self.settings).await {
            Ok(()) => SaveStatus::Saved { at: Utc::now() },
            Err(e) => {
                error!("Failed to save settings: {}", e);
                SaveStatus::Failed {
                    at: Utc::now(),
                    reason: e.to_string(),
                }
            }
        };
    }

    /// Outcome of the last readings save
    pub fn save_status(&self) -> &SaveStatus {
        self.readings.save_status()
    }

    /// Outcome of the last settings save
    pub fn settings_save_status(&self) -> &SaveStatus {
        &self.settings_status
    }

    pub fn storage_description(&self) -> String {
        self.storage.describe()
    }

    /// Check that the storage backend answers a read
    pub async fn probe_storage(&self) -> Result<(), StorageError> {
        self.storage.get(READINGS_KEY).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::category::BloodPressureCategory;
    use bp_tracker_data::storage::tests::MockKeyValueStore;
    use bp_tracker_data::storage::{InMemoryStore, DARK_MODE_KEY, PATIENT_NAME_KEY};
    use chrono::TimeZone;

    fn input(systolic: u16, diastolic: u16, pulse: u16) -> NewReading {
        NewReading {
            systolic: Some(systolic),
            diastolic: Some(diastolic),
            pulse: Some(pulse),
            ..NewReading::default()
        }
    }

    async fn tracker(options: TrackerOptions) -> (Arc<InMemoryStore>, TrackerService) {
        let storage = Arc::new(InMemoryStore::new());
        let tracker = TrackerService::load(storage.clone(), options).await;
        (storage, tracker)
    }

    #[test]
    fn test_default_options() {
        let options = TrackerOptions::default();
        assert_eq!(options.display_offset.local_minus_utc(), 3600);
        assert_eq!(options.policy, ClassificationPolicy::Legacy);
        assert_eq!(options.print_delay, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_add_delete_and_statistics() {
        let (_, mut tracker) = tracker(TrackerOptions::default()).await;

        let first = tracker.add_reading(input(120, 80, 70)).await.unwrap();
        tracker.add_reading(input(130, 85, 74)).await.unwrap();
        tracker.add_reading(input(110, 70, 66)).await.unwrap();

        let stats = tracker.statistics();
        assert_eq!(stats.total_readings, 3);
        let avg = stats.rolling_average.unwrap();
        assert_eq!((avg.systolic, avg.diastolic), (120, 78));

        tracker.delete_reading(first.id).await.unwrap();
        assert_eq!(tracker.readings().len(), 2);
        assert!(matches!(
            tracker.delete_reading(first.id).await,
            Err(TrackerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_policy_flows_into_classification() {
        let (_, legacy) = tracker(TrackerOptions::default()).await;
        assert_eq!(legacy.classify(200, 70).level, BloodPressureCategory::Stage1);

        let (_, guideline) = tracker(TrackerOptions {
            policy: ClassificationPolicy::Guideline,
            ..TrackerOptions::default()
        })
        .await;
        assert_eq!(guideline.classify(200, 70).level, BloodPressureCategory::Crisis);
    }

    #[tokio::test]
    async fn test_chart_disabled() {
        let (_, tracker) = tracker(TrackerOptions {
            capabilities: Capabilities {
                show_charts: false,
                show_medication_flag: true,
            },
            ..TrackerOptions::default()
        })
        .await;

        let result = tracker.chart(ChartWindow::Week, Utc::now());
        assert!(matches!(result, Err(TrackerError::FeatureDisabled("charts"))));
    }

    #[tokio::test]
    async fn test_settings_persist_and_reload() {
        let (storage, mut tracker) = tracker(TrackerOptions::default()).await;

        tracker
            .update_settings(Settings {
                patient_name: Some("  Chidi ".to_string()),
                dark_mode: false,
            })
            .await;
        assert!(tracker.toggle_dark_mode().await);

        let snapshot = storage.snapshot();
        assert_eq!(snapshot.get(PATIENT_NAME_KEY).map(String::as_str), Some("Chidi"));
        assert_eq!(snapshot.get(DARK_MODE_KEY).map(String::as_str), Some("true"));

        let reloaded = TrackerService::load(storage, TrackerOptions::default()).await;
        assert_eq!(reloaded.settings().patient_name.as_deref(), Some("Chidi"));
        assert!(reloaded.settings().dark_mode);
    }

    #[tokio::test]
    async fn test_settings_write_failure_is_recorded() {
        let storage = Arc::new(MockKeyValueStore::new().with_write_failure());
        let mut tracker = TrackerService::load(storage, TrackerOptions::default()).await;

        assert!(tracker.toggle_dark_mode().await);
        assert!(tracker.settings().dark_mode);
        assert!(tracker.settings_save_status().is_failed());
    }

    #[tokio::test]
    async fn test_report_uses_display_offset_and_settings() {
        let (_, mut tracker) = tracker(TrackerOptions::default()).await;
        tracker
            .update_settings(Settings {
                patient_name: Some("Chidi".to_string()),
                dark_mode: false,
            })
            .await;

        let now = Utc.with_ymd_and_hms(2025, 10, 16, 9, 20, 0).unwrap();
        let html = tracker.render_report(now, true);

        assert!(html.contains("Patient:</strong> Chidi"));
        assert!(html.contains("16/10/2025, 10:20:00"));
        assert!(html.contains("window.print()"));
        assert!(!tracker.render_report(now, false).contains("window.print()"));
    }

    #[tokio::test]
    async fn test_probe_storage() {
        let (_, tracker) = tracker(TrackerOptions::default()).await;
        assert!(tracker.probe_storage().await.is_ok());
        assert_eq!(tracker.storage_description(), "in-memory store");

        let broken = Arc::new(MockKeyValueStore::new().with_read_failure());
        let tracker = TrackerService::load(broken, TrackerOptions::default()).await;
        assert!(tracker.probe_storage().await.is_err());
    }
}
