use std::collections::HashSet;
use std::sync::Arc;

use bp_tracker_data::models::{decode_readings, encode_readings};
use bp_tracker_data::storage::{KeyValueStore, StorageError, READINGS_KEY};
use chrono::{DateTime, Duration, DurationRound, FixedOffset, Utc};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

use crate::entities::conversions::{convert_to_data_record, convert_to_domain_reading};
use crate::entities::reading::{display_date, display_time, normalize_notes, NewReading, Reading};
use crate::services::errors::TrackerError;

/// Outcome of the most recent save
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SaveStatus {
    /// Nothing has been written since startup
    NotSaved,
    Saved { at: DateTime<Utc> },
    Failed { at: DateTime<Utc>, reason: String },
}

impl SaveStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, SaveStatus::Failed { .. })
    }
}

/// Ordered list of readings, newest first, backed by a key-value store.
///
/// Memory is updated before every save, so a failed save never loses the
/// in-memory change.
#[derive(Debug)]
pub struct ReadingStore<S: KeyValueStore + ?Sized> {
    storage: Arc<S>,
    readings: Vec<Reading>,
    display_offset: FixedOffset,
    save_status: SaveStatus,
}

impl<S: KeyValueStore + ?Sized> ReadingStore<S> {
    /// Empty store that has not read from storage
    pub fn new(storage: Arc<S>, display_offset: FixedOffset) -> Self {
        Self {
            storage,
            readings: Vec::new(),
            display_offset,
            save_status: SaveStatus::NotSaved,
        }
    }

    /// Load the persisted reading list.
    ///
    /// A missing key is an empty store. Storage or parse failures are logged
    /// and also yield an empty store. Invalid or duplicate records are dropped.
    #[instrument(skip(storage))]
    pub async fn load(storage: Arc<S>, display_offset: FixedOffset) -> Self {
        let mut store = Self::new(storage, display_offset);

        let raw = match store.storage.get(READINGS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("No stored readings, starting empty");
                return store;
            }
            Err(e) => {
                error!("Failed to read stored readings: {}", e);
                return store;
            }
        };

        let records = match decode_readings(&raw) {
            Ok(records) => records,
            Err(e) => {
                error!("Stored readings are not valid JSON, starting empty: {}", e);
                return store;
            }
        };

        let mut seen = HashSet::new();
        for record in records {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!("Dropping malformed stored reading: {}", e);
                    continue;
                }
            };
            match convert_to_domain_reading(record, display_offset) {
                Ok(reading) if !seen.insert(reading.id) => {
                    warn!("Dropping reading with duplicate id {}", reading.id);
                }
                Ok(reading) => store.readings.push(reading),
                Err(e) => warn!("Dropping invalid stored reading: {}", e),
            }
        }

        store.sort_newest_first();
        info!("Loaded {} readings", store.readings.len());
        store
    }

    fn sort_newest_first(&mut self) {
        self.readings
            .sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
    }

    /// Readings, newest first
    pub fn all(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Reading> {
        self.readings.iter().find(|r| r.id == id)
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    pub fn display_offset(&self) -> FixedOffset {
        self.display_offset
    }

    /// Validate and record a new reading created now
    pub async fn add(&mut self, input: NewReading) -> Result<Reading, TrackerError> {
        self.add_at(input, Utc::now()).await
    }

    /// Validate and record a new reading created at `now`.
    ///
    /// `now` is truncated to whole milliseconds, the precision readings are
    /// stored with.
    #[instrument(skip(self, input))]
    pub async fn add_at(&mut self, input: NewReading, now: DateTime<Utc>) -> Result<Reading, TrackerError> {
        input.validate()?;
        let now = now.duration_trunc(Duration::milliseconds(1)).unwrap_or(now);

        let (systolic, diastolic, pulse) = match (input.systolic, input.diastolic, input.pulse) {
            (Some(s), Some(d), Some(p)) => (s, d, p),
            _ => {
                return Err(TrackerError::Validation(
                    "Please fill in all required fields".to_string(),
                ))
            }
        };

        let max_id = self.readings.iter().map(|r| r.id).max();
        let id = match max_id {
            Some(max) if max >= now.timestamp_millis() => {
                max.checked_add(1).ok_or(TrackerError::IdsExhausted)?
            }
            _ => now.timestamp_millis(),
        };

        let reading = Reading {
            id,
            systolic,
            diastolic,
            pulse,
            notes: normalize_notes(input.notes),
            medication: input.medication,
            timestamp: now,
            date: display_date(now, self.display_offset),
            time: display_time(now, self.display_offset),
        };

        let position = self.readings.partition_point(|r| r.timestamp > reading.timestamp);
        self.readings.insert(position, reading.clone());
        debug!("Added reading {} at position {}", reading.id, position);

        self.persist().await;
        Ok(reading)
    }

    /// Remove a reading; returns whether one was removed
    #[instrument(skip(self))]
    pub async fn remove(&mut self, id: i64) -> bool {
        let before = self.readings.len();
        self.readings.retain(|r| r.id != id);

        if self.readings.len() == before {
            debug!("No reading with id {}", id);
            return false;
        }

        self.persist().await;
        true
    }

    /// Write the full list to storage
    pub async fn save(&self) -> Result<(), StorageError> {
        let records: Vec<_> = self.readings.iter().map(convert_to_data_record).collect();
        let raw = encode_readings(&records)?;
        self.storage.set(READINGS_KEY, &raw).await
    }

    async fn persist(&mut self) {
        self.save_status = match self.save().await {
            Ok(()) => SaveStatus::Saved { at: Utc::now() },
            Err(e) => {
                error!("Failed to save readings: {}", e);
                SaveStatus::Failed {
                    at: Utc::now(),
                    reason: e.to_string(),
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bp_tracker_data::storage::tests::MockKeyValueStore;
    use bp_tracker_data::storage::InMemoryStore;
    use chrono::{Duration, TimeZone};

    fn wat() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn input(systolic: u16, diastolic: u16, pulse: u16) -> NewReading {
        NewReading {
            systolic: Some(systolic),
            diastolic: Some(diastolic),
            pulse: Some(pulse),
            notes: None,
            medication: false,
        }
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 16, 9, minute, 0).unwrap()
    }

    #[tokio::test]
    async fn test_add_then_reload_round_trips() {
        let storage = Arc::new(InMemoryStore::new());
        let mut store = ReadingStore::load(storage.clone(), wat()).await;

        let created = store
            .add_at(
                NewReading {
                    notes: Some("  after coffee ".to_string()),
                    medication: true,
                    ..input(132, 84, 76)
                },
                at(20),
            )
            .await
            .unwrap();

        assert_eq!(created.date, "16/10/2025");
        assert_eq!(created.time, "10:20");
        assert_eq!(created.notes.as_deref(), Some("after coffee"));
        assert!(matches!(store.save_status(), SaveStatus::Saved { .. }));

        let reloaded = ReadingStore::load(storage, wat()).await;
        assert_eq!(reloaded.all(), store.all());
    }

    #[tokio::test]
    async fn test_sub_millisecond_clock_round_trips() {
        let storage = Arc::new(InMemoryStore::new());
        let mut store = ReadingStore::load(storage.clone(), wat()).await;

        let precise = at(20) + Duration::nanoseconds(106_874_687);
        let created = store.add_at(input(120, 80, 70), precise).await.unwrap();
        store.add(input(118, 78, 68)).await.unwrap();

        assert_eq!(created.timestamp_iso(), "2025-10-16T09:20:00.106Z");
        assert_eq!(created.timestamp.timestamp_subsec_nanos(), 106_000_000);

        let reloaded = ReadingStore::load(storage, wat()).await;
        assert_eq!(reloaded.all(), store.all());
    }

    #[tokio::test]
    async fn test_new_readings_go_first() {
        let storage = Arc::new(InMemoryStore::new());
        let mut store = ReadingStore::load(storage, wat()).await;

        store.add_at(input(120, 80, 70), at(1)).await.unwrap();
        store.add_at(input(130, 85, 72), at(2)).await.unwrap();

        let ids: Vec<i64> = store.all().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![at(2).timestamp_millis(), at(1).timestamp_millis()]);
    }

    #[tokio::test]
    async fn test_ids_stay_unique_when_clock_repeats() {
        let storage = Arc::new(InMemoryStore::new());
        let mut store = ReadingStore::load(storage, wat()).await;

        let first = store.add_at(input(120, 80, 70), at(5)).await.unwrap();
        let second = store.add_at(input(121, 80, 70), at(5)).await.unwrap();
        let third = store.add_at(input(122, 80, 70), at(4)).await.unwrap();

        assert_eq!(second.id, first.id + 1);
        assert_eq!(third.id, first.id + 2);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_add_then_remove_restores_prior_state() {
        let storage = Arc::new(InMemoryStore::new());
        let mut store = ReadingStore::load(storage.clone(), wat()).await;
        store.add_at(input(120, 80, 70), at(1)).await.unwrap();
        store.add_at(input(118, 76, 64), at(2)).await.unwrap();
        let before = store.all().to_vec();

        let added = store.add_at(input(150, 95, 88), at(3)).await.unwrap();
        assert!(store.remove(added.id).await);

        assert_eq!(store.all(), before.as_slice());
        let reloaded = ReadingStore::load(storage, wat()).await;
        assert_eq!(reloaded.all(), before.as_slice());
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_noop() {
        let storage = Arc::new(MockKeyValueStore::new());
        let mut store = ReadingStore::load(storage.clone(), wat()).await;
        store.add_at(input(120, 80, 70), at(1)).await.unwrap();
        let writes = storage.write_count();

        assert!(!store.remove(42).await);
        assert_eq!(store.len(), 1);
        assert_eq!(storage.write_count(), writes);
    }

    #[tokio::test]
    async fn test_validation_failure_changes_nothing() {
        let storage = Arc::new(MockKeyValueStore::new());
        let mut store = ReadingStore::load(storage.clone(), wat()).await;

        let missing = NewReading {
            pulse: None,
            ..input(120, 80, 70)
        };
        let err = store.add_at(missing, at(1)).await.unwrap_err();
        assert!(matches!(err, TrackerError::Validation(ref msg) if msg.contains("Pulse value is required")));

        let zero = input(0, 80, 70);
        assert!(matches!(store.add_at(zero, at(1)).await, Err(TrackerError::Validation(_))));

        assert!(store.is_empty());
        assert_eq!(storage.write_count(), 0);
        assert_eq!(store.save_status(), &SaveStatus::NotSaved);
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_and_reports_status() {
        let storage = Arc::new(MockKeyValueStore::new().with_write_failure());
        let mut store = ReadingStore::load(storage.clone(), wat()).await;

        let reading = store.add_at(input(120, 80, 70), at(1)).await.unwrap();

        assert_eq!(store.all(), &[reading]);
        assert!(store.save_status().is_failed());
        assert_eq!(storage.raw(READINGS_KEY), None);

        storage.set_write_failure(false);
        store.add_at(input(125, 78, 70), at(2)).await.unwrap();
        assert!(matches!(store.save_status(), SaveStatus::Saved { .. }));
        assert!(storage.raw(READINGS_KEY).is_some());
    }

    #[tokio::test]
    async fn test_load_tolerates_read_and_parse_failures() {
        let unreadable = Arc::new(MockKeyValueStore::with_entries(&[(READINGS_KEY, "[]")]).with_read_failure());
        assert!(ReadingStore::load(unreadable, wat()).await.is_empty());

        let garbage = Arc::new(InMemoryStore::with_entries(&[(READINGS_KEY, "{not json")]));
        assert!(ReadingStore::load(garbage, wat()).await.is_empty());
    }

    #[tokio::test]
    async fn test_load_drops_invalid_records_and_sorts() {
        let raw = r#"[
            {"id":1,"systolic":120,"diastolic":80,"pulse":70,"notes":"","medication":false,
             "timestamp":"2025-10-16T08:00:00.000Z","date":"16/10/2025","time":"09:00"},
            {"id":3,"systolic":130,"diastolic":85,"pulse":72,"timestamp":1760605200000},
            {"id":3,"systolic":140,"diastolic":90,"pulse":75,"timestamp":1760605200000},
            {"id":4,"systolic":0,"diastolic":80,"pulse":70,"timestamp":"2025-10-16T10:00:00.000Z"},
            {"id":5,"systolic":120,"diastolic":80,"pulse":70,"timestamp":"not a date"}
        ]"#;
        let storage = Arc::new(InMemoryStore::with_entries(&[(READINGS_KEY, raw)]));

        let store = ReadingStore::load(storage, wat()).await;
        let ids: Vec<i64> = store.all().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(store.get(3).unwrap().systolic, 130);
        assert_eq!(store.get(3).unwrap().time, "10:00");
    }

    #[tokio::test]
    async fn test_one_bad_record_keeps_the_rest() {
        let raw = r#"[
            {"id":1,"systolic":120,"diastolic":80,"pulse":70,"timestamp":"2025-10-16T08:00:00.000Z"},
            {"id":2,"systolic":-5,"diastolic":80,"pulse":70,"timestamp":"2025-10-16T08:30:00.000Z"},
            {"id":3,"systolic":"high","diastolic":80,"pulse":70,"timestamp":"2025-10-16T09:00:00.000Z"}
        ]"#;
        let storage = Arc::new(InMemoryStore::with_entries(&[(READINGS_KEY, raw)]));

        let mut store = ReadingStore::load(storage.clone(), wat()).await;
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).unwrap().systolic, 120);

        // The surviving history is written back alongside the new reading
        store.add_at(input(125, 82, 71), at(30)).await.unwrap();
        let reloaded = ReadingStore::load(storage, wat()).await;
        let ids: Vec<i64> = reloaded.all().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![at(30).timestamp_millis(), 1]);
    }

    #[tokio::test]
    async fn test_exhausted_ids_are_an_error() {
        let raw = format!(
            r#"[{{"id":{},"systolic":120,"diastolic":80,"pulse":70,"timestamp":"2025-10-16T08:00:00.000Z"}}]"#,
            i64::MAX
        );
        let storage = Arc::new(MockKeyValueStore::with_entries(&[(READINGS_KEY, raw.as_str())]));
        let mut store = ReadingStore::load(storage.clone(), wat()).await;
        assert_eq!(store.len(), 1);

        let err = store.add_at(input(120, 80, 70), at(1)).await.unwrap_err();
        assert!(matches!(err, TrackerError::IdsExhausted));
        assert_eq!(store.len(), 1);
        assert_eq!(storage.write_count(), 0);
    }

    #[tokio::test]
    async fn test_out_of_order_timestamp_is_placed_by_time() {
        let storage = Arc::new(InMemoryStore::new());
        let mut store = ReadingStore::load(storage, wat()).await;
        store.add_at(input(120, 80, 70), at(30)).await.unwrap();

        let earlier = at(30) - Duration::minutes(10);
        let reading = store.add_at(input(125, 80, 70), earlier).await.unwrap();

        assert_eq!(store.all().last().unwrap().id, reading.id);
        assert!(store.all().windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }
}
