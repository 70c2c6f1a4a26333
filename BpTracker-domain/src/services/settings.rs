use std::sync::Arc;

use bp_tracker_data::storage::{KeyValueStore, StorageError, DARK_MODE_KEY, PATIENT_NAME_KEY};
use tracing::{error, instrument, warn};

use crate::entities::settings::Settings;

/// Loads settings once at startup and writes them back on change
#[derive(Debug)]
pub struct SettingsStore<S: KeyValueStore + ?Sized> {
    storage: Arc<S>,
}

impl<S: KeyValueStore + ?Sized> SettingsStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Read persisted settings; unreadable values fall back to defaults
    #[instrument(skip(self))]
    pub async fn load(&self) -> Settings {
        let patient_name = match self.storage.get(PATIENT_NAME_KEY).await {
            Ok(name) => name.filter(|n| !n.trim().is_empty()),
            Err(e) => {
                error!("Failed to read patient name: {}", e);
                None
            }
        };

        let dark_mode = match self.storage.get(DARK_MODE_KEY).await {
            Ok(Some(value)) => match value.trim() {
                "true" => true,
                "false" => false,
                other => {
                    warn!("Ignoring unrecognised dark mode value {:?}", other);
                    false
                }
            },
            Ok(None) => false,
            Err(e) => {
                error!("Failed to read dark mode flag: {}", e);
                false
            }
        };

        Settings {
            patient_name,
            dark_mode,
        }
    }

    /// Persist both settings keys
    #[instrument(skip(self, settings))]
    pub async fn save(&self, settings: &Settings) -> Result<(), StorageError> {
        let name = settings.patient_name().unwrap_or_default();
        self.storage.set(PATIENT_NAME_KEY, name).await?;
        self.storage
            .set(DARK_MODE_KEY, if settings.dark_mode { "true" } else { "false" })
            .await
    }
}
