//! Domain layer health check functionality
//! This module provides health check services for the application

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::services::store::SaveStatus;
use crate::services::tracker::TrackerService;

/// System health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component works but its last save failed
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone, Serialize)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check that storage answers a read.
    /// Returns an error describing the failure otherwise
    async fn check_storage_status(&self) -> Result<(), String>;
}

fn save_component(status: &SaveStatus) -> HealthComponent {
    match status {
        SaveStatus::NotSaved => HealthComponent {
            status: ComponentStatus::Healthy,
            details: Some("Nothing saved yet".to_string()),
        },
        SaveStatus::Saved { at } => HealthComponent {
            status: ComponentStatus::Healthy,
            details: Some(format!("Last saved at {}", at.to_rfc3339())),
        },
        SaveStatus::Failed { at, reason } => HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some(format!("Last save failed at {}: {}", at.to_rfc3339(), reason)),
        },
    }
}

/// Worst component status decides the overall status
pub fn overall_status<'a>(components: impl IntoIterator<Item = &'a HealthComponent>) -> SystemStatus {
    let mut status = SystemStatus::Healthy;
    for component in components {
        match component.status {
            ComponentStatus::Unhealthy => return SystemStatus::Unhealthy,
            ComponentStatus::Degraded => status = SystemStatus::Degraded,
            ComponentStatus::Healthy => {}
        }
    }
    status
}

#[async_trait]
impl HealthServiceTrait for TrackerService {
    async fn get_system_health(&self) -> SystemHealth {
        let storage = match self.check_storage_status().await {
            Ok(()) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(self.storage_description()),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };

        let components: HashMap<String, HealthComponent> = vec![
            ("storage".to_string(), storage),
            ("readings".to_string(), save_component(self.save_status())),
            ("settings".to_string(), save_component(self.settings_save_status())),
        ]
        .into_iter()
        .collect();

        SystemHealth {
            status: overall_status(components.values()),
            components,
        }
    }

    async fn check_storage_status(&self) -> Result<(), String> {
        self.probe_storage()
            .await
            .map_err(|e| format!("Storage error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NewReading;
    use crate::services::tracker::TrackerOptions;
    use bp_tracker_data::storage::tests::MockKeyValueStore;
    use bp_tracker_data::storage::InMemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_system_health() {
        let tracker = TrackerService::load(Arc::new(InMemoryStore::new()), TrackerOptions::default()).await;
        let health = tracker.get_system_health().await;

        assert_eq!(health.status, SystemStatus::Healthy);
        assert!(health.components.contains_key("storage"));
        assert!(health.components.contains_key("readings"));
        assert!(health.components.contains_key("settings"));
    }

    #[tokio::test]
    async fn test_failed_save_degrades() {
        let storage = Arc::new(MockKeyValueStore::new().with_write_failure());
        let mut tracker = TrackerService::load(storage, TrackerOptions::default()).await;
        tracker
            .add_reading(NewReading {
                systolic: Some(120),
                diastolic: Some(80),
                pulse: Some(70),
                ..NewReading::default()
            })
            .await
            .unwrap();

        let health = tracker.get_system_health().await;
        assert_eq!(health.status, SystemStatus::Degraded);
        assert_eq!(health.components["readings"].status, ComponentStatus::Degraded);
    }

    #[tokio::test]
    async fn test_unreadable_storage_is_unhealthy() {
        let storage = Arc::new(MockKeyValueStore::new().with_read_failure());
        let tracker = TrackerService::load(storage, TrackerOptions::default()).await;

        let health = tracker.get_system_health().await;
        assert_eq!(health.status, SystemStatus::Unhealthy);
        assert!(tracker.check_storage_status().await.is_err());
    }
}
