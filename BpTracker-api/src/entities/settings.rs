use bp_tracker_domain::entities::{Capabilities, Settings};
use serde::{Deserialize, Serialize};

/// Settings as returned to clients, with the active capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    pub dark_mode: bool,
    pub capabilities: Capabilities,
}

impl SettingsResponse {
    pub fn new(settings: &Settings, capabilities: Capabilities) -> Self {
        Self {
            patient_name: settings.patient_name().map(str::to_string),
            dark_mode: settings.dark_mode,
            capabilities,
        }
    }
}

/// Replacement settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub patient_name: Option<String>,
    #[serde(default)]
    pub dark_mode: bool,
}

impl From<UpdateSettingsRequest> for Settings {
    fn from(request: UpdateSettingsRequest) -> Self {
        Settings {
            patient_name: request.patient_name,
            dark_mode: request.dark_mode,
        }
    }
}
