use serde::{Deserialize, Serialize};

/// Process-wide display settings, persisted independently of readings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Name printed on reports
    pub patient_name: Option<String>,

    /// Dark display theme
    #[serde(default)]
    pub dark_mode: bool,
}

impl Settings {
    /// Patient name, or `None` when blank
    pub fn patient_name(&self) -> Option<&str> {
        self.patient_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Feature switches for the presentation component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Chart series are available
    pub show_charts: bool,

    /// Medication flag is shown on readings and reports
    pub show_medication_flag: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            show_charts: true,
            show_medication_flag: true,
        }
    }
}
