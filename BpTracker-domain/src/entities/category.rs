use std::fmt;
use serde::{Deserialize, Serialize};

/// Blood pressure category assigned by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodPressureCategory {
    /// Normal blood pressure
    Normal,

    /// Elevated blood pressure
    Elevated,

    /// Stage 1 hypertension
    #[serde(rename = "Stage 1")]
    Stage1,

    /// Stage 2 hypertension
    #[serde(rename = "Stage 2")]
    Stage2,

    /// Hypertensive crisis
    Crisis,
}

impl BloodPressureCategory {
    /// Every category, least to most severe
    pub const ALL: [BloodPressureCategory; 5] = [
        BloodPressureCategory::Normal,
        BloodPressureCategory::Elevated,
        BloodPressureCategory::Stage1,
        BloodPressureCategory::Stage2,
        BloodPressureCategory::Crisis,
    ];

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            BloodPressureCategory::Normal => "Normal",
            BloodPressureCategory::Elevated => "Elevated",
            BloodPressureCategory::Stage1 => "Stage 1",
            BloodPressureCategory::Stage2 => "Stage 2",
            BloodPressureCategory::Crisis => "Crisis",
        }
    }

    /// Advice shown next to a reading in this category
    pub fn advice(&self) -> &'static str {
        match self {
            BloodPressureCategory::Normal => "Keep up the good work!",
            BloodPressureCategory::Elevated => "Watch your diet, reduce salt",
            BloodPressureCategory::Stage1 => "See doctor soon, lifestyle changes needed",
            BloodPressureCategory::Stage2 => "See doctor urgently, medication likely needed",
            BloodPressureCategory::Crisis => "GO TO HOSPITAL NOW! Emergency!",
        }
    }

    /// Range text for the category legend
    pub fn range_text(&self) -> &'static str {
        match self {
            BloodPressureCategory::Normal => "Less than 120/80",
            BloodPressureCategory::Elevated => "120-129/less than 80",
            BloodPressureCategory::Stage1 => "130-139/80-89",
            BloodPressureCategory::Stage2 => "140+/90+",
            BloodPressureCategory::Crisis => "180+/120+ - Emergency!",
        }
    }

    /// CSS class suffix used for report badges
    pub fn css_class(&self) -> &'static str {
        match self {
            BloodPressureCategory::Normal => "normal",
            BloodPressureCategory::Elevated => "elevated",
            BloodPressureCategory::Stage1 => "stage1",
            BloodPressureCategory::Stage2 => "stage2",
            BloodPressureCategory::Crisis => "crisis",
        }
    }
}

impl fmt::Display for BloodPressureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of classifying a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Category level
    pub level: BloodPressureCategory,
    /// Advice text for the level
    pub advice: &'static str,
}

impl From<BloodPressureCategory> for Classification {
    fn from(level: BloodPressureCategory) -> Self {
        Self {
            level,
            advice: level.advice(),
        }
    }
}

/// One row of the category legend
#[derive(Debug, Clone, Serialize)]
pub struct LegendEntry {
    pub level: BloodPressureCategory,
    pub range: &'static str,
}

/// Disclaimer printed under the legend
pub const DISCLAIMER: &str = "For tracking only. Consult your doctor.";

/// Category legend in severity order
pub fn category_legend() -> Vec<LegendEntry> {
    BloodPressureCategory::ALL
        .iter()
        .map(|level| LegendEntry {
            level: *level,
            range: level.range_text(),
        })
        .collect()
}
