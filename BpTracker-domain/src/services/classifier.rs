use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::entities::category::{BloodPressureCategory, Classification};

/// Which rule set the classifier applies.
///
/// `Legacy` keeps the historical rule 3 (`systolic < 140 OR diastolic < 90`),
/// under which a reading like 200/70 is Stage 1. `Guideline` uses `AND` in
/// that rule so the same reading falls through to Crisis. Changing clinical
/// classification needs explicit sign-off, so `Legacy` is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationPolicy {
    #[default]
    Legacy,
    Guideline,
}

impl FromStr for ClassificationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(ClassificationPolicy::Legacy),
            "guideline" => Ok(ClassificationPolicy::Guideline),
            other => Err(format!("Unknown classification policy: {}", other)),
        }
    }
}

/// Maps a pair of pressures to a category and advice
pub trait Classify: Send + Sync {
    fn classify(&self, systolic: i32, diastolic: i32) -> Classification;
}

/// Rule-ordered classifier; first matching rule wins
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleClassifier {
    policy: ClassificationPolicy,
}

impl RuleClassifier {
    pub fn new(policy: ClassificationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ClassificationPolicy {
        self.policy
    }
}

impl Classify for RuleClassifier {
    fn classify(&self, systolic: i32, diastolic: i32) -> Classification {
        categorize_blood_pressure(systolic, diastolic, self.policy).into()
    }
}

/// Categorize blood pressure based on measurements
pub fn categorize_blood_pressure(
    systolic: i32,
    diastolic: i32,
    policy: ClassificationPolicy,
) -> BloodPressureCategory {
    let stage1 = match policy {
        ClassificationPolicy::Legacy => systolic < 140 || diastolic < 90,
        ClassificationPolicy::Guideline => systolic < 140 && diastolic < 90,
    };

    if systolic < 120 && diastolic < 80 {
        BloodPressureCategory::Normal
    } else if systolic < 130 && diastolic < 80 {
        BloodPressureCategory::Elevated
    } else if stage1 {
        BloodPressureCategory::Stage1
    } else if systolic < 180 && diastolic < 120 {
        BloodPressureCategory::Stage2
    } else {
        BloodPressureCategory::Crisis
    }
}

/// Classify with the default (legacy) rule set
pub fn classify(systolic: i32, diastolic: i32) -> Classification {
    RuleClassifier::default().classify(systolic, diastolic)
}
