use serde::{Deserialize, Serialize};

use crate::error::ScanError;

pub const NUM_CLASSES: usize = 7;
pub const MOLE_INDEX: usize = 5;

// Mole suppression: a "Common Mole" call below this confidence gives way
// to a runner-up scoring above the floor.
pub const MOLE_CONFIDENCE_CEILING: f64 = 60.0;
pub const RUNNER_UP_FLOOR: f64 = 15.0;

pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClinicalCategory {
    Cancer,
    PreCancerous,
    Benign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassInfo {
    pub index: usize,
    pub label: &'static str,
    pub category: ClinicalCategory,
}

/// Output classes of the lesion classifier, index-aligned with its
/// probability vector.
pub const CLASSES: [ClassInfo; NUM_CLASSES] = [
    ClassInfo {
        index: 0,
        label: "Actinic Keratoses (Pre-Cancerous)",
        category: ClinicalCategory::PreCancerous,
    },
    ClassInfo {
        index: 1,
        label: "Basal Cell Carcinoma (Cancer)",
        category: ClinicalCategory::Cancer,
    },
    ClassInfo {
        index: 2,
        label: "Benign Keratosis (Sun Spot)",
        category: ClinicalCategory::Benign,
    },
    ClassInfo {
        index: 3,
        label: "Dermatofibroma (Benign)",
        category: ClinicalCategory::Benign,
    },
    ClassInfo {
        index: 4,
        label: "Melanoma (High Risk Cancer)",
        category: ClinicalCategory::Cancer,
    },
    ClassInfo {
        index: 5,
        label: "Common Mole (Benign)",
        category: ClinicalCategory::Benign,
    },
    ClassInfo {
        index: 6,
        label: "Vascular Lesion (Benign)",
        category: ClinicalCategory::Benign,
    },
];

/// Cancer and pre-cancerous classes. A primary call on one of these is
/// always `high` severity.
pub fn is_high_priority(index: usize) -> bool {
    CLASSES
        .get(index)
        .is_some_and(|class| class.category != ClinicalCategory::Benign)
}

pub fn class_label(index: usize) -> &'static str {
    CLASSES
        .get(index)
        .map(|class| class.label)
        .unwrap_or(UNKNOWN_LABEL)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskCheck {
    pub name: &'static str,
    pub index: usize,
    pub threshold: f64,
}

/// Hidden-risk thresholds, in check order. Melanoma is flagged far earlier
/// than the other two.
pub const RISK_CHECKS: [RiskCheck; 3] = [
    RiskCheck {
        name: "Melanoma",
        index: 4,
        threshold: 2.0,
    },
    RiskCheck {
        name: "Basal Cell",
        index: 1,
        threshold: 5.0,
    },
    RiskCheck {
        name: "Actinic Keratosis",
        index: 0,
        threshold: 5.0,
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityVector([f32; NUM_CLASSES]);

impl ProbabilityVector {
    pub fn from_slice(values: &[f32]) -> Result<Self, ScanError> {
        let probs: [f32; NUM_CLASSES] = values.try_into().map_err(|_| {
            ScanError::Inference(format!(
                "expected {} class probabilities, got {}",
                NUM_CLASSES,
                values.len()
            ))
        })?;
        Ok(ProbabilityVector(probs))
    }

    pub fn as_array(&self) -> &[f32; NUM_CLASSES] {
        &self.0
    }

    /// Probability of `index` scaled to percent. Scaled in `f32` before
    /// widening, so 0.05 reads as exactly 5.0.
    pub fn percent(&self, index: usize) -> f64 {
        scale_percent(self.0[index])
    }
}

pub fn scale_percent(prob: f32) -> f64 {
    f64::from(prob * 100.0)
}

impl TryFrom<Vec<f32>> for ProbabilityVector {
    type Error = ScanError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Self::from_slice(&values)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskEntry {
    pub name: &'static str,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub diagnosis: String,
    pub confidence: f64,
    pub severity: Severity,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResponse {
    pub success: bool,
    #[serde(flatten)]
    pub verdict: Verdict,
}

impl ScanResponse {
    pub fn success(verdict: Verdict) -> Self {
        ScanResponse {
            success: true,
            verdict,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn online() -> Self {
        HealthResponse {
            status: "online".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
