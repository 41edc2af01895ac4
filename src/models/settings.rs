use serde::{Deserialize, Serialize};

/// Upper bound applied to a normalized KPI score. Overachievement beyond
/// 150% of target still counts, but only up to this ceiling.
pub const DEFAULT_SCORE_CAP: f64 = 150.0;

pub const DEFAULT_FALLBACK_STATUS: &str = "At Risk";

/// Scoring and status policy.
///
/// Defaults:
///
/// | total score | status      |
/// |-------------|-------------|
/// | >= 90       | `Excellent` |
/// | >= 70       | `On Track`  |
/// | otherwise   | `At Risk`   |
///
/// and a per-KPI score cap of 150.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringPolicy {
    pub score_cap: f64,
    pub status_thresholds: Vec<StatusThreshold>,
    pub fallback_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusThreshold {
    pub min_score: f64,
    pub label: String,
}

impl StatusThreshold {
    pub fn new(min_score: f64, label: impl Into<String>) -> Self {
        Self {
            min_score,
            label: label.into(),
        }
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            score_cap: DEFAULT_SCORE_CAP,
            status_thresholds: vec![
                StatusThreshold::new(90.0, "Excellent"),
                StatusThreshold::new(70.0, "On Track"),
            ],
            fallback_status: DEFAULT_FALLBACK_STATUS.to_string(),
        }
    }
}

impl ScoringPolicy {
    /// Label for an overall score. Thresholds are checked from the highest
    /// `min_score` down; `None` in gives `None` out.
    pub fn status_for(&self, total_score: Option<f64>) -> Option<String> {
        let score = total_score?;
        let label = self
            .status_thresholds
            .iter()
            .filter(|threshold| score >= threshold.min_score)
            .max_by(|a, b| a.min_score.total_cmp(&b.min_score))
            .map(|threshold| threshold.label.as_str())
            .unwrap_or(self.fallback_status.as_str());
        Some(label.to_string())
    }
}
