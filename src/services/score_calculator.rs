use tracing::trace;

use crate::models::kpi::{Direction, KpiDefinition};
use crate::models::kpi_value::{KpiValueRecord, ScoreEntry};
use crate::models::settings::{ScoringPolicy, DEFAULT_SCORE_CAP};

/// Turns a single (target, actual) measurement into a score on the
/// `[0, score_cap]` scale, where 100 means "exactly on target".
///
/// Missing inputs and zero denominators yield `None`, never an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreCalculator {
    score_cap: f64,
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_SCORE_CAP)
    }
}

impl ScoreCalculator {
    pub fn new(score_cap: f64) -> Self {
        Self {
            score_cap: score_cap.max(0.0),
        }
    }

    pub fn from_policy(policy: &ScoringPolicy) -> Self {
        Self::new(policy.score_cap)
    }

    /// Score for a stored value. A manual score is returned untouched;
    /// otherwise the score is derived from target and actual, ignoring any
    /// previously computed score on the record.
    pub fn compute_score(&self, value: &KpiValueRecord, definition: &KpiDefinition) -> Option<f64> {
        if let ScoreEntry::Manual(score) = value.score {
            trace!(target: "app::score", value_id = value.id, score, "manual score kept");
            return Some(score);
        }

        self.score_measurement(definition.direction, value.target_value, value.actual_value)
    }

    pub fn score_measurement(
        &self,
        direction: Direction,
        target: Option<f64>,
        actual: Option<f64>,
    ) -> Option<f64> {
        let (target, actual) = (target?, actual?);

        // Scale before dividing so whole percentages come out exact.
        let score = match direction {
            Direction::HigherIsBetter => {
                if target == 0.0 {
                    return None;
                }
                actual * 100.0 / target
            }
            Direction::LowerIsBetter => {
                if target == 0.0 || actual == 0.0 {
                    return None;
                }
                target * 100.0 / actual
            }
        };

        if !score.is_finite() {
            return None;
        }

        Some(score.clamp(0.0, self.score_cap))
    }

    /// The score entry to persist after a write: an operator-supplied score
    /// becomes `Manual`, anything else is recomputed.
    pub fn entry_for(
        &self,
        manual_score: Option<f64>,
        direction: Direction,
        target: Option<f64>,
        actual: Option<f64>,
    ) -> ScoreEntry {
        match manual_score {
            Some(score) => ScoreEntry::Manual(score),
            None => ScoreEntry::computed(self.score_measurement(direction, target, actual)),
        }
    }
}

/// [`ScoreCalculator::compute_score`] with the default cap of 150.
pub fn compute_score(value: &KpiValueRecord, definition: &KpiDefinition) -> Option<f64> {
    ScoreCalculator::default().compute_score(value, definition)
}
