use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::kpi::KpiDefinition;
use crate::models::kpi_value::KpiValueRecord;

/// Weight a value contributes with: its own weight, else the KPI's default
/// weight, else zero.
pub fn effective_weight(value: &KpiValueRecord, definition: &KpiDefinition) -> f64 {
    value
        .weight
        .or(definition.default_weight)
        .unwrap_or(0.0)
}

/// Combines `(score, weight)` pairs into one overall score.
///
/// Unscored entries are dropped before anything else, so their weight never
/// reaches the denominator. With nothing left the result is `None`. When the
/// remaining weights sum to zero the plain mean of the remaining scores is
/// used; otherwise the weighted mean.
///
/// Fails only on malformed weights (negative or non-finite).
pub fn aggregate_employee_score(entries: &[(Option<f64>, f64)]) -> AppResult<Option<f64>> {
    for (index, (_, weight)) in entries.iter().enumerate() {
        if !weight.is_finite() || *weight < 0.0 {
            return Err(AppError::validation_with_details(
                "KPI weight must be a non-negative number",
                json!({ "index": index, "weight": weight.to_string() }),
            ));
        }
    }

    let scored: Vec<(f64, f64)> = entries
        .iter()
        .filter_map(|(score, weight)| score.map(|score| (score, *weight)))
        .collect();

    if scored.is_empty() {
        return Ok(None);
    }

    let total_weight: f64 = scored.iter().map(|(_, weight)| weight).sum();
    if total_weight == 0.0 {
        let sum: f64 = scored.iter().map(|(score, _)| score).sum();
        return Ok(Some(sum / scored.len() as f64));
    }

    let weighted_sum: f64 = scored.iter().map(|(score, weight)| score * weight).sum();
    Ok(Some(weighted_sum / total_weight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::kpi::Direction;
    use crate::models::kpi_value::ScoreEntry;
    use proptest::prelude::*;

    fn approx(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("score expected");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn unscored_entries_do_not_dilute_the_mean() {
        let overall = aggregate_employee_score(&[(Some(80.0), 2.0), (None, 5.0), (Some(60.0), 0.0)])
            .unwrap();
        approx(overall, 80.0);
    }

    #[test]
    fn zero_weight_sum_falls_back_to_plain_mean() {
        let overall = aggregate_employee_score(&[(Some(80.0), 0.0), (Some(60.0), 0.0)]).unwrap();
        approx(overall, 70.0);
    }

    #[test]
    fn empty_and_unscored_sets_yield_none() {
        assert_eq!(aggregate_employee_score(&[]).unwrap(), None);
        assert_eq!(
            aggregate_employee_score(&[(None, 1.0), (None, 0.0)]).unwrap(),
            None
        );
    }

    #[test]
    fn weighted_mean_of_mixed_directions() {
        let overall = aggregate_employee_score(&[(Some(120.0), 2.0), (Some(125.0), 1.0)]).unwrap();
        approx(overall, 365.0 / 3.0);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let err = aggregate_employee_score(&[(Some(50.0), -1.0)]).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn effective_weight_falls_back_to_definition_then_zero() {
        let mut definition = KpiDefinition {
            id: 1,
            name: "Tickets closed".to_string(),
            category: None,
            unit: None,
            direction: Direction::HigherIsBetter,
            default_weight: Some(3.0),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let mut value = KpiValueRecord {
            id: 1,
            employee_id: 1,
            period_id: 1,
            kpi_id: 1,
            target_value: None,
            actual_value: None,
            weight: Some(1.5),
            score: ScoreEntry::Unscored,
            comment: None,
            status: None,
            created_at: String::new(),
            updated_at: String::new(),
        };

        assert_eq!(effective_weight(&value, &definition), 1.5);
        value.weight = None;
        assert_eq!(effective_weight(&value, &definition), 3.0);
        definition.default_weight = None;
        assert_eq!(effective_weight(&value, &definition), 0.0);
    }

    proptest! {
        #[test]
        fn overall_lies_between_min_and_max_score(
            entries in prop::collection::vec((0.0f64..150.0, 0.0f64..10.0), 1..20),
        ) {
            let pairs: Vec<(Option<f64>, f64)> =
                entries.iter().map(|(score, weight)| (Some(*score), *weight)).collect();
            let overall = aggregate_employee_score(&pairs).unwrap().unwrap();
            let min = entries.iter().map(|(score, _)| *score).fold(f64::INFINITY, f64::min);
            let max = entries.iter().map(|(score, _)| *score).fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(overall >= min - 1e-9 && overall <= max + 1e-9);
        }

        #[test]
        fn appending_unscored_entries_changes_nothing(
            entries in prop::collection::vec((0.0f64..150.0, 0.0f64..10.0), 0..10),
            noise in prop::collection::vec(0.0f64..10.0, 1..5),
        ) {
            let mut pairs: Vec<(Option<f64>, f64)> =
                entries.iter().map(|(score, weight)| (Some(*score), *weight)).collect();
            let before = aggregate_employee_score(&pairs).unwrap();
            pairs.extend(noise.into_iter().map(|weight| (None, weight)));
            let after = aggregate_employee_score(&pairs).unwrap();
            prop_assert_eq!(before, after);
        }
    }
}
