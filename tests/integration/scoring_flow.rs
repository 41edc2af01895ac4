// KPI value lifecycle against a real database file

use kpi_scorecard_lib::db::DbPool;
use kpi_scorecard_lib::models::employee::EmployeeCreateInput;
use kpi_scorecard_lib::models::kpi::{Direction, KpiCreateInput};
use kpi_scorecard_lib::models::kpi_value::{KpiValueCreateInput, KpiValueUpdateInput, ScoreEntry};
use kpi_scorecard_lib::models::period::PeriodCreateInput;
use kpi_scorecard_lib::models::settings::ScoringPolicy;
use kpi_scorecard_lib::services::kpi_value_service::KpiValueService;
use kpi_scorecard_lib::services::reference_service::ReferenceService;
use kpi_scorecard_lib::services::report_service::ReportService;
use tempfile::tempdir;

struct Env {
    reference: ReferenceService,
    values: KpiValueService,
    reports: ReportService,
    _dir: tempfile::TempDir,
}

fn setup_test_environment(policy: ScoringPolicy) -> Env {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("test.sqlite")).expect("db pool");
    Env {
        reference: ReferenceService::new(pool.clone()),
        values: KpiValueService::new(pool.clone(), &policy),
        reports: ReportService::new(pool, policy),
        _dir: dir,
    }
}

#[test]
fn test_value_lifecycle_with_manual_override() {
    let env = setup_test_environment(ScoringPolicy::default());

    let employee = env
        .reference
        .create_employee(EmployeeCreateInput {
            name: "Ada".to_string(),
            ..Default::default()
        })
        .expect("employee");
    let period = env
        .reference
        .create_period(PeriodCreateInput {
            year: 2024,
            month: 3,
            label: None,
        })
        .expect("period");
    assert_eq!(period.label.as_deref(), Some("2024-03"));

    let sales = env
        .reference
        .create_kpi(KpiCreateInput {
            name: "Sales".to_string(),
            default_weight: Some(2.0),
            ..Default::default()
        })
        .expect("kpi");

    let value = env
        .values
        .create_value(KpiValueCreateInput {
            employee_id: employee.id,
            period_id: period.id,
            kpi_id: sales.id,
            target_value: Some(100.0),
            actual_value: Some(90.0),
            ..Default::default()
        })
        .expect("value");
    assert_eq!(value.score, ScoreEntry::Computed(90.0));

    // Changing the actual recomputes.
    let value = env
        .values
        .update_value(
            value.id,
            KpiValueUpdateInput {
                actual_value: Some(Some(110.0)),
                ..Default::default()
            },
        )
        .expect("update actual");
    assert_eq!(value.score.value(), Some(110.0));
    assert!(!value.score.is_manual());

    // An operator score sticks through later input changes.
    let value = env
        .values
        .update_value(
            value.id,
            KpiValueUpdateInput {
                score: Some(Some(75.0)),
                ..Default::default()
            },
        )
        .expect("manual score");
    assert_eq!(value.score, ScoreEntry::Manual(75.0));

    let value = env
        .values
        .update_value(
            value.id,
            KpiValueUpdateInput {
                target_value: Some(Some(50.0)),
                ..Default::default()
            },
        )
        .expect("update target");
    assert_eq!(value.score, ScoreEntry::Manual(75.0));

    let summary = env
        .reports
        .score_employee_period(employee.id, period.id)
        .expect("score");
    assert_eq!(summary.weighted_score, Some(75.0));

    // Dropping the override goes back to the computed score, capped.
    let value = env
        .values
        .update_value(
            value.id,
            KpiValueUpdateInput {
                score: Some(None),
                ..Default::default()
            },
        )
        .expect("clear manual");
    assert_eq!(value.score, ScoreEntry::Computed(150.0));

    env.values.delete_value(value.id).expect("delete");
    let listing = env
        .values
        .employee_period_values(employee.id, period.id)
        .expect("listing");
    assert!(listing.values.is_empty());
    assert_eq!(listing.employee.id, employee.id);

    let summary = env
        .reports
        .score_employee_period(employee.id, period.id)
        .expect("score after delete");
    assert_eq!(summary.weighted_score, None);
}

#[test]
fn test_lower_is_better_scoring() {
    let env = setup_test_environment(ScoringPolicy::default());

    let employee = env
        .reference
        .create_employee(EmployeeCreateInput {
            name: "Grace".to_string(),
            ..Default::default()
        })
        .expect("employee");
    let period = env
        .reference
        .create_period(PeriodCreateInput {
            year: 2024,
            month: 4,
            label: Some("April".to_string()),
        })
        .expect("period");
    let defects = env
        .reference
        .create_kpi(KpiCreateInput {
            name: "Defects".to_string(),
            direction: Some(Direction::LowerIsBetter),
            ..Default::default()
        })
        .expect("kpi");

    let create = |target: Option<f64>, actual: Option<f64>| KpiValueCreateInput {
        employee_id: employee.id,
        period_id: period.id,
        kpi_id: defects.id,
        target_value: target,
        actual_value: actual,
        ..Default::default()
    };

    let value = env.values.create_value(create(Some(50.0), Some(40.0))).expect("value");
    assert_eq!(value.score, ScoreEntry::Computed(125.0));

    // Zero actual cannot be a denominator.
    let value = env
        .values
        .update_value(
            value.id,
            KpiValueUpdateInput {
                actual_value: Some(Some(0.0)),
                ..Default::default()
            },
        )
        .expect("zero actual");
    assert_eq!(value.score, ScoreEntry::Unscored);
}

#[test]
fn test_configured_cap_applies_to_stored_and_reported_scores() {
    let policy = ScoringPolicy {
        score_cap: 110.0,
        ..ScoringPolicy::default()
    };
    let env = setup_test_environment(policy);

    let employee = env
        .reference
        .create_employee(EmployeeCreateInput {
            name: "Linus".to_string(),
            ..Default::default()
        })
        .expect("employee");
    let period = env
        .reference
        .create_period(PeriodCreateInput {
            year: 2024,
            month: 5,
            label: None,
        })
        .expect("period");
    let kpi = env
        .reference
        .create_kpi(KpiCreateInput {
            name: "Tickets".to_string(),
            ..Default::default()
        })
        .expect("kpi");

    let value = env
        .values
        .create_value(KpiValueCreateInput {
            employee_id: employee.id,
            period_id: period.id,
            kpi_id: kpi.id,
            target_value: Some(10.0),
            actual_value: Some(30.0),
            ..Default::default()
        })
        .expect("value");
    assert_eq!(value.score, ScoreEntry::Computed(110.0));

    let summary = env
        .reports
        .score_employee_period(employee.id, period.id)
        .expect("score");
    assert_eq!(summary.weighted_score, Some(110.0));
}
