// Error handling and edge case tests

use kpi_scorecard_lib::commands::CommandError;
use kpi_scorecard_lib::db::DbPool;
use kpi_scorecard_lib::error::AppError;
use kpi_scorecard_lib::models::department::{DepartmentCreateInput, DepartmentUpdateInput};
use kpi_scorecard_lib::models::employee::EmployeeCreateInput;
use kpi_scorecard_lib::models::kpi::KpiCreateInput;
use kpi_scorecard_lib::models::kpi_value::KpiValueCreateInput;
use kpi_scorecard_lib::models::period::PeriodCreateInput;
use kpi_scorecard_lib::models::settings::ScoringPolicy;
use kpi_scorecard_lib::services::kpi_value_service::KpiValueService;
use kpi_scorecard_lib::services::reference_service::ReferenceService;
use kpi_scorecard_lib::services::report_service::ReportService;
use kpi_scorecard_lib::services::summary_reporter::DepartmentScope;
use tempfile::tempdir;

fn setup_test_environment() -> (ReferenceService, KpiValueService, ReportService, tempfile::TempDir) {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("test.sqlite")).expect("db pool");
    let policy = ScoringPolicy::default();
    (
        ReferenceService::new(pool.clone()),
        KpiValueService::new(pool.clone(), &policy),
        ReportService::new(pool, policy),
        dir,
    )
}

/// Employee, period and KPI ids of a minimal scorecard.
fn seed(reference: &ReferenceService) -> (i64, i64, i64) {
    let employee = reference
        .create_employee(EmployeeCreateInput {
            name: "Ada".to_string(),
            ..Default::default()
        })
        .expect("employee");
    let period = reference
        .create_period(PeriodCreateInput {
            year: 2024,
            month: 1,
            label: None,
        })
        .expect("period");
    let kpi = reference
        .create_kpi(KpiCreateInput {
            name: "Sales".to_string(),
            ..Default::default()
        })
        .expect("kpi");
    (employee.id, period.id, kpi.id)
}

#[test]
fn test_unknown_references_are_not_found() {
    let (reference, values, reports, _dir) = setup_test_environment();
    let (employee_id, period_id, kpi_id) = seed(&reference);

    let err = values
        .create_value(KpiValueCreateInput {
            employee_id: 999,
            period_id,
            kpi_id,
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(err.missing_reference(), Some(("employee", 999)));

    let err = values
        .create_value(KpiValueCreateInput {
            employee_id,
            period_id: 998,
            kpi_id,
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(err.missing_reference(), Some(("period", 998)));

    let err = reports
        .summarize_period(404, None, DepartmentScope::default())
        .unwrap_err();
    assert_eq!(err.missing_reference(), Some(("period", 404)));

    let err = reports
        .summarize_period(period_id, Some(77), DepartmentScope::default())
        .unwrap_err();
    assert_eq!(err.missing_reference(), Some(("department", 77)));

    let err = reports.score_employee_period(555, period_id).unwrap_err();
    assert_eq!(err.missing_reference(), Some(("employee", 555)));

    let err = values.update_value(12345, Default::default()).unwrap_err();
    assert_eq!(err.missing_reference(), Some(("kpi value", 12345)));
}

#[test]
fn test_duplicate_value_is_conflict() {
    let (reference, values, _reports, _dir) = setup_test_environment();
    let (employee_id, period_id, kpi_id) = seed(&reference);

    let input = KpiValueCreateInput {
        employee_id,
        period_id,
        kpi_id,
        target_value: Some(10.0),
        actual_value: Some(10.0),
        ..Default::default()
    };
    values.create_value(input.clone()).expect("first value");

    let err = values.create_value(input).unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));

    let command: CommandError = err.into();
    assert_eq!(command.code, "CONFLICT");
}

#[test]
fn test_malformed_input_is_rejected() {
    let (reference, values, _reports, _dir) = setup_test_environment();
    let (employee_id, period_id, kpi_id) = seed(&reference);

    let err = values
        .create_value(KpiValueCreateInput {
            employee_id,
            period_id,
            kpi_id,
            weight: Some(-1.0),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let err = values
        .create_value(KpiValueCreateInput {
            employee_id,
            period_id,
            kpi_id,
            actual_value: Some(f64::NAN),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let err = reference
        .create_kpi(KpiCreateInput {
            name: "Negative".to_string(),
            default_weight: Some(-2.0),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let err = reference
        .create_period(PeriodCreateInput {
            year: 2024,
            month: 13,
            label: None,
        })
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let err = reference
        .create_employee(EmployeeCreateInput {
            name: "   ".to_string(),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let command: CommandError = err.into();
    assert_eq!(command.code, "VALIDATION_ERROR");
}

#[test]
fn test_referenced_rows_cannot_be_deleted() {
    let (reference, values, _reports, _dir) = setup_test_environment();
    let (employee_id, period_id, kpi_id) = seed(&reference);
    values
        .create_value(KpiValueCreateInput {
            employee_id,
            period_id,
            kpi_id,
            ..Default::default()
        })
        .expect("value");

    let err = reference.delete_kpi(kpi_id).unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));

    let err = reference.delete_period(period_id).unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));

    let err = reference.delete_employee(employee_id).unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));

    // Still there afterwards.
    assert!(reference.get_kpi(kpi_id).is_ok());
}

#[test]
fn test_department_cycles_are_rejected() {
    let (reference, _values, _reports, _dir) = setup_test_environment();

    let parent = reference
        .create_department(DepartmentCreateInput {
            name: "Parent".to_string(),
            ..Default::default()
        })
        .expect("parent");
    let child = reference
        .create_department(DepartmentCreateInput {
            name: "Child".to_string(),
            parent_department_id: Some(parent.id),
            ..Default::default()
        })
        .expect("child");

    let err = reference
        .update_department(
            parent.id,
            DepartmentUpdateInput {
                parent_department_id: Some(Some(child.id)),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let err = reference
        .update_department(
            parent.id,
            DepartmentUpdateInput {
                parent_department_id: Some(Some(parent.id)),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let err = reference.delete_department(parent.id).unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));
}
