// Period summary reports over a populated database

use kpi_scorecard_lib::db::DbPool;
use kpi_scorecard_lib::models::department::{DepartmentCreateInput, DepartmentUpdateInput};
use kpi_scorecard_lib::models::employee::EmployeeCreateInput;
use kpi_scorecard_lib::models::kpi::{Direction, KpiCreateInput};
use kpi_scorecard_lib::models::kpi_value::KpiValueCreateInput;
use kpi_scorecard_lib::models::period::PeriodCreateInput;
use kpi_scorecard_lib::models::settings::{ScoringPolicy, StatusThreshold};
use kpi_scorecard_lib::services::kpi_value_service::KpiValueService;
use kpi_scorecard_lib::services::reference_service::ReferenceService;
use kpi_scorecard_lib::services::report_service::ReportService;
use kpi_scorecard_lib::services::summary_reporter::DepartmentScope;
use tempfile::tempdir;

struct Fixture {
    pool: DbPool,
    reference: ReferenceService,
    values: KpiValueService,
    period_id: i64,
    sales_id: i64,
    defects_id: i64,
    company_id: i64,
    engineering_id: i64,
    platform_id: i64,
    _dir: tempfile::TempDir,
}

/// Company > Engineering > Platform, plus one KPI of each direction.
fn setup_fixture() -> Fixture {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("report.sqlite")).expect("db pool");
    let reference = ReferenceService::new(pool.clone());
    let values = KpiValueService::new(pool.clone(), &ScoringPolicy::default());

    let company = reference
        .create_department(DepartmentCreateInput {
            name: "Company".to_string(),
            ..Default::default()
        })
        .expect("company");
    let engineering = reference
        .create_department(DepartmentCreateInput {
            name: "Engineering".to_string(),
            parent_department_id: Some(company.id),
            ..Default::default()
        })
        .expect("engineering");
    let platform = reference
        .create_department(DepartmentCreateInput {
            name: "Platform".to_string(),
            parent_department_id: Some(engineering.id),
            ..Default::default()
        })
        .expect("platform");

    let period = reference
        .create_period(PeriodCreateInput {
            year: 2024,
            month: 6,
            label: None,
        })
        .expect("period");
    let sales = reference
        .create_kpi(KpiCreateInput {
            name: "Sales".to_string(),
            direction: Some(Direction::HigherIsBetter),
            ..Default::default()
        })
        .expect("sales");
    let defects = reference
        .create_kpi(KpiCreateInput {
            name: "Defects".to_string(),
            direction: Some(Direction::LowerIsBetter),
            ..Default::default()
        })
        .expect("defects");

    Fixture {
        pool,
        reference,
        values,
        period_id: period.id,
        sales_id: sales.id,
        defects_id: defects.id,
        company_id: company.id,
        engineering_id: engineering.id,
        platform_id: platform.id,
        _dir: dir,
    }
}

impl Fixture {
    fn employee(&self, name: &str, department_id: Option<i64>) -> i64 {
        self.reference
            .create_employee(EmployeeCreateInput {
                name: name.to_string(),
                department_id,
                ..Default::default()
            })
            .expect("employee")
            .id
    }

    fn value(
        &self,
        employee_id: i64,
        kpi_id: i64,
        target: f64,
        actual: f64,
        weight: f64,
        status: Option<&str>,
    ) {
        self.values
            .create_value(KpiValueCreateInput {
                employee_id,
                period_id: self.period_id,
                kpi_id,
                target_value: Some(target),
                actual_value: Some(actual),
                weight: Some(weight),
                status: status.map(str::to_string),
                ..Default::default()
            })
            .expect("value");
    }

    fn reports(&self) -> ReportService {
        ReportService::new(self.pool.clone(), ScoringPolicy::default())
    }
}

#[test]
fn test_weighted_summary_end_to_end() {
    let fx = setup_fixture();
    let ada = fx.employee("Ada", Some(fx.platform_id));
    fx.value(ada, fx.sales_id, 100.0, 120.0, 2.0, None);
    fx.value(ada, fx.defects_id, 50.0, 40.0, 1.0, None);

    let rows = fx
        .reports()
        .summarize_period(fx.period_id, None, DepartmentScope::default())
        .expect("report");
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    let total = row.total_score.expect("total score");
    assert!((total - 365.0 / 3.0).abs() < 1e-9, "got {total}");
    assert_eq!(row.status.as_deref(), Some("Excellent"));
    assert_eq!(row.period_label, "2024-06");
    assert_eq!(row.department_name.as_deref(), Some("Platform"));
    assert_eq!(row.scored_kpis, 2);
    assert_eq!(row.total_kpis, 2);
}

#[test]
fn test_department_filter_includes_sub_departments() {
    let fx = setup_fixture();
    let root_person = fx.employee("Root", Some(fx.company_id));
    let eng_person = fx.employee("Eng", Some(fx.engineering_id));
    let plat_person = fx.employee("Plat", Some(fx.platform_id));
    let nowhere = fx.employee("Nowhere", None);
    for id in [root_person, eng_person, plat_person, nowhere] {
        fx.value(id, fx.sales_id, 100.0, 80.0, 1.0, None);
    }

    let reports = fx.reports();
    let names = |department: Option<i64>, scope: DepartmentScope| -> Vec<String> {
        reports
            .summarize_period(fx.period_id, department, scope)
            .expect("report")
            .into_iter()
            .map(|row| row.employee_name)
            .collect()
    };

    assert_eq!(
        names(None, DepartmentScope::WithDescendants),
        vec!["Eng", "Nowhere", "Plat", "Root"]
    );
    assert_eq!(
        names(Some(fx.engineering_id), DepartmentScope::WithDescendants),
        vec!["Eng", "Plat"]
    );
    assert_eq!(
        names(Some(fx.engineering_id), DepartmentScope::Exact),
        vec!["Eng"]
    );
    assert_eq!(
        names(Some(fx.platform_id), DepartmentScope::WithDescendants),
        vec!["Plat"]
    );
}

#[test]
fn test_reparenting_moves_employees_between_reports() {
    let fx = setup_fixture();
    let plat_person = fx.employee("Plat", Some(fx.platform_id));
    fx.value(plat_person, fx.sales_id, 100.0, 100.0, 1.0, None);

    fx.reference
        .update_department(
            fx.platform_id,
            DepartmentUpdateInput {
                parent_department_id: Some(None),
                ..Default::default()
            },
        )
        .expect("detach platform");

    let rows = fx
        .reports()
        .summarize_period(fx.period_id, Some(fx.company_id), DepartmentScope::WithDescendants)
        .expect("report");
    assert!(rows.is_empty());
}

#[test]
fn test_employees_without_values_are_omitted_and_statuses_roll_up() {
    let fx = setup_fixture();
    let busy = fx.employee("Busy", None);
    let _idle = fx.employee("Idle", None);
    fx.value(busy, fx.sales_id, 100.0, 60.0, 1.0, Some("Approved"));
    fx.value(busy, fx.defects_id, 10.0, 10.0, 1.0, Some("Pending"));

    let rows = fx
        .reports()
        .summarize_period(fx.period_id, None, DepartmentScope::default())
        .expect("report");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].employee_name, "Busy");
    assert_eq!(rows[0].total_score, Some(80.0));
    assert_eq!(rows[0].status.as_deref(), Some("On Track"));
    assert_eq!(rows[0].recorded_status.as_deref(), Some("Mixed"));
}

#[test]
fn test_report_is_repeatable_and_policy_driven() {
    let fx = setup_fixture();
    let ada = fx.employee("Ada", None);
    fx.value(ada, fx.sales_id, 100.0, 95.0, 1.0, None);

    let reports = fx.reports();
    let first = reports
        .summarize_period(fx.period_id, None, DepartmentScope::default())
        .expect("first");
    let second = reports
        .summarize_period(fx.period_id, None, DepartmentScope::default())
        .expect("second");
    assert_eq!(first, second);
    assert_eq!(first[0].status.as_deref(), Some("Excellent"));

    let strict = ReportService::new(
        fx.pool.clone(),
        ScoringPolicy {
            status_thresholds: vec![StatusThreshold::new(100.0, "Excellent")],
            fallback_status: "Below Target".to_string(),
            ..ScoringPolicy::default()
        },
    );
    let rows = strict
        .summarize_period(fx.period_id, None, DepartmentScope::default())
        .expect("strict");
    assert_eq!(rows[0].status.as_deref(), Some("Below Target"));
}
