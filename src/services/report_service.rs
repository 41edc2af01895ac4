use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::report::{EmployeeSummaryRow, ScoreSummary};
use crate::models::settings::ScoringPolicy;
use crate::services::scorecard_source::ScorecardSnapshot;
use crate::services::summary_reporter::{DepartmentScope, SummaryReporter};

/// Period reports over the database. Each call reads one snapshot and then
/// computes without touching the connection again.
#[derive(Clone)]
pub struct ReportService {
    db: DbPool,
    reporter: SummaryReporter,
}

impl ReportService {
    pub fn new(db: DbPool, policy: ScoringPolicy) -> Self {
        Self {
            db,
            reporter: SummaryReporter::new(policy),
        }
    }

    pub fn summarize_period(
        &self,
        period_id: i64,
        department_id: Option<i64>,
        scope: DepartmentScope,
    ) -> AppResult<Vec<EmployeeSummaryRow>> {
        let snapshot = self.snapshot(period_id)?;
        self.reporter
            .summarize_period(&snapshot, period_id, department_id, scope)
    }

    pub fn score_employee_period(&self, employee_id: i64, period_id: i64) -> AppResult<ScoreSummary> {
        let snapshot = self.snapshot(period_id)?;
        self.reporter
            .score_employee_period(&snapshot, employee_id, period_id)
    }

    fn snapshot(&self, period_id: i64) -> AppResult<ScorecardSnapshot> {
        self.db
            .with_connection(|conn| ScorecardSnapshot::load_period(conn, period_id))
    }
}
