use serde::{Deserialize, Serialize};

use crate::models::employee::Employee;
use crate::models::kpi_value::KpiValueRecord;
use crate::models::period::Period;

/// One employee's rolled-up result for a period. Derived on demand, never
/// stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummaryRow {
    pub employee_id: i64,
    pub employee_name: String,
    pub department_id: Option<i64>,
    pub department_name: Option<String>,
    pub period_id: i64,
    pub period_label: String,
    pub total_score: Option<f64>,
    pub status: Option<String>,
    /// Operator-set statuses across the employee's values: the shared label,
    /// `"Mixed"` when they differ, or `None` when none are set.
    pub recorded_status: Option<String>,
    pub scored_kpis: usize,
    pub total_kpis: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub employee_id: i64,
    pub period_id: i64,
    pub weighted_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePeriodValues {
    pub period: Period,
    pub employee: Employee,
    pub values: Vec<KpiValueRecord>,
}
