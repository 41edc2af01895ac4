use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::{debug, info};

use crate::error::AppResult;
use crate::models::department::Department;
use crate::models::kpi::KpiDefinition;
use crate::models::kpi_value::KpiValueRecord;
use crate::models::report::{EmployeeSummaryRow, ScoreSummary};
use crate::models::settings::ScoringPolicy;
use crate::services::department_hierarchy::DepartmentTree;
use crate::services::score_calculator::ScoreCalculator;
use crate::services::scorecard_source::{require, KpiValueSource, ReferenceData};
use crate::services::weighted_aggregator::{aggregate_employee_score, effective_weight};

const MIXED_STATUS: &str = "Mixed";

/// How a department filter matches employees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DepartmentScope {
    /// The department and everything below it.
    #[default]
    WithDescendants,
    /// Only employees assigned directly to the department.
    Exact,
}

/// Builds per-employee period summaries. Read-only: the same source yields
/// the same rows every time.
#[derive(Debug, Clone)]
pub struct SummaryReporter {
    calculator: ScoreCalculator,
    policy: ScoringPolicy,
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new(ScoringPolicy::default())
    }
}

impl SummaryReporter {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self {
            calculator: ScoreCalculator::from_policy(&policy),
            policy,
        }
    }

    /// One row per employee with at least one KPI value in the period,
    /// ordered by name then id.
    pub fn summarize_period<S>(
        &self,
        source: &S,
        period_id: i64,
        department_id: Option<i64>,
        scope: DepartmentScope,
    ) -> AppResult<Vec<EmployeeSummaryRow>>
    where
        S: ReferenceData + KpiValueSource,
    {
        let period = require(source.period(period_id)?, "period", period_id)?;
        let period_label = period.display_label();

        let departments = source.departments()?;
        let allowed = match department_id {
            Some(id) => Some(resolve_department_filter(source, &departments, id, scope)?),
            None => None,
        };
        let department_names: HashMap<i64, &Department> = departments
            .iter()
            .map(|department| (department.id, department))
            .collect();

        let mut by_employee: BTreeMap<i64, Vec<KpiValueRecord>> = BTreeMap::new();
        for value in source.values_for_period(period_id)? {
            by_employee.entry(value.employee_id).or_default().push(value);
        }

        let mut kpis: HashMap<i64, KpiDefinition> = HashMap::new();
        let mut rows = Vec::with_capacity(by_employee.len());

        for (employee_id, values) in by_employee {
            let employee = require(source.employee(employee_id)?, "employee", employee_id)?;

            if let Some(allowed) = allowed.as_ref() {
                let included = employee
                    .department_id
                    .is_some_and(|id| allowed.contains(&id));
                if !included {
                    continue;
                }
            }

            let (total_score, scored_kpis) = self.score_values(source, &values, &mut kpis)?;
            let department = employee
                .department_id
                .and_then(|id| department_names.get(&id));

            rows.push(EmployeeSummaryRow {
                employee_id,
                employee_name: employee.name,
                department_id: employee.department_id,
                department_name: department.map(|department| department.name.clone()),
                period_id,
                period_label: period_label.clone(),
                total_score,
                status: self.policy.status_for(total_score),
                recorded_status: roll_up_statuses(&values),
                scored_kpis,
                total_kpis: values.len(),
            });
        }

        rows.sort_by(|a, b| {
            a.employee_name
                .cmp(&b.employee_name)
                .then(a.employee_id.cmp(&b.employee_id))
        });

        info!(
            target: "app::report",
            period_id,
            department_id = ?department_id,
            rows = rows.len(),
            "period summary computed"
        );
        Ok(rows)
    }

    /// Weighted score of a single employee for a period.
    pub fn score_employee_period<S>(
        &self,
        source: &S,
        employee_id: i64,
        period_id: i64,
    ) -> AppResult<ScoreSummary>
    where
        S: ReferenceData + KpiValueSource,
    {
        require(source.employee(employee_id)?, "employee", employee_id)?;
        require(source.period(period_id)?, "period", period_id)?;

        let values = source.values_for_employee_period(employee_id, period_id)?;
        let mut kpis = HashMap::new();
        let (weighted_score, _) = self.score_values(source, &values, &mut kpis)?;

        Ok(ScoreSummary {
            employee_id,
            period_id,
            weighted_score,
        })
    }

    /// Overall score and number of scoreable values.
    fn score_values<S>(
        &self,
        source: &S,
        values: &[KpiValueRecord],
        kpis: &mut HashMap<i64, KpiDefinition>,
    ) -> AppResult<(Option<f64>, usize)>
    where
        S: ReferenceData + ?Sized,
    {
        let mut entries = Vec::with_capacity(values.len());
        for value in values {
            if !kpis.contains_key(&value.kpi_id) {
                let definition = require(source.kpi(value.kpi_id)?, "kpi", value.kpi_id)?;
                kpis.insert(value.kpi_id, definition);
            }
            let Some(definition) = kpis.get(&value.kpi_id) else {
                continue;
            };

            let score = self.calculator.compute_score(value, definition);
            debug!(
                target: "app::score",
                value_id = value.id,
                kpi_id = value.kpi_id,
                score = ?score,
                "kpi value scored"
            );
            entries.push((score, effective_weight(value, definition)));
        }

        let scored = entries.iter().filter(|(score, _)| score.is_some()).count();
        let overall = aggregate_employee_score(&entries)?;
        Ok((overall, scored))
    }
}

fn resolve_department_filter<S>(
    source: &S,
    departments: &[Department],
    department_id: i64,
    scope: DepartmentScope,
) -> AppResult<HashSet<i64>>
where
    S: ReferenceData + ?Sized,
{
    require(source.department(department_id)?, "department", department_id)?;

    Ok(match scope {
        DepartmentScope::Exact => HashSet::from([department_id]),
        DepartmentScope::WithDescendants => {
            DepartmentTree::from_departments(departments).descendants_of(department_id)
        }
    })
}

fn roll_up_statuses(values: &[KpiValueRecord]) -> Option<String> {
    let statuses: BTreeSet<&str> = values
        .iter()
        .filter_map(|value| value.status.as_deref())
        .map(str::trim)
        .filter(|status| !status.is_empty())
        .collect();

    match statuses.len() {
        0 => None,
        1 => statuses.into_iter().next().map(str::to_string),
        _ => Some(MIXED_STATUS.to_string()),
    }
}
