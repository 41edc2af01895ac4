use std::collections::HashMap;

use rusqlite::Connection;
use tracing::debug;

use crate::db::repositories::department_repository::DepartmentRepository;
use crate::db::repositories::employee_repository::EmployeeRepository;
use crate::db::repositories::kpi_repository::KpiRepository;
use crate::db::repositories::kpi_value_repository::KpiValueRepository;
use crate::db::repositories::period_repository::PeriodRepository;
use crate::error::{AppError, AppResult};
use crate::models::department::Department;
use crate::models::employee::Employee;
use crate::models::kpi::KpiDefinition;
use crate::models::kpi_value::KpiValueRecord;
use crate::models::period::Period;

/// Lookups of departments, employees, periods and KPI definitions.
pub trait ReferenceData {
    fn period(&self, id: i64) -> AppResult<Option<Period>>;
    fn department(&self, id: i64) -> AppResult<Option<Department>>;
    fn departments(&self) -> AppResult<Vec<Department>>;
    fn employee(&self, id: i64) -> AppResult<Option<Employee>>;
    fn kpi(&self, id: i64) -> AppResult<Option<KpiDefinition>>;
}

/// Read access to stored KPI values.
pub trait KpiValueSource {
    fn values_for_period(&self, period_id: i64) -> AppResult<Vec<KpiValueRecord>>;

    fn values_for_employee_period(
        &self,
        employee_id: i64,
        period_id: i64,
    ) -> AppResult<Vec<KpiValueRecord>> {
        Ok(self
            .values_for_period(period_id)?
            .into_iter()
            .filter(|value| value.employee_id == employee_id)
            .collect())
    }
}

/// An in-memory copy of everything a period report reads.
///
/// Reports run against one snapshot so that a single report never mixes data
/// from before and after a concurrent write.
#[derive(Debug, Clone, Default)]
pub struct ScorecardSnapshot {
    periods: HashMap<i64, Period>,
    departments: HashMap<i64, Department>,
    employees: HashMap<i64, Employee>,
    kpis: HashMap<i64, KpiDefinition>,
    values: Vec<KpiValueRecord>,
}

impl ScorecardSnapshot {
    /// Loads reference data plus the KPI values of one period.
    ///
    /// All reads share one read transaction, so under WAL every table is seen
    /// as of the same commit.
    pub fn load_period(conn: &Connection, period_id: i64) -> AppResult<Self> {
        let tx = conn.unchecked_transaction()?;
        let snapshot = Self::read_period(&tx, period_id)?;
        tx.commit()?;

        debug!(
            target: "app::report",
            period_id,
            employees = snapshot.employees.len(),
            values = snapshot.values.len(),
            "scorecard snapshot loaded"
        );
        Ok(snapshot)
    }

    fn read_period(conn: &Connection, period_id: i64) -> AppResult<Self> {
        let mut snapshot = Self::default();

        if let Some(row) = PeriodRepository::find_by_id(conn, period_id)? {
            snapshot.periods.insert(row.id, row.into_record());
        }

        for row in DepartmentRepository::list_all(conn)? {
            snapshot.departments.insert(row.id, row.into_record());
        }

        for row in EmployeeRepository::list_all(conn)? {
            let employee = row.into_record()?;
            snapshot.employees.insert(employee.id, employee);
        }

        for row in KpiRepository::list_all(conn)? {
            let kpi = row.into_record()?;
            snapshot.kpis.insert(kpi.id, kpi);
        }

        snapshot.values = KpiValueRepository::list_by_period(conn, period_id)?
            .into_iter()
            .map(|row| row.into_record())
            .collect();

        Ok(snapshot)
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.periods.insert(period.id, period);
        self
    }

    pub fn with_department(mut self, department: Department) -> Self {
        self.departments.insert(department.id, department);
        self
    }

    pub fn with_employee(mut self, employee: Employee) -> Self {
        self.employees.insert(employee.id, employee);
        self
    }

    pub fn with_kpi(mut self, kpi: KpiDefinition) -> Self {
        self.kpis.insert(kpi.id, kpi);
        self
    }

    pub fn with_value(mut self, value: KpiValueRecord) -> Self {
        self.values.push(value);
        self
    }
}

impl ReferenceData for ScorecardSnapshot {
    fn period(&self, id: i64) -> AppResult<Option<Period>> {
        Ok(self.periods.get(&id).cloned())
    }

    fn department(&self, id: i64) -> AppResult<Option<Department>> {
        Ok(self.departments.get(&id).cloned())
    }

    fn departments(&self) -> AppResult<Vec<Department>> {
        let mut departments: Vec<Department> = self.departments.values().cloned().collect();
        departments.sort_by_key(|department| department.id);
        Ok(departments)
    }

    fn employee(&self, id: i64) -> AppResult<Option<Employee>> {
        Ok(self.employees.get(&id).cloned())
    }

    fn kpi(&self, id: i64) -> AppResult<Option<KpiDefinition>> {
        Ok(self.kpis.get(&id).cloned())
    }
}

impl KpiValueSource for ScorecardSnapshot {
    fn values_for_period(&self, period_id: i64) -> AppResult<Vec<KpiValueRecord>> {
        Ok(self
            .values
            .iter()
            .filter(|value| value.period_id == period_id)
            .cloned()
            .collect())
    }
}

/// Resolves a reference or reports it as missing.
pub fn require<T>(found: Option<T>, entity: &'static str, id: i64) -> AppResult<T> {
    found.ok_or_else(|| AppError::not_found(entity, id))
}
