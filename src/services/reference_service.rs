use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use crate::db::repositories::department_repository::{DepartmentRepository, DepartmentRow};
use crate::db::repositories::employee_repository::{EmployeeRepository, EmployeeRow};
use crate::db::repositories::kpi_repository::{KpiRepository, KpiRow};
use crate::db::repositories::period_repository::{PeriodRepository, PeriodRow};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::department::{Department, DepartmentCreateInput, DepartmentUpdateInput};
use crate::models::employee::{Employee, EmployeeCreateInput, EmployeeUpdateInput};
use crate::models::kpi::{KpiCreateInput, KpiDefinition, KpiUpdateInput};
use crate::models::period::{default_label, Period, PeriodCreateInput, PeriodUpdateInput};
use crate::services::department_hierarchy::DepartmentTree;

const MAX_NAME_LENGTH: usize = 200;

/// CRUD for the reference data that KPI values point at: departments,
/// employees, KPI definitions and periods.
#[derive(Clone)]
pub struct ReferenceService {
    db: DbPool,
}

impl ReferenceService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    // Departments

    pub fn create_department(&self, input: DepartmentCreateInput) -> AppResult<Department> {
        let name = normalize_name(&input.name, "department")?;
        let now = Utc::now().to_rfc3339();

        let department = self.db.with_connection(|conn| {
            if let Some(parent_id) = input.parent_department_id {
                DepartmentRepository::find_by_id(conn, parent_id)?
                    .ok_or_else(|| AppError::not_found("department", parent_id))?;
            }

            let mut record = Department {
                id: 0,
                name,
                parent_department_id: input.parent_department_id,
                is_active: input.is_active.unwrap_or(true),
                created_at: now.clone(),
                updated_at: now,
            };
            record.id = DepartmentRepository::insert(conn, &DepartmentRow::from_record(&record))?;
            Ok(record)
        })?;

        info!(department_id = department.id, "department created");
        Ok(department)
    }

    pub fn update_department(&self, id: i64, update: DepartmentUpdateInput) -> AppResult<Department> {
        let department = self.db.with_connection(|conn| {
            let mut record = DepartmentRepository::find_by_id(conn, id)?
                .ok_or_else(|| AppError::not_found("department", id))?
                .into_record();

            if let Some(name) = update.name {
                record.name = normalize_name(&name, "department")?;
            }

            if let Some(parent) = update.parent_department_id {
                if let Some(parent_id) = parent {
                    DepartmentRepository::find_by_id(conn, parent_id)?
                        .ok_or_else(|| AppError::not_found("department", parent_id))?;

                    let departments: Vec<Department> = DepartmentRepository::list_all(conn)?
                        .into_iter()
                        .map(|row| row.into_record())
                        .collect();
                    let tree = DepartmentTree::from_departments(&departments);
                    if tree.would_create_cycle(id, parent_id) {
                        return Err(AppError::validation_with_details(
                            "department cannot be placed under itself or its descendants",
                            json!({ "departmentId": id, "parentDepartmentId": parent_id }),
                        ));
                    }
                }
                record.parent_department_id = parent;
            }

            if let Some(is_active) = update.is_active {
                record.is_active = is_active;
            }

            record.updated_at = Utc::now().to_rfc3339();
            DepartmentRepository::update(conn, &DepartmentRow::from_record(&record))?;
            Ok(record)
        })?;

        info!(department_id = id, "department updated");
        Ok(department)
    }

    pub fn delete_department(&self, id: i64) -> AppResult<()> {
        self.db
            .with_connection(|conn| DepartmentRepository::delete(conn, id))?;
        info!(department_id = id, "department deleted");
        Ok(())
    }

    pub fn get_department(&self, id: i64) -> AppResult<Department> {
        self.db
            .with_connection(|conn| DepartmentRepository::find_by_id(conn, id))?
            .map(DepartmentRow::into_record)
            .ok_or_else(|| AppError::not_found("department", id))
    }

    pub fn list_departments(&self) -> AppResult<Vec<Department>> {
        let rows = self
            .db
            .with_connection(|conn| DepartmentRepository::list_all(conn))?;
        let departments: Vec<Department> =
            rows.into_iter().map(DepartmentRow::into_record).collect();
        debug!(count = departments.len(), "departments listed");
        Ok(departments)
    }

    // Employees

    pub fn create_employee(&self, input: EmployeeCreateInput) -> AppResult<Employee> {
        let name = normalize_name(&input.name, "employee")?;
        let now = Utc::now().to_rfc3339();

        let employee = self.db.with_connection(|conn| {
            if let Some(department_id) = input.department_id {
                DepartmentRepository::find_by_id(conn, department_id)?
                    .ok_or_else(|| AppError::not_found("department", department_id))?;
            }

            let mut record = Employee {
                id: 0,
                name,
                department_id: input.department_id,
                title: normalize_optional_string(input.title),
                hire_date: input.hire_date,
                is_active: input.is_active.unwrap_or(true),
                created_at: now.clone(),
                updated_at: now,
            };
            record.id = EmployeeRepository::insert(conn, &EmployeeRow::from_record(&record))?;
            Ok(record)
        })?;

        info!(employee_id = employee.id, "employee created");
        Ok(employee)
    }

    pub fn update_employee(&self, id: i64, update: EmployeeUpdateInput) -> AppResult<Employee> {
        let employee = self.db.with_connection(|conn| {
            let mut record = EmployeeRepository::find_by_id(conn, id)?
                .ok_or_else(|| AppError::not_found("employee", id))?
                .into_record()?;

            if let Some(name) = update.name {
                record.name = normalize_name(&name, "employee")?;
            }

            if let Some(department_id) = update.department_id {
                if let Some(department_id) = department_id {
                    DepartmentRepository::find_by_id(conn, department_id)?
                        .ok_or_else(|| AppError::not_found("department", department_id))?;
                }
                record.department_id = department_id;
            }

            if let Some(title) = update.title {
                record.title = normalize_optional_string(title);
            }

            if let Some(hire_date) = update.hire_date {
                record.hire_date = hire_date;
            }

            if let Some(is_active) = update.is_active {
                record.is_active = is_active;
            }

            record.updated_at = Utc::now().to_rfc3339();
            EmployeeRepository::update(conn, &EmployeeRow::from_record(&record))?;
            Ok(record)
        })?;

        info!(employee_id = id, "employee updated");
        Ok(employee)
    }

    pub fn delete_employee(&self, id: i64) -> AppResult<()> {
        self.db
            .with_connection(|conn| EmployeeRepository::delete(conn, id))?;
        info!(employee_id = id, "employee deleted");
        Ok(())
    }

    pub fn get_employee(&self, id: i64) -> AppResult<Employee> {
        self.db
            .with_connection(|conn| EmployeeRepository::find_by_id(conn, id))?
            .ok_or_else(|| AppError::not_found("employee", id))?
            .into_record()
    }

    /// All employees, or only those assigned directly to `department_id`.
    pub fn list_employees(&self, department_id: Option<i64>) -> AppResult<Vec<Employee>> {
        let rows = self.db.with_connection(|conn| match department_id {
            Some(id) => EmployeeRepository::list_by_department(conn, id),
            None => EmployeeRepository::list_all(conn),
        })?;
        let employees = rows
            .into_iter()
            .map(EmployeeRow::into_record)
            .collect::<AppResult<Vec<_>>>()?;
        debug!(count = employees.len(), "employees listed");
        Ok(employees)
    }

    // KPI definitions

    pub fn create_kpi(&self, input: KpiCreateInput) -> AppResult<KpiDefinition> {
        let now = Utc::now().to_rfc3339();
        let mut record = KpiDefinition {
            id: 0,
            name: normalize_name(&input.name, "kpi")?,
            category: normalize_optional_string(input.category),
            unit: normalize_optional_string(input.unit),
            direction: input.direction.unwrap_or_default(),
            default_weight: normalize_weight(input.default_weight, "defaultWeight")?,
            created_at: now.clone(),
            updated_at: now,
        };

        record.id = self
            .db
            .with_connection(|conn| KpiRepository::insert(conn, &KpiRow::from_record(&record)))?;
        info!(kpi_id = record.id, direction = %record.direction, "kpi created");
        Ok(record)
    }

    pub fn update_kpi(&self, id: i64, update: KpiUpdateInput) -> AppResult<KpiDefinition> {
        let mut record = self.get_kpi(id)?;

        if let Some(name) = update.name {
            record.name = normalize_name(&name, "kpi")?;
        }
        if let Some(category) = update.category {
            record.category = normalize_optional_string(category);
        }
        if let Some(unit) = update.unit {
            record.unit = normalize_optional_string(unit);
        }
        if let Some(direction) = update.direction {
            record.direction = direction;
        }
        if let Some(default_weight) = update.default_weight {
            record.default_weight = normalize_weight(default_weight, "defaultWeight")?;
        }

        record.updated_at = Utc::now().to_rfc3339();
        self.db
            .with_connection(|conn| KpiRepository::update(conn, &KpiRow::from_record(&record)))?;
        info!(kpi_id = id, "kpi updated");
        Ok(record)
    }

    pub fn delete_kpi(&self, id: i64) -> AppResult<()> {
        self.db.with_connection(|conn| KpiRepository::delete(conn, id))?;
        info!(kpi_id = id, "kpi deleted");
        Ok(())
    }

    pub fn get_kpi(&self, id: i64) -> AppResult<KpiDefinition> {
        self.db
            .with_connection(|conn| KpiRepository::find_by_id(conn, id))?
            .ok_or_else(|| AppError::not_found("kpi", id))?
            .into_record()
    }

    pub fn list_kpis(&self) -> AppResult<Vec<KpiDefinition>> {
        let rows = self.db.with_connection(|conn| KpiRepository::list_all(conn))?;
        rows.into_iter()
            .map(KpiRow::into_record)
            .collect::<AppResult<Vec<_>>>()
    }

    // Periods

    pub fn create_period(&self, input: PeriodCreateInput) -> AppResult<Period> {
        let month = normalize_month(input.month)?;
        let now = Utc::now().to_rfc3339();
        let mut record = Period {
            id: 0,
            year: input.year,
            month,
            label: Some(ensure_label(input.year, month, input.label.as_deref())),
            created_at: now.clone(),
            updated_at: now,
        };

        record.id = self
            .db
            .with_connection(|conn| PeriodRepository::insert(conn, &PeriodRow::from_record(&record)))?;
        info!(period_id = record.id, label = ?record.label, "period created");
        Ok(record)
    }

    pub fn update_period(&self, id: i64, update: PeriodUpdateInput) -> AppResult<Period> {
        let mut record = self.get_period(id)?;
        let previous_default = default_label(record.year, record.month);

        if let Some(year) = update.year {
            record.year = year;
        }
        if let Some(month) = update.month {
            record.month = normalize_month(month)?;
        }
        let label = match update.label {
            Some(label) => label,
            // A generated label follows the period when it moves.
            None => record.label.take().filter(|label| *label != previous_default),
        };
        record.label = Some(ensure_label(record.year, record.month, label.as_deref()));

        record.updated_at = Utc::now().to_rfc3339();
        self.db
            .with_connection(|conn| PeriodRepository::update(conn, &PeriodRow::from_record(&record)))?;
        info!(period_id = id, "period updated");
        Ok(record)
    }

    pub fn delete_period(&self, id: i64) -> AppResult<()> {
        self.db
            .with_connection(|conn| PeriodRepository::delete(conn, id))?;
        info!(period_id = id, "period deleted");
        Ok(())
    }

    pub fn get_period(&self, id: i64) -> AppResult<Period> {
        self.db
            .with_connection(|conn| PeriodRepository::find_by_id(conn, id))?
            .map(PeriodRow::into_record)
            .ok_or_else(|| AppError::not_found("period", id))
    }

    pub fn list_periods(&self) -> AppResult<Vec<Period>> {
        let rows = self
            .db
            .with_connection(|conn| PeriodRepository::list_all(conn))?;
        Ok(rows.into_iter().map(PeriodRow::into_record).collect())
    }
}

fn normalize_name(raw: &str, entity: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{entity} name must not be blank")));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "{entity} name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_string(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn normalize_weight(weight: Option<f64>, field: &str) -> AppResult<Option<f64>> {
    match weight {
        Some(weight) if !weight.is_finite() || weight < 0.0 => {
            Err(AppError::validation_with_details(
                format!("{field} must be a non-negative number"),
                json!({ "field": field, "value": weight.to_string() }),
            ))
        }
        other => Ok(other),
    }
}

fn normalize_month(month: u32) -> AppResult<u32> {
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err(AppError::validation_with_details(
            "month must be between 1 and 12",
            json!({ "month": month }),
        ))
    }
}

fn ensure_label(year: i32, month: u32, label: Option<&str>) -> String {
    match label.map(str::trim) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => default_label(year, month),
    }
}
