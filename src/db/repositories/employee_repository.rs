use std::convert::TryFrom;

use chrono::NaiveDate;
use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::employee::Employee;

const DATE_FORMAT: &str = "%Y-%m-%d";

const BASE_SELECT: &str = r#"
    SELECT
        id,
        name,
        department_id,
        title,
        hire_date,
        is_active,
        created_at,
        updated_at
    FROM employees
"#;

#[derive(Debug, Clone)]
pub struct EmployeeRow {
    pub id: i64,
    pub name: String,
    pub department_id: Option<i64>,
    pub title: Option<String>,
    pub hire_date: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl EmployeeRow {
    pub fn from_record(record: &Employee) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            department_id: record.department_id,
            title: record.title.clone(),
            hire_date: record
                .hire_date
                .map(|date| date.format(DATE_FORMAT).to_string()),
            is_active: record.is_active,
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
        }
    }

    pub fn into_record(self) -> AppResult<Employee> {
        let hire_date = self
            .hire_date
            .as_deref()
            .map(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT))
            .transpose()
            .map_err(|err| {
                AppError::database(format!("employee {} has invalid hire_date: {err}", self.id))
            })?;

        Ok(Employee {
            id: self.id,
            name: self.name,
            department_id: self.department_id,
            title: self.title,
            hire_date,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<&Row<'_>> for EmployeeRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            department_id: row.get("department_id")?,
            title: row.get("title")?,
            hire_date: row.get("hire_date")?,
            is_active: row.get("is_active")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct EmployeeRepository;

impl EmployeeRepository {
    pub fn insert(conn: &Connection, row: &EmployeeRow) -> AppResult<i64> {
        conn.execute(
            r#"
                INSERT INTO employees (
                    name,
                    department_id,
                    title,
                    hire_date,
                    is_active,
                    created_at,
                    updated_at
                ) VALUES (
                    :name,
                    :department_id,
                    :title,
                    :hire_date,
                    :is_active,
                    :created_at,
                    :updated_at
                )
            "#,
            named_params! {
                ":name": &row.name,
                ":department_id": &row.department_id,
                ":title": &row.title,
                ":hire_date": &row.hire_date,
                ":is_active": &row.is_active,
                ":created_at": &row.created_at,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn update(conn: &Connection, row: &EmployeeRow) -> AppResult<()> {
        let affected = conn.execute(
            r#"
                UPDATE employees SET
                    name = :name,
                    department_id = :department_id,
                    title = :title,
                    hire_date = :hire_date,
                    is_active = :is_active,
                    updated_at = :updated_at
                WHERE id = :id
            "#,
            named_params! {
                ":id": &row.id,
                ":name": &row.name,
                ":department_id": &row.department_id,
                ":title": &row.title,
                ":hire_date": &row.hire_date,
                ":is_active": &row.is_active,
                ":updated_at": &row.updated_at,
            },
        )?;

        if affected == 0 {
            return Err(AppError::not_found("employee", row.id));
        }
        Ok(())
    }

    pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
        let affected = conn.execute(
            "DELETE FROM employees WHERE id = :id",
            named_params! {":id": id},
        )?;

        if affected == 0 {
            return Err(AppError::not_found("employee", id));
        }
        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<EmployeeRow>> {
        let sql = format!("{BASE_SELECT} WHERE id = :id");
        let mut stmt = conn.prepare(&sql)?;
        let row = stmt
            .query_row(named_params! {":id": id}, |row| EmployeeRow::try_from(row))
            .optional()?;
        Ok(row)
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<EmployeeRow>> {
        let sql = format!("{BASE_SELECT} ORDER BY name ASC, id ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| EmployeeRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn list_by_department(conn: &Connection, department_id: i64) -> AppResult<Vec<EmployeeRow>> {
        let sql = format!("{BASE_SELECT} WHERE department_id = :department_id ORDER BY name ASC, id ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(named_params! {":department_id": department_id}, |row| {
                EmployeeRow::try_from(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
