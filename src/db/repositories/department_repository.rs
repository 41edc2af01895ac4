use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::department::Department;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        name,
        parent_department_id,
        is_active,
        created_at,
        updated_at
    FROM departments
"#;

#[derive(Debug, Clone)]
pub struct DepartmentRow {
    pub id: i64,
    pub name: String,
    pub parent_department_id: Option<i64>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl DepartmentRow {
    pub fn from_record(record: &Department) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            parent_department_id: record.parent_department_id,
            is_active: record.is_active,
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
        }
    }

    pub fn into_record(self) -> Department {
        Department {
            id: self.id,
            name: self.name,
            parent_department_id: self.parent_department_id,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl TryFrom<&Row<'_>> for DepartmentRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            parent_department_id: row.get("parent_department_id")?,
            is_active: row.get("is_active")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct DepartmentRepository;

impl DepartmentRepository {
    pub fn insert(conn: &Connection, row: &DepartmentRow) -> AppResult<i64> {
        conn.execute(
            r#"
                INSERT INTO departments (
                    name,
                    parent_department_id,
                    is_active,
                    created_at,
                    updated_at
                ) VALUES (
                    :name,
                    :parent_department_id,
                    :is_active,
                    :created_at,
                    :updated_at
                )
            "#,
            named_params! {
                ":name": &row.name,
                ":parent_department_id": &row.parent_department_id,
                ":is_active": &row.is_active,
                ":created_at": &row.created_at,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn update(conn: &Connection, row: &DepartmentRow) -> AppResult<()> {
        let affected = conn.execute(
            r#"
                UPDATE departments SET
                    name = :name,
                    parent_department_id = :parent_department_id,
                    is_active = :is_active,
                    updated_at = :updated_at
                WHERE id = :id
            "#,
            named_params! {
                ":id": &row.id,
                ":name": &row.name,
                ":parent_department_id": &row.parent_department_id,
                ":is_active": &row.is_active,
                ":updated_at": &row.updated_at,
            },
        )?;

        if affected == 0 {
            return Err(AppError::not_found("department", row.id));
        }
        Ok(())
    }

    pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
        let affected = conn.execute(
            "DELETE FROM departments WHERE id = :id",
            named_params! {":id": id},
        )?;

        if affected == 0 {
            return Err(AppError::not_found("department", id));
        }
        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<DepartmentRow>> {
        let sql = format!("{BASE_SELECT} WHERE id = :id");
        let mut stmt = conn.prepare(&sql)?;
        let row = stmt
            .query_row(named_params! {":id": id}, |row| DepartmentRow::try_from(row))
            .optional()?;
        Ok(row)
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<DepartmentRow>> {
        let sql = format!("{BASE_SELECT} ORDER BY name ASC, id ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| DepartmentRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
