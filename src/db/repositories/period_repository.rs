use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::period::Period;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        year,
        month,
        label,
        created_at,
        updated_at
    FROM periods
"#;

#[derive(Debug, Clone)]
pub struct PeriodRow {
    pub id: i64,
    pub year: i32,
    pub month: u32,
    pub label: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl PeriodRow {
    pub fn from_record(record: &Period) -> Self {
        Self {
            id: record.id,
            year: record.year,
            month: record.month,
            label: record.label.clone(),
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
        }
    }

    pub fn into_record(self) -> Period {
        Period {
            id: self.id,
            year: self.year,
            month: self.month,
            label: self.label,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl TryFrom<&Row<'_>> for PeriodRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            year: row.get("year")?,
            month: row.get("month")?,
            label: row.get("label")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct PeriodRepository;

impl PeriodRepository {
    pub fn insert(conn: &Connection, row: &PeriodRow) -> AppResult<i64> {
        conn.execute(
            r#"
                INSERT INTO periods (
                    year,
                    month,
                    label,
                    created_at,
                    updated_at
                ) VALUES (
                    :year,
                    :month,
                    :label,
                    :created_at,
                    :updated_at
                )
            "#,
            named_params! {
                ":year": &row.year,
                ":month": &row.month,
                ":label": &row.label,
                ":created_at": &row.created_at,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn update(conn: &Connection, row: &PeriodRow) -> AppResult<()> {
        let affected = conn.execute(
            r#"
                UPDATE periods SET
                    year = :year,
                    month = :month,
                    label = :label,
                    updated_at = :updated_at
                WHERE id = :id
            "#,
            named_params! {
                ":id": &row.id,
                ":year": &row.year,
                ":month": &row.month,
                ":label": &row.label,
                ":updated_at": &row.updated_at,
            },
        )?;

        if affected == 0 {
            return Err(AppError::not_found("period", row.id));
        }
        Ok(())
    }

    pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
        let affected = conn.execute(
            "DELETE FROM periods WHERE id = :id",
            named_params! {":id": id},
        )?;

        if affected == 0 {
            return Err(AppError::not_found("period", id));
        }
        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<PeriodRow>> {
        let sql = format!("{BASE_SELECT} WHERE id = :id");
        let mut stmt = conn.prepare(&sql)?;
        let row = stmt
            .query_row(named_params! {":id": id}, |row| PeriodRow::try_from(row))
            .optional()?;
        Ok(row)
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<PeriodRow>> {
        let sql = format!("{BASE_SELECT} ORDER BY year DESC, month DESC, id ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| PeriodRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
