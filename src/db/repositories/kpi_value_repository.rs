use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::kpi_value::{KpiValueRecord, ScoreEntry};

const BASE_SELECT: &str = r#"
    SELECT
        id,
        employee_id,
        period_id,
        kpi_id,
        target_value,
        actual_value,
        weight,
        score,
        score_source,
        comment,
        status,
        created_at,
        updated_at
    FROM kpi_values
"#;

#[derive(Debug, Clone)]
pub struct KpiValueRow {
    pub id: i64,
    pub employee_id: i64,
    pub period_id: i64,
    pub kpi_id: i64,
    pub target_value: Option<f64>,
    pub actual_value: Option<f64>,
    pub weight: Option<f64>,
    pub score: Option<f64>,
    pub score_source: Option<String>,
    pub comment: Option<String>,
    pub status: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl KpiValueRow {
    pub fn from_record(record: &KpiValueRecord) -> Self {
        Self {
            id: record.id,
            employee_id: record.employee_id,
            period_id: record.period_id,
            kpi_id: record.kpi_id,
            target_value: record.target_value,
            actual_value: record.actual_value,
            weight: record.weight,
            score: record.score.value(),
            score_source: record.score.source().map(str::to_string),
            comment: record.comment.clone(),
            status: record.status.clone(),
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
        }
    }

    pub fn into_record(self) -> KpiValueRecord {
        KpiValueRecord {
            id: self.id,
            employee_id: self.employee_id,
            period_id: self.period_id,
            kpi_id: self.kpi_id,
            target_value: self.target_value,
            actual_value: self.actual_value,
            weight: self.weight,
            score: ScoreEntry::from_parts(self.score, self.score_source.as_deref()),
            comment: self.comment,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl TryFrom<&Row<'_>> for KpiValueRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            employee_id: row.get("employee_id")?,
            period_id: row.get("period_id")?,
            kpi_id: row.get("kpi_id")?,
            target_value: row.get("target_value")?,
            actual_value: row.get("actual_value")?,
            weight: row.get("weight")?,
            score: row.get("score")?,
            score_source: row.get("score_source")?,
            comment: row.get("comment")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct KpiValueRepository;

impl KpiValueRepository {
    pub fn insert(conn: &Connection, row: &KpiValueRow) -> AppResult<i64> {
        conn.execute(
            r#"
                INSERT INTO kpi_values (
                    employee_id,
                    period_id,
                    kpi_id,
                    target_value,
                    actual_value,
                    weight,
                    score,
                    score_source,
                    comment,
                    status,
                    created_at,
                    updated_at
                ) VALUES (
                    :employee_id,
                    :period_id,
                    :kpi_id,
                    :target_value,
                    :actual_value,
                    :weight,
                    :score,
                    :score_source,
                    :comment,
                    :status,
                    :created_at,
                    :updated_at
                )
            "#,
            named_params! {
                ":employee_id": &row.employee_id,
                ":period_id": &row.period_id,
                ":kpi_id": &row.kpi_id,
                ":target_value": &row.target_value,
                ":actual_value": &row.actual_value,
                ":weight": &row.weight,
                ":score": &row.score,
                ":score_source": &row.score_source,
                ":comment": &row.comment,
                ":status": &row.status,
                ":created_at": &row.created_at,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Overwrites the measurement fields of an existing value. The
    /// (employee, period, kpi) triple is fixed at creation.
    pub fn update(conn: &Connection, row: &KpiValueRow) -> AppResult<()> {
        let affected = conn.execute(
            r#"
                UPDATE kpi_values SET
                    target_value = :target_value,
                    actual_value = :actual_value,
                    weight = :weight,
                    score = :score,
                    score_source = :score_source,
                    comment = :comment,
                    status = :status,
                    updated_at = :updated_at
                WHERE id = :id
            "#,
            named_params! {
                ":id": &row.id,
                ":target_value": &row.target_value,
                ":actual_value": &row.actual_value,
                ":weight": &row.weight,
                ":score": &row.score,
                ":score_source": &row.score_source,
                ":comment": &row.comment,
                ":status": &row.status,
                ":updated_at": &row.updated_at,
            },
        )?;

        if affected == 0 {
            return Err(AppError::not_found("kpi value", row.id));
        }
        Ok(())
    }

    pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
        let affected = conn.execute(
            "DELETE FROM kpi_values WHERE id = :id",
            named_params! {":id": id},
        )?;

        if affected == 0 {
            return Err(AppError::not_found("kpi value", id));
        }
        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<KpiValueRow>> {
        let sql = format!("{BASE_SELECT} WHERE id = :id");
        let mut stmt = conn.prepare(&sql)?;
        let row = stmt
            .query_row(named_params! {":id": id}, |row| KpiValueRow::try_from(row))
            .optional()?;
        Ok(row)
    }

    pub fn list_by_employee_period(
        conn: &Connection,
        employee_id: i64,
        period_id: i64,
    ) -> AppResult<Vec<KpiValueRow>> {
        let sql = format!(
            "{BASE_SELECT} WHERE employee_id = :employee_id AND period_id = :period_id ORDER BY id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                named_params! {
                    ":employee_id": employee_id,
                    ":period_id": period_id,
                },
                |row| KpiValueRow::try_from(row),
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Values matching whichever of the two filters is set; no filters lists
    /// everything.
    pub fn list_filtered(
        conn: &Connection,
        employee_id: Option<i64>,
        period_id: Option<i64>,
    ) -> AppResult<Vec<KpiValueRow>> {
        let sql = format!(
            "{BASE_SELECT} WHERE (:employee_id IS NULL OR employee_id = :employee_id) \
             AND (:period_id IS NULL OR period_id = :period_id) \
             ORDER BY period_id ASC, employee_id ASC, id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                named_params! {
                    ":employee_id": employee_id,
                    ":period_id": period_id,
                },
                |row| KpiValueRow::try_from(row),
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn list_by_period(conn: &Connection, period_id: i64) -> AppResult<Vec<KpiValueRow>> {
        let sql = format!("{BASE_SELECT} WHERE period_id = :period_id ORDER BY employee_id ASC, id ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(named_params! {":period_id": period_id}, |row| {
                KpiValueRow::try_from(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
