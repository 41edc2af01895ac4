use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::kpi::{Direction, KpiDefinition};

const BASE_SELECT: &str = r#"
    SELECT
        id,
        name,
        category,
        unit,
        direction,
        default_weight,
        created_at,
        updated_at
    FROM kpis
"#;

#[derive(Debug, Clone)]
pub struct KpiRow {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub direction: String,
    pub default_weight: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl KpiRow {
    pub fn from_record(record: &KpiDefinition) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            category: record.category.clone(),
            unit: record.unit.clone(),
            direction: record.direction.as_str().to_string(),
            default_weight: record.default_weight,
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
        }
    }

    pub fn into_record(self) -> AppResult<KpiDefinition> {
        let direction = self.direction.parse::<Direction>().map_err(|reason| {
            AppError::database(format!("kpi {} has invalid direction: {reason}", self.id))
        })?;

        Ok(KpiDefinition {
            id: self.id,
            name: self.name,
            category: self.category,
            unit: self.unit,
            direction,
            default_weight: self.default_weight,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<&Row<'_>> for KpiRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            category: row.get("category")?,
            unit: row.get("unit")?,
            direction: row.get("direction")?,
            default_weight: row.get("default_weight")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct KpiRepository;

impl KpiRepository {
    pub fn insert(conn: &Connection, row: &KpiRow) -> AppResult<i64> {
        conn.execute(
            r#"
                INSERT INTO kpis (
                    name,
                    category,
                    unit,
                    direction,
                    default_weight,
                    created_at,
                    updated_at
                ) VALUES (
                    :name,
                    :category,
                    :unit,
                    :direction,
                    :default_weight,
                    :created_at,
                    :updated_at
                )
            "#,
            named_params! {
                ":name": &row.name,
                ":category": &row.category,
                ":unit": &row.unit,
                ":direction": &row.direction,
                ":default_weight": &row.default_weight,
                ":created_at": &row.created_at,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn update(conn: &Connection, row: &KpiRow) -> AppResult<()> {
        let affected = conn.execute(
            r#"
                UPDATE kpis SET
                    name = :name,
                    category = :category,
                    unit = :unit,
                    direction = :direction,
                    default_weight = :default_weight,
                    updated_at = :updated_at
                WHERE id = :id
            "#,
            named_params! {
                ":id": &row.id,
                ":name": &row.name,
                ":category": &row.category,
                ":unit": &row.unit,
                ":direction": &row.direction,
                ":default_weight": &row.default_weight,
                ":updated_at": &row.updated_at,
            },
        )?;

        if affected == 0 {
            return Err(AppError::not_found("kpi", row.id));
        }
        Ok(())
    }

    pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
        let affected = conn.execute("DELETE FROM kpis WHERE id = :id", named_params! {":id": id})?;

        if affected == 0 {
            return Err(AppError::not_found("kpi", id));
        }
        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<KpiRow>> {
        let sql = format!("{BASE_SELECT} WHERE id = :id");
        let mut stmt = conn.prepare(&sql)?;
        let row = stmt
            .query_row(named_params! {":id": id}, |row| KpiRow::try_from(row))
            .optional()?;
        Ok(row)
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<KpiRow>> {
        let sql = format!("{BASE_SELECT} ORDER BY name ASC, id ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| KpiRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
