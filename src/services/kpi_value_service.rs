use chrono::Utc;
use rusqlite::Connection;
use serde_json::json;
use tracing::{debug, info};

use crate::db::repositories::employee_repository::EmployeeRepository;
use crate::db::repositories::kpi_repository::KpiRepository;
use crate::db::repositories::kpi_value_repository::{KpiValueRepository, KpiValueRow};
use crate::db::repositories::period_repository::PeriodRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::kpi::KpiDefinition;
use crate::models::kpi_value::{
    KpiValueCreateInput, KpiValueRecord, KpiValueUpdateInput, ScoreEntry,
};
use crate::models::report::EmployeePeriodValues;
use crate::models::settings::ScoringPolicy;
use crate::services::reference_service::{normalize_optional_string, normalize_weight};
use crate::services::score_calculator::ScoreCalculator;

/// Stores KPI measurements and keeps each value's score in step with its
/// inputs. Manual scores are stored as given and never recomputed.
#[derive(Clone)]
pub struct KpiValueService {
    db: DbPool,
    calculator: ScoreCalculator,
}

impl KpiValueService {
    pub fn new(db: DbPool, policy: &ScoringPolicy) -> Self {
        Self {
            db,
            calculator: ScoreCalculator::from_policy(policy),
        }
    }

    pub fn create_value(&self, input: KpiValueCreateInput) -> AppResult<KpiValueRecord> {
        let target_value = normalize_measurement(input.target_value, "targetValue")?;
        let actual_value = normalize_measurement(input.actual_value, "actualValue")?;
        let weight = normalize_weight(input.weight, "weight")?;
        let manual_score = normalize_measurement(input.score, "score")?;

        let record = self.db.with_connection(|conn| {
            EmployeeRepository::find_by_id(conn, input.employee_id)?
                .ok_or_else(|| AppError::not_found("employee", input.employee_id))?;
            PeriodRepository::find_by_id(conn, input.period_id)?
                .ok_or_else(|| AppError::not_found("period", input.period_id))?;
            let kpi = load_kpi(conn, input.kpi_id)?;

            let duplicate = KpiValueRepository::list_by_employee_period(
                conn,
                input.employee_id,
                input.period_id,
            )?
            .into_iter()
            .any(|row| row.kpi_id == input.kpi_id);
            if duplicate {
                return Err(AppError::conflict(format!(
                    "employee {} already has a value for kpi {} in period {}",
                    input.employee_id, input.kpi_id, input.period_id
                )));
            }

            let now = Utc::now().to_rfc3339();
            let mut record = KpiValueRecord {
                id: 0,
                employee_id: input.employee_id,
                period_id: input.period_id,
                kpi_id: input.kpi_id,
                target_value,
                actual_value,
                weight,
                score: self.calculator.entry_for(
                    manual_score,
                    kpi.direction,
                    target_value,
                    actual_value,
                ),
                comment: normalize_optional_string(input.comment),
                status: normalize_optional_string(input.status),
                created_at: now.clone(),
                updated_at: now,
            };
            record.id = KpiValueRepository::insert(conn, &KpiValueRow::from_record(&record))?;
            Ok(record)
        })?;

        info!(
            target: "app::score",
            value_id = record.id,
            employee_id = record.employee_id,
            period_id = record.period_id,
            kpi_id = record.kpi_id,
            score = ?record.score,
            "kpi value created"
        );
        Ok(record)
    }

    pub fn update_value(&self, id: i64, update: KpiValueUpdateInput) -> AppResult<KpiValueRecord> {
        let record = self.db.with_connection(|conn| {
            let mut record = KpiValueRepository::find_by_id(conn, id)?
                .ok_or_else(|| AppError::not_found("kpi value", id))?
                .into_record();

            if let Some(target_value) = update.target_value {
                record.target_value = normalize_measurement(target_value, "targetValue")?;
            }
            if let Some(actual_value) = update.actual_value {
                record.actual_value = normalize_measurement(actual_value, "actualValue")?;
            }
            if let Some(weight) = update.weight {
                record.weight = normalize_weight(weight, "weight")?;
            }
            if let Some(comment) = update.comment {
                record.comment = normalize_optional_string(comment);
            }
            if let Some(status) = update.status {
                record.status = normalize_optional_string(status);
            }

            let manual_score = match update.score {
                Some(score) => normalize_measurement(score, "score")?,
                None => match record.score {
                    ScoreEntry::Manual(score) => Some(score),
                    _ => None,
                },
            };

            let kpi = load_kpi(conn, record.kpi_id)?;
            record.score = self.calculator.entry_for(
                manual_score,
                kpi.direction,
                record.target_value,
                record.actual_value,
            );
            record.updated_at = Utc::now().to_rfc3339();

            KpiValueRepository::update(conn, &KpiValueRow::from_record(&record))?;
            Ok(record)
        })?;

        info!(target: "app::score", value_id = id, score = ?record.score, "kpi value updated");
        Ok(record)
    }

    pub fn delete_value(&self, id: i64) -> AppResult<()> {
        self.db
            .with_connection(|conn| KpiValueRepository::delete(conn, id))?;
        info!(target: "app::score", value_id = id, "kpi value deleted");
        Ok(())
    }

    pub fn get_value(&self, id: i64) -> AppResult<KpiValueRecord> {
        self.db
            .with_connection(|conn| KpiValueRepository::find_by_id(conn, id))?
            .map(KpiValueRow::into_record)
            .ok_or_else(|| AppError::not_found("kpi value", id))
    }

    /// Values filtered by employee, period, both or neither.
    pub fn list_values(
        &self,
        employee_id: Option<i64>,
        period_id: Option<i64>,
    ) -> AppResult<Vec<KpiValueRecord>> {
        let rows = self.db.with_connection(|conn| {
            KpiValueRepository::list_filtered(conn, employee_id, period_id)
        })?;
        let values: Vec<KpiValueRecord> = rows.into_iter().map(KpiValueRow::into_record).collect();
        debug!(?employee_id, ?period_id, count = values.len(), "kpi values listed");
        Ok(values)
    }

    /// The employee, the period and the employee's values for it.
    pub fn employee_period_values(
        &self,
        employee_id: i64,
        period_id: i64,
    ) -> AppResult<EmployeePeriodValues> {
        self.db.with_connection(|conn| {
            let employee = EmployeeRepository::find_by_id(conn, employee_id)?
                .ok_or_else(|| AppError::not_found("employee", employee_id))?
                .into_record()?;
            let period = PeriodRepository::find_by_id(conn, period_id)?
                .ok_or_else(|| AppError::not_found("period", period_id))?
                .into_record();
            let values = KpiValueRepository::list_by_employee_period(conn, employee_id, period_id)?
                .into_iter()
                .map(KpiValueRow::into_record)
                .collect();

            Ok(EmployeePeriodValues {
                period,
                employee,
                values,
            })
        })
    }

    /// Recomputes every non-manual score in a period, e.g. after a KPI's
    /// direction or the score cap changed. Returns how many rows changed.
    pub fn refresh_computed_scores(&self, period_id: i64) -> AppResult<usize> {
        let changed = self.db.with_connection(|conn| {
            PeriodRepository::find_by_id(conn, period_id)?
                .ok_or_else(|| AppError::not_found("period", period_id))?;

            let mut changed = 0;
            for row in KpiValueRepository::list_by_period(conn, period_id)? {
                let mut record = row.into_record();
                if record.score.is_manual() {
                    continue;
                }

                let kpi = load_kpi(conn, record.kpi_id)?;
                let refreshed = self.calculator.entry_for(
                    None,
                    kpi.direction,
                    record.target_value,
                    record.actual_value,
                );
                if refreshed == record.score {
                    continue;
                }

                record.score = refreshed;
                record.updated_at = Utc::now().to_rfc3339();
                KpiValueRepository::update(conn, &KpiValueRow::from_record(&record))?;
                changed += 1;
            }
            Ok(changed)
        })?;

        info!(target: "app::score", period_id, changed, "computed scores refreshed");
        Ok(changed)
    }
}

fn load_kpi(conn: &Connection, kpi_id: i64) -> AppResult<KpiDefinition> {
    KpiRepository::find_by_id(conn, kpi_id)?
        .ok_or_else(|| AppError::not_found("kpi", kpi_id))?
        .into_record()
}

fn normalize_measurement(value: Option<f64>, field: &str) -> AppResult<Option<f64>> {
    match value {
        Some(value) if !value.is_finite() => Err(AppError::validation_with_details(
            format!("{field} must be a finite number"),
            json!({ "field": field, "value": value.to_string() }),
        )),
        other => Ok(other),
    }
}
