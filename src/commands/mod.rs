pub mod kpi_values;
pub mod reference;
pub mod report;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::error;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::services::kpi_value_service::KpiValueService;
use crate::services::reference_service::ReferenceService;
use crate::services::report_service::ReportService;
use crate::services::settings_service::SettingsService;

#[derive(Clone)]
pub struct AppState {
    reference_service: Arc<ReferenceService>,
    kpi_value_service: Arc<KpiValueService>,
    report_service: Arc<ReportService>,
    settings_service: Arc<SettingsService>,
}

impl AppState {
    pub fn new(db_pool: DbPool, settings_service: SettingsService) -> AppResult<Self> {
        let policy = settings_service.get()?;

        let reference_service = Arc::new(ReferenceService::new(db_pool.clone()));
        let kpi_value_service = Arc::new(KpiValueService::new(db_pool.clone(), &policy));
        let report_service = Arc::new(ReportService::new(db_pool, policy));

        Ok(Self {
            reference_service,
            kpi_value_service,
            report_service,
            settings_service: Arc::new(settings_service),
        })
    }

    pub fn reference(&self) -> Arc<ReferenceService> {
        Arc::clone(&self.reference_service)
    }

    pub fn values(&self) -> Arc<KpiValueService> {
        Arc::clone(&self.kpi_value_service)
    }

    pub fn reports(&self) -> Arc<ReportService> {
        Arc::clone(&self.report_service)
    }

    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings_service)
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Validation { message, details } => {
                CommandError::new("VALIDATION_ERROR", message, details)
            }
            AppError::NotFound { entity, id } => CommandError::new(
                "NOT_FOUND",
                format!("{entity} {id} not found"),
                Some(serde_json::json!({ "entity": entity, "id": id })),
            ),
            AppError::Conflict { message } => CommandError::new("CONFLICT", message, None),
            AppError::Config { message } => CommandError::new("CONFIG_ERROR", message, None),
            AppError::Database { message } => {
                error!(target: "app::command", %message, "database error in command");
                CommandError::new("UNKNOWN", message, None)
            }
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("UNKNOWN", "serialization failed", None)
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("UNKNOWN", format!("file system error: {error}"), None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(error: serde_json::Error) -> Self {
        AppError::from(error).into()
    }
}

/// Two-decimal rounding for display only; stored and computed values keep
/// full precision.
pub fn round_for_display(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Converts a command result into the JSON printed on stdout.
pub fn to_output<T: Serialize>(value: &T) -> CommandResult<JsonValue> {
    Ok(serde_json::to_value(value)?)
}

/// Maps a pair of `--x <value>` / `--clear-x` flags onto a partial-update
/// field.
pub(crate) fn patch<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_code_and_details() {
        let command: CommandError = AppError::not_found("kpi", 7).into();
        assert_eq!(command.code, "NOT_FOUND");
        assert_eq!(command.message, "kpi 7 not found");
        assert_eq!(
            command.details,
            Some(serde_json::json!({ "entity": "kpi", "id": 7 }))
        );
    }

    #[test]
    fn conflict_and_validation_keep_their_messages() {
        let command: CommandError = AppError::conflict("duplicate value").into();
        assert_eq!(command.code, "CONFLICT");
        assert_eq!(command.message, "duplicate value");

        let command: CommandError = AppError::validation("weight must not be negative").into();
        assert_eq!(command.code, "VALIDATION_ERROR");
    }

    #[test]
    fn display_rounding_uses_two_decimals() {
        assert_eq!(round_for_display(121.666_666), 121.67);
        assert_eq!(round_for_display(80.0), 80.0);
        assert_eq!(round_for_display(0.004), 0.0);
    }

    #[test]
    fn clear_flag_wins_over_value() {
        assert_eq!(patch(Some(3.0), false), Some(Some(3.0)));
        assert_eq!(patch(Some(3.0), true), Some(None));
        assert_eq!(patch::<f64>(None, false), None);
    }
}
