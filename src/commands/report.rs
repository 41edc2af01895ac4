use serde_json::Value as JsonValue;
use tracing::debug;

use crate::services::summary_reporter::DepartmentScope;

use super::{round_for_display, to_output, AppState, CommandResult};

pub fn execute_score(state: &AppState, employee_id: i64, period_id: i64) -> CommandResult<JsonValue> {
    debug!(target: "app::command", employee_id, period_id, "score command");

    let mut summary = state.reports().score_employee_period(employee_id, period_id)?;
    summary.weighted_score = summary.weighted_score.map(round_for_display);
    to_output(&summary)
}

pub fn execute_report(
    state: &AppState,
    period_id: i64,
    department_id: Option<i64>,
    exact: bool,
) -> CommandResult<JsonValue> {
    let scope = if exact {
        DepartmentScope::Exact
    } else {
        DepartmentScope::WithDescendants
    };
    debug!(target: "app::command", period_id, ?department_id, ?scope, "report command");

    let mut rows = state
        .reports()
        .summarize_period(period_id, department_id, scope)?;
    for row in &mut rows {
        row.total_score = row.total_score.map(round_for_display);
    }
    to_output(&rows)
}

/// The scoring policy in effect, after YAML overrides.
pub fn execute_policy(state: &AppState) -> CommandResult<JsonValue> {
    to_output(&state.settings().get()?)
}
