use clap::Subcommand;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::models::kpi_value::{
    KpiValueCreateInput, KpiValueRecord, KpiValueUpdateInput, ScoreEntry,
};

use super::{patch, round_for_display, to_output, AppState, CommandResult};

#[derive(Debug, Subcommand)]
pub enum ValueCommand {
    /// Record a KPI value for an employee in a period
    Set {
        #[arg(long)]
        employee: i64,

        #[arg(long)]
        period: i64,

        #[arg(long)]
        kpi: i64,

        #[arg(long)]
        target: Option<f64>,

        #[arg(long)]
        actual: Option<f64>,

        /// Overrides the KPI's default weight
        #[arg(long)]
        weight: Option<f64>,

        /// Manual score; skips computation from target and actual
        #[arg(long)]
        score: Option<f64>,

        #[arg(long)]
        comment: Option<String>,

        #[arg(long)]
        status: Option<String>,
    },

    /// Change a recorded value
    Update {
        id: i64,

        #[arg(long, conflicts_with = "clear_target")]
        target: Option<f64>,

        #[arg(long)]
        clear_target: bool,

        #[arg(long, conflicts_with = "clear_actual")]
        actual: Option<f64>,

        #[arg(long)]
        clear_actual: bool,

        #[arg(long, conflicts_with = "clear_weight")]
        weight: Option<f64>,

        #[arg(long)]
        clear_weight: bool,

        #[arg(long, conflicts_with = "clear_score")]
        score: Option<f64>,

        /// Drop the manual score and recompute
        #[arg(long)]
        clear_score: bool,

        #[arg(long, conflicts_with = "clear_comment")]
        comment: Option<String>,

        #[arg(long)]
        clear_comment: bool,

        #[arg(long, conflicts_with = "clear_status")]
        status: Option<String>,

        #[arg(long)]
        clear_status: bool,
    },

    /// Show one recorded value
    Get { id: i64 },

    /// List values; with both filters the employee and period are included
    List {
        #[arg(long)]
        employee: Option<i64>,

        #[arg(long)]
        period: Option<i64>,
    },

    /// Delete a recorded value
    Delete { id: i64 },

    /// Recompute every non-manual score in a period
    Rescore {
        #[arg(long)]
        period: i64,
    },
}

pub fn execute_value(state: &AppState, command: ValueCommand) -> CommandResult<JsonValue> {
    let service = state.values();
    debug!(target: "app::command", ?command, "value command");

    match command {
        ValueCommand::Set {
            employee,
            period,
            kpi,
            target,
            actual,
            weight,
            score,
            comment,
            status,
        } => {
            let record = service.create_value(KpiValueCreateInput {
                employee_id: employee,
                period_id: period,
                kpi_id: kpi,
                target_value: target,
                actual_value: actual,
                weight,
                score,
                comment,
                status,
            })?;
            to_output(&rounded(record))
        }
        ValueCommand::Update {
            id,
            target,
            clear_target,
            actual,
            clear_actual,
            weight,
            clear_weight,
            score,
            clear_score,
            comment,
            clear_comment,
            status,
            clear_status,
        } => {
            let record = service.update_value(
                id,
                KpiValueUpdateInput {
                    target_value: patch(target, clear_target),
                    actual_value: patch(actual, clear_actual),
                    weight: patch(weight, clear_weight),
                    score: patch(score, clear_score),
                    comment: patch(comment, clear_comment),
                    status: patch(status, clear_status),
                },
            )?;
            to_output(&rounded(record))
        }
        ValueCommand::Get { id } => to_output(&rounded(service.get_value(id)?)),
        ValueCommand::List {
            employee: Some(employee),
            period: Some(period),
        } => {
            let mut listing = service.employee_period_values(employee, period)?;
            listing.values = listing.values.into_iter().map(rounded).collect();
            to_output(&listing)
        }
        ValueCommand::List { employee, period } => {
            let values: Vec<KpiValueRecord> = service
                .list_values(employee, period)?
                .into_iter()
                .map(rounded)
                .collect();
            to_output(&values)
        }
        ValueCommand::Delete { id } => {
            service.delete_value(id)?;
            Ok(json!({ "deleted": id }))
        }
        ValueCommand::Rescore { period } => {
            let changed = service.refresh_computed_scores(period)?;
            Ok(json!({ "periodId": period, "rescored": changed }))
        }
    }
}

fn rounded(mut record: KpiValueRecord) -> KpiValueRecord {
    record.score = match record.score {
        ScoreEntry::Computed(score) => ScoreEntry::Computed(round_for_display(score)),
        ScoreEntry::Manual(score) => ScoreEntry::Manual(round_for_display(score)),
        ScoreEntry::Unscored => ScoreEntry::Unscored,
    };
    record
}
