pub mod commands;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;
use tracing::info;

use crate::commands::kpi_values::{execute_value, ValueCommand};
use crate::commands::reference::{
    execute_department, execute_employee, execute_kpi, execute_period, DepartmentCommand,
    EmployeeCommand, KpiCommand, PeriodCommand,
};
use crate::commands::report::{execute_policy, execute_report, execute_score};
use crate::commands::{AppState, CommandError, CommandResult};
use crate::services::settings_service::SettingsService;

#[derive(Debug, Parser)]
#[command(name = "kpi-scorecard")]
#[command(about = "Employee KPI scoring and period summary reports")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database file
    #[arg(long, global = true, env = "KPI_SCORECARD_DB", default_value = "kpi-scorecard.sqlite")]
    db: PathBuf,

    /// Scoring policy YAML (score cap and status thresholds)
    #[arg(long, global = true, env = "KPI_SCORECARD_CONFIG")]
    config: Option<PathBuf>,

    /// Also write logs to daily files in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage departments
    Department {
        #[command(subcommand)]
        cmd: DepartmentCommand,
    },

    /// Manage employees
    Employee {
        #[command(subcommand)]
        cmd: EmployeeCommand,
    },

    /// Manage KPI definitions
    Kpi {
        #[command(subcommand)]
        cmd: KpiCommand,
    },

    /// Manage reporting periods
    Period {
        #[command(subcommand)]
        cmd: PeriodCommand,
    },

    /// Record and edit KPI values
    Value {
        #[command(subcommand)]
        cmd: ValueCommand,
    },

    /// Weighted score of one employee for one period
    Score {
        #[arg(long)]
        employee: i64,

        #[arg(long)]
        period: i64,
    },

    /// Per-employee summary for a period
    Report {
        #[arg(long)]
        period: i64,

        /// Only employees of this department and its sub-departments
        #[arg(long)]
        department: Option<i64>,

        /// Match the department exactly, without sub-departments
        #[arg(long, requires = "department")]
        exact: bool,
    },

    /// Print the scoring policy in effect
    Policy,
}

/// Parses arguments, runs one command and prints its JSON result. Errors are
/// printed to stderr as a JSON `CommandError`.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = utils::logger::init_logging(cli.log_dir.as_deref()) {
        eprintln!("failed to initialize logging: {err}");
    }

    match try_run(cli) {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                print_error(&CommandError::from(err));
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            print_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn try_run(cli: Cli) -> CommandResult<JsonValue> {
    let pool = db::DbPool::new(&cli.db)?;
    let state = AppState::new(pool, SettingsService::new(cli.config))?;
    info!(db_path = %cli.db.display(), "kpi scorecard ready");

    match cli.command {
        Commands::Department { cmd } => execute_department(&state, cmd),
        Commands::Employee { cmd } => execute_employee(&state, cmd),
        Commands::Kpi { cmd } => execute_kpi(&state, cmd),
        Commands::Period { cmd } => execute_period(&state, cmd),
        Commands::Value { cmd } => execute_value(&state, cmd),
        Commands::Score { employee, period } => execute_score(&state, employee, period),
        Commands::Report {
            period,
            department,
            exact,
        } => execute_report(&state, period, department, exact),
        Commands::Policy => execute_policy(&state),
    }
}

fn print_error(err: &CommandError) {
    match serde_json::to_string_pretty(err) {
        Ok(text) => eprintln!("{text}"),
        Err(_) => eprintln!("{}: {}", err.code, err.message),
    }
}
