use chrono::NaiveDate;
use clap::{ArgAction, Subcommand};
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::models::department::{DepartmentCreateInput, DepartmentUpdateInput};
use crate::models::employee::{EmployeeCreateInput, EmployeeUpdateInput};
use crate::models::kpi::{Direction, KpiCreateInput, KpiUpdateInput};
use crate::models::period::{PeriodCreateInput, PeriodUpdateInput};

use super::{patch, to_output, AppState, CommandResult};

#[derive(Debug, Subcommand)]
pub enum DepartmentCommand {
    /// Create a department
    Add {
        #[arg(long)]
        name: String,

        /// Parent department id
        #[arg(long)]
        parent: Option<i64>,

        #[arg(long, action = ArgAction::Set)]
        active: Option<bool>,
    },

    /// Show one department
    Get { id: i64 },

    /// List all departments
    List,

    /// Change a department
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, conflicts_with = "no_parent")]
        parent: Option<i64>,

        /// Make the department a root
        #[arg(long)]
        no_parent: bool,

        #[arg(long, action = ArgAction::Set)]
        active: Option<bool>,
    },

    /// Delete a department
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum EmployeeCommand {
    /// Create an employee
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        department: Option<i64>,

        #[arg(long)]
        title: Option<String>,

        /// Hire date, YYYY-MM-DD
        #[arg(long)]
        hire_date: Option<NaiveDate>,

        #[arg(long, action = ArgAction::Set)]
        active: Option<bool>,
    },

    /// Show one employee
    Get { id: i64 },

    /// List employees, optionally only those of one department
    List {
        #[arg(long)]
        department: Option<i64>,
    },

    /// Change an employee
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, conflicts_with = "no_department")]
        department: Option<i64>,

        #[arg(long)]
        no_department: bool,

        #[arg(long, conflicts_with = "clear_title")]
        title: Option<String>,

        #[arg(long)]
        clear_title: bool,

        #[arg(long, conflicts_with = "clear_hire_date")]
        hire_date: Option<NaiveDate>,

        #[arg(long)]
        clear_hire_date: bool,

        #[arg(long, action = ArgAction::Set)]
        active: Option<bool>,
    },

    /// Delete an employee
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum KpiCommand {
    /// Define a KPI
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        unit: Option<String>,

        /// `higher` or `lower`
        #[arg(long)]
        direction: Option<Direction>,

        #[arg(long)]
        default_weight: Option<f64>,
    },

    /// Show one KPI definition
    Get { id: i64 },

    /// List KPI definitions
    List,

    /// Change a KPI definition
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, conflicts_with = "clear_category")]
        category: Option<String>,

        #[arg(long)]
        clear_category: bool,

        #[arg(long, conflicts_with = "clear_unit")]
        unit: Option<String>,

        #[arg(long)]
        clear_unit: bool,

        #[arg(long)]
        direction: Option<Direction>,

        #[arg(long, conflicts_with = "clear_default_weight")]
        default_weight: Option<f64>,

        #[arg(long)]
        clear_default_weight: bool,
    },

    /// Delete a KPI definition
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum PeriodCommand {
    /// Create a monthly period
    Add {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: u32,

        /// Defaults to YYYY-MM
        #[arg(long)]
        label: Option<String>,
    },

    /// Show one period
    Get { id: i64 },

    /// List periods, newest first
    List,

    /// Change a period
    Update {
        id: i64,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        month: Option<u32>,

        #[arg(long, conflicts_with = "reset_label")]
        label: Option<String>,

        /// Go back to the generated YYYY-MM label
        #[arg(long)]
        reset_label: bool,
    },

    /// Delete a period
    Delete { id: i64 },
}

pub fn execute_department(state: &AppState, command: DepartmentCommand) -> CommandResult<JsonValue> {
    let service = state.reference();
    debug!(target: "app::command", ?command, "department command");

    match command {
        DepartmentCommand::Add {
            name,
            parent,
            active,
        } => to_output(&service.create_department(DepartmentCreateInput {
            name,
            parent_department_id: parent,
            is_active: active,
        })?),
        DepartmentCommand::Get { id } => to_output(&service.get_department(id)?),
        DepartmentCommand::List => to_output(&service.list_departments()?),
        DepartmentCommand::Update {
            id,
            name,
            parent,
            no_parent,
            active,
        } => to_output(&service.update_department(
            id,
            DepartmentUpdateInput {
                name,
                parent_department_id: patch(parent, no_parent),
                is_active: active,
            },
        )?),
        DepartmentCommand::Delete { id } => {
            service.delete_department(id)?;
            Ok(json!({ "deleted": id }))
        }
    }
}

pub fn execute_employee(state: &AppState, command: EmployeeCommand) -> CommandResult<JsonValue> {
    let service = state.reference();
    debug!(target: "app::command", ?command, "employee command");

    match command {
        EmployeeCommand::Add {
            name,
            department,
            title,
            hire_date,
            active,
        } => to_output(&service.create_employee(EmployeeCreateInput {
            name,
            department_id: department,
            title,
            hire_date,
            is_active: active,
        })?),
        EmployeeCommand::Get { id } => to_output(&service.get_employee(id)?),
        EmployeeCommand::List { department } => to_output(&service.list_employees(department)?),
        EmployeeCommand::Update {
            id,
            name,
            department,
            no_department,
            title,
            clear_title,
            hire_date,
            clear_hire_date,
            active,
        } => to_output(&service.update_employee(
            id,
            EmployeeUpdateInput {
                name,
                department_id: patch(department, no_department),
                title: patch(title, clear_title),
                hire_date: patch(hire_date, clear_hire_date),
                is_active: active,
            },
        )?),
        EmployeeCommand::Delete { id } => {
            service.delete_employee(id)?;
            Ok(json!({ "deleted": id }))
        }
    }
}

pub fn execute_kpi(state: &AppState, command: KpiCommand) -> CommandResult<JsonValue> {
    let service = state.reference();
    debug!(target: "app::command", ?command, "kpi command");

    match command {
        KpiCommand::Add {
            name,
            category,
            unit,
            direction,
            default_weight,
        } => to_output(&service.create_kpi(KpiCreateInput {
            name,
            category,
            unit,
            direction,
            default_weight,
        })?),
        KpiCommand::Get { id } => to_output(&service.get_kpi(id)?),
        KpiCommand::List => to_output(&service.list_kpis()?),
        KpiCommand::Update {
            id,
            name,
            category,
            clear_category,
            unit,
            clear_unit,
            direction,
            default_weight,
            clear_default_weight,
        } => to_output(&service.update_kpi(
            id,
            KpiUpdateInput {
                name,
                category: patch(category, clear_category),
                unit: patch(unit, clear_unit),
                direction,
                default_weight: patch(default_weight, clear_default_weight),
            },
        )?),
        KpiCommand::Delete { id } => {
            service.delete_kpi(id)?;
            Ok(json!({ "deleted": id }))
        }
    }
}

pub fn execute_period(state: &AppState, command: PeriodCommand) -> CommandResult<JsonValue> {
    let service = state.reference();
    debug!(target: "app::command", ?command, "period command");

    match command {
        PeriodCommand::Add { year, month, label } => {
            to_output(&service.create_period(PeriodCreateInput { year, month, label })?)
        }
        PeriodCommand::Get { id } => to_output(&service.get_period(id)?),
        PeriodCommand::List => to_output(&service.list_periods()?),
        PeriodCommand::Update {
            id,
            year,
            month,
            label,
            reset_label,
        } => to_output(&service.update_period(
            id,
            PeriodUpdateInput {
                year,
                month,
                label: patch(label, reset_label),
            },
        )?),
        PeriodCommand::Delete { id } => {
            service.delete_period(id)?;
            Ok(json!({ "deleted": id }))
        }
    }
}
