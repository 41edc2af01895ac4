use std::process::ExitCode;

fn main() -> ExitCode {
    kpi_scorecard_lib::run()
}
