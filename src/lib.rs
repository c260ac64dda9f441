// sql_app - experiment sample-data workflow on SQLite
// Module declarations
pub mod db;
pub mod error;
pub mod sampling;
pub mod settings;
pub mod workflow;

use anyhow::Result;
use std::io::Write;
use std::path::Path;

use settings::WorkflowSettings;
use workflow::{run_workflow, WorkflowSummary};

/// Load settings from the working directory and run the workflow, printing
/// the report to stdout
pub fn run() -> Result<WorkflowSummary> {
    let settings = WorkflowSettings::load(Path::new("."))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = run_workflow(&settings, &mut out)?;
    out.flush()?;

    Ok(summary)
}
