// src/solver/mod.rs

use std::{
    fs::{self, File},
    path::Path,
    process::{Command, Stdio},
    time::Instant,
};

use tracing::{info, instrument};

use crate::config::SolverConfig;
use crate::error::{ReportError, ReportResult};

/// Run `binary F E [--tiebreak] > report_path` and wait for it.
///
/// Any non-zero exit is fatal. The solver is deterministic, so there is no retry.
#[instrument(level = "info", skip(solver), fields(command = %solver.command_line()))]
pub fn run_solver(solver: &SolverConfig, report_path: &Path) -> ReportResult<()> {
    let command = solver.command_line();
    if let Some(parent) = report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
    }
    let out = File::create(report_path).map_err(|e| ReportError::io(report_path, e))?;

    let start = Instant::now();
    let status = Command::new(&solver.binary)
        .args(solver.args())
        .stdin(Stdio::null())
        .stdout(Stdio::from(out))
        .status()
        .map_err(|e| ReportError::SubprocessFailure {
            command: command.clone(),
            status: e.to_string(),
        })?;

    if !status.success() {
        return Err(ReportError::SubprocessFailure {
            command,
            status: status.to_string(),
        });
    }
    info!(elapsed = ?start.elapsed(), path = %report_path.display(), "solver finished");
    Ok(())
}
