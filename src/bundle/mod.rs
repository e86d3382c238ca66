// src/bundle/mod.rs

use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::error::{ReportError, ReportResult};
use crate::model::{diagnostics::Diagnostic, DecisionRecord, ValidatedReport};
use crate::tensor::{floor_ticks, DerivedTensors};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloorTick {
    pub position: usize,
    pub label: u32,
}

/// The worst-case and average drops of the largest floor count, per egg budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropProfile {
    pub floors: u32,
    pub min_max: Vec<f64>,
    pub average: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figures {
    pub access: PathBuf,
    pub drops: PathBuf,
    pub figext: String,
    /// `None` means the renderer keeps the figure's own resolution.
    pub dpi: Option<f64>,
    pub horizontals: bool,
    pub floor_ticks: Vec<FloorTick>,
}

/// Everything the renderer needs, in one serializable record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderBundle {
    pub generated_at: DateTime<Utc>,
    pub report: PathBuf,
    pub command: String,
    pub used_tiebreak: bool,
    pub tensors: DerivedTensors,
    pub access_totals: Vec<f64>,
    pub profile: Option<DropProfile>,
    pub decisions: BTreeMap<u32, DecisionRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub figures: Figures,
}

impl RenderBundle {
    pub fn new(
        config: &Config,
        report: &ValidatedReport,
        tensors: DerivedTensors,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        let model = report.model();
        let render = &config.render;

        let profile = tensors.floors.last().map(|&floors| {
            let last = tensors.min_max.nrows() - 1;
            DropProfile {
                floors,
                min_max: tensors.min_max.row(last).to_vec(),
                average: tensors.average.row(last).to_vec(),
            }
        });
        let floor_ticks = floor_ticks(&tensors.floors, render.maxfticks)
            .into_iter()
            .map(|(position, label)| FloorTick { position, label })
            .collect();

        Self {
            generated_at: Utc::now(),
            report: config.report_path.clone(),
            command: model.preamble.command.clone(),
            used_tiebreak: model.used_tiebreak(),
            access_totals: tensors.access_totals(),
            tensors,
            profile,
            decisions: model.decisions.clone(),
            diagnostics,
            figures: Figures {
                access: config.artefact_path(&format!("-access.{}", render.figext)),
                drops: config.artefact_path(&format!("-drops.{}", render.figext)),
                figext: render.figext.clone(),
                dpi: render.effective_dpi(),
                horizontals: render.horizontals,
                floor_ticks,
            },
        }
    }
}

/// Write `bundle` as pretty JSON to `path`: to a tmp file first, then rename over.
pub fn write_bundle(bundle: &RenderBundle, path: &Path) -> ReportResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir).map_err(|e| ReportError::io(dir, e))?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bundle.json".to_string());
    let tmp_path = dir.join(format!(".{}.tmp", file_name));

    let mut tmp = fs::File::create(&tmp_path).map_err(|e| ReportError::io(&tmp_path, e))?;
    serde_json::to_writer_pretty(&mut tmp, bundle).map_err(|e| ReportError::Serialize {
        what: path.display().to_string(),
        detail: e.to_string(),
    })?;
    // trailing newline
    tmp.write_all(b"\n")
        .map_err(|e| ReportError::io(&tmp_path, e))?;
    drop(tmp);

    fs::rename(&tmp_path, path).map_err(|e| ReportError::io(path, e))?;
    info!(path = %path.display(), "wrote render bundle");
    Ok(())
}
