// src/config.rs

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReportError, ReportResult};

/// How to invoke the solver. It only runs when both `floors` and `eggs` are >= 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub binary: PathBuf,
    pub floors: u32,
    pub eggs: u32,
    /// Ask the solver to sub-optimise the policy for average drops.
    pub tiebreak: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("./dpegg"),
            floors: 0,
            eggs: 0,
            tiebreak: false,
        }
    }
}

impl SolverConfig {
    pub fn enabled(&self) -> bool {
        self.floors >= 1 && self.eggs >= 1
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = vec![self.floors.to_string(), self.eggs.to_string()];
        if self.tiebreak {
            args.push("--tiebreak".to_string());
        }
        args
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.binary.display().to_string())
            .chain(self.args())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Plot options handed through to the renderer untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Figure file extension, e.g. `pdf` or `png`.
    pub figext: String,
    /// Only used for png output.
    pub dpi: f64,
    pub maxfticks: usize,
    /// Draw a line between egg-budget rows of the access plot.
    pub horizontals: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            figext: "pdf".to_string(),
            dpi: 250.0,
            maxfticks: 12,
            horizontals: false,
        }
    }
}

impl RenderOptions {
    /// `None` means "use the figure's own resolution".
    pub fn effective_dpi(&self) -> Option<f64> {
        (self.figext == "png").then_some(self.dpi)
    }
}

/// One pipeline run. Built once at startup and passed down by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Solver output to read (and to write, when the solver runs).
    pub report_path: PathBuf,
    /// Where the bundle goes; defaults to the report's directory.
    pub output_dir: Option<PathBuf>,
    pub solver: SolverConfig,
    pub render: RenderOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_path: PathBuf::from("dpegg-dump"),
            output_dir: None,
            solver: SolverConfig::default(),
            render: RenderOptions::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(text: &str) -> ReportResult<Self> {
        serde_yaml::from_str(text).map_err(|e| ReportError::Config {
            detail: e.to_string(),
        })
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ReportResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
        let cfg = Self::from_yaml_str(&text)?;
        debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn validate(&self) -> ReportResult<()> {
        if self.report_path.as_os_str().is_empty() {
            return Err(ReportError::Config {
                detail: "report path is empty".into(),
            });
        }
        if self.render.figext.is_empty() {
            return Err(ReportError::Config {
                detail: "figure extension is empty".into(),
            });
        }
        if self.render.dpi.is_nan() || self.render.dpi <= 0.0 {
            return Err(ReportError::Config {
                detail: format!("dpi must be positive, got {}", self.render.dpi),
            });
        }
        Ok(())
    }

    /// Directory for generated artefacts.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            self.report_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        })
    }

    /// `<dir>/<report file name><suffix>`
    pub fn artefact_path(&self, suffix: &str) -> PathBuf {
        let stem = self
            .report_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dpegg-dump".to_string());
        self.output_dir().join(format!("{}{}", stem, suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_overrides_defaults() {
        let cfg = Config::from_yaml_str(
            "report_path: out/dpegg-out-127\nsolver:\n  floors: 127\n  eggs: 8\n  tiebreak: true\nrender:\n  figext: png\n",
        )
        .unwrap();
        assert_eq!(cfg.solver.binary, PathBuf::from("./dpegg"));
        assert!(cfg.solver.enabled());
        assert_eq!(cfg.solver.command_line(), "./dpegg 127 8 --tiebreak");
        assert_eq!(cfg.render.effective_dpi(), Some(250.0));
        assert_eq!(cfg.render.maxfticks, 12);
        assert_eq!(
            cfg.artefact_path("-bundle.json"),
            PathBuf::from("out/dpegg-out-127-bundle.json")
        );
        cfg.validate().unwrap();
    }

    #[test]
    fn defaults_do_not_run_the_solver() {
        let cfg = Config::default();
        assert!(!cfg.solver.enabled());
        assert_eq!(cfg.render.effective_dpi(), None);
        assert_eq!(cfg.artefact_path("-access.pdf"), PathBuf::from("dpegg-dump-access.pdf"));
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.report_path = PathBuf::new();
        assert!(matches!(cfg.validate(), Err(ReportError::Config { .. })));
        assert!(Config::from_yaml_str("render:\n  dpi: lots\n").is_err());
    }
}
