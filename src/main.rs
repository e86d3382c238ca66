use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dpegg_report::{config::Config, pipeline};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Parse a dpegg solver report into validated tensors for plotting"
)]
struct Args {
    /// YAML config; command-line flags override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Name of the solver output (can be pre-existing).
    #[arg(long = "dpegg-output")]
    dpegg_output: Option<PathBuf>,
    /// Directory for the render bundle.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Solver executable.
    #[arg(long)]
    solver: Option<PathBuf>,
    /// Maximum number of eggs.
    #[arg(long)]
    eggs: Option<u32>,
    /// Maximum number of floors.
    #[arg(long)]
    floors: Option<u32>,
    /// Sub-optimize the policy to minimize average drops.
    #[arg(long)]
    tiebreak: bool,
    /// Draw egg-budget separators on the access plot.
    #[arg(long)]
    horizontals: bool,
    #[arg(long)]
    maxfticks: Option<usize>,
    /// Figure file extension (e.g. pdf or png).
    #[arg(long)]
    figext: Option<String>,
    /// Resolution for png output.
    #[arg(long)]
    dpi: Option<f64>,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => Config::from_yaml_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(p) = self.dpegg_output {
            cfg.report_path = p;
        }
        if let Some(d) = self.output_dir {
            cfg.output_dir = Some(d);
        }
        if let Some(s) = self.solver {
            cfg.solver.binary = s;
        }
        if let Some(e) = self.eggs {
            cfg.solver.eggs = e;
        }
        if let Some(f) = self.floors {
            cfg.solver.floors = f;
        }
        cfg.solver.tiebreak |= self.tiebreak;
        cfg.render.horizontals |= self.horizontals;
        if let Some(m) = self.maxfticks {
            cfg.render.maxfticks = m;
        }
        if let Some(x) = self.figext {
            cfg.render.figext = x;
        }
        if let Some(d) = self.dpi {
            cfg.render.dpi = d;
        }
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) config ───────────────────────────────────────────────────
    let config = Args::parse().into_config()?;
    info!(
        report = %config.report_path.display(),
        solver = config.solver.enabled(),
        "startup"
    );

    // ─── 3) run ──────────────────────────────────────────────────────
    let out = pipeline::run(&config)
        .with_context(|| format!("processing {}", config.report_path.display()))?;

    info!(
        lines = out.lines_read,
        bundle = %out.bundle_path.display(),
        tiebreak = out.bundle.used_tiebreak,
        "done"
    );
    Ok(())
}
