// src/bin/scan_reports.rs

use anyhow::{Context, Result};
use clap::Parser;
use dpegg_report::{build, RawReport, ReportLayout};
use glob::glob;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "scan-reports")]
#[command(about = "Parse and validate every dpegg report matching a glob pattern")]
struct Args {
    /// Glob pattern for report files
    #[arg(default_value = "dpegg-out-*")]
    pattern: String,
}

struct ScanRow {
    path: PathBuf,
    result: Result<(usize, usize, bool, bool)>,
}

fn scan_one(path: &Path) -> Result<(usize, usize, bool, bool)> {
    let raw = RawReport::load(path)?;
    let validated = dpegg_report::parse_report(&raw, &ReportLayout::default())?.validate()?;
    let t = build(&validated);
    Ok((
        t.floors.len(),
        t.eggs.len(),
        validated.model().used_tiebreak(),
        t.monotonicity.combined,
    ))
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(env).init();

    let args = Args::parse();

    // 1) Find all reports
    let paths: Vec<PathBuf> = glob(&args.pattern)
        .with_context(|| format!("Failed to read glob pattern '{}'", args.pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();
    if paths.is_empty() {
        return Err(anyhow::anyhow!(
            "No report files found under '{}'",
            args.pattern
        ));
    }
    info!("scanning {} reports", paths.len());

    // 2) In parallel: parse + validate + build each one
    let mut rows: Vec<ScanRow> = paths
        .par_iter()
        .map(|path| ScanRow {
            path: path.clone(),
            result: scan_one(path),
        })
        .collect();
    rows.sort_by(|a, b| a.path.cmp(&b.path));

    // 3) Print summary table
    println!(
        "\n{: <40} {:>7} {:>5} {:>9} {:>9}",
        "Report", "Floors", "Eggs", "Tiebreak", "Monotone"
    );
    println!("{:-<74}", "");
    let mut failed = 0;
    for row in &rows {
        match &row.result {
            Ok((floors, eggs, tiebreak, monotone)) => println!(
                "{: <40} {:>7} {:>5} {:>9} {:>9}",
                row.path.display(),
                floors,
                eggs,
                tiebreak,
                monotone
            ),
            Err(e) => {
                failed += 1;
                warn!(path = %row.path.display(), "{:#}", e);
                println!("{: <40} error: {:#}", row.path.display(), e);
            }
        }
    }
    println!("\n{} ok, {} failed", rows.len() - failed, failed);

    Ok(())
}
