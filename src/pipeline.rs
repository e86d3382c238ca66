// src/pipeline.rs

use std::path::PathBuf;

use arrow::record_batch::RecordBatch;

use tracing::{debug, info, instrument};

use crate::bundle::{write_bundle, RenderBundle};
use crate::config::Config;
use crate::error::ReportResult;
use crate::model::diagnostics;
use crate::report::{parse_report, RawReport, ReportLayout};
use crate::solver::run_solver;
use crate::tensor;

/// What one run produced.
#[derive(Debug)]
pub struct Outcome {
    pub bundle: RenderBundle,
    pub bundle_path: PathBuf,
    /// Columnar copies of the derived matrices, for in-process consumers.
    pub batches: Vec<(&'static str, RecordBatch)>,
    pub lines_read: usize,
}

/// solver (optional) → read → parse → validate → tensors → bundle on disk.
#[instrument(level = "info", skip(config), fields(report = %config.report_path.display()))]
pub fn run(config: &Config) -> ReportResult<Outcome> {
    config.validate()?;

    if config.solver.enabled() {
        run_solver(&config.solver, &config.report_path)?;
    }

    let raw = RawReport::load(&config.report_path)?;
    let lines_read = raw.lines.len();
    let validated = parse_report(&raw, &ReportLayout::default())?.validate()?;
    drop(raw);

    let tensors = tensor::build(&validated);
    let findings = diagnostics::check(&validated);
    let batches = tensor::arrow::to_record_batches(&tensors)?;
    for (name, batch) in &batches {
        debug!(
            matrix = *name,
            rows = batch.num_rows(),
            columns = batch.num_columns(),
            "arrow batch"
        );
    }
    info!(
        floors = tensors.floors.len(),
        eggs = tensors.eggs.len(),
        decisions = validated.model().decisions.len(),
        tiebreak = validated.model().used_tiebreak(),
        monotone = tensors.monotonicity.combined,
        diagnostics = findings.len(),
        "report ready"
    );

    let bundle = RenderBundle::new(config, &validated, tensors, findings);
    let bundle_path = config.artefact_path("-bundle.json");
    write_bundle(&bundle, &bundle_path)?;

    Ok(Outcome {
        bundle,
        bundle_path,
        batches,
        lines_read,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::report::fixtures::{SCENARIO, SOLVER_3_2};
    use std::fs;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,dpegg_report=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn config_for(dir: &std::path::Path, text: &str) -> anyhow::Result<Config> {
        let report_path = dir.join("dpegg-dump");
        fs::write(&report_path, text)?;
        Ok(Config {
            report_path,
            ..Config::default()
        })
    }

    #[test]
    fn existing_report_end_to_end() -> anyhow::Result<()> {
        init_test_logging();
        let dir = tempfile::tempdir()?;
        let config = config_for(dir.path(), SOLVER_3_2)?;

        let out = run(&config)?;
        assert_eq!(out.lines_read, SOLVER_3_2.lines().count());
        assert_eq!(out.bundle_path, dir.path().join("dpegg-dump-bundle.json"));
        assert!(out.bundle_path.exists());
        assert!(out.bundle.tensors.monotonicity.combined);
        assert!(out.bundle.diagnostics.is_empty());
        assert_eq!(out.bundle.tensors.floors, vec![1, 2, 3]);

        let shapes: Vec<_> = out
            .batches
            .iter()
            .map(|(name, b)| (*name, b.num_rows(), b.num_columns()))
            .collect();
        assert_eq!(
            shapes,
            vec![
                ("min_max", 3, 3),
                ("average", 3, 3),
                ("access_frequency", 3, 3)
            ]
        );
        Ok(())
    }

    #[test]
    fn invalid_report_writes_nothing() -> anyhow::Result<()> {
        init_test_logging();
        let dir = tempfile::tempdir()?;
        let text = SCENARIO.replace("floors2: 0.5 1.0 1.5", "floors2: 0.5 1.0 3.5");
        let config = config_for(dir.path(), &text)?;

        let err = run(&config).unwrap_err();
        assert!(matches!(err, ReportError::DomainInvariant { .. }));
        assert!(!dir.path().join("dpegg-dump-bundle.json").exists());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn failing_solver_stops_the_run() -> anyhow::Result<()> {
        init_test_logging();
        let dir = tempfile::tempdir()?;
        let mut config = config_for(dir.path(), SCENARIO)?;
        config.solver.binary = "false".into();
        config.solver.floors = 4;
        config.solver.eggs = 2;

        assert!(matches!(
            run(&config),
            Err(ReportError::SubprocessFailure { .. })
        ));
        Ok(())
    }
}
