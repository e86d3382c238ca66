// src/report/mod.rs
pub mod decision;
pub mod row;
pub mod section;
pub mod summary;

use std::{fs::File, io::Read, path::Path};

use tracing::{debug, info};

use crate::error::{ReportError, ReportResult};
use crate::model::{ReportModel, ThreeTableSet};
use section::SectionGrammar;

pub use decision::{parse_decisions, FIRST_RECORDED_BUDGET};
pub use row::{parse_labelled, parse_row, render_row};
pub use section::{parse_section, render_section, ParsedSection, Termination};

/// Solver output, one entry per line, exactly as read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReport {
    pub lines: Vec<String>,
}

impl RawReport {
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Read the whole report into memory; the file is closed before returning.
    pub fn load<P: AsRef<Path>>(path: P) -> ReportResult<Self> {
        let path = path.as_ref();
        let mut text = String::new();
        {
            let mut file = File::open(path).map_err(|e| ReportError::io(path, e))?;
            file.read_to_string(&mut text)
                .map_err(|e| ReportError::io(path, e))?;
        }
        let report = Self::from_text(&text);
        info!(lines = report.lines.len(), path = %path.display(), "read report");
        Ok(report)
    }
}

/// First line at or after `start` that begins with `prefix` (literal match).
pub fn locate(lines: &[String], prefix: &str, start: usize) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, l)| l.starts_with(prefix))
        .map(|(i, _)| i)
}

/// Anchors and row prefixes of the report format. The defaults match the
/// solver; the parser reads nothing else from its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    pub tiebreak_marker: &'static str,
    pub required_drops_anchor: &'static str,
    pub min_max: SectionGrammar<'static>,
    pub average: SectionGrammar<'static>,
    pub histogram: SectionGrammar<'static>,
    pub decision_anchor: &'static str,
    pub decision_labels: [&'static str; 3],
    pub budget_anchor: &'static str,
    pub executions_anchor: &'static str,
    pub execution_prefix: &'static str,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            tiebreak_marker: "--tiebreak",
            required_drops_anchor: "--- required min. number of drops = ",
            min_max: SectionGrammar {
                anchor: "--- min max drops",
                row_prefix: "floors",
            },
            average: SectionGrammar {
                anchor: "--- average drops",
                row_prefix: "floors",
            },
            // singular on purpose: the solver prints `floor  <n>:` here
            histogram: SectionGrammar {
                anchor: "--- drop histogram",
                row_prefix: "floor",
            },
            decision_anchor: "--- decision @ state (e = ",
            decision_labels: ["drops", "values", "means"],
            budget_anchor: "--- floors F",
            executions_anchor: "--- optimal E = ",
            execution_prefix: "L =",
        }
    }
}

/// Parse every section of a report into a `ReportModel`. No cross-table
/// checks happen here; see `ReportModel::validate`.
#[tracing::instrument(level = "debug", skip_all, fields(lines = raw.lines.len()))]
pub fn parse_report(raw: &RawReport, layout: &ReportLayout) -> ReportResult<ReportModel> {
    let lines = &raw.lines;

    let preamble = summary::parse_preamble(lines, layout)?;
    let tables = ThreeTableSet {
        min_max: layout.min_max.parse(lines, 0)?.table,
        average: layout.average.parse(lines, 0)?.table,
        histogram: layout.histogram.parse(lines, 0)?.table,
    };
    debug!(
        min_max = tables.min_max.len(),
        average = tables.average.len(),
        histogram = tables.histogram.len(),
        "tables parsed"
    );

    let decisions = parse_decisions(lines, layout)?;
    let summaries = summary::parse_budget_summaries(lines, layout)?;
    let executions = summary::parse_executions(lines, layout)?;

    Ok(ReportModel {
        lines: lines.clone(),
        preamble,
        tables,
        decisions,
        summaries,
        executions,
    })
}

/// Convenience wrapper for in-memory text.
pub fn parse_str(text: &str) -> ReportResult<ReportModel> {
    parse_report(&RawReport::from_text(text), &ReportLayout::default())
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// The smallest report that exercises every main section.
    pub const SCENARIO: &str = "--tiebreak
--- min max drops
floors1: 0 1 2
floors2: 1 2 3
--- average drops
floors1: 0.0 0.5 1.0
floors2: 0.5 1.0 1.5
--- drop histogram
floor1: 1 1 0
floor2: 0 1 1
--- decision @ state (e = 1
drops: 1
values: 0.1
means: 0.2
--- decision @ state (e = 2
drops: 1 2
values: 0.3 0.4
means: 0.5 0.6
";

    /// Solver output for `./dpegg 3 2 --tiebreak`, trimmed of timing noise.
    pub const SOLVER_3_2: &str = "./dpegg 3 2 --tiebreak
--- required min. number of drops = 2
3 scans at level e = 1
3 scans at level e = 2
value (action) table has 20 (12) entries (duration = 0.0001 s.)
--- floors F = 3, eggs E = 1 ---
min max drops = 3 (optimal worst case)
mean drops    = 2.25 (uniform limit floor)
drops histg.  = 0 1 1 2
--- decision @ state (e = 1, lb = 0, ub = 4) ---
drops:   1
values:  3
means:  2.25
--- floors F = 3, eggs E = 2 ---
min max drops = 2 (optimal worst case)
mean drops    = 2 (uniform limit floor)
drops histg.  = 0 0 4
--- decision @ state (e = 2, lb = 0, ub = 4) ---
drops:   1 2 3
values:  3 2 3
means:  2.25 2 2.25
--- min max drops, E = 1..2 ---
floors   1:   1   1
floors   2:   2   2
floors   3:   3   2
--- average drops, E = 1..2 ---
floors   1:        1        1
floors   2:   1.66667  1.66667
floors   3:      2.25        2
--- drop histograms E = 1..2 (F = 3) ---
floor    1:   4   2
floor    2:   3   4
floor    3:   2   2
--- optimal E = 2 executions for all limit levels L ---
L =   0: 2 1 (2 steps)
L =   1: 2 1 (2 steps)
L =   2: 2 3 (2 steps)
L =   3: 2 3 (2 steps)
";
}
