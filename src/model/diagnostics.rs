// src/model/diagnostics.rs
//
// Non-fatal consistency checks between the main tables and the rest of the
// report. A mismatch here is logged and carried into the bundle; it never
// stops the pipeline.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use super::ValidatedReport;

/// Summary values may be printed with 6 significant digits.
const MEAN_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Worst case for the full building disagrees with the closed-form bound.
    ClassicLimit { expected: u32, found: f64 },
    /// The preamble's required drops disagree with the closed-form bound.
    RequiredDrops { printed: u32, expected: u32 },
    /// A per-budget summary block disagrees with the bottom table row.
    Summary {
        eggs: u32,
        field: &'static str,
        summary: f64,
        table: f64,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ClassicLimit { expected, found } => write!(
                f,
                "min max drops for the full floor count is {}, classic bound is {}",
                found, expected
            ),
            Diagnostic::RequiredDrops { printed, expected } => write!(
                f,
                "report says {} drops are required, classic bound is {}",
                printed, expected
            ),
            Diagnostic::Summary {
                eggs,
                field,
                summary,
                table,
            } => write!(
                f,
                "eggs E = {}: summary {} is {}, table says {}",
                eggs, field, summary, table
            ),
        }
    }
}

/// Smallest number of drops that always finds the limit floor among `floors`
/// floors with `eggs` eggs, from `N(d, e) = 1 + N(d-1, e-1) + N(d-1, e)`.
/// Returns `None` for zero floors or zero eggs.
pub fn classic_drop_limit(floors: u32, eggs: u32) -> Option<u32> {
    if floors == 0 || eggs == 0 {
        return None;
    }
    let eggs = eggs as usize;
    // reach[e] = floors coverable with the drops so far and e eggs
    let mut reach = vec![0u64; eggs + 1];
    for d in 1..=floors {
        for e in (1..=eggs).rev() {
            reach[e] = 1 + reach[e - 1] + reach[e];
        }
        if reach[eggs] >= floors as u64 {
            return Some(d);
        }
    }
    None
}

/// Run every cross-check; each finding is logged as a warning.
pub fn check(report: &ValidatedReport) -> Vec<Diagnostic> {
    let model = report.model();
    let tables = &model.tables;
    let mut out = Vec::new();

    let (Some(last_mm), Some(last_avg)) = (tables.min_max.rows.last(), tables.average.rows.last())
    else {
        return out;
    };
    let columns = last_mm.values.len() as u32;

    if let Some(expected) = classic_drop_limit(last_mm.key, columns) {
        if let Some(&found) = last_mm.values.last() {
            if found != f64::from(expected) {
                out.push(Diagnostic::ClassicLimit { expected, found });
            }
        }
        if let Some(printed) = model.preamble.required_drops {
            if printed != expected {
                out.push(Diagnostic::RequiredDrops { printed, expected });
            }
        }
    }

    for s in model.summaries.values() {
        if s.floors != last_mm.key || s.eggs == 0 || s.eggs > columns {
            continue;
        }
        let j = (s.eggs - 1) as usize;
        if f64::from(s.max_drops) != last_mm.values[j] {
            out.push(Diagnostic::Summary {
                eggs: s.eggs,
                field: "max_drops",
                summary: f64::from(s.max_drops),
                table: last_mm.values[j],
            });
        }
        let mean = last_avg.values[j];
        if (s.mean_drops - mean).abs() > MEAN_TOLERANCE * mean.abs().max(1.0) {
            out.push(Diagnostic::Summary {
                eggs: s.eggs,
                field: "mean_drops",
                summary: s.mean_drops,
                table: mean,
            });
        }
    }

    for d in &out {
        warn!("{}", d);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::{SCENARIO, SOLVER_3_2};
    use crate::report::parse_str;

    #[test]
    fn classic_limits() {
        assert_eq!(classic_drop_limit(1, 1), Some(1));
        assert_eq!(classic_drop_limit(3, 2), Some(2));
        assert_eq!(classic_drop_limit(10, 1), Some(10));
        assert_eq!(classic_drop_limit(100, 2), Some(14));
        assert_eq!(classic_drop_limit(127, 8), Some(7));
        assert_eq!(classic_drop_limit(0, 3), None);
    }

    #[test]
    fn solver_output_is_consistent() {
        let v = parse_str(SOLVER_3_2).unwrap().validate().unwrap();
        assert!(check(&v).is_empty());
    }

    #[test]
    fn disagreements_are_reported() {
        let text = SOLVER_3_2
            .replace("number of drops = 2", "number of drops = 3")
            .replace("mean drops    = 2 (", "mean drops    = 1.9 (");
        let v = parse_str(&text).unwrap().validate().unwrap();
        let found = check(&v);
        assert_eq!(found.len(), 2);
        assert!(found.contains(&Diagnostic::RequiredDrops {
            printed: 3,
            expected: 2
        }));
        assert!(matches!(
            found[1],
            Diagnostic::Summary {
                eggs: 2,
                field: "mean_drops",
                ..
            }
        ));
    }

    #[test]
    fn scenario_bottom_right_is_off_the_classic_bound() {
        // two floors and three eggs need two drops, the scenario table says 3
        let v = parse_str(SCENARIO).unwrap().validate().unwrap();
        assert_eq!(
            check(&v),
            vec![Diagnostic::ClassicLimit {
                expected: 2,
                found: 3.0
            }]
        );
    }
}
