// src/model/mod.rs
pub mod diagnostics;
pub mod types;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{ReportError, ReportResult};
pub use types::{
    BudgetSummary, DecisionRecord, ExecutionTrace, Preamble, Table, TableRow, ThreeTableSet,
};

/// Everything parsed out of one report, before any cross-table checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportModel {
    /// Raw report lines; line 0 is kept for the tie-break marker.
    #[serde(skip)]
    pub lines: Vec<String>,
    pub preamble: Preamble,
    pub tables: ThreeTableSet,
    /// Decision blocks keyed by egg budget, 2 and up.
    pub decisions: BTreeMap<u32, DecisionRecord>,
    pub summaries: BTreeMap<u32, BudgetSummary>,
    pub executions: Vec<ExecutionTrace>,
}

/// A `ReportModel` whose tables passed `validate`. Only this type can be
/// turned into tensors.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedReport {
    model: ReportModel,
}

impl ValidatedReport {
    pub fn model(&self) -> &ReportModel {
        &self.model
    }

    pub fn tables(&self) -> &ThreeTableSet {
        &self.model.tables
    }

    pub fn into_inner(self) -> ReportModel {
        self.model
    }
}

impl ReportModel {
    pub fn used_tiebreak(&self) -> bool {
        self.preamble.used_tiebreak
    }

    /// Check the three tables against each other:
    /// - same number of rows
    /// - same floor keys, in the same order
    /// - same number of egg-budget columns
    /// - min max drops never below average drops
    #[instrument(level = "debug", skip(self), fields(rows = self.tables.min_max.len()))]
    pub fn validate(self) -> ReportResult<ValidatedReport> {
        let ThreeTableSet {
            min_max,
            average,
            histogram,
        } = &self.tables;

        for (name, t) in [("average", average), ("histogram", histogram)] {
            if t.len() != min_max.len() {
                return Err(ReportError::InconsistentKeys {
                    detail: format!(
                        "min max table has {} rows, {} table has {}",
                        min_max.len(),
                        name,
                        t.len()
                    ),
                });
            }
            if let Some((i, (a, b))) = min_max
                .rows
                .iter()
                .zip(&t.rows)
                .enumerate()
                .find(|(_, (a, b))| a.key != b.key)
            {
                return Err(ReportError::InconsistentKeys {
                    detail: format!(
                        "row {}: min max table has floors {}, {} table has floors {}",
                        i, a.key, name, b.key
                    ),
                });
            }
            if t.columns() != min_max.columns() {
                return Err(ReportError::structural(format!(
                    "min max table has {} egg budgets, {} table has {}",
                    min_max.columns(),
                    name,
                    t.columns()
                )));
            }
        }

        for (mm, avg) in min_max.rows.iter().zip(&average.rows) {
            if let Some((j, (&hi, &lo))) = mm
                .values
                .iter()
                .zip(&avg.values)
                .enumerate()
                .find(|(_, (hi, lo))| hi.is_nan() || lo.is_nan() || hi < lo)
            {
                return Err(ReportError::DomainInvariant {
                    floors: mm.key,
                    eggs: j as u32 + 1,
                    min_max: hi,
                    average: lo,
                });
            }
        }

        debug!(
            rows = min_max.len(),
            columns = min_max.columns(),
            "report validated"
        );
        Ok(ValidatedReport { model: self })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::{SCENARIO, SOLVER_3_2};
    use crate::report::parse_str;

    #[test]
    fn well_formed_reports_validate() {
        for text in [SCENARIO, SOLVER_3_2] {
            let v = parse_str(text).unwrap().validate().unwrap();
            let t = v.tables();
            assert_eq!(t.min_max.keys(), t.average.keys());
            assert_eq!(t.min_max.keys(), t.histogram.keys());
            for (mm, avg) in t.min_max.rows.iter().zip(&t.average.rows) {
                assert!(mm.values.iter().zip(&avg.values).all(|(a, b)| a >= b));
            }
        }
    }

    #[test]
    fn row_count_mismatch() {
        let text = SCENARIO.replace("floor2: 0 1 1\n", "");
        let err = parse_str(&text).unwrap().validate().unwrap_err();
        assert!(matches!(err, ReportError::InconsistentKeys { .. }));
    }

    #[test]
    fn key_mismatch() {
        let text = SCENARIO.replace("floor2: 0 1 1", "floor3: 0 1 1");
        let err = parse_str(&text).unwrap().validate().unwrap_err();
        match err {
            ReportError::InconsistentKeys { detail } => assert!(detail.contains("floors 3")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn column_mismatch() {
        let text = SCENARIO
            .replace("floor1: 1 1 0", "floor1: 1 1")
            .replace("floor2: 0 1 1", "floor2: 0 1");
        let err = parse_str(&text).unwrap().validate().unwrap_err();
        assert!(matches!(err, ReportError::Structural { .. }));
    }

    #[test]
    fn average_above_worst_case() {
        let text = SCENARIO.replace("floors2: 0.5 1.0 1.5", "floors2: 0.5 2.5 1.5");
        let err = parse_str(&text).unwrap().validate().unwrap_err();
        match err {
            ReportError::DomainInvariant {
                floors,
                eggs,
                min_max,
                average,
            } => {
                assert_eq!((floors, eggs), (2, 2));
                assert_eq!((min_max, average), (2.0, 2.5));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nan_cell_breaks_the_bound() {
        let text = SCENARIO.replace("floors2: 1 2 3", "floors2: 1 nan 3");
        let err = parse_str(&text).unwrap().validate().unwrap_err();
        match err {
            ReportError::DomainInvariant {
                floors,
                eggs,
                min_max,
                average,
            } => {
                assert_eq!((floors, eggs), (2, 2));
                assert!(min_max.is_nan());
                assert_eq!(average, 1.0);
            }
            other => panic!("unexpected error: {other}"),
        }

        let text = SCENARIO.replace("floors2: 0.5 1.0 1.5", "floors2: 0.5 1.0 NaN");
        assert!(matches!(
            parse_str(&text).unwrap().validate(),
            Err(ReportError::DomainInvariant { floors: 2, eggs: 3, .. })
        ));
    }
}
