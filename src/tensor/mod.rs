// src/tensor/mod.rs
pub mod arrow;

use ndarray::{Array2, Axis};
use serde::Serialize;
use tracing::{debug, warn};

use crate::model::{Table, ValidatedReport};

/// Rows are floor counts, columns are egg budgets.
pub fn table_to_array(table: &Table) -> Array2<f64> {
    Array2::from_shape_fn((table.len(), table.columns()), |(r, c)| {
        table.rows[r].values[c]
    })
}

/// Shape checks on average drops. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Monotonicity {
    /// More floors never lowers the expected drop count.
    pub along_floors: bool,
    /// More eggs never raises the expected drop count.
    pub along_eggs: bool,
    pub combined: bool,
}

impl Monotonicity {
    pub fn of(average: &Array2<f64>) -> Self {
        let along_floors = average
            .outer_iter()
            .zip(average.outer_iter().skip(1))
            .all(|(prev, next)| next.iter().zip(prev.iter()).all(|(n, p)| n >= p));
        let along_eggs = average
            .axis_iter(Axis(1))
            .zip(average.axis_iter(Axis(1)).skip(1))
            .all(|(prev, next)| next.iter().zip(prev.iter()).all(|(n, p)| n <= p));
        Self {
            along_floors,
            along_eggs,
            combined: along_floors && along_eggs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedTensors {
    /// Floor counts, one per row.
    pub floors: Vec<u32>,
    /// Egg budgets `1..=columns`.
    pub eggs: Vec<u32>,
    pub min_max: Array2<f64>,
    pub average: Array2<f64>,
    /// Drop histogram divided by the number of floor rows.
    pub access_frequency: Array2<f64>,
    pub monotonicity: Monotonicity,
}

impl DerivedTensors {
    /// Per egg budget, the summed access frequency over all floors.
    pub fn access_totals(&self) -> Vec<f64> {
        self.access_frequency.sum_axis(Axis(0)).to_vec()
    }
}

/// Turn validated tables into tensors. Row keys, widths and the min max >= average
/// bound are already guaranteed by `ValidatedReport`.
pub fn build(report: &ValidatedReport) -> DerivedTensors {
    let tables = report.tables();
    let floors = tables.min_max.keys();
    let eggs = (1..=tables.min_max.columns() as u32).collect();

    let min_max = table_to_array(&tables.min_max);
    let average = table_to_array(&tables.average);
    let access_frequency = table_to_array(&tables.histogram) / floors.len() as f64;

    let monotonicity = Monotonicity::of(&average);
    if !monotonicity.along_floors {
        warn!(
            tiebreak = report.model().used_tiebreak(),
            "average drops decrease somewhere as floors increase"
        );
    }
    if !monotonicity.along_eggs {
        warn!(
            tiebreak = report.model().used_tiebreak(),
            "average drops increase somewhere as eggs increase"
        );
    }
    debug!(shape = ?min_max.dim(), ?monotonicity, "tensors built");

    DerivedTensors {
        floors,
        eggs,
        min_max,
        average,
        access_frequency,
        monotonicity,
    }
}

/// Positions and labels for at most `max_ticks` floor ticks, evenly spread
/// over the rows and rounded half-to-even.
pub fn floor_ticks(floors: &[u32], max_ticks: usize) -> Vec<(usize, u32)> {
    let n = floors.len();
    let count = n.min(max_ticks);
    match count {
        0 => Vec::new(),
        1 => vec![(0, floors[0])],
        _ => {
            let step = (n - 1) as f64 / (count - 1) as f64;
            (0..count)
                .map(|i| {
                    let pos = (i as f64 * step).round_ties_even() as usize;
                    (pos, floors[pos])
                })
                .collect()
        }
    }
}
