// src/model/types.rs

use serde::Serialize;

/// One `floors <N>: v1 v2 ...` line: the floor count and one value per egg budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub key: u32,
    pub values: Vec<f64>,
}

/// Rows of one report section, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new(rows: Vec<TableRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of egg-budget columns, taken from the first row (0 for an empty table).
    pub fn columns(&self) -> usize {
        self.rows.first().map_or(0, |r| r.values.len())
    }

    pub fn keys(&self) -> Vec<u32> {
        self.rows.iter().map(|r| r.key).collect()
    }
}

/// The three main tables of a report. Once validated they share row keys and width.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThreeTableSet {
    pub min_max: Table,
    pub average: Table,
    pub histogram: Table,
}

/// Admissible decisions at the initial state for one egg budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRecord {
    pub eggs: u32,
    /// State bounds printed in the anchor, when present.
    pub lb: Option<u32>,
    pub ub: Option<u32>,
    /// Candidate floors.
    pub drops: Vec<f64>,
    /// Worst-case cost of dropping from each candidate.
    pub values: Vec<f64>,
    /// Mean cost of dropping from each candidate.
    pub means: Vec<f64>,
}

/// Line 0 of the report and the classic drop bound printed right after it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Preamble {
    pub command: String,
    pub used_tiebreak: bool,
    pub required_drops: Option<u32>,
}

/// The `--- floors F = .., eggs E = .. ---` block emitted once per egg budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub floors: u32,
    pub eggs: u32,
    pub max_drops: u32,
    pub mean_drops: f64,
    /// Count of limit floors needing exactly k drops, k = 0..=max_drops.
    pub histogram: Vec<u64>,
}

/// One `L = x: f1 f2 ... (n steps)` line of the executions section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionTrace {
    pub limit: u32,
    pub floors: Vec<u32>,
    pub steps: u32,
}
