// src/report/decision.rs

use std::collections::BTreeMap;

use regex::Regex;
use tracing::{debug, trace};

use super::row::parse_labelled;
use super::{locate, ReportLayout};
use crate::error::{ReportError, ReportResult};
use crate::model::DecisionRecord;

/// Egg budgets below this are located but neither parsed nor kept: with a single
/// egg the only policy is a linear scan from the bottom, so its block says nothing.
pub const FIRST_RECORDED_BUDGET: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor {
    index: usize,
    eggs: u32,
    lb: Option<u32>,
    ub: Option<u32>,
}

struct AnchorScanner<'a> {
    lines: &'a [String],
    prefix: &'a str,
    re: Regex,
}

impl<'a> AnchorScanner<'a> {
    fn new(lines: &'a [String], prefix: &'a str) -> ReportResult<Self> {
        // `(e = 2, lb = 0, ub = 11) ---`; the bounds are optional
        let pattern = format!(
            r"^{}(\d+)\s*(?:,\s*lb\s*=\s*(\d+)\s*,\s*ub\s*=\s*(\d+)\s*\))?",
            regex::escape(prefix)
        );
        let re = Regex::new(&pattern).map_err(|e| {
            ReportError::structural(format!("decision anchor `{}`: {}", prefix, e))
        })?;
        Ok(Self { lines, prefix, re })
    }

    /// Next decision anchor at or after `from`. The egg count is parsed in full,
    /// so `e = 1` never matches the start of `e = 10`.
    fn next(&self, from: usize) -> ReportResult<Option<Anchor>> {
        let Some(index) = locate(self.lines, self.prefix, from) else {
            return Ok(None);
        };
        let line = &self.lines[index];
        let caps = self.re.captures(line).ok_or_else(|| {
            ReportError::format(index, self.prefix, line, "egg count is not an integer")
        })?;
        let num = |i: usize| -> ReportResult<Option<u32>> {
            caps.get(i)
                .map(|m| {
                    m.as_str().parse::<u32>().map_err(|_| {
                        ReportError::format(index, self.prefix, line, "number out of range")
                    })
                })
                .transpose()
        };
        let eggs = num(1)?.ok_or_else(|| {
            ReportError::format(index, self.prefix, line, "missing egg count")
        })?;
        Ok(Some(Anchor {
            index,
            eggs,
            lb: num(2)?,
            ub: num(3)?,
        }))
    }
}

/// Collect the decision blocks for every egg budget from 2 upwards.
///
/// Blocks must appear as e = 1, 2, 3, ... with no gaps or repeats; each search
/// resumes right after the previous anchor, so anything else is reported
/// rather than silently skipped.
pub fn parse_decisions(
    lines: &[String],
    layout: &ReportLayout,
) -> ReportResult<BTreeMap<u32, DecisionRecord>> {
    let scanner = AnchorScanner::new(lines, layout.decision_anchor)?;

    let first = scanner.next(0)?.ok_or_else(|| {
        ReportError::structural("no decision block for e = 1")
    })?;
    if first.eggs != 1 {
        return Err(ReportError::structural(format!(
            "first decision block (line {}) is for e = {}, expected e = 1",
            first.index + 1,
            first.eggs
        )));
    }

    let mut out = BTreeMap::new();
    let mut current = first;
    loop {
        if current.eggs >= FIRST_RECORDED_BUDGET {
            let record = parse_block(lines, &current, layout)?;
            trace!(eggs = record.eggs, candidates = record.drops.len(), "decision block");
            out.insert(record.eggs, record);
        } else {
            trace!(eggs = current.eggs, line = current.index + 1, "decision block skipped");
        }

        let Some(next) = scanner.next(current.index + 1)? else {
            break;
        };
        if next.eggs != current.eggs + 1 {
            return Err(ReportError::structural(format!(
                "decision block for e = {} (line {}) follows e = {}; expected e = {}",
                next.eggs,
                next.index + 1,
                current.eggs,
                current.eggs + 1
            )));
        }
        current = next;
    }

    debug!(blocks = out.len(), "decision blocks parsed");
    Ok(out)
}

fn parse_block(
    lines: &[String],
    anchor: &Anchor,
    layout: &ReportLayout,
) -> ReportResult<DecisionRecord> {
    let [drops_label, values_label, means_label] = layout.decision_labels;
    let sub = |offset: usize, label: &str| -> ReportResult<Vec<f64>> {
        let index = anchor.index + offset;
        let line = lines.get(index).ok_or_else(|| {
            ReportError::structural(format!(
                "decision block for e = {} ends before its `{}` line",
                anchor.eggs, label
            ))
        })?;
        parse_labelled(line, index, label)
    };

    let drops = sub(1, drops_label)?;
    let values = sub(2, values_label)?;
    let means = sub(3, means_label)?;

    if drops.len() != values.len() || drops.len() != means.len() {
        return Err(ReportError::structural(format!(
            "decision block for e = {} (line {}) has {} drops, {} values, {} means",
            anchor.eggs,
            anchor.index + 1,
            drops.len(),
            values.len(),
            means.len()
        )));
    }

    Ok(DecisionRecord {
        eggs: anchor.eggs,
        lb: anchor.lb,
        ub: anchor.ub,
        drops,
        values,
        means,
    })
}
