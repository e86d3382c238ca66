// src/report/summary.rs
//
// The parts of the solver output that sit around the three main tables:
// the echoed command line, the per-budget summary blocks and the list of
// optimal executions. All of them are optional; when present they must parse.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::debug;

use super::{locate, ReportLayout};
use crate::error::{ReportError, ReportResult};
use crate::model::{BudgetSummary, ExecutionTrace, Preamble};

pub fn parse_preamble(lines: &[String], layout: &ReportLayout) -> ReportResult<Preamble> {
    let command = lines.first().cloned().unwrap_or_default();
    let used_tiebreak = command.contains(layout.tiebreak_marker);

    let required_drops = match locate(lines, layout.required_drops_anchor, 0) {
        None => None,
        Some(index) => {
            let line = &lines[index];
            let raw = line[layout.required_drops_anchor.len()..].trim();
            let n = raw.parse::<u32>().map_err(|_| {
                ReportError::format(
                    index,
                    layout.required_drops_anchor,
                    line,
                    format!("`{}` is not a drop count", raw),
                )
            })?;
            Some(n)
        }
    };

    Ok(Preamble {
        command,
        used_tiebreak,
        required_drops,
    })
}

/// Text after the `=` of a `label = value ...` line.
fn assignment<'l>(lines: &'l [String], index: usize, label: &str) -> ReportResult<&'l str> {
    let line = lines.get(index).ok_or_else(|| {
        ReportError::structural(format!("report ends before `{}` line", label))
    })?;
    let rest = line
        .strip_prefix(label)
        .and_then(|r| r.trim_start().strip_prefix('='))
        .ok_or_else(|| ReportError::format(index, label, line, format!("expected `{} = ...`", label)))?;
    Ok(rest.trim())
}

fn first_token<T: std::str::FromStr>(
    text: &str,
    lines: &[String],
    index: usize,
    label: &str,
) -> ReportResult<T> {
    let tok = text.split_whitespace().next().unwrap_or("");
    tok.parse::<T>().map_err(|_| {
        ReportError::format(index, label, &lines[index], format!("`{}` is not a number", tok))
    })
}

/// Every `--- floors F = <F>, eggs E = <e> ---` block, keyed by egg budget.
pub fn parse_budget_summaries(
    lines: &[String],
    layout: &ReportLayout,
) -> ReportResult<BTreeMap<u32, BudgetSummary>> {
    let re = Regex::new(r"^--- floors F = (\d+), eggs E = (\d+) ---")
        .map_err(|e| ReportError::structural(e.to_string()))?;

    let mut out = BTreeMap::new();
    let mut from = 0;
    while let Some(index) = locate(lines, layout.budget_anchor, from) {
        from = index + 1;
        let line = &lines[index];
        let caps = re.captures(line).ok_or_else(|| {
            ReportError::format(index, layout.budget_anchor, line, "expected `F = <n>, eggs E = <n>`")
        })?;
        let floors: u32 = first_token(&caps[1], lines, index, layout.budget_anchor)?;
        let eggs: u32 = first_token(&caps[2], lines, index, layout.budget_anchor)?;

        let max_label = "min max drops";
        let max_drops: u32 =
            first_token(assignment(lines, index + 1, max_label)?, lines, index + 1, max_label)?;
        let mean_label = "mean drops";
        let mean_drops: f64 =
            first_token(assignment(lines, index + 2, mean_label)?, lines, index + 2, mean_label)?;
        let histo_label = "drops histg.";
        let histogram = assignment(lines, index + 3, histo_label)?
            .split_whitespace()
            .map(|tok| {
                tok.parse::<u64>().map_err(|_| {
                    ReportError::format(
                        index + 3,
                        histo_label,
                        &lines[index + 3],
                        format!("`{}` is not a count", tok),
                    )
                })
            })
            .collect::<ReportResult<Vec<u64>>>()?;

        if out
            .insert(
                eggs,
                BudgetSummary {
                    floors,
                    eggs,
                    max_drops,
                    mean_drops,
                    histogram,
                },
            )
            .is_some()
        {
            return Err(ReportError::structural(format!(
                "summary block for eggs E = {} repeated at line {}",
                eggs,
                index + 1
            )));
        }
    }

    debug!(blocks = out.len(), "budget summaries parsed");
    Ok(out)
}

/// The `L = x: f1 f2 ... (n steps)` rows after the executions anchor.
pub fn parse_executions(
    lines: &[String],
    layout: &ReportLayout,
) -> ReportResult<Vec<ExecutionTrace>> {
    let Some(anchor) = locate(lines, layout.executions_anchor, 0) else {
        return Ok(Vec::new());
    };
    let re = Regex::new(r"^L =\s*(\d+):((?:\s+\d+)*)\s*\((\d+) steps\)\s*$")
        .map_err(|e| ReportError::structural(e.to_string()))?;

    let prefix = layout.execution_prefix;
    let mut out = Vec::new();
    for (index, line) in lines.iter().enumerate().skip(anchor + 1) {
        if !line.starts_with(prefix) {
            break;
        }
        let caps = re
            .captures(line)
            .ok_or_else(|| ReportError::format(index, prefix, line, "expected `L = x: floors (n steps)`"))?;
        let bad = |what: &str| ReportError::format(index, prefix, line, what.to_string());
        let limit = caps[1].parse::<u32>().map_err(|_| bad("limit out of range"))?;
        let floors = caps[2]
            .split_whitespace()
            .map(|t| t.parse::<u32>().map_err(|_| bad("floor out of range")))
            .collect::<ReportResult<Vec<u32>>>()?;
        let steps = caps[3].parse::<u32>().map_err(|_| bad("step count out of range"))?;
        if floors.len() != steps as usize {
            return Err(bad(&format!(
                "{} floors listed for {} steps",
                floors.len(),
                steps
            )));
        }
        out.push(ExecutionTrace {
            limit,
            floors,
            steps,
        });
    }

    debug!(traces = out.len(), "executions parsed");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn preamble_reads_marker_and_limit() {
        let l = lines("./dpegg 10 3 --tiebreak \n--- required min. number of drops = 4\n");
        let p = parse_preamble(&l, &ReportLayout::default()).unwrap();
        assert!(p.used_tiebreak);
        assert_eq!(p.required_drops, Some(4));
        assert_eq!(p.command, "./dpegg 10 3 --tiebreak ");

        let p = parse_preamble(&lines("./dpegg 10 3"), &ReportLayout::default()).unwrap();
        assert!(!p.used_tiebreak);
        assert_eq!(p.required_drops, None);
    }

    #[test]
    fn budget_blocks() {
        let l = lines(
            "--- floors F = 3, eggs E = 1 ---\n\
             min max drops = 3 (optimal worst case)\n\
             mean drops    = 2.25 (uniform limit floor)\n\
             drops histg.  = 0 1 1 2 \n\
             --- decision @ state (e = 1, lb = 0, ub = 4) ---\n\
             --- floors F = 3, eggs E = 2 ---\n\
             min max drops = 2 (optimal worst case)\n\
             mean drops    = 2 (uniform limit floor)\n\
             drops histg.  = 0 0 4 \n",
        );
        let s = parse_budget_summaries(&l, &ReportLayout::default()).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s[&1].histogram, vec![0, 1, 1, 2]);
        assert_eq!(s[&1].mean_drops, 2.25);
        assert_eq!(s[&2].max_drops, 2);
        assert_eq!(s[&2].floors, 3);
    }

    #[test]
    fn broken_budget_block() {
        let l = lines("--- floors F = 3, eggs E = 1 ---\nmin max drops = lots\n");
        assert!(matches!(
            parse_budget_summaries(&l, &ReportLayout::default()),
            Err(ReportError::Format { line: 2, .. })
        ));
    }

    #[test]
    fn executions_section() {
        let l = lines(
            "--- optimal E = 2 executions for all limit levels L ---\n\
             L =   0: 2 1 (2 steps)\n\
             L =   1: 2 3 (2 steps)\n\
             L =   3: 2 3 (2 steps)\n",
        );
        let t = parse_executions(&l, &ReportLayout::default()).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t[0].floors, vec![2, 1]);
        assert_eq!(t[2].limit, 3);

        let l = lines("--- optimal E = 2 executions\nL =   0: 2 1 (3 steps)");
        assert!(parse_executions(&l, &ReportLayout::default()).is_err());
        assert!(parse_executions(&lines("x"), &ReportLayout::default())
            .unwrap()
            .is_empty());
    }
}
