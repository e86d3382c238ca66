// src/report/section.rs

use tracing::trace;

use super::locate;
use super::row::{parse_row, render_row};
use crate::error::{ReportError, ReportResult};
use crate::model::{Table, TableRow};

/// A section is an anchor line followed by zero or more rows sharing a prefix.
/// There is no end marker: the first line that is not a row ends the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionGrammar<'a> {
    pub anchor: &'a str,
    pub row_prefix: &'a str,
}

/// Why the row scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Line `index` (0-based) did not start with the row prefix.
    Mismatch { index: usize },
    EndOfInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSection {
    /// 0-based index of the anchor line, when the scan started from one.
    pub anchor: Option<usize>,
    pub table: Table,
    pub termination: Termination,
}

enum State {
    Seek { from: usize },
    Rows { at: usize },
    Done(Termination),
}

impl SectionGrammar<'_> {
    /// Find the anchor at or after `from`, then collect its rows.
    pub fn parse(&self, lines: &[String], from: usize) -> ReportResult<ParsedSection> {
        run(lines, State::Seek { from }, Some(self.anchor), self.row_prefix)
    }
}

/// Collect rows starting exactly at `start`, without looking for an anchor.
pub fn parse_section(lines: &[String], start: usize, prefix: &str) -> ReportResult<ParsedSection> {
    run(lines, State::Rows { at: start }, None, prefix)
}

fn run(
    lines: &[String],
    initial: State,
    anchor: Option<&str>,
    prefix: &str,
) -> ReportResult<ParsedSection> {
    let mut rows: Vec<TableRow> = Vec::new();
    let mut anchor_at = None;
    let mut state = initial;

    let termination = loop {
        state = match state {
            State::Seek { from } => {
                let anchor = anchor.unwrap_or_default();
                let idx = locate(lines, anchor, from).ok_or_else(|| {
                    ReportError::structural(format!("section `{}` not found", anchor))
                })?;
                anchor_at = Some(idx);
                State::Rows { at: idx + 1 }
            }
            State::Rows { at } => match lines.get(at) {
                None => State::Done(Termination::EndOfInput),
                Some(line) => match parse_row(line, at, prefix)? {
                    Some(row) => {
                        if let Some(first) = rows.first() {
                            if first.values.len() != row.values.len() {
                                return Err(ReportError::format(
                                    at,
                                    prefix,
                                    line,
                                    format!(
                                        "expected {} values, found {}",
                                        first.values.len(),
                                        row.values.len()
                                    ),
                                ));
                            }
                        }
                        rows.push(row);
                        State::Rows { at: at + 1 }
                    }
                    None => State::Done(Termination::Mismatch { index: at }),
                },
            },
            State::Done(t) => break t,
        };
    };

    trace!(prefix, rows = rows.len(), ?termination, "section parsed");
    Ok(ParsedSection {
        anchor: anchor_at,
        table: Table::new(rows),
        termination,
    })
}

/// Inverse of a section parse: anchor line followed by each row.
pub fn render_section(grammar: &SectionGrammar<'_>, table: &Table) -> Vec<String> {
    std::iter::once(grammar.anchor.to_string())
        .chain(table.rows.iter().map(|r| render_row(r, grammar.row_prefix)))
        .collect()
}
