// src/report/row.rs

use crate::error::{ReportError, ReportResult};
use crate::model::TableRow;

/// Parse `<prefix><int>: <float> <float> ...`.
///
/// `Ok(None)` means the line belongs to something else (it does not start with
/// `prefix`). A line that does start with `prefix` but is broken is an error:
/// bad numbers must never be mistaken for the end of a table.
/// `index` is the 0-based position of `line` in the report, used for error context.
pub fn parse_row(line: &str, index: usize, prefix: &str) -> ReportResult<Option<TableRow>> {
    let Some(rest) = line.strip_prefix(prefix) else {
        return Ok(None);
    };
    let Some(isep) = rest.find(':') else {
        return Err(ReportError::format(index, prefix, line, "missing `:`"));
    };

    // the solver right-aligns keys, e.g. `floors   7:`
    let key_str = rest[..isep].trim();
    let key = key_str.parse::<u32>().map_err(|_| {
        ReportError::format(
            index,
            prefix,
            line,
            format!("row key `{}` is not an integer", key_str),
        )
    })?;

    let values = parse_floats(&rest[isep + 1..], index, prefix, line)?;
    Ok(Some(TableRow { key, values }))
}

/// Parse `<label>: <float> <float> ...` and keep only the numbers.
pub fn parse_labelled(line: &str, index: usize, label: &str) -> ReportResult<Vec<f64>> {
    let rest = line.strip_prefix(label).ok_or_else(|| {
        ReportError::format(index, label, line, format!("expected a `{}:` line", label))
    })?;
    let rest = rest.trim_start().strip_prefix(':').ok_or_else(|| {
        ReportError::format(index, label, line, "missing `:` after label")
    })?;
    parse_floats(rest, index, label, line)
}

fn parse_floats(text: &str, index: usize, prefix: &str, line: &str) -> ReportResult<Vec<f64>> {
    text.split_whitespace()
        .map(|tok| {
            tok.parse::<f64>().map_err(|_| {
                ReportError::format(index, prefix, line, format!("`{}` is not a number", tok))
            })
        })
        .collect()
}

/// Write a row back in the report's own format.
pub fn render_row(row: &TableRow, prefix: &str) -> String {
    let mut out = format!("{}{}:", prefix, row.key);
    for v in &row.values {
        out.push(' ');
        out.push_str(&v.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_padded_key_and_values() {
        let row = parse_row("floors   7:   3   2.5   1 ", 4, "floors")
            .unwrap()
            .unwrap();
        assert_eq!(row.key, 7);
        assert_eq!(row.values, vec![3.0, 2.5, 1.0]);
    }

    #[test]
    fn other_prefix_is_not_a_row() {
        assert!(parse_row("--- average drops", 0, "floors").unwrap().is_none());
        assert!(parse_row("", 0, "floor").unwrap().is_none());
    }

    #[test]
    fn non_numeric_token_is_format_error() {
        let err = parse_row("floors1: 0 x 2", 9, "floors").unwrap_err();
        match err {
            ReportError::Format { line, prefix, .. } => {
                assert_eq!(line, 10);
                assert_eq!(prefix, "floors");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_colon_and_bad_key_are_errors() {
        assert!(matches!(
            parse_row("floors1 0 1", 0, "floors"),
            Err(ReportError::Format { .. })
        ));
        // `floor` rows must not swallow a `floors` line
        assert!(matches!(
            parse_row("floors 1: 0 1", 0, "floor"),
            Err(ReportError::Format { .. })
        ));
    }

    #[test]
    fn labelled_line_drops_label() {
        assert_eq!(
            parse_labelled("values:  0.3 0.4", 0, "values").unwrap(),
            vec![0.3, 0.4]
        );
        assert_eq!(parse_labelled("means:", 0, "means").unwrap(), Vec::<f64>::new());
        assert!(parse_labelled("drops: 1 2", 0, "means").is_err());
    }

    #[test]
    fn rendered_row_parses_back() {
        let row = TableRow {
            key: 12,
            values: vec![0.0, 0.125, 3.0, 2.718281828],
        };
        let line = render_row(&row, "floors");
        assert_eq!(parse_row(&line, 0, "floors").unwrap(), Some(row));
    }
}
