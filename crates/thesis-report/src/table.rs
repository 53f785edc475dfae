//! Rectangular tables and their markdown rendering

use crate::format::Cell;
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S: Into<String>>(title: impl Into<String>, columns: Vec<S>) -> Self {
        Self {
            title: title.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; short rows are padded with dashes, long rows truncated
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn with_row(mut self, row: Vec<Cell>) -> Self {
        self.push_row(row);
        self
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let j = self.column_index(column)?;
        self.rows.get(row)?.get(j)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Bold title line, header, separator and one line per row
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        if !self.title.is_empty() {
            let _ = writeln!(out, "**{}**", self.title);
            out.push('\n');
        }
        let _ = writeln!(out, "| {} |", self.columns.join(" | "));
        let _ = writeln!(out, "|{}|", vec!["---"; self.columns.len()].join("|"));
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            let _ = writeln!(out, "| {} |", cells.join(" | "));
        }
        out.truncate(out.trim_end().len());
        out
    }
}

/// Parsed body of a rendered markdown table
///
/// Each body row becomes one vector; a cell is `Some` when its text parses
/// as a number. Title, header and separator lines are skipped.
pub fn numeric_cells(markdown: &str) -> Vec<Vec<Option<f64>>> {
    markdown
        .lines()
        .filter(|line| line.starts_with('|'))
        .skip(2)
        .map(|line| {
            line.trim()
                .trim_start_matches('|')
                .trim_end_matches('|')
                .split('|')
                .map(|cell| cell.trim().parse::<f64>().ok())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new("Results", vec!["Source", "df", "F", "p"])
            .with_row(vec![
                Cell::text("Between Groups"),
                Cell::Count(2),
                Cell::Number(4.1234),
                Cell::PValue(0.0412),
            ])
            .with_row(vec![Cell::text("Within Groups"), Cell::Count(27)])
    }

    #[test]
    fn test_markdown_layout() {
        let md = sample().to_markdown();
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "**Results**");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "| Source | df | F | p |");
        assert_eq!(lines[3], "|---|---|---|---|");
        assert_eq!(lines[4], "| Between Groups | 2 | 4.1234 | .041 |");
        assert_eq!(lines[5], "| Within Groups | 27 | — | — |");
    }

    #[test]
    fn test_numeric_cells_reparse() {
        let cells = numeric_cells(&sample().to_markdown());
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0], vec![None, Some(2.0), Some(4.1234), Some(0.041)]);
        assert_eq!(cells[1][2], None);
    }

    #[test]
    fn test_cell_lookup() {
        let t = sample();
        assert_eq!(t.cell(0, "F"), Some(&Cell::Number(4.1234)));
        assert_eq!(t.cell(1, "F"), Some(&Cell::Empty));
        assert_eq!(t.cell(0, "η²"), None);
    }
}
