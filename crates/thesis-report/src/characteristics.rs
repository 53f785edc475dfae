//! Sample characteristics and correlation matrix tables

use crate::builder::ReportTables;
use crate::format::{format_fixed, Cell};
use crate::table::Table;
use crate::{Error, Result};
use thesis_core::numeric::{pairwise_complete, pearson};
use thesis_core::round4;
use thesis_data::Dataset;
use thesis_engine::Descriptives;

/// Table 1: Mean (SD) per continuous variable, n (%) per category
pub fn sample_characteristics(descriptives: &Descriptives) -> ReportTables {
    let mut table = Table::new("Sample Characteristics", vec!["Characteristic", "Total"]);
    for s in &descriptives.continuous {
        table.push_row(vec![
            Cell::text(&s.variable),
            Cell::text(format!(
                "{} ({})",
                format_fixed(s.mean, 2),
                format_fixed(s.std, 2)
            )),
        ]);
    }
    for s in &descriptives.categorical {
        table.push_row(vec![Cell::text(&s.variable), Cell::Blank]);
        for c in &s.categories {
            table.push_row(vec![
                Cell::text(format!("  {}", c.category)),
                Cell::text(format!("{} ({}%)", c.n, format_fixed(c.percentage, 1))),
            ]);
        }
    }
    ReportTables {
        tables: vec![table],
        summary: None,
        note: "Note. Continuous variables presented as Mean (SD); categorical variables as n (%)."
            .to_string(),
    }
}

/// Lower-triangle Pearson matrix over pairwise-complete rows
///
/// The diagonal is a dash, the upper triangle blank. A pair with zero
/// variance after deletion also renders as a dash.
pub fn correlation_matrix(dataset: &Dataset, variables: &[String]) -> Result<Table> {
    if variables.len() < 2 {
        return Err(Error::TooFewVariables(variables.len()));
    }
    let columns = variables
        .iter()
        .map(|v| dataset.numeric(v))
        .collect::<thesis_data::Result<Vec<_>>>()?;

    let mut header = vec![String::new()];
    header.extend(variables.iter().cloned());
    let mut table = Table::new("Correlation Matrix", header);
    for (i, name) in variables.iter().enumerate() {
        let mut row = vec![Cell::text(name)];
        for j in 0..variables.len() {
            let cell = match j.cmp(&i) {
                std::cmp::Ordering::Greater => Cell::Blank,
                std::cmp::Ordering::Equal => Cell::Empty,
                std::cmp::Ordering::Less => {
                    let (x, y) = pairwise_complete(&columns[i], &columns[j]);
                    pearson(&x, &y).map_or(Cell::Empty, |r| Cell::Number(round4(r)))
                }
            };
            row.push(cell);
        }
        table.push_row(row);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use thesis_data::ColumnData;

    fn dataset() -> Dataset {
        Dataset::from_columns(
            "m",
            vec![
                ("a", ColumnData::numeric([1.0, 2.0, 3.0, 4.0, 5.0])),
                ("b", ColumnData::numeric([2.0, 4.0, 6.0, 8.0, 10.0])),
                ("c", ColumnData::numeric([5.0, 4.0, 3.0, 2.0, 1.0])),
                ("k", ColumnData::numeric([1.0, 1.0, 1.0, 1.0, 1.0])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_lower_triangle() {
        let vars: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let t = correlation_matrix(&dataset(), &vars).unwrap();
        assert_eq!(t.rows.len(), 3);
        assert_eq!(t.cell(0, "a"), Some(&Cell::Empty));
        assert_eq!(t.cell(0, "b"), Some(&Cell::Blank));
        assert_eq!(t.cell(1, "a"), Some(&Cell::Number(1.0)));
        assert_eq!(t.cell(2, "a"), Some(&Cell::Number(-1.0)));
    }

    #[test]
    fn test_constant_column_renders_dash() {
        let vars = vec!["a".to_string(), "k".to_string()];
        let t = correlation_matrix(&dataset(), &vars).unwrap();
        assert_eq!(t.cell(1, "a"), Some(&Cell::Empty));
    }

    #[test]
    fn test_matrix_needs_two_variables() {
        let vars = vec!["a".to_string()];
        assert!(matches!(
            correlation_matrix(&dataset(), &vars),
            Err(Error::TooFewVariables(1))
        ));
        let vars = vec!["a".to_string(), "missing".to_string()];
        assert!(matches!(
            correlation_matrix(&dataset(), &vars),
            Err(Error::Data(_))
        ));
    }
}
