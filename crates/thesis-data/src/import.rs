//! CSV import with per-column type inference

use crate::{ColumnData, Dataset, DatasetMetadata, Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, instrument};

/// Cell contents read as missing
pub const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

/// An imported dataset with the metadata collaborators rely on
#[derive(Debug, Clone)]
pub struct Imported {
    pub dataset: Dataset,
    pub metadata: DatasetMetadata,
}

fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell)
}

/// UTF-8 when valid, otherwise Latin-1 (every byte maps to one char)
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn infer_column(cells: Vec<Option<String>>) -> ColumnData {
    let parsed: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(s) => s.parse::<f64>().ok().map(Some),
        })
        .collect();
    match parsed {
        Some(values) => ColumnData::Numeric(values),
        None => ColumnData::Text(cells),
    }
}

/// Read CSV with a header row from any reader
#[instrument(skip(reader))]
pub fn from_reader<R: Read>(name: &str, reader: R) -> Result<Imported> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .byte_headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = decode(h);
            if h.is_empty() {
                format!("column_{}", i + 1)
            } else {
                h
            }
        })
        .collect();
    if headers.is_empty() {
        return Err(Error::InvalidInput("CSV file has no header row".to_string()));
    }

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in csv_reader.byte_records() {
        let record = record?;
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            let value = decode(field);
            column.push(if is_missing(&value) { None } else { Some(value) });
        }
    }

    let columns: Vec<(String, ColumnData)> = headers
        .into_iter()
        .zip(cells)
        .map(|(h, c)| (h, infer_column(c)))
        .collect();
    let dataset = Dataset::from_columns(name, columns)?;
    let metadata = dataset.metadata()?;
    debug!(rows = metadata.rows, columns = metadata.columns, "csv imported");
    Ok(Imported { dataset, metadata })
}

/// Read a CSV file; the file name becomes the dataset name
pub fn from_path(path: impl AsRef<Path>) -> Result<Imported> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if extension != "csv" {
        return Err(Error::InvalidInput(format!(
            "Unsupported file format: {}",
            extension
        )));
    }
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("dataset")
        .to_string();
    let file = File::open(path)?;
    from_reader(&name, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColumnKind;

    const CSV: &str = "id,group,score,notes\n\
                       1,control,3.5,ok\n\
                       2,treatment,NA,\n\
                       3,control,4.0,late\n\
                       4,treatment,2.5,ok\n";

    #[test]
    fn test_infers_numeric_and_text() {
        let imported = from_reader("survey.csv", CSV.as_bytes()).unwrap();
        let ds = &imported.dataset;
        assert_eq!(ds.height(), 4);
        assert!(ds.is_numeric("score").unwrap());
        assert!(!ds.is_numeric("group").unwrap());
        assert_eq!(ds.numeric("score").unwrap()[1], None);
        assert_eq!(ds.labels("notes").unwrap()[1], None);
    }

    #[test]
    fn test_metadata_reports_missing() {
        let imported = from_reader("survey.csv", CSV.as_bytes()).unwrap();
        let meta = &imported.metadata;
        assert_eq!(meta.rows, 4);
        assert_eq!(meta.column_names, vec!["id", "group", "score", "notes"]);
        let score = &meta.column_types[2];
        assert_eq!(score.missing_count, 1);
        assert_eq!(score.missing_pct, 25.0);
        assert_eq!(meta.column_types[1].kind, ColumnKind::Binary);
    }

    #[test]
    fn test_latin1_fallback() {
        let bytes: &[u8] = b"city\nM\xfcnchen\n";
        let imported = from_reader("cities.csv", bytes).unwrap();
        assert_eq!(
            imported.dataset.labels("city").unwrap()[0].as_deref(),
            Some("M\u{fc}nchen")
        );
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let bad = "a,b\n1,2\n3\n";
        assert!(matches!(from_reader("bad.csv", bad.as_bytes()), Err(Error::Csv(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(from_path("data.sav"), Err(Error::InvalidInput(_))));
    }
}
