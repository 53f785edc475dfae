//! DataFrame-backed datasets and column-level metadata

use crate::{Error, Result};
use ordered_float::OrderedFloat;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Columns with more distinct numeric values than this are continuous
pub const CONTINUOUS_UNIQUE_THRESHOLD: usize = 10;

/// Inferred measurement kind of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    NumericContinuous,
    NumericDiscrete,
    Categorical,
    Binary,
}

impl ColumnKind {
    /// Infer the kind from the storage type and the number of distinct
    /// non-missing values
    pub fn infer(numeric: bool, distinct: usize) -> Self {
        if distinct == 2 {
            Self::Binary
        } else if numeric && distinct > CONTINUOUS_UNIQUE_THRESHOLD {
            Self::NumericContinuous
        } else if numeric {
            Self::NumericDiscrete
        } else {
            Self::Categorical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NumericContinuous => "numeric_continuous",
            Self::NumericDiscrete => "numeric_discrete",
            Self::Categorical => "categorical",
            Self::Binary => "binary",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-column metadata supplied alongside an imported dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub kind: ColumnKind,
    pub dtype: String,
    pub missing_count: usize,
    /// Percentage of rows missing, rounded to 2 decimals
    pub missing_pct: f64,
    pub unique_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub column_types: Vec<ColumnMetadata>,
}

/// Owned column values used to build a dataset without touching polars
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn numeric<I: IntoIterator<Item = f64>>(values: I) -> Self {
        Self::Numeric(values.into_iter().map(Some).collect())
    }

    pub fn text<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Text(values.into_iter().map(|s| Some(s.into())).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert into a polars column
    pub fn into_column(self, name: &str) -> Column {
        match self {
            Self::Numeric(v) => Series::new(name.into(), v).into(),
            Self::Text(v) => Series::new(name.into(), v).into(),
        }
    }
}

pub(crate) fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::Int16
            | DataType::Int8
            | DataType::UInt64
            | DataType::UInt32
            | DataType::UInt16
            | DataType::UInt8
            | DataType::Boolean
    )
}

/// Render a number the way it appears in a data file (`2` rather than `2.0`)
pub fn format_number(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{}", x)
    }
}

/// A named, immutable snapshot of tabular data
///
/// Wraps a polars `DataFrame`, which guarantees every column has the same
/// row count.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    frame: DataFrame,
}

impl Dataset {
    pub fn new(name: impl Into<String>, frame: DataFrame) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }

    /// Build a dataset from named columns of equal length
    pub fn from_columns<S: AsRef<str>>(
        name: impl Into<String>,
        columns: Vec<(S, ColumnData)>,
    ) -> Result<Self> {
        let cols: Vec<Column> = columns
            .into_iter()
            .map(|(n, data)| data.into_column(n.as_ref()))
            .collect();
        Ok(Self::new(name, DataFrame::new(cols)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    fn column(&self, name: &str) -> Result<&Column> {
        self.frame
            .column(name)
            .map_err(|_| Error::InvalidColumn(name.to_string()))
    }

    /// Whether the column holds numbers
    pub fn is_numeric(&self, name: &str) -> Result<bool> {
        Ok(is_numeric_dtype(self.column(name)?.dtype()))
    }

    /// Numeric values with missing entries (null, NaN, ±inf) as `None`
    pub fn numeric(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self.column(name)?;
        if !is_numeric_dtype(column.dtype()) {
            return Err(Error::TypeMismatch {
                column: name.to_string(),
                expected: "numeric".to_string(),
                got: format!("{:?}", column.dtype()),
            });
        }
        let float_column = column.cast(&DataType::Float64)?;
        Ok(float_column
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect())
    }

    /// Non-missing numeric values of a column
    pub fn numeric_complete(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self.numeric(name)?.into_iter().flatten().collect())
    }

    /// Values as text labels; numbers render without a trailing `.0`
    pub fn labels(&self, name: &str) -> Result<Vec<Option<String>>> {
        let column = self.column(name)?;
        if is_numeric_dtype(column.dtype()) {
            return Ok(self
                .numeric(name)?
                .into_iter()
                .map(|v| v.map(format_number))
                .collect());
        }
        let text_column = column.cast(&DataType::String)?;
        Ok(text_column
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }

    /// Column values as owned data
    pub fn column_data(&self, name: &str) -> Result<ColumnData> {
        if self.is_numeric(name)? {
            Ok(ColumnData::Numeric(self.numeric(name)?))
        } else {
            Ok(ColumnData::Text(self.labels(name)?))
        }
    }

    /// Number of missing entries
    pub fn missing_count(&self, name: &str) -> Result<usize> {
        Ok(self.labels(name)?.iter().filter(|v| v.is_none()).count())
    }

    /// Number of distinct non-missing values
    pub fn distinct_count(&self, name: &str) -> Result<usize> {
        if self.is_numeric(name)? {
            let set: BTreeSet<OrderedFloat<f64>> = self
                .numeric(name)?
                .into_iter()
                .flatten()
                .map(OrderedFloat)
                .collect();
            Ok(set.len())
        } else {
            let set: BTreeSet<String> = self.labels(name)?.into_iter().flatten().collect();
            Ok(set.len())
        }
    }

    pub fn column_kind(&self, name: &str) -> Result<ColumnKind> {
        Ok(ColumnKind::infer(
            self.is_numeric(name)?,
            self.distinct_count(name)?,
        ))
    }

    pub fn column_metadata(&self, name: &str) -> Result<ColumnMetadata> {
        let rows = self.height();
        let missing_count = self.missing_count(name)?;
        let missing_pct = if rows > 0 {
            thesis_core::round_to(missing_count as f64 / rows as f64 * 100.0, 2)
        } else {
            0.0
        };
        Ok(ColumnMetadata {
            name: name.to_string(),
            kind: self.column_kind(name)?,
            dtype: format!("{:?}", self.column(name)?.dtype()),
            missing_count,
            missing_pct,
            unique_count: self.distinct_count(name)?,
        })
    }

    pub fn metadata(&self) -> Result<DatasetMetadata> {
        let column_names = self.column_names();
        let column_types = column_names
            .iter()
            .map(|n| self.column_metadata(n))
            .collect::<Result<Vec<_>>>()?;
        Ok(DatasetMetadata {
            rows: self.height(),
            columns: self.width(),
            column_names,
            column_types,
        })
    }

    /// Rows of the selected columns rendered as labels, one `Vec` per row
    pub(crate) fn row_keys(&self, columns: &[String]) -> Result<Vec<Vec<Option<String>>>> {
        let cols = columns
            .iter()
            .map(|c| self.labels(c))
            .collect::<Result<Vec<_>>>()?;
        Ok((0..self.height())
            .map(|i| cols.iter().map(|c| c[i].clone()).collect())
            .collect())
    }

    /// Keep only rows where `mask` is true
    pub fn filter_rows(&self, mask: &[bool]) -> Result<DataFrame> {
        if mask.len() != self.height() {
            return Err(Error::InvalidInput(format!(
                "Row mask has {} entries for {} rows",
                mask.len(),
                self.height()
            )));
        }
        let mask = BooleanChunked::from_slice("mask".into(), mask);
        Ok(self.frame.filter(&mask)?)
    }

    /// Copy of the frame with `data` added, or replacing an existing column
    pub fn with_column(&self, name: &str, data: ColumnData) -> Result<DataFrame> {
        if data.len() != self.height() {
            return Err(Error::InvalidInput(format!(
                "Column '{}' has {} rows, dataset has {}",
                name,
                data.len(),
                self.height()
            )));
        }
        let mut frame = self.frame.clone();
        frame.with_column(data.into_column(name))?;
        Ok(frame)
    }
}
