//! Cleaning and recoding transformations
//!
//! Every operation reads a [`Dataset`] and returns a new frame plus a typed
//! report; the input is never modified. [`Transformation`] wraps the
//! operations in a serde-friendly enum for dispatch through a store.

use crate::dataset::format_number;
use crate::reliability::cronbach_alpha;
use crate::{ColumnData, Dataset, Error, Result};
use ordered_float::OrderedFloat;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use thesis_core::numeric::{mean, median, min_max, quantile_sorted, skewness, sorted, std_dev};
use thesis_core::round4;
use tracing::{debug, instrument};

/// Default age bands (lower bound inclusive)
pub const AGE_BINS: [f64; 8] = [0.0, 18.0, 25.0, 35.0, 45.0, 55.0, 65.0, 100.0];
pub const AGE_LABELS: [&str; 7] = [
    "Under 18", "18-24", "25-34", "35-44", "45-54", "55-64", "65+",
];
pub const QUARTILE_LABELS: [&str; 4] = ["Q1 (Low)", "Q2", "Q3", "Q4 (High)"];

/// A new frame with a report describing what changed
#[derive(Debug, Clone)]
pub struct Transformed<R> {
    pub frame: DataFrame,
    pub report: R,
}

impl<R: Serialize> Transformed<R> {
    /// Erase the report type for the audit trail
    pub fn into_json(self) -> Result<Transformed<Value>> {
        Ok(Transformed {
            frame: self.frame,
            report: serde_json::to_value(self.report)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keep {
    #[default]
    First,
    Last,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMethod {
    #[default]
    Drop,
    Mean,
    Median,
    Mode,
    Value,
    Ffill,
    Bfill,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryMethod {
    #[default]
    Quartiles,
    Quantiles,
    EqualWidth,
    Custom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardizeMethod {
    #[default]
    Zscore,
    Minmax,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMethod {
    #[default]
    Mean,
    Sum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicatesReport {
    pub rows_removed: usize,
    pub original_count: usize,
    pub new_count: usize,
    pub subset: Option<Vec<String>>,
    pub keep: Keep,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingReport {
    pub column: String,
    pub method: MissingMethod,
    pub fill_value: Option<String>,
    pub missing_before: usize,
    pub missing_after: usize,
    pub imputed_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub source_column: String,
    pub new_column: String,
    pub method: String,
    pub labels: Vec<String>,
    pub distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseReport {
    pub source_column: String,
    pub new_column: String,
    pub min_value: f64,
    pub max_value: f64,
    pub original_range: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleScoreReport {
    pub items: Vec<String>,
    pub items_used: Vec<String>,
    pub reverse_items: Vec<String>,
    pub new_column: String,
    pub method: ScoreMethod,
    pub cronbachs_alpha: Option<f64>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizeReport {
    pub columns: Vec<String>,
    pub new_columns: Vec<String>,
    pub method: StandardizeMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecodeReport {
    pub column: String,
    pub new_column: String,
    pub mapping: BTreeMap<String, String>,
    pub values_changed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinsorizeReport {
    pub column: String,
    pub lower_percentile: f64,
    pub upper_percentile: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub original_min: f64,
    pub original_max: f64,
    pub values_clipped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogReport {
    pub column: String,
    pub new_column: String,
    pub add_constant: f64,
    pub original_skewness: Option<f64>,
    pub transformed_skewness: Option<f64>,
}

fn require_numeric(ds: &Dataset, column: &str) -> Result<Vec<Option<f64>>> {
    ds.numeric(column)
}

fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

fn no_data(column: &str) -> Error {
    Error::InvalidInput(format!("Column '{}' has no non-missing values", column))
}

/// Drop repeated rows, comparing `subset` columns (all columns by default)
#[instrument(skip(ds))]
pub fn remove_duplicates(
    ds: &Dataset,
    subset: Option<&[String]>,
    keep: Keep,
) -> Result<Transformed<DuplicatesReport>> {
    let columns = match subset {
        Some(cols) if !cols.is_empty() => cols.to_vec(),
        _ => ds.column_names(),
    };
    let keys = ds.row_keys(&columns)?;
    let mut seen = HashSet::new();
    let mut mask = vec![false; keys.len()];
    let order: Box<dyn Iterator<Item = usize>> = match keep {
        Keep::First => Box::new(0..keys.len()),
        Keep::Last => Box::new((0..keys.len()).rev()),
    };
    for i in order {
        mask[i] = seen.insert(&keys[i]);
    }
    let frame = ds.filter_rows(&mask)?;
    let original_count = ds.height();
    let new_count = frame.height();
    debug!(removed = original_count - new_count, "duplicates removed");
    Ok(Transformed {
        frame,
        report: DuplicatesReport {
            rows_removed: original_count - new_count,
            original_count,
            new_count,
            subset: subset.map(<[String]>::to_vec),
            keep,
        },
    })
}

fn fill_forward<T: Clone>(values: &mut [Option<T>]) {
    let mut last: Option<T> = None;
    for v in values.iter_mut() {
        match v {
            Some(x) => last = Some(x.clone()),
            None => *v = last.clone(),
        }
    }
}

fn fill_backward<T: Clone>(values: &mut [Option<T>]) {
    values.reverse();
    fill_forward(values);
    values.reverse();
}

fn fill_with<T: Clone>(values: &mut [Option<T>], fill: T) {
    for v in values.iter_mut().filter(|v| v.is_none()) {
        *v = Some(fill.clone());
    }
}

/// Most frequent value; ties resolve to the smallest
fn mode_of<T: Ord + Clone>(values: &[Option<T>]) -> Option<T> {
    let mut counts: BTreeMap<&T, usize> = BTreeMap::new();
    for v in values.iter().flatten() {
        *counts.entry(v).or_insert(0) += 1;
    }
    let best = counts.values().copied().max()?;
    counts
        .into_iter()
        .find(|(_, c)| *c == best)
        .map(|(v, _)| v.clone())
}

fn missing_in(data: &ColumnData) -> usize {
    match data {
        ColumnData::Numeric(v) => v.iter().filter(|x| x.is_none()).count(),
        ColumnData::Text(v) => v.iter().filter(|x| x.is_none()).count(),
    }
}

/// Drop or impute missing values in one column
#[instrument(skip(ds))]
pub fn handle_missing(
    ds: &Dataset,
    column: &str,
    method: MissingMethod,
    fill_value: Option<&str>,
) -> Result<Transformed<MissingReport>> {
    let mut data = ds.column_data(column)?;
    let missing_before = missing_in(&data);

    let frame = if method == MissingMethod::Drop {
        let mask: Vec<bool> = ds.labels(column)?.iter().map(Option::is_some).collect();
        ds.filter_rows(&mask)?
    } else {
        match (&mut data, method) {
            (ColumnData::Numeric(v), MissingMethod::Mean) => {
                let m = mean(&present(v)).map_err(|_| no_data(column))?;
                fill_with(v, m);
            }
            (ColumnData::Numeric(v), MissingMethod::Median) => {
                let m = median(&present(v)).map_err(|_| no_data(column))?;
                fill_with(v, m);
            }
            (ColumnData::Text(_), MissingMethod::Mean | MissingMethod::Median) => {
                return Err(Error::TypeMismatch {
                    column: column.to_string(),
                    expected: "numeric".to_string(),
                    got: "text".to_string(),
                });
            }
            (ColumnData::Numeric(v), MissingMethod::Mode) => {
                let keyed: Vec<Option<OrderedFloat<f64>>> =
                    v.iter().map(|x| x.map(OrderedFloat)).collect();
                if let Some(m) = mode_of(&keyed) {
                    fill_with(v, m.0);
                }
            }
            (ColumnData::Text(v), MissingMethod::Mode) => {
                if let Some(m) = mode_of(v) {
                    fill_with(v, m);
                }
            }
            (ColumnData::Numeric(v), MissingMethod::Value) => {
                let raw = fill_value.ok_or_else(|| {
                    Error::InvalidParameter("fill_value is required for method 'value'".into())
                })?;
                let parsed = raw.trim().parse::<f64>().map_err(|_| {
                    Error::InvalidParameter(format!(
                        "fill_value '{}' is not numeric but column '{}' is",
                        raw, column
                    ))
                })?;
                fill_with(v, parsed);
            }
            (ColumnData::Text(v), MissingMethod::Value) => {
                let raw = fill_value.ok_or_else(|| {
                    Error::InvalidParameter("fill_value is required for method 'value'".into())
                })?;
                fill_with(v, raw.to_string());
            }
            (ColumnData::Numeric(v), MissingMethod::Ffill) => fill_forward(v),
            (ColumnData::Text(v), MissingMethod::Ffill) => fill_forward(v),
            (ColumnData::Numeric(v), MissingMethod::Bfill) => fill_backward(v),
            (ColumnData::Text(v), MissingMethod::Bfill) => fill_backward(v),
            (_, MissingMethod::Drop) => {}
        }
        ds.with_column(column, data.clone())?
    };

    let missing_after = if method == MissingMethod::Drop {
        0
    } else {
        missing_in(&data)
    };
    Ok(Transformed {
        frame,
        report: MissingReport {
            column: column.to_string(),
            method,
            fill_value: fill_value.map(str::to_string),
            missing_before,
            missing_after,
            imputed_count: missing_before - missing_after,
        },
    })
}

/// Index of the interval containing `x`
///
/// Intervals are `(e[i], e[i+1]]` when `right`, else `[e[i], e[i+1])`.
/// `include_lowest` closes the first interval on the left.
fn bin_index(x: f64, edges: &[f64], right: bool, include_lowest: bool) -> Option<usize> {
    for i in 0..edges.len().saturating_sub(1) {
        let (lo, hi) = (edges[i], edges[i + 1]);
        let inside = if right {
            (x > lo || (include_lowest && i == 0 && x == lo)) && x <= hi
        } else {
            x >= lo && x < hi
        };
        if inside {
            return Some(i);
        }
    }
    None
}

fn interval_label(lo: f64, hi: f64) -> String {
    format!("({}, {}]", format_number(lo), format_number(hi))
}

fn strictly_increasing(edges: &[f64]) -> bool {
    edges.windows(2).all(|w| w[0] < w[1])
}

/// Quantile edges for `q` equal-frequency groups
fn quantile_edges(values: &[f64], q: usize) -> Vec<f64> {
    let s = sorted(values);
    (0..=q)
        .map(|i| quantile_sorted(&s, i as f64 / q as f64))
        .collect()
}

/// `n` equal-width edges over the data range, widened slightly on the left
fn equal_width_edges(values: &[f64], n: usize) -> Result<Vec<f64>> {
    let (mut lo, mut hi) = min_max(values)?;
    if lo == hi {
        lo -= 0.001 * lo.abs().max(1.0);
        hi += 0.001 * hi.abs().max(1.0);
        let step = (hi - lo) / n as f64;
        return Ok((0..=n).map(|i| lo + step * i as f64).collect());
    }
    let step = (hi - lo) / n as f64;
    let mut edges: Vec<f64> = (0..=n).map(|i| lo + step * i as f64).collect();
    edges[0] -= (hi - lo) * 0.001;
    edges[n] = hi;
    Ok(edges)
}

#[allow(clippy::too_many_arguments)]
fn categorize(
    ds: &Dataset,
    column: &str,
    new_column: &str,
    edges: &[f64],
    labels: &[String],
    right: bool,
    include_lowest: bool,
    method: &str,
) -> Result<Transformed<CategoryReport>> {
    if !strictly_increasing(edges) {
        return Err(Error::InvalidInput(format!(
            "Bin edges for '{}' must be unique and increasing: {:?}",
            column, edges
        )));
    }
    if labels.len() + 1 != edges.len() {
        return Err(Error::InvalidParameter(format!(
            "Bin labels must be one fewer than the number of bin edges ({} labels, {} edges)",
            labels.len(),
            edges.len()
        )));
    }
    let values = require_numeric(ds, column)?;
    let binned: Vec<Option<String>> = values
        .iter()
        .map(|v| {
            v.and_then(|x| bin_index(x, edges, right, include_lowest))
                .map(|i| labels[i].clone())
        })
        .collect();
    let mut distribution = BTreeMap::new();
    for label in binned.iter().flatten() {
        *distribution.entry(label.clone()).or_insert(0) += 1;
    }
    let frame = ds.with_column(new_column, ColumnData::Text(binned))?;
    Ok(Transformed {
        frame,
        report: CategoryReport {
            source_column: column.to_string(),
            new_column: new_column.to_string(),
            method: method.to_string(),
            labels: labels.to_vec(),
            distribution,
        },
    })
}

/// Bin a numeric column into labelled categories
///
/// Quantile methods close every interval on the right and include the
/// minimum in the first one; equal-width bins span the data range.
#[instrument(skip(ds, custom_bins, custom_labels))]
pub fn create_categories(
    ds: &Dataset,
    column: &str,
    new_column: Option<&str>,
    method: CategoryMethod,
    n_categories: usize,
    custom_bins: Option<&[f64]>,
    custom_labels: Option<&[String]>,
) -> Result<Transformed<CategoryReport>> {
    let new_column = new_column
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}_cat", column));
    let values = present(&require_numeric(ds, column)?);
    if values.is_empty() {
        return Err(no_data(column));
    }
    if matches!(method, CategoryMethod::Quantiles | CategoryMethod::EqualWidth) && n_categories < 2
    {
        return Err(Error::InvalidParameter(format!(
            "n_categories must be at least 2, got {}",
            n_categories
        )));
    }
    match method {
        CategoryMethod::Quartiles => {
            let labels: Vec<String> = QUARTILE_LABELS.iter().map(|s| s.to_string()).collect();
            let edges = quantile_edges(&values, 4);
            categorize(ds, column, &new_column, &edges, &labels, true, true, "quartiles")
        }
        CategoryMethod::Quantiles => {
            let labels: Vec<String> = (1..=n_categories).map(|i| format!("G{}", i)).collect();
            let edges = quantile_edges(&values, n_categories);
            categorize(ds, column, &new_column, &edges, &labels, true, true, "quantiles")
        }
        CategoryMethod::EqualWidth => {
            let labels: Vec<String> = (1..=n_categories).map(|i| format!("Bin{}", i)).collect();
            let edges = equal_width_edges(&values, n_categories)?;
            categorize(ds, column, &new_column, &edges, &labels, true, false, "equal_width")
        }
        CategoryMethod::Custom => {
            let edges = custom_bins.ok_or_else(|| {
                Error::InvalidParameter("custom_bins are required for method 'custom'".into())
            })?;
            let labels: Vec<String> = match custom_labels {
                Some(l) => l.to_vec(),
                None => edges.windows(2).map(|w| interval_label(w[0], w[1])).collect(),
            };
            categorize(ds, column, &new_column, edges, &labels, true, false, "custom")
        }
    }
}

/// Age bands with lower bounds inclusive; defaults to [`AGE_BINS`]
#[instrument(skip(ds, bins, labels))]
pub fn create_age_groups(
    ds: &Dataset,
    column: &str,
    new_column: Option<&str>,
    bins: Option<&[f64]>,
    labels: Option<&[String]>,
) -> Result<Transformed<CategoryReport>> {
    let new_column = new_column
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}_group", column));
    let (edges, labels): (Vec<f64>, Vec<String>) = match bins {
        Some(b) => {
            let labels = match labels {
                Some(l) => l.to_vec(),
                None => b
                    .windows(2)
                    .map(|w| format!("[{}, {})", format_number(w[0]), format_number(w[1])))
                    .collect(),
            };
            (b.to_vec(), labels)
        }
        None => (
            AGE_BINS.to_vec(),
            AGE_LABELS.iter().map(|s| s.to_string()).collect(),
        ),
    };
    categorize(ds, column, &new_column, &edges, &labels, false, false, "age_groups")
}

/// `(max + min) - x` into `{column}_r` unless another name is given
#[instrument(skip(ds))]
pub fn reverse_code(
    ds: &Dataset,
    column: &str,
    new_column: Option<&str>,
    max_value: Option<f64>,
) -> Result<Transformed<ReverseReport>> {
    let new_column = new_column
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}_r", column));
    let values = require_numeric(ds, column)?;
    let (min, observed_max) = min_max(&present(&values)).map_err(|_| no_data(column))?;
    let max = max_value.unwrap_or(observed_max);
    let reversed: Vec<Option<f64>> = values.iter().map(|v| v.map(|x| max + min - x)).collect();
    let frame = ds.with_column(&new_column, ColumnData::Numeric(reversed))?;
    Ok(Transformed {
        frame,
        report: ReverseReport {
            source_column: column.to_string(),
            new_column,
            min_value: min,
            max_value: max,
            original_range: format!("{}-{}", format_number(min), format_number(max)),
        },
    })
}

/// Composite score over `items`, reverse-coding `reverse_items` first
///
/// Row scores use whichever items are present in that row; rows with no
/// items present stay missing. Cronbach's alpha is computed on the items
/// actually used.
#[instrument(skip(ds, items, reverse_items))]
pub fn compute_scale_score(
    ds: &Dataset,
    items: &[String],
    new_column: &str,
    method: ScoreMethod,
    reverse_items: &[String],
    max_value: Option<f64>,
) -> Result<Transformed<ScaleScoreReport>> {
    if items.is_empty() {
        return Err(Error::InvalidParameter(
            "Scale score needs at least one item".to_string(),
        ));
    }
    let mut frame = ds.frame().clone();
    let mut items_used = Vec::with_capacity(items.len());
    let mut columns = Vec::with_capacity(items.len());

    for item in items {
        let values = require_numeric(ds, item)?;
        if reverse_items.contains(item) {
            let (min, observed_max) = min_max(&present(&values)).map_err(|_| no_data(item))?;
            let max = max_value.unwrap_or(observed_max);
            let reversed: Vec<Option<f64>> =
                values.iter().map(|v| v.map(|x| max + min - x)).collect();
            let name = format!("{}_r", item);
            frame = Dataset::new(ds.name(), frame)
                .with_column(&name, ColumnData::Numeric(reversed.clone()))?;
            items_used.push(name);
            columns.push(reversed);
        } else {
            items_used.push(item.clone());
            columns.push(values);
        }
    }

    let scores: Vec<Option<f64>> = (0..ds.height())
        .map(|row| {
            let row_values: Vec<f64> = columns.iter().filter_map(|c| c[row]).collect();
            if row_values.is_empty() {
                return None;
            }
            let total: f64 = row_values.iter().sum();
            Some(match method {
                ScoreMethod::Mean => total / row_values.len() as f64,
                ScoreMethod::Sum => total,
            })
        })
        .collect();

    let alpha = cronbach_alpha(&columns);
    let present_scores = present(&scores);
    let frame = Dataset::new(ds.name(), frame)
        .with_column(new_column, ColumnData::Numeric(scores))?;
    debug!(?alpha, "scale score computed");
    Ok(Transformed {
        frame,
        report: ScaleScoreReport {
            items: items.to_vec(),
            items_used,
            reverse_items: reverse_items.to_vec(),
            new_column: new_column.to_string(),
            method,
            cronbachs_alpha: alpha,
            mean: mean(&present_scores).ok().map(round4),
            std: std_dev(&present_scores).ok().map(round4),
        },
    })
}

/// Z-scores into `{col}_z` or min-max scaling into `{col}_scaled`
#[instrument(skip(ds, columns))]
pub fn standardize(
    ds: &Dataset,
    columns: &[String],
    method: StandardizeMethod,
) -> Result<Transformed<StandardizeReport>> {
    let mut frame = ds.frame().clone();
    let mut new_columns = Vec::with_capacity(columns.len());
    for column in columns {
        let values = require_numeric(ds, column)?;
        let data = present(&values);
        let (name, (center, scale)) = match method {
            StandardizeMethod::Zscore => {
                let m = mean(&data).map_err(|_| no_data(column))?;
                let s = std_dev(&data)?;
                (format!("{}_z", column), (m, s))
            }
            StandardizeMethod::Minmax => {
                let (lo, hi) = min_max(&data).map_err(|_| no_data(column))?;
                (format!("{}_scaled", column), (lo, hi - lo))
            }
        };
        if scale == 0.0 {
            return Err(Error::InvalidInput(format!(
                "Cannot standardize '{}': column is constant",
                column
            )));
        }
        let scaled: Vec<Option<f64>> = values
            .iter()
            .map(|v| v.map(|x| (x - center) / scale))
            .collect();
        frame = Dataset::new(ds.name(), frame).with_column(&name, ColumnData::Numeric(scaled))?;
        new_columns.push(name);
    }
    Ok(Transformed {
        frame,
        report: StandardizeReport {
            columns: columns.to_vec(),
            new_columns,
            method,
        },
    })
}

/// Replace values by label; the result stays numeric when the source
/// column is numeric and every recoded value parses as a number
#[instrument(skip(ds, mapping))]
pub fn recode_values(
    ds: &Dataset,
    column: &str,
    mapping: &BTreeMap<String, String>,
    new_column: Option<&str>,
) -> Result<Transformed<RecodeReport>> {
    let new_column = new_column.unwrap_or(column).to_string();
    let labels = ds.labels(column)?;
    let mut values_changed = 0;
    let recoded: Vec<Option<String>> = labels
        .into_iter()
        .map(|v| {
            v.map(|s| match mapping.get(&s) {
                Some(to) => {
                    values_changed += 1;
                    to.clone()
                }
                None => s,
            })
        })
        .collect();

    let as_numbers: Option<Vec<Option<f64>>> = recoded
        .iter()
        .map(|v| match v {
            None => Some(None),
            Some(s) => s.parse::<f64>().ok().map(Some),
        })
        .collect();
    let data = match as_numbers {
        Some(numbers) if ds.is_numeric(column)? => ColumnData::Numeric(numbers),
        _ => ColumnData::Text(recoded),
    };
    let frame = ds.with_column(&new_column, data)?;
    Ok(Transformed {
        frame,
        report: RecodeReport {
            column: column.to_string(),
            new_column,
            mapping: mapping.clone(),
            values_changed,
        },
    })
}

/// Clip a column to its `lower` and `upper` percentiles
#[instrument(skip(ds))]
pub fn winsorize(
    ds: &Dataset,
    column: &str,
    lower: f64,
    upper: f64,
) -> Result<Transformed<WinsorizeReport>> {
    if !(0.0..=1.0).contains(&lower) || !(0.0..=1.0).contains(&upper) || lower >= upper {
        return Err(Error::InvalidParameter(format!(
            "Percentiles must satisfy 0 <= lower < upper <= 1, got {} and {}",
            lower, upper
        )));
    }
    let values = require_numeric(ds, column)?;
    let s = sorted(&present(&values));
    if s.is_empty() {
        return Err(no_data(column));
    }
    let lo = quantile_sorted(&s, lower);
    let hi = quantile_sorted(&s, upper);
    let mut values_clipped = 0;
    let clipped: Vec<Option<f64>> = values
        .iter()
        .map(|v| {
            v.map(|x| {
                let c = x.clamp(lo, hi);
                if c != x {
                    values_clipped += 1;
                }
                c
            })
        })
        .collect();
    let frame = ds.with_column(column, ColumnData::Numeric(clipped))?;
    Ok(Transformed {
        frame,
        report: WinsorizeReport {
            column: column.to_string(),
            lower_percentile: lower,
            upper_percentile: upper,
            lower_bound: round4(lo),
            upper_bound: round4(hi),
            original_min: round4(s[0]),
            original_max: round4(s[s.len() - 1]),
            values_clipped,
        },
    })
}

/// `ln(x + constant)` into `{column}_log` unless another name is given
#[instrument(skip(ds))]
pub fn log_transform(
    ds: &Dataset,
    column: &str,
    new_column: Option<&str>,
    add_constant: f64,
) -> Result<Transformed<LogReport>> {
    let new_column = new_column
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}_log", column));
    let values = require_numeric(ds, column)?;
    if let Some(bad) = present(&values).into_iter().find(|x| x + add_constant <= 0.0) {
        return Err(Error::InvalidInput(format!(
            "Cannot log-transform '{}': {} + {} is not positive",
            column, bad, add_constant
        )));
    }
    let logged: Vec<Option<f64>> = values
        .iter()
        .map(|v| v.map(|x| (x + add_constant).ln()))
        .collect();
    let original_skewness = skewness(&present(&values)).ok().map(round4);
    let transformed_skewness = skewness(&present(&logged)).ok().map(round4);
    let frame = ds.with_column(&new_column, ColumnData::Numeric(logged))?;
    Ok(Transformed {
        frame,
        report: LogReport {
            column: column.to_string(),
            new_column,
            add_constant,
            original_skewness,
            transformed_skewness,
        },
    })
}

fn default_n_categories() -> usize {
    4
}

fn default_lower() -> f64 {
    0.05
}

fn default_upper() -> f64 {
    0.95
}

fn default_constant() -> f64 {
    1.0
}

/// A transformation request as received from a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Transformation {
    RemoveDuplicates {
        #[serde(default)]
        subset: Option<Vec<String>>,
        #[serde(default)]
        keep: Keep,
    },
    HandleMissing {
        column: String,
        #[serde(default)]
        method: MissingMethod,
        #[serde(default)]
        fill_value: Option<String>,
    },
    CreateAgeGroups {
        age_column: String,
        #[serde(default)]
        new_column: Option<String>,
        #[serde(default)]
        bins: Option<Vec<f64>>,
        #[serde(default)]
        labels: Option<Vec<String>>,
    },
    CreateCategories {
        column: String,
        #[serde(default)]
        new_column: Option<String>,
        #[serde(default)]
        method: CategoryMethod,
        #[serde(default = "default_n_categories")]
        n_categories: usize,
        #[serde(default)]
        custom_bins: Option<Vec<f64>>,
        #[serde(default)]
        custom_labels: Option<Vec<String>>,
    },
    ReverseCode {
        column: String,
        #[serde(default)]
        new_column: Option<String>,
        #[serde(default)]
        max_value: Option<f64>,
    },
    ComputeScaleScore {
        items: Vec<String>,
        new_column: String,
        #[serde(default)]
        method: ScoreMethod,
        #[serde(default)]
        reverse_items: Vec<String>,
        #[serde(default)]
        max_value: Option<f64>,
    },
    Standardize {
        columns: Vec<String>,
        #[serde(default)]
        method: StandardizeMethod,
    },
    RecodeValues {
        column: String,
        mapping: BTreeMap<String, String>,
        #[serde(default)]
        new_column: Option<String>,
    },
    WinsorizeOutliers {
        column: String,
        #[serde(default = "default_lower")]
        lower_percentile: f64,
        #[serde(default = "default_upper")]
        upper_percentile: f64,
    },
    LogTransform {
        column: String,
        #[serde(default)]
        new_column: Option<String>,
        #[serde(default = "default_constant")]
        add_constant: f64,
    },
}

impl Transformation {
    /// Name recorded in the audit trail
    pub fn action(&self) -> &'static str {
        match self {
            Self::RemoveDuplicates { .. } => "remove_duplicates",
            Self::HandleMissing { .. } => "handle_missing",
            Self::CreateAgeGroups { .. } => "create_age_groups",
            Self::CreateCategories { .. } => "create_categories",
            Self::ReverseCode { .. } => "reverse_code",
            Self::ComputeScaleScore { .. } => "compute_scale_score",
            Self::Standardize { .. } => "standardize",
            Self::RecodeValues { .. } => "recode_values",
            Self::WinsorizeOutliers { .. } => "winsorize_outliers",
            Self::LogTransform { .. } => "log_transform",
        }
    }

    pub fn apply(&self, ds: &Dataset) -> Result<Transformed<Value>> {
        match self {
            Self::RemoveDuplicates { subset, keep } => {
                remove_duplicates(ds, subset.as_deref(), *keep)?.into_json()
            }
            Self::HandleMissing {
                column,
                method,
                fill_value,
            } => handle_missing(ds, column, *method, fill_value.as_deref())?.into_json(),
            Self::CreateAgeGroups {
                age_column,
                new_column,
                bins,
                labels,
            } => create_age_groups(
                ds,
                age_column,
                new_column.as_deref(),
                bins.as_deref(),
                labels.as_deref(),
            )?
            .into_json(),
            Self::CreateCategories {
                column,
                new_column,
                method,
                n_categories,
                custom_bins,
                custom_labels,
            } => create_categories(
                ds,
                column,
                new_column.as_deref(),
                *method,
                *n_categories,
                custom_bins.as_deref(),
                custom_labels.as_deref(),
            )?
            .into_json(),
            Self::ReverseCode {
                column,
                new_column,
                max_value,
            } => reverse_code(ds, column, new_column.as_deref(), *max_value)?.into_json(),
            Self::ComputeScaleScore {
                items,
                new_column,
                method,
                reverse_items,
                max_value,
            } => compute_scale_score(ds, items, new_column, *method, reverse_items, *max_value)?
                .into_json(),
            Self::Standardize { columns, method } => standardize(ds, columns, *method)?.into_json(),
            Self::RecodeValues {
                column,
                mapping,
                new_column,
            } => recode_values(ds, column, mapping, new_column.as_deref())?.into_json(),
            Self::WinsorizeOutliers {
                column,
                lower_percentile,
                upper_percentile,
            } => winsorize(ds, column, *lower_percentile, *upper_percentile)?.into_json(),
            Self::LogTransform {
                column,
                new_column,
                add_constant,
            } => log_transform(ds, column, new_column.as_deref(), *add_constant)?.into_json(),
        }
    }
}
