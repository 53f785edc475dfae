//! Descriptive statistics per column

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thesis_core::numeric::{
    kurtosis, mean, median, min_max, quantile_sorted, skewness, sorted, std_dev,
};
use thesis_core::{round4, round_to};
use thesis_data::{Dataset, CONTINUOUS_UNIQUE_THRESHOLD};
use tracing::debug;

/// Categories with fewer observations are listed as sparse
pub const SPARSE_CATEGORY_N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkewDirection {
    Right,
    Left,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionShape {
    /// |skewness| > 1
    pub skewed: bool,
    pub direction: SkewDirection,
    pub use_nonparametric: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousSummary {
    pub variable: String,
    pub n: usize,
    pub missing: usize,
    pub missing_pct: f64,
    pub mean: f64,
    pub std: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub min: f64,
    pub max: f64,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    pub distribution: DistributionShape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub n: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub variable: String,
    pub n: usize,
    pub missing: usize,
    pub missing_pct: f64,
    pub unique_values: usize,
    /// Most frequent first, ties by label
    pub categories: Vec<CategoryCount>,
    pub sparse_categories: Vec<String>,
}

/// Summaries in column order, split by column kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Descriptives {
    pub continuous: Vec<ContinuousSummary>,
    pub categorical: Vec<CategoricalSummary>,
}

impl Descriptives {
    pub fn continuous(&self, variable: &str) -> Option<&ContinuousSummary> {
        self.continuous.iter().find(|s| s.variable == variable)
    }

    pub fn categorical(&self, variable: &str) -> Option<&CategoricalSummary> {
        self.categorical.iter().find(|s| s.variable == variable)
    }
}

fn missing_pct(missing: usize, rows: usize) -> f64 {
    if rows == 0 {
        0.0
    } else {
        round_to(missing as f64 / rows as f64 * 100.0, 2)
    }
}

fn continuous(variable: &str, values: &[Option<f64>]) -> Result<ContinuousSummary> {
    let data: Vec<f64> = values.iter().flatten().copied().collect();
    let missing = values.len() - data.len();
    let s = sorted(&data);
    let (q1, q3) = (quantile_sorted(&s, 0.25), quantile_sorted(&s, 0.75));
    let (min, max) = min_max(&data)?;
    let skew = skewness(&data).ok();
    let skewed = skew.is_some_and(|g| g.abs() > 1.0);
    Ok(ContinuousSummary {
        variable: variable.to_string(),
        n: data.len(),
        missing,
        missing_pct: missing_pct(missing, values.len()),
        mean: round4(mean(&data)?),
        std: round4(std_dev(&data)?),
        median: round4(median(&data)?),
        q1: round4(q1),
        q3: round4(q3),
        iqr: round4(q3 - q1),
        min: round4(min),
        max: round4(max),
        skewness: skew.map(round4),
        kurtosis: kurtosis(&data).ok().map(round4),
        distribution: DistributionShape {
            skewed,
            direction: if skew.is_some_and(|g| g > 0.0) {
                SkewDirection::Right
            } else {
                SkewDirection::Left
            },
            use_nonparametric: skewed,
        },
    })
}

fn categorical(variable: &str, labels: Vec<Option<String>>) -> CategoricalSummary {
    let rows = labels.len();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for label in labels.into_iter().flatten() {
        *counts.entry(label).or_insert(0) += 1;
    }
    let n: usize = counts.values().sum();
    let mut ordered: Vec<(String, usize)> = counts.into_iter().collect();
    // stable sort keeps label order within equal counts
    ordered.sort_by(|a, b| b.1.cmp(&a.1));

    let categories: Vec<CategoryCount> = ordered
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category,
            n: count,
            percentage: round_to(count as f64 / n as f64 * 100.0, 2),
        })
        .collect();
    let sparse_categories = categories
        .iter()
        .filter(|c| c.n < SPARSE_CATEGORY_N)
        .map(|c| c.category.clone())
        .collect();
    CategoricalSummary {
        variable: variable.to_string(),
        n,
        missing: rows - n,
        missing_pct: missing_pct(rows - n, rows),
        unique_values: categories.len(),
        categories,
        sparse_categories,
    }
}

/// Describe the named columns, or every column when `variables` is `None`
///
/// Numeric columns with more than ten distinct values are summarised as
/// continuous; everything else as categorical. Unknown names are skipped.
pub fn describe(dataset: &Dataset, variables: Option<&[String]>) -> Result<Descriptives> {
    let names = match variables {
        Some(v) => v.to_vec(),
        None => dataset.column_names(),
    };
    let mut out = Descriptives::default();
    for name in &names {
        if !dataset.has_column(name) {
            debug!(column = %name, "skipping unknown column");
            continue;
        }
        if dataset.is_numeric(name)?
            && dataset.distinct_count(name)? > CONTINUOUS_UNIQUE_THRESHOLD
        {
            out.continuous
                .push(continuous(name, &dataset.numeric(name)?)?);
        } else {
            out.categorical.push(categorical(name, dataset.labels(name)?));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use thesis_data::ColumnData;

    fn dataset() -> Dataset {
        let mut score: Vec<Option<f64>> = (1..=12).map(|i| Some(f64::from(i))).collect();
        score.push(None);
        score.push(Some(40.0));
        let group = ["a", "a", "b", "a", "b", "c", "a", "b", "a", "a", "b", "a", "b", "a"];
        Dataset::from_columns(
            "d",
            vec![
                ("score", ColumnData::Numeric(score)),
                ("group", ColumnData::text(group)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_continuous_block() {
        let d = describe(&dataset(), None).unwrap();
        let s = d.continuous("score").unwrap();
        assert_eq!(s.n, 13);
        assert_eq!(s.missing, 1);
        assert_abs_diff_eq!(s.missing_pct, 7.14, epsilon = 1e-12);
        assert_eq!(s.median, 7.0);
        assert_eq!(s.max, 40.0);
        assert!(s.distribution.skewed);
        assert_eq!(s.distribution.direction, SkewDirection::Right);
        assert!(s.distribution.use_nonparametric);
    }

    #[test]
    fn test_categorical_block() {
        let d = describe(&dataset(), Some(&["group".to_string(), "nope".to_string()])).unwrap();
        assert!(d.continuous.is_empty());
        let c = d.categorical("group").unwrap();
        let order: Vec<(&str, usize)> = c
            .categories
            .iter()
            .map(|c| (c.category.as_str(), c.n))
            .collect();
        assert_eq!(order, vec![("a", 8), ("b", 5), ("c", 1)]);
        assert_abs_diff_eq!(c.categories[0].percentage, 57.14, epsilon = 1e-12);
        assert_eq!(c.sparse_categories, vec!["c".to_string()]);
        assert_eq!(c.unique_values, 3);
    }
}
