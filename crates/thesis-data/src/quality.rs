//! Automated data quality assessment
//!
//! The overall score is a placeholder heuristic:
//! `max(0, 100 - 5 * issues - 10 * critical issues)`. The weights have no
//! statistical derivation and should be read as a rough traffic light.

use crate::{Dataset, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use thesis_core::numeric::{mean, min_max, quantile_sorted, sorted};
use thesis_core::{round4, round_to};
use tracing::{debug, instrument};

/// Share of rows above which duplicates are critical
const CRITICAL_DUPLICATE_SHARE: f64 = 0.1;
/// Outlier percentage above which a column is critical
const CRITICAL_OUTLIER_PCT: f64 = 10.0;
/// Categorical columns with more levels are not inspected
const MAX_CATEGORY_LEVELS: usize = 100;
/// Categories with fewer observations are sparse
pub const SPARSE_CATEGORY_N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// high above 20% missing, medium above 5%
    pub fn from_missing_pct(pct: f64) -> Self {
        if pct > 20.0 {
            Self::High
        } else if pct > 5.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    ReadyForAnalysis,
    CleanData,
    ProceedWithCaution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierSuggestion {
    Investigate,
    WinsorizeOrTransform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateCheck {
    pub exact_duplicates: usize,
    pub percentage: f64,
    /// First ten row indices repeating an earlier row
    pub duplicate_row_indices: Vec<usize>,
    pub issues_count: usize,
    pub critical: bool,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub missing_count: usize,
    pub missing_percentage: f64,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingCheck {
    pub total_missing_cells: usize,
    pub total_cells: usize,
    pub overall_missing_percentage: f64,
    pub columns_with_missing: usize,
    pub by_column: BTreeMap<String, ColumnMissing>,
    pub high_missing_columns: Vec<String>,
    pub issues_count: usize,
    pub critical: bool,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOutliers {
    pub iqr_outliers: usize,
    pub percentage: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub sample_outlier_values: Vec<f64>,
    pub suggestion: OutlierSuggestion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierCheck {
    pub columns_with_outliers: usize,
    pub by_column: BTreeMap<String, ColumnOutliers>,
    pub total_outlier_values: usize,
    pub issues_count: usize,
    pub critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeIssue {
    pub current_type: String,
    pub suggested_type: String,
    pub issue: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCheck {
    pub issues: BTreeMap<String, TypeIssue>,
    pub issues_count: usize,
    pub critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeIssue {
    pub expected_min: Option<f64>,
    pub expected_max: Option<f64>,
    pub actual_min: f64,
    pub actual_max: f64,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeCheck {
    pub issues: BTreeMap<String, RangeIssue>,
    pub issues_count: usize,
    pub critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryIssue {
    pub unique_values: usize,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCheck {
    pub issues: BTreeMap<String, CategoryIssue>,
    pub issues_count: usize,
    pub critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    pub total_issues: usize,
    pub critical_issues: usize,
    pub data_quality_score: u32,
    pub recommendation: Recommendation,
}

impl QualitySummary {
    /// Aggregate `(issues_count, critical)` pairs from each check
    pub fn from_checks(checks: &[(usize, bool)]) -> Self {
        let total_issues: usize = checks.iter().map(|(n, _)| n).sum();
        let critical_issues: usize = checks.iter().filter(|(_, c)| *c).map(|(n, _)| n).sum();
        let penalty = 5 * total_issues + 10 * critical_issues;
        let recommendation = if critical_issues > 0 {
            Recommendation::ProceedWithCaution
        } else if total_issues > 0 {
            Recommendation::CleanData
        } else {
            Recommendation::ReadyForAnalysis
        };
        Self {
            total_issues,
            critical_issues,
            data_quality_score: 100usize.saturating_sub(penalty) as u32,
            recommendation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub timestamp: DateTime<Utc>,
    pub dataset_info: DatasetInfo,
    pub duplicates: DuplicateCheck,
    pub missing_data: MissingCheck,
    pub outliers: OutlierCheck,
    pub data_types: TypeCheck,
    pub value_ranges: RangeCheck,
    pub category_issues: CategoryCheck,
    pub summary: QualitySummary,
}

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round_to(part as f64 / whole as f64 * 100.0, 2)
    }
}

pub fn check_duplicates(ds: &Dataset) -> Result<DuplicateCheck> {
    let keys = ds.row_keys(&ds.column_names())?;
    let mut seen = HashSet::new();
    let duplicates: Vec<usize> = keys
        .iter()
        .enumerate()
        .filter_map(|(i, k)| (!seen.insert(k)).then_some(i))
        .collect();
    let n = duplicates.len();
    let rows = ds.height();
    Ok(DuplicateCheck {
        exact_duplicates: n,
        percentage: pct(n, rows),
        duplicate_row_indices: duplicates.into_iter().take(10).collect(),
        issues_count: usize::from(n > 0),
        critical: rows > 0 && n as f64 > rows as f64 * CRITICAL_DUPLICATE_SHARE,
        suggestion: (n > 0).then(|| "Consider removing duplicate rows".to_string()),
    })
}

fn missing_suggestion(column: &str, pct: f64) -> String {
    if pct > 50.0 {
        format!("Consider dropping column '{}' (>{:.1}% missing)", column, pct)
    } else if pct > 20.0 {
        format!(
            "Column '{}' has high missingness ({:.1}%). Consider imputation",
            column, pct
        )
    } else if pct > 5.0 {
        format!("Column '{}' has moderate missingness ({:.1}%)", column, pct)
    } else {
        format!("Column '{}' has low missingness ({:.1}%)", column, pct)
    }
}

pub fn check_missing(ds: &Dataset) -> Result<MissingCheck> {
    let rows = ds.height();
    let mut by_column = BTreeMap::new();
    let mut high = Vec::new();
    let mut suggestions = Vec::new();
    let mut total_missing = 0;

    for column in ds.column_names() {
        let missing = ds.missing_count(&column)?;
        total_missing += missing;
        if missing == 0 {
            continue;
        }
        let p = pct(missing, rows);
        let severity = Severity::from_missing_pct(p);
        if severity == Severity::High {
            high.push(column.clone());
        }
        suggestions.push(missing_suggestion(&column, p));
        by_column.insert(
            column,
            ColumnMissing {
                missing_count: missing,
                missing_percentage: p,
                severity,
            },
        );
    }

    let total_cells = rows * ds.width();
    Ok(MissingCheck {
        total_missing_cells: total_missing,
        total_cells,
        overall_missing_percentage: pct(total_missing, total_cells),
        columns_with_missing: by_column.len(),
        issues_count: by_column.len(),
        critical: !high.is_empty(),
        by_column,
        high_missing_columns: high,
        suggestions,
    })
}

/// Tukey fences at 1.5 IQR, for columns with at least four values
pub fn check_outliers(ds: &Dataset) -> Result<OutlierCheck> {
    let mut by_column = BTreeMap::new();
    let mut total = 0;
    for column in ds.column_names() {
        if !ds.is_numeric(&column)? {
            continue;
        }
        let values = ds.numeric_complete(&column)?;
        if values.len() < 4 {
            continue;
        }
        let s = sorted(&values);
        let q1 = quantile_sorted(&s, 0.25);
        let q3 = quantile_sorted(&s, 0.75);
        let iqr = q3 - q1;
        let (lower, upper) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
        let outliers: Vec<f64> = values
            .iter()
            .copied()
            .filter(|&x| x < lower || x > upper)
            .collect();
        if outliers.is_empty() {
            continue;
        }
        let p = pct(outliers.len(), values.len());
        total += outliers.len();
        by_column.insert(
            column,
            ColumnOutliers {
                iqr_outliers: outliers.len(),
                percentage: p,
                lower_bound: round4(lower),
                upper_bound: round4(upper),
                sample_outlier_values: outliers.iter().take(5).copied().map(round4).collect(),
                suggestion: if p < 5.0 {
                    OutlierSuggestion::Investigate
                } else {
                    OutlierSuggestion::WinsorizeOrTransform
                },
            },
        );
    }
    Ok(OutlierCheck {
        columns_with_outliers: by_column.len(),
        total_outlier_values: total,
        issues_count: by_column.len(),
        critical: by_column.values().any(|c| c.percentage > CRITICAL_OUTLIER_PCT),
        by_column,
    })
}

pub fn check_data_types(ds: &Dataset) -> Result<TypeCheck> {
    let rows = ds.height();
    let mut issues = BTreeMap::new();
    for column in ds.column_names() {
        let meta = ds.column_metadata(&column)?;
        if ds.is_numeric(&column)? {
            let unique = meta.unique_count;
            let ratio = if rows > 0 { unique as f64 / rows as f64 } else { 0.0 };
            if ratio < 0.05 && unique < 10 {
                issues.insert(
                    column,
                    TypeIssue {
                        current_type: meta.dtype,
                        suggested_type: "category".to_string(),
                        issue: "Low cardinality numeric - consider as categorical".to_string(),
                    },
                );
            }
        } else {
            let labels: Vec<String> = ds.labels(&column)?.into_iter().flatten().collect();
            if !labels.is_empty() && labels.iter().all(|s| s.trim().parse::<f64>().is_ok()) {
                issues.insert(
                    column,
                    TypeIssue {
                        current_type: meta.dtype,
                        suggested_type: "float64".to_string(),
                        issue: "Numeric values stored as text".to_string(),
                    },
                );
            }
        }
    }
    Ok(TypeCheck {
        issues_count: issues.len(),
        issues,
        critical: false,
    })
}

/// Plausible bounds for columns whose name contains the pattern
const RANGE_PATTERNS: [(&str, Option<f64>, Option<f64>); 6] = [
    ("age", Some(0.0), Some(120.0)),
    ("percentage", Some(0.0), Some(100.0)),
    ("year", Some(1900.0), Some(2100.0)),
    ("score", Some(0.0), None),
    ("rating", Some(1.0), Some(5.0)),
    ("count", Some(0.0), None),
];

pub fn check_value_ranges(ds: &Dataset) -> Result<RangeCheck> {
    let mut issues = BTreeMap::new();
    for column in ds.column_names() {
        if !ds.is_numeric(&column)? {
            continue;
        }
        let lower = column.to_lowercase();
        let Some((_, min, max)) = RANGE_PATTERNS.iter().find(|(p, _, _)| lower.contains(p))
        else {
            continue;
        };
        let values = ds.numeric_complete(&column)?;
        let Ok((actual_min, actual_max)) = min_max(&values) else {
            continue;
        };
        let mut found = Vec::new();
        if let Some(lo) = min {
            let below = values.iter().filter(|&&x| x < *lo).count();
            if below > 0 {
                found.push(format!("{} values below minimum ({})", below, lo));
            }
        }
        if let Some(hi) = max {
            let above = values.iter().filter(|&&x| x > *hi).count();
            if above > 0 {
                found.push(format!("{} values above maximum ({})", above, hi));
            }
        }
        if !found.is_empty() {
            issues.insert(
                column,
                RangeIssue {
                    expected_min: *min,
                    expected_max: *max,
                    actual_min: round4(actual_min),
                    actual_max: round4(actual_max),
                    issues: found,
                },
            );
        }
    }
    Ok(RangeCheck {
        issues_count: issues.len(),
        critical: !issues.is_empty(),
        issues,
    })
}

pub fn check_categories(ds: &Dataset) -> Result<CategoryCheck> {
    let mut issues = BTreeMap::new();
    for column in ds.column_names() {
        if ds.is_numeric(&column)? {
            continue;
        }
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for v in ds.labels(&column)?.into_iter().flatten() {
            *counts.entry(v).or_insert(0) += 1;
        }
        if counts.len() > MAX_CATEGORY_LEVELS {
            continue;
        }
        let mut found = Vec::new();
        let folded: BTreeSet<String> = counts.keys().map(|k| k.trim().to_lowercase()).collect();
        if folded.len() != counts.len() {
            found.push("Case variations detected".to_string());
        }
        let sparse: Vec<&str> = counts
            .iter()
            .filter(|(_, &n)| n < SPARSE_CATEGORY_N)
            .map(|(k, _)| k.as_str())
            .take(5)
            .collect();
        if !sparse.is_empty() {
            found.push(format!("Sparse categories (n<5): {:?}", sparse));
        }
        if !found.is_empty() {
            issues.insert(
                column,
                CategoryIssue {
                    unique_values: counts.len(),
                    issues: found,
                },
            );
        }
    }
    Ok(CategoryCheck {
        issues_count: issues.values().map(|c| c.issues.len()).sum(),
        issues,
        critical: false,
    })
}

impl QualityReport {
    #[instrument(skip(ds), fields(dataset = ds.name()))]
    pub fn run(ds: &Dataset) -> Result<Self> {
        let duplicates = check_duplicates(ds)?;
        let missing_data = check_missing(ds)?;
        let outliers = check_outliers(ds)?;
        let data_types = check_data_types(ds)?;
        let value_ranges = check_value_ranges(ds)?;
        let category_issues = check_categories(ds)?;
        let summary = QualitySummary::from_checks(&[
            (duplicates.issues_count, duplicates.critical),
            (missing_data.issues_count, missing_data.critical),
            (outliers.issues_count, outliers.critical),
            (data_types.issues_count, data_types.critical),
            (value_ranges.issues_count, value_ranges.critical),
            (category_issues.issues_count, category_issues.critical),
        ]);
        debug!(score = summary.data_quality_score, "quality check complete");
        Ok(Self {
            timestamp: Utc::now(),
            dataset_info: DatasetInfo {
                rows: ds.height(),
                columns: ds.width(),
                column_names: ds.column_names(),
            },
            duplicates,
            missing_data,
            outliers,
            data_types,
            value_ranges,
            category_issues,
            summary,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variable_type", rename_all = "snake_case")]
pub enum VariableDetails {
    Continuous {
        min: Option<f64>,
        max: Option<f64>,
        mean: Option<f64>,
        unique_values: usize,
    },
    Discrete {
        min: Option<f64>,
        max: Option<f64>,
        mean: Option<f64>,
        unique_values: usize,
    },
    Categorical {
        unique_values: usize,
        /// Listed when there are at most 20 levels
        categories: Option<Vec<String>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub variable_name: String,
    pub data_type: String,
    pub n_total: usize,
    pub n_valid: usize,
    pub n_missing: usize,
    pub missing_percentage: f64,
    #[serde(flatten)]
    pub details: VariableDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataDictionary {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub variables: Vec<DictionaryEntry>,
}

impl DataDictionary {
    pub fn generate(ds: &Dataset, version: &str) -> Result<Self> {
        let n_total = ds.height();
        let mut variables = Vec::with_capacity(ds.width());
        for column in ds.column_names() {
            let meta = ds.column_metadata(&column)?;
            let details = if ds.is_numeric(&column)? {
                let values = ds.numeric_complete(&column)?;
                let range = min_max(&values).ok();
                let min = range.map(|r| round4(r.0));
                let max = range.map(|r| round4(r.1));
                let mean = mean(&values).ok().map(round4);
                let unique_values = meta.unique_count;
                if unique_values > 10 {
                    VariableDetails::Continuous { min, max, mean, unique_values }
                } else {
                    VariableDetails::Discrete { min, max, mean, unique_values }
                }
            } else {
                let mut levels: Vec<String> = Vec::new();
                for v in ds.labels(&column)?.into_iter().flatten() {
                    if !levels.contains(&v) {
                        levels.push(v);
                    }
                }
                VariableDetails::Categorical {
                    unique_values: levels.len(),
                    categories: (levels.len() <= 20).then_some(levels),
                }
            };
            variables.push(DictionaryEntry {
                variable_name: column,
                data_type: meta.dtype,
                n_total,
                n_valid: n_total - meta.missing_count,
                n_missing: meta.missing_count,
                missing_percentage: meta.missing_pct,
                details,
            });
        }
        Ok(Self {
            version: version.to_string(),
            generated_at: Utc::now(),
            variables,
        })
    }
}
