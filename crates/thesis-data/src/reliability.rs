//! Internal-consistency reliability of multi-item scales

use crate::{Dataset, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use thesis_core::numeric::{mean, pearson, std_dev, variance};
use thesis_core::round4;

/// Item-total correlation below which an item is flagged for removal
pub const LOW_ITEM_TOTAL_R: f64 = 0.3;
/// Alpha gain above which deleting an item is recommended
pub const ALPHA_GAIN_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlphaBand {
    Excellent,
    Good,
    Acceptable,
    Questionable,
    Poor,
    Unacceptable,
    #[serde(rename = "Could not calculate")]
    NotComputable,
}

impl AlphaBand {
    pub fn from_alpha(alpha: Option<f64>) -> Self {
        match alpha {
            None => Self::NotComputable,
            Some(a) if a >= 0.9 => Self::Excellent,
            Some(a) if a >= 0.8 => Self::Good,
            Some(a) if a >= 0.7 => Self::Acceptable,
            Some(a) if a >= 0.6 => Self::Questionable,
            Some(a) if a >= 0.5 => Self::Poor,
            Some(_) => Self::Unacceptable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Acceptable => "Acceptable",
            Self::Questionable => "Questionable",
            Self::Poor => "Poor",
            Self::Unacceptable => "Unacceptable",
            Self::NotComputable => "Could not calculate",
        }
    }
}

impl fmt::Display for AlphaBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStatistics {
    pub item: String,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub item_total_r: Option<f64>,
    pub alpha_if_deleted: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityAnalysis {
    pub scale_name: String,
    pub n_items: usize,
    pub n_valid_cases: usize,
    pub cronbachs_alpha: Option<f64>,
    pub interpretation: AlphaBand,
    pub item_statistics: Vec<ItemStatistics>,
    pub recommendations: Vec<String>,
}

/// Rows where every item is present, transposed back to per-item columns
fn listwise_complete(items: &[Vec<Option<f64>>]) -> Vec<Vec<f64>> {
    let n = items.iter().map(Vec::len).min().unwrap_or(0);
    let mut out = vec![Vec::new(); items.len()];
    for row in 0..n {
        if items.iter().all(|c| c[row].is_some()) {
            for (dst, src) in out.iter_mut().zip(items) {
                dst.extend(src[row]);
            }
        }
    }
    out
}

fn row_totals(columns: &[Vec<f64>]) -> Vec<f64> {
    let n = columns.first().map_or(0, Vec::len);
    (0..n).map(|i| columns.iter().map(|c| c[i]).sum()).collect()
}

/// Cronbach's alpha over listwise-complete rows, rounded to 4 decimals
///
/// `None` for fewer than two items, fewer than two complete rows, or zero
/// variance of the total score.
pub fn cronbach_alpha(items: &[Vec<Option<f64>>]) -> Option<f64> {
    if items.len() < 2 {
        return None;
    }
    let columns = listwise_complete(items);
    let k = columns.len() as f64;
    let item_var: f64 = columns
        .iter()
        .map(|c| variance(c))
        .collect::<thesis_core::Result<Vec<f64>>>()
        .ok()?
        .iter()
        .sum();
    let total_var = variance(&row_totals(&columns)).ok()?;
    if total_var == 0.0 {
        return None;
    }
    Some(round4(k / (k - 1.0) * (1.0 - item_var / total_var)))
}

/// Correlation of each item with the sum of the remaining items
pub fn corrected_item_total(items: &[Vec<Option<f64>>]) -> Vec<Option<f64>> {
    let columns = listwise_complete(items);
    let totals = row_totals(&columns);
    columns
        .iter()
        .map(|c| {
            let rest: Vec<f64> = totals.iter().zip(c).map(|(t, x)| t - x).collect();
            pearson(c, &rest).ok().map(round4)
        })
        .collect()
}

/// Alpha recomputed with each item left out in turn
pub fn alpha_if_deleted(items: &[Vec<Option<f64>>]) -> Vec<Option<f64>> {
    (0..items.len())
        .map(|skip| {
            let remaining: Vec<Vec<Option<f64>>> = items
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, c)| c.clone())
                .collect();
            cronbach_alpha(&remaining)
        })
        .collect()
}

impl ReliabilityAnalysis {
    pub fn from_dataset(dataset: &Dataset, items: &[String], scale_name: &str) -> Result<Self> {
        if items.is_empty() {
            return Err(Error::InvalidParameter(
                "Reliability analysis needs at least one item".to_string(),
            ));
        }
        let columns = items
            .iter()
            .map(|c| dataset.numeric(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_items(items, &columns, scale_name))
    }

    pub fn from_items(names: &[String], items: &[Vec<Option<f64>>], scale_name: &str) -> Self {
        let alpha = cronbach_alpha(items);
        let item_total = corrected_item_total(items);
        let deleted = alpha_if_deleted(items);
        let n_valid_cases = listwise_complete(items).first().map_or(0, Vec::len);

        let item_statistics: Vec<ItemStatistics> = names
            .iter()
            .zip(items)
            .enumerate()
            .map(|(i, (name, values))| {
                let present: Vec<f64> = values.iter().flatten().copied().collect();
                ItemStatistics {
                    item: name.clone(),
                    mean: mean(&present).ok().map(round4),
                    std: std_dev(&present).ok().map(round4),
                    item_total_r: item_total.get(i).copied().flatten(),
                    alpha_if_deleted: deleted.get(i).copied().flatten(),
                }
            })
            .collect();

        let mut recommendations = Vec::new();
        for stat in &item_statistics {
            if let Some(r) = stat.item_total_r {
                if r < LOW_ITEM_TOTAL_R {
                    recommendations.push(format!(
                        "Consider removing '{}' (low item-total correlation: {})",
                        stat.item, r
                    ));
                }
            }
        }
        if let Some(a) = alpha {
            for stat in &item_statistics {
                if let Some(d) = stat.alpha_if_deleted {
                    if d > a + ALPHA_GAIN_THRESHOLD {
                        recommendations.push(format!(
                            "Removing '{}' would improve alpha from {} to {}",
                            stat.item, a, d
                        ));
                    }
                }
            }
        }
        if recommendations.is_empty() {
            recommendations
                .push("Scale reliability is adequate. No items need removal.".to_string());
        }

        Self {
            scale_name: scale_name.to_string(),
            n_items: items.len(),
            n_valid_cases,
            cronbachs_alpha: alpha,
            interpretation: AlphaBand::from_alpha(alpha),
            item_statistics,
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn some(v: &[f64]) -> Vec<Option<f64>> {
        v.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_alpha_known_value() {
        // three items, five respondents
        let items = vec![
            some(&[4.0, 5.0, 3.0, 2.0, 4.0]),
            some(&[4.0, 4.0, 3.0, 2.0, 5.0]),
            some(&[5.0, 5.0, 2.0, 1.0, 4.0]),
        ];
        // item variances 1.3, 1.3, 3.3; total variance 15.3
        let expected = 1.5 * (1.0 - 5.9 / 15.3);
        assert_abs_diff_eq!(cronbach_alpha(&items).unwrap(), expected, epsilon = 1e-4);
    }

    #[test]
    fn test_alpha_undefined_cases() {
        assert_eq!(cronbach_alpha(&[some(&[1.0, 2.0])]), None);
        let constant = vec![some(&[3.0, 3.0, 3.0]), some(&[2.0, 2.0, 2.0])];
        assert_eq!(cronbach_alpha(&constant), None);
    }

    #[test]
    fn test_listwise_deletion() {
        let items = vec![
            vec![Some(1.0), None, Some(3.0), Some(4.0)],
            vec![Some(1.0), Some(2.0), Some(3.0), Some(5.0)],
        ];
        let cols = listwise_complete(&items);
        assert_eq!(cols[0], vec![1.0, 3.0, 4.0]);
        assert_eq!(cols[1], vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_bands() {
        assert_eq!(AlphaBand::from_alpha(Some(0.95)), AlphaBand::Excellent);
        assert_eq!(AlphaBand::from_alpha(Some(0.8)), AlphaBand::Good);
        assert_eq!(AlphaBand::from_alpha(Some(0.65)), AlphaBand::Questionable);
        assert_eq!(AlphaBand::from_alpha(Some(0.2)), AlphaBand::Unacceptable);
        assert_eq!(AlphaBand::from_alpha(None).as_str(), "Could not calculate");
    }

    #[test]
    fn test_bad_item_is_flagged() {
        let names: Vec<String> = ["a", "b", "c", "noise"].iter().map(|s| s.to_string()).collect();
        let items = vec![
            some(&[1.0, 2.0, 3.0, 4.0, 5.0, 2.0]),
            some(&[1.0, 2.0, 3.0, 5.0, 5.0, 2.0]),
            some(&[2.0, 2.0, 3.0, 4.0, 5.0, 1.0]),
            some(&[5.0, 1.0, 4.0, 1.0, 2.0, 5.0]),
        ];
        let analysis = ReliabilityAnalysis::from_items(&names, &items, "Wellbeing");
        assert_eq!(analysis.n_items, 4);
        assert_eq!(analysis.n_valid_cases, 6);
        assert!(analysis
            .recommendations
            .iter()
            .any(|r| r.contains("'noise'")));
    }
}
