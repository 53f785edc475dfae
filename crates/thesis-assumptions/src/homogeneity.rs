//! Homogeneity of variance across groups

use crate::types::{GroupVariance, HomogeneityResult, Recommendation, SubTest, TestStatistic};
use crate::{Error, Result};
use thesis_core::distributions::{chi2_upper_p, f_upper_p};
use thesis_core::numeric::{mean, median, variance};
use thesis_core::round4;
use tracing::{debug, instrument};

const VARIANCE_RATIO_CONCERN: f64 = 3.0;

fn check_groups(groups: &[Vec<f64>]) -> thesis_core::Result<()> {
    if groups.len() < 2 {
        return Err(thesis_core::Error::InsufficientData {
            expected: 2,
            actual: groups.len(),
        });
    }
    if let Some(g) = groups.iter().find(|g| g.is_empty()) {
        return Err(thesis_core::Error::InsufficientData {
            expected: 1,
            actual: g.len(),
        });
    }
    Ok(())
}

/// Brown-Forsythe variant of Levene's test (deviations from group medians)
pub fn levene(groups: &[Vec<f64>]) -> thesis_core::Result<TestStatistic> {
    check_groups(groups)?;
    let k = groups.len();
    let total: usize = groups.iter().map(Vec::len).sum();
    if total <= k {
        return Err(thesis_core::Error::InsufficientData {
            expected: k + 1,
            actual: total,
        });
    }

    let deviations: Vec<Vec<f64>> = groups
        .iter()
        .map(|g| {
            let m = median(g)?;
            Ok(g.iter().map(|v| (v - m).abs()).collect())
        })
        .collect::<thesis_core::Result<_>>()?;
    let group_means: Vec<f64> = deviations.iter().map(|d| mean(d)).collect::<thesis_core::Result<_>>()?;
    let grand = deviations.iter().flatten().sum::<f64>() / total as f64;

    let between: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(d, m)| d.len() as f64 * (m - grand).powi(2))
        .sum();
    let within: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(d, m)| d.iter().map(|z| (z - m).powi(2)).sum::<f64>())
        .sum();

    let df1 = (k - 1) as f64;
    let df2 = (total - k) as f64;
    if within == 0.0 {
        if between == 0.0 {
            return Err(thesis_core::Error::Computation(
                "Levene statistic is undefined when every group is constant".to_string(),
            ));
        }
        return Ok(TestStatistic::new(f64::INFINITY, 0.0));
    }
    let w = (df2 / df1) * between / within;
    Ok(TestStatistic::new(w, f_upper_p(w, df1, df2)?))
}

/// Bartlett's test for equal variances
pub fn bartlett(groups: &[Vec<f64>]) -> thesis_core::Result<TestStatistic> {
    check_groups(groups)?;
    let k = groups.len() as f64;
    let vars: Vec<f64> = groups.iter().map(|g| variance(g)).collect::<thesis_core::Result<_>>()?;
    if vars.iter().any(|&v| v <= 0.0) {
        return Err(thesis_core::Error::Computation(
            "Bartlett's test requires positive variance in every group".to_string(),
        ));
    }
    let ns: Vec<f64> = groups.iter().map(|g| g.len() as f64).collect();
    let big_n: f64 = ns.iter().sum();
    let pooled = ns.iter().zip(&vars).map(|(n, v)| (n - 1.0) * v).sum::<f64>() / (big_n - k);
    let numer = (big_n - k) * pooled.ln()
        - ns.iter().zip(&vars).map(|(n, v)| (n - 1.0) * v.ln()).sum::<f64>();
    let denom = 1.0
        + (ns.iter().map(|n| 1.0 / (n - 1.0)).sum::<f64>() - 1.0 / (big_n - k)) / (3.0 * (k - 1.0));
    let t = numer / denom;
    Ok(TestStatistic::new(t, chi2_upper_p(t, k - 1.0)?))
}

/// Levene and Bartlett with per-group variances
///
/// Levene decides the verdict; Bartlett is reported alongside when it is
/// defined for the data.
#[instrument(skip(groups), fields(k = groups.len()))]
pub fn check_homogeneity(
    groups: &[Vec<f64>],
    group_names: Option<&[String]>,
    alpha: f64,
) -> Result<HomogeneityResult> {
    thesis_core::check_alpha(alpha)?;
    if let Some(names) = group_names {
        if names.len() != groups.len() {
            return Err(Error::InvalidInput(format!(
                "{} group names given for {} groups",
                names.len(),
                groups.len()
            )));
        }
    }
    let clean: Vec<Vec<f64>> = groups
        .iter()
        .map(|g| g.iter().copied().filter(|v| v.is_finite()).collect())
        .collect();

    let levene = SubTest::from_statistic(levene(&clean)?, alpha);
    let bartlett = match bartlett(&clean) {
        Ok(t) => Some(SubTest::from_statistic(t, alpha)),
        Err(e) => {
            debug!(error = %e, "bartlett omitted");
            None
        }
    };

    let group_variances: Vec<GroupVariance> = clean
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let var = variance(g).unwrap_or(0.0);
            GroupVariance {
                group: group_names
                    .map(|names| names[i].clone())
                    .unwrap_or_else(|| format!("Group {}", i + 1)),
                n: g.len(),
                variance: round4(var),
                std: round4(var.sqrt()),
            }
        })
        .collect();

    let positive: Vec<f64> = clean
        .iter()
        .filter_map(|g| variance(g).ok())
        .filter(|&v| v > 0.0)
        .collect();
    let variance_ratio = if positive.len() >= 2 {
        let max = positive.iter().copied().fold(f64::MIN, f64::max);
        let min = positive.iter().copied().fold(f64::MAX, f64::min);
        Some(round4(max / min))
    } else {
        None
    };

    let equal_variance = levene.assumption_met;
    Ok(HomogeneityResult {
        n_groups: clean.len(),
        levene,
        bartlett,
        group_variances,
        variance_ratio,
        variance_ratio_concern: variance_ratio.is_some_and(|r| r > VARIANCE_RATIO_CONCERN),
        equal_variance,
        recommendation: if equal_variance {
            Recommendation::Proceed
        } else {
            Recommendation::UseWelchOrNonparametric
        },
    })
}
