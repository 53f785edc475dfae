//! Independent and paired two-sample t-tests

use crate::groups::{group_statistics, Groups};
use crate::record::{
    AnalysisResult, DegreesOfFreedom, EffectBlock, EffectLabel, EffectMetric, GroupNormality,
    MeanDifference, TestDetails, Variables,
};
use crate::selector::TestSelector;
use crate::{Error, Result};
use thesis_assumptions::homogeneity::levene;
use thesis_assumptions::normality::{shapiro_wilk, SHAPIRO_MAX_N, SHAPIRO_MIN_N};
use thesis_assumptions::SubTest;
use thesis_core::distributions::{t_quantile, t_two_sided_p};
use thesis_core::numeric::{mean, std_dev, variance};
use thesis_core::round4;
use thesis_effect::{CohenD, TwoSampleEffectSize};
use tracing::debug;

pub const PAIRING_WARNING: &str =
    "Pairs are matched by row order within each group; no subject identifier is used";

fn rounded_pair((a, b): (f64, f64)) -> (f64, f64) {
    (round4(a), round4(b))
}

fn group_normality(names: &[String], groups: [&[f64]; 2], alpha: f64) -> Vec<GroupNormality> {
    names
        .iter()
        .zip(groups)
        .map(|(name, g)| GroupNormality {
            group: name.clone(),
            shapiro_wilk: if (SHAPIRO_MIN_N..=SHAPIRO_MAX_N).contains(&g.len()) {
                shapiro_wilk(g)
                    .ok()
                    .map(|t| SubTest::from_statistic(t, alpha))
            } else {
                None
            },
        })
        .collect()
}

/// Cohen's d with its interval, labelled on the d scale
fn cohen_block(g1: &[f64], g2: &[f64]) -> Result<EffectBlock> {
    let d = CohenD::new().compute(g1, g2)?;
    let mut block = EffectBlock::new(
        EffectMetric::CohensD,
        round4(d.magnitude),
        EffectLabel::Magnitude(d.interpretation),
    );
    block.ci_95 = d.confidence_interval.map(rounded_pair);
    Ok(block)
}

/// Independent samples t-test, pooled or Welch by a Levene gate
///
/// The reported df is always `n1 + n2 - 2`; when Welch is chosen its
/// Satterthwaite df drives the p-value and is reported alongside.
pub fn independent_t(
    groups: &Groups,
    group: &str,
    outcome: &str,
    alpha: f64,
) -> Result<AnalysisResult> {
    let (g1, g2) = groups.expect_two("T-test")?;
    let (n1, n2) = (g1.len(), g2.len());
    if n1 < 2 || n2 < 2 {
        return Err(Error::InvalidInput(
            "T-test requires at least 2 observations per group".to_string(),
        ));
    }

    // an undefined Levene statistic falls back to Welch
    let lev = levene(&[g1.to_vec(), g2.to_vec()]).ok();
    let equal_var = lev.is_some_and(|l| l.holds(alpha));
    let (v1, v2) = (variance(g1)?, variance(g2)?);
    if v1 == 0.0 && v2 == 0.0 {
        return Err(Error::InvalidInput(
            "T-test is undefined when both groups have zero variance".to_string(),
        ));
    }
    let (nf1, nf2) = (n1 as f64, n2 as f64);
    let diff = mean(g1)? - mean(g2)?;
    let df_pooled = nf1 + nf2 - 2.0;

    let (t, df_test, welch_df) = if equal_var {
        let sp2 = ((nf1 - 1.0) * v1 + (nf2 - 1.0) * v2) / df_pooled;
        (diff / (sp2 * (1.0 / nf1 + 1.0 / nf2)).sqrt(), df_pooled, None)
    } else {
        let (a, b) = (v1 / nf1, v2 / nf2);
        let df = (a + b).powi(2) / (a * a / (nf1 - 1.0) + b * b / (nf2 - 1.0));
        (diff / (a + b).sqrt(), df, Some(round4(df)))
    };
    let p = t_two_sided_p(t, df_test)?;
    debug!(t, df_test, equal_var, "independent t-test");

    let se_diff = (v1 / nf1 + v2 / nf2).sqrt();
    let crit = t_quantile(0.975, df_pooled)?;

    Ok(AnalysisResult {
        test_type: if equal_var {
            "Independent Samples t-test".to_string()
        } else {
            "Independent Samples t-test (Welch's)".to_string()
        },
        selector: TestSelector::TwoSample,
        statistic: round4(t),
        degrees_of_freedom: DegreesOfFreedom::Scalar(n1 + n2 - 2),
        p_value: round4(p),
        significant: p < alpha,
        alpha,
        sample_size: n1 + n2,
        effect_size: cohen_block(g1, g2)?,
        variables: Variables::grouped(group, outcome, groups.names.clone()),
        details: TestDetails::TwoSample {
            equal_variance: equal_var,
            levene: lev.map(|l| SubTest::from_statistic(l, alpha)),
            welch_df,
            mean_difference: MeanDifference {
                value: round4(diff),
                ci_95: rounded_pair((diff - crit * se_diff, diff + crit * se_diff)),
            },
            group_statistics: vec![
                group_statistics(&groups.names[0], g1)?,
                group_statistics(&groups.names[1], g2)?,
            ],
            normality: group_normality(&groups.names, [g1, g2], alpha),
        },
        warnings: Vec::new(),
    })
}

/// Paired samples t-test on positionally aligned group values
pub fn paired_t(groups: &Groups, group: &str, outcome: &str, alpha: f64) -> Result<AnalysisResult> {
    let (g1, g2) = groups.expect_two("Paired t-test")?;
    if g1.len() != g2.len() {
        return Err(Error::InvalidInput(
            "Paired t-test requires equal sample sizes".to_string(),
        ));
    }
    let n = g1.len();
    if n < 2 {
        return Err(Error::InvalidInput(
            "Paired t-test requires at least 2 pairs".to_string(),
        ));
    }

    let diffs: Vec<f64> = g1.iter().zip(g2).map(|(a, b)| a - b).collect();
    let mean_d = mean(&diffs)?;
    let sd_d = std_dev(&diffs)?;
    if sd_d == 0.0 {
        return Err(Error::InvalidInput(
            "Paired t-test is undefined when all differences are equal".to_string(),
        ));
    }
    let se = sd_d / (n as f64).sqrt();
    let t = mean_d / se;
    let df = (n - 1) as f64;
    let p = t_two_sided_p(t, df)?;
    let crit = t_quantile(0.975, df)?;
    debug!(t, df, "paired t-test");

    Ok(AnalysisResult {
        test_type: "Paired Samples t-test".to_string(),
        selector: TestSelector::Paired,
        statistic: round4(t),
        degrees_of_freedom: DegreesOfFreedom::Scalar(n - 1),
        p_value: round4(p),
        significant: p < alpha,
        alpha,
        sample_size: n,
        effect_size: cohen_block(g1, g2)?,
        variables: Variables::grouped(group, outcome, groups.names.clone()),
        details: TestDetails::Paired {
            mean_difference: MeanDifference {
                value: round4(mean_d),
                ci_95: rounded_pair((mean_d - crit * se, mean_d + crit * se)),
            },
            group_statistics: vec![
                group_statistics(&groups.names[0], g1)?,
                group_statistics(&groups.names[1], g2)?,
            ],
            normality: group_normality(&groups.names, [g1, g2], alpha),
        },
        warnings: vec![PAIRING_WARNING.to_string()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use thesis_effect::EffectSizeInterpretation;

    fn groups(a: Vec<f64>, b: Vec<f64>) -> Groups {
        Groups::from_parts(vec!["A".into(), "B".into()], vec![a, b]).unwrap()
    }

    #[test]
    fn test_pooled_t_closed_form() {
        let g = groups(
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![6.0, 7.0, 8.0, 9.0, 10.0],
        );
        let r = independent_t(&g, "group", "score", 0.05).unwrap();
        assert_eq!(r.test_type, "Independent Samples t-test");
        assert_abs_diff_eq!(r.statistic, -5.0, epsilon = 1e-12);
        assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::Scalar(8));
        // 2 * P(T_8 > 5)
        assert_abs_diff_eq!(r.p_value, 0.0011, epsilon = 1e-12);
        assert!(r.significant);
        // pooled sd = sqrt(2.5)
        assert_abs_diff_eq!(r.effect_size.value, round4(-5.0 / 2.5f64.sqrt()), epsilon = 1e-12);
        assert_eq!(
            r.effect_size.interpretation,
            EffectLabel::Magnitude(EffectSizeInterpretation::Large)
        );
    }

    #[test]
    fn test_welch_chosen_for_unequal_spread() {
        let a: Vec<f64> = (0..30).map(|i| (i % 5) as f64).collect();
        let b: Vec<f64> = (0..30).map(|i| (i % 5) as f64 * 10.0 + 1.0).collect();
        let r = independent_t(&groups(a, b), "g", "y", 0.05).unwrap();
        assert!(r.test_type.contains("Welch"));
        assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::Scalar(58));
        let TestDetails::TwoSample {
            equal_variance,
            welch_df,
            ..
        } = r.details
        else {
            panic!("wrong details");
        };
        assert!(!equal_variance);
        assert!(welch_df.unwrap() < 58.0);
    }

    #[test]
    fn test_three_groups_rejected() {
        let g = Groups::from_parts(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
        )
        .unwrap();
        let err = independent_t(&g, "g", "y", 0.05).unwrap_err();
        assert_eq!(err.to_string(), "T-test requires exactly 2 groups, found 3");
    }

    #[test]
    fn test_paired_uses_differences() {
        let g = groups(vec![10.0, 12.0, 9.0, 14.0], vec![8.0, 11.0, 9.0, 10.0]);
        let r = paired_t(&g, "time", "score", 0.05).unwrap();
        // differences 2, 1, 0, 4: mean 1.75, sd sqrt(2.9167)
        let t = 1.75 / (35.0f64 / 12.0).sqrt() * 2.0;
        assert_abs_diff_eq!(r.statistic, round4(t), epsilon = 1e-12);
        assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::Scalar(3));
        assert_eq!(r.warnings, vec![PAIRING_WARNING.to_string()]);
    }

    #[test]
    fn test_paired_requires_equal_sizes() {
        let g = groups(vec![1.0, 2.0, 3.0], vec![1.0, 2.0]);
        let err = paired_t(&g, "g", "y", 0.05).unwrap_err();
        assert_eq!(err.to_string(), "Paired t-test requires equal sample sizes");
    }
}
