//! One-way ANOVA with Tukey HSD post-hoc comparisons

use crate::groups::{group_statistics, Groups};
use crate::record::{
    AnalysisResult, DegreesOfFreedom, EffectBlock, EffectLabel, EffectMetric, PairwiseComparison,
    PostHoc, SumsOfSquaresBlock, TestDetails, Variables,
};
use crate::selector::TestSelector;
use crate::{Error, Result};
use thesis_assumptions::homogeneity::levene;
use thesis_assumptions::SubTest;
use thesis_core::distributions::{f_upper_p, studentized_range_quantile, studentized_range_sf};
use thesis_core::numeric::mean;
use thesis_core::round4;
use thesis_effect::{EffectSizeInterpretation, EffectSizeType, SumsOfSquares};
use tracing::{debug, warn};

/// Tukey-Kramer comparisons of every pair of groups
///
/// Groups are compared in sorted label order and `mean_diff` is the second
/// group's mean minus the first's.
pub fn tukey_hsd(groups: &Groups, ms_within: f64, df_within: f64, alpha: f64) -> Result<PostHoc> {
    let k = groups.len();
    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| groups.names[a].cmp(&groups.names[b]));
    let means: Vec<f64> = groups
        .values
        .iter()
        .map(|g| mean(g))
        .collect::<thesis_core::Result<_>>()?;
    let q_crit = studentized_range_quantile(1.0 - alpha, k, df_within)?;

    let mut comparisons = Vec::with_capacity(k * (k - 1) / 2);
    for (pos, &i) in order.iter().enumerate() {
        for &j in &order[pos + 1..] {
            let diff = means[j] - means[i];
            let ni = groups.values[i].len() as f64;
            let nj = groups.values[j].len() as f64;
            let se = (ms_within / 2.0 * (1.0 / ni + 1.0 / nj)).sqrt();
            let (p_adj, half_width) = if se > 0.0 {
                (studentized_range_sf(diff.abs() / se, k, df_within)?, q_crit * se)
            } else {
                (if diff == 0.0 { 1.0 } else { 0.0 }, 0.0)
            };
            comparisons.push(PairwiseComparison {
                group1: groups.names[i].clone(),
                group2: groups.names[j].clone(),
                mean_diff: round4(diff),
                p_adj: round4(p_adj),
                ci_lower: round4(diff - half_width),
                ci_upper: round4(diff + half_width),
                significant: p_adj < alpha,
            });
        }
    }
    Ok(PostHoc {
        method: TUKEY_METHOD.to_string(),
        comparisons,
    })
}

const TUKEY_METHOD: &str = "Tukey HSD";

/// One-way ANOVA over three or more groups
pub fn one_way(groups: &Groups, group: &str, outcome: &str, alpha: f64) -> Result<AnalysisResult> {
    if groups.len() < 3 {
        return Err(Error::InvalidInput(
            "ANOVA requires 3 or more groups. Use t-test for 2 groups.".to_string(),
        ));
    }
    let slices = groups.slices();
    let ss = SumsOfSquares::from_groups(&slices)?;
    let (k, n) = (ss.k, ss.n);
    if n <= k {
        return Err(Error::InvalidInput(format!(
            "ANOVA needs more observations ({n}) than groups ({k})"
        )));
    }
    let df_between = (k - 1) as f64;
    let df_within = (n - k) as f64;
    let ms_within = ss.ms_within();

    let f = if ss.within > 0.0 {
        ss.ms_between() / ms_within
    } else if ss.between > 0.0 {
        f64::INFINITY
    } else {
        return Err(Error::InvalidInput(
            "ANOVA is undefined when every observation is equal".to_string(),
        ));
    };
    let p = f_upper_p(f, df_between, df_within)?;
    debug!(f, k, n, "one-way anova");

    let eta = ss.eta_squared();
    let mut effect = EffectBlock::new(
        EffectMetric::EtaSquared,
        round4(eta),
        EffectLabel::Magnitude(EffectSizeInterpretation::from_magnitude(
            eta,
            EffectSizeType::VarianceExplained,
        )),
    );
    effect.omega_squared = Some(round4(ss.omega_squared()));

    let group_stats = groups
        .names
        .iter()
        .zip(&groups.values)
        .map(|(name, g)| group_statistics(name, g))
        .collect::<Result<Vec<_>>>()?;
    let levene = levene(&groups.values)
        .ok()
        .map(|t| SubTest::from_statistic(t, alpha));

    // the omnibus result stands even when the post-hoc cannot be computed
    let mut warnings = Vec::new();
    let posthoc = tukey_hsd(groups, ms_within, df_within, alpha).unwrap_or_else(|e| {
        warn!(error = %e, "post-hoc comparisons skipped");
        warnings.push(format!("Tukey HSD comparisons not computed: {e}"));
        PostHoc {
            method: TUKEY_METHOD.to_string(),
            comparisons: Vec::new(),
        }
    });

    Ok(AnalysisResult {
        test_type: "One-way ANOVA".to_string(),
        selector: TestSelector::KGroup,
        statistic: round4(f),
        degrees_of_freedom: DegreesOfFreedom::Split {
            between: k - 1,
            within: n - k,
        },
        p_value: round4(p),
        significant: p < alpha,
        alpha,
        sample_size: n,
        effect_size: effect,
        variables: Variables::grouped(group, outcome, groups.names.clone()),
        details: TestDetails::KGroup {
            sums_of_squares: SumsOfSquaresBlock {
                between: round4(ss.between),
                within: round4(ss.within),
                total: round4(ss.total),
            },
            group_statistics: group_stats,
            posthoc,
            levene,
        },
        warnings,
    })
}
