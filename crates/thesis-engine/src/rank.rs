//! Rank-based tests: Mann-Whitney U and Kruskal-Wallis H

use crate::groups::{rank_group_statistics, Groups};
use crate::record::{
    AnalysisResult, DegreesOfFreedom, EffectBlock, EffectLabel, EffectMetric, TestDetails,
    Variables,
};
use crate::selector::TestSelector;
use crate::{Error, Result};
use thesis_core::distributions::{chi2_upper_p, normal_sf};
use thesis_core::numeric::{ranks, tie_counts};
use thesis_core::round4;
use thesis_effect::{EpsilonSquared, RankBiserial};
use tracing::debug;

/// Largest group size for which the exact U distribution is used
pub const EXACT_MAX_N: usize = 8;

/// Σ (t³ - t) over tie groups
fn tie_term(pooled: &[f64]) -> f64 {
    tie_counts(pooled)
        .into_iter()
        .map(|t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum()
}

/// Number of rank arrangements giving each value of U, for U in 0..=n1·n2
fn u_distribution(n1: usize, n2: usize) -> Vec<f64> {
    // ways[j][u]: arrangements of i items of sample 1 among j items of
    // sample 2 with statistic u, built up over i
    let max_u = n1 * n2;
    let mut ways = vec![vec![0.0; max_u + 1]; n2 + 1];
    for row in ways.iter_mut() {
        row[0] = 1.0;
    }
    for _ in 1..=n1 {
        let mut next = vec![vec![0.0; max_u + 1]; n2 + 1];
        next[0][0] = 1.0;
        for j in 1..=n2 {
            for u in 0..=max_u {
                // the largest observation belongs to sample 1 (adds j) or 2
                let from_one = if u >= j { ways[j][u - j] } else { 0.0 };
                next[j][u] = from_one + next[j - 1][u];
            }
        }
        ways = next;
    }
    ways.swap_remove(n2)
}

/// Two-sided exact p-value, 2·P(U ≥ max(U1, U2)) capped at 1
pub fn exact_p(u1: f64, n1: usize, n2: usize) -> f64 {
    let counts = u_distribution(n1, n2);
    let total: f64 = counts.iter().sum();
    let u_max = u1.max((n1 * n2) as f64 - u1);
    let tail: f64 = counts
        .iter()
        .enumerate()
        .filter(|&(u, _)| u as f64 >= u_max)
        .map(|(_, c)| c)
        .sum();
    (2.0 * tail / total).min(1.0)
}

/// Mann-Whitney U test of two independent groups
///
/// The statistic is U of the first group. Small samples without ties use
/// the exact null distribution; otherwise the normal approximation with
/// tie and continuity corrections.
pub fn mann_whitney(
    groups: &Groups,
    group: &str,
    outcome: &str,
    alpha: f64,
) -> Result<AnalysisResult> {
    let (g1, g2) = groups.expect_two("Mann-Whitney U")?;
    let (n1, n2) = (g1.len(), g2.len());
    if n1 == 0 || n2 == 0 {
        return Err(Error::InvalidInput(
            "Mann-Whitney U requires observations in both groups".to_string(),
        ));
    }
    let pooled: Vec<f64> = g1.iter().chain(g2).copied().collect();
    let r = ranks(&pooled);
    let r1: f64 = r[..n1].iter().sum();
    let (nf1, nf2) = (n1 as f64, n2 as f64);
    let u1 = r1 - nf1 * (nf1 + 1.0) / 2.0;
    let ties = tie_term(&pooled);

    let exact = n1 <= EXACT_MAX_N && n2 <= EXACT_MAX_N && ties == 0.0;
    let p = if exact {
        exact_p(u1, n1, n2)
    } else {
        let n = nf1 + nf2;
        let mu = nf1 * nf2 / 2.0;
        let sigma = (nf1 * nf2 / 12.0 * ((n + 1.0) - ties / (n * (n - 1.0)))).sqrt();
        if !(sigma > 0.0) {
            return Err(Error::InvalidInput(
                "Mann-Whitney U is undefined when all values are identical".to_string(),
            ));
        }
        let u_max = u1.max(nf1 * nf2 - u1);
        let z = (u_max - mu - 0.5) / sigma;
        (2.0 * normal_sf(z)).min(1.0)
    };
    debug!(u1, exact, p, "mann-whitney");

    let rb = RankBiserial::new().from_u(u1, n1, n2)?;
    Ok(AnalysisResult {
        test_type: "Mann-Whitney U Test".to_string(),
        selector: TestSelector::RankTwoSample,
        statistic: round4(u1),
        degrees_of_freedom: DegreesOfFreedom::None,
        p_value: round4(p),
        significant: p < alpha,
        alpha,
        sample_size: n1 + n2,
        effect_size: EffectBlock::new(
            EffectMetric::RankBiserialR,
            round4(rb.magnitude),
            EffectLabel::Magnitude(rb.interpretation),
        ),
        variables: Variables::grouped(group, outcome, groups.names.clone()),
        details: TestDetails::RankTwoSample {
            exact,
            group_statistics: vec![
                rank_group_statistics(&groups.names[0], g1)?,
                rank_group_statistics(&groups.names[1], g2)?,
            ],
        },
        warnings: Vec::new(),
    })
}

/// Kruskal-Wallis H test over three or more groups
pub fn kruskal_wallis(
    groups: &Groups,
    group: &str,
    outcome: &str,
    alpha: f64,
) -> Result<AnalysisResult> {
    if groups.len() < 3 {
        return Err(Error::InvalidInput(
            "Kruskal-Wallis requires 3 or more groups. Use Mann-Whitney U for 2 groups."
                .to_string(),
        ));
    }
    if groups.values.iter().any(Vec::is_empty) {
        return Err(Error::InvalidInput(
            "Kruskal-Wallis requires observations in every group".to_string(),
        ));
    }
    let pooled: Vec<f64> = groups.values.iter().flatten().copied().collect();
    let n = pooled.len();
    let nf = n as f64;
    let r = ranks(&pooled);

    let mut offset = 0;
    let mut h = 0.0;
    for g in &groups.values {
        let rank_sum: f64 = r[offset..offset + g.len()].iter().sum();
        h += rank_sum * rank_sum / g.len() as f64;
        offset += g.len();
    }
    h = 12.0 / (nf * (nf + 1.0)) * h - 3.0 * (nf + 1.0);
    let correction = 1.0 - tie_term(&pooled) / (nf * nf * nf - nf);
    if correction <= 0.0 {
        return Err(Error::InvalidInput(
            "Kruskal-Wallis is undefined when all values are identical".to_string(),
        ));
    }
    h /= correction;
    let k = groups.len();
    let p = chi2_upper_p(h, (k - 1) as f64)?;
    debug!(h, k, n, "kruskal-wallis");

    let eps = EpsilonSquared::new().from_h(h, n)?;
    let group_statistics = groups
        .names
        .iter()
        .zip(&groups.values)
        .map(|(name, g)| rank_group_statistics(name, g))
        .collect::<Result<Vec<_>>>()?;

    Ok(AnalysisResult {
        test_type: "Kruskal-Wallis H Test".to_string(),
        selector: TestSelector::RankKGroup,
        statistic: round4(h),
        degrees_of_freedom: DegreesOfFreedom::Scalar(k - 1),
        p_value: round4(p),
        significant: p < alpha,
        alpha,
        sample_size: n,
        effect_size: EffectBlock::new(
            EffectMetric::EpsilonSquared,
            round4(eps.magnitude),
            EffectLabel::Magnitude(eps.interpretation),
        ),
        variables: Variables::grouped(group, outcome, groups.names.clone()),
        details: TestDetails::RankKGroup { group_statistics },
        warnings: Vec::new(),
    })
}
