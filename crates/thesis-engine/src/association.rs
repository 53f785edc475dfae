//! Chi-square test of independence with Fisher's exact test for sparse 2×2
//! tables

use crate::record::{
    AnalysisResult, ContingencyTable, DegreesOfFreedom, EffectBlock, EffectLabel, EffectMetric,
    ExpectedCellCounts, TestDetails, Variables,
};
use crate::selector::TestSelector;
use crate::{Error, Result};
use std::collections::BTreeSet;
use thesis_core::distributions::{chi2_upper_p, ln_choose};
use thesis_core::{round4, round_to};
use thesis_data::Dataset;
use thesis_effect::{odds_ratio, phi, CramersV};
use tracing::debug;

/// Cross-tabulation of two label columns, rows and columns in sorted order
pub fn crosstab(dataset: &Dataset, variable1: &str, variable2: &str) -> Result<ContingencyTable> {
    let a = dataset.labels(variable1)?;
    let b = dataset.labels(variable2)?;
    let pairs: Vec<(String, String)> = a
        .into_iter()
        .zip(b)
        .filter_map(|(x, y)| Some((x?, y?)))
        .collect();
    let rows: Vec<String> = pairs
        .iter()
        .map(|(x, _)| x.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let cols: Vec<String> = pairs
        .iter()
        .map(|(_, y)| y.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut observed = vec![vec![0u64; cols.len()]; rows.len()];
    for (x, y) in &pairs {
        if let (Ok(i), Ok(j)) = (rows.binary_search(x), cols.binary_search(y)) {
            observed[i][j] += 1;
        }
    }
    Ok(ContingencyTable {
        row_labels: rows,
        column_labels: cols,
        observed,
        expected: Vec::new(),
    })
}

/// Expected counts under independence
pub fn expected_counts(observed: &[Vec<u64>]) -> Vec<Vec<f64>> {
    let n: u64 = observed.iter().flatten().sum();
    let col_count = observed.first().map_or(0, Vec::len);
    let row_sums: Vec<f64> = observed.iter().map(|r| r.iter().sum::<u64>() as f64).collect();
    let col_sums: Vec<f64> = (0..col_count)
        .map(|j| observed.iter().map(|r| r[j]).sum::<u64>() as f64)
        .collect();
    row_sums
        .iter()
        .map(|r| col_sums.iter().map(|c| r * c / n as f64).collect())
        .collect()
}

/// Pearson χ², with Yates' continuity correction when `yates` is set
pub fn chi_square(observed: &[Vec<u64>], expected: &[Vec<f64>], yates: bool) -> f64 {
    observed
        .iter()
        .flatten()
        .zip(expected.iter().flatten())
        .map(|(&o, &e)| {
            let diff = e - o as f64;
            let adjusted = if yates {
                diff.signum() * diff.abs().min(0.5)
            } else {
                0.0
            };
            let o = o as f64 + adjusted;
            (o - e).powi(2) / e
        })
        .sum()
}

/// Two-sided Fisher exact p-value of a 2×2 table
///
/// Sums the hypergeometric probabilities of every table with the same
/// margins that is no more likely than the observed one.
pub fn fisher_exact(table: [[u64; 2]; 2]) -> f64 {
    let [[a, b], [c, d]] = table;
    let row1 = a + b;
    let col1 = a + c;
    let n = a + b + c + d;
    let lo = col1.saturating_sub(c + d);
    let hi = row1.min(col1);
    let log_denom = ln_choose(n, col1);
    let prob = |x: u64| (ln_choose(row1, x) + ln_choose(n - row1, col1 - x) - log_denom).exp();

    let observed = prob(a);
    let p: f64 = (lo..=hi)
        .map(prob)
        .filter(|&q| q <= observed * (1.0 + 1e-7))
        .sum();
    p.min(1.0)
}

/// χ² test of independence on a contingency table
///
/// A 2×2 table with any expected count below 5 or any empty cell switches
/// to Fisher's exact test for the p-value and odds ratio; the statistic is
/// still the (Yates-corrected) χ². Cramér's V and phi use the uncorrected
/// χ².
pub fn independence(
    mut table: ContingencyTable,
    variable1: &str,
    variable2: &str,
    alpha: f64,
) -> Result<AnalysisResult> {
    let (r, c) = (table.row_labels.len(), table.column_labels.len());
    if r < 2 || c < 2 {
        return Err(Error::InvalidInput(format!(
            "Chi-square test requires at least 2 categories per variable, found {r}x{c}"
        )));
    }
    let n: u64 = table.observed.iter().flatten().sum();
    let expected = expected_counts(&table.observed);
    let dof = (r - 1) * (c - 1);
    let yates = dof == 1;

    let chi2 = chi_square(&table.observed, &expected, yates);
    let chi2_plain = chi_square(&table.observed, &expected, false);

    let min_expected = expected
        .iter()
        .flatten()
        .copied()
        .fold(f64::INFINITY, f64::min);
    let cells_below_5 = expected.iter().flatten().filter(|&&e| e < 5.0).count();
    let any_empty = table.observed.iter().flatten().any(|&o| o == 0);
    let fisher_recommended = cells_below_5 > 0;
    let is_2x2 = r == 2 && c == 2;
    let exact = is_2x2 && (fisher_recommended || any_empty);

    let (p, test_type, or) = if exact {
        let t = [
            [table.observed[0][0], table.observed[0][1]],
            [table.observed[1][0], table.observed[1][1]],
        ];
        let or = odds_ratio([
            [t[0][0] as f64, t[0][1] as f64],
            [t[1][0] as f64, t[1][1] as f64],
        ]);
        (fisher_exact(t), "Fisher's Exact Test", Some(round4(or)))
    } else {
        (
            chi2_upper_p(chi2, dof as f64)?,
            "Chi-square Test of Independence",
            None,
        )
    };
    debug!(chi2, dof, exact, "association test");

    let nf = n as f64;
    let v = CramersV::new().from_chi2(chi2_plain, nf, r, c)?;
    let mut effect = EffectBlock::new(
        EffectMetric::CramersV,
        round4(v.magnitude),
        EffectLabel::Magnitude(v.interpretation),
    );
    effect.phi = phi(chi2_plain, nf, r, c).map(round4);
    effect.odds_ratio = or;

    table.expected = expected
        .iter()
        .map(|row| row.iter().map(|&e| round_to(e, 2)).collect())
        .collect();

    Ok(AnalysisResult {
        test_type: test_type.to_string(),
        selector: TestSelector::Association,
        statistic: round4(chi2),
        degrees_of_freedom: DegreesOfFreedom::Scalar(dof),
        p_value: round4(p),
        significant: p < alpha,
        alpha,
        sample_size: n as usize,
        effect_size: effect,
        variables: Variables::pair(variable1, variable2),
        details: TestDetails::Association {
            contingency_table: table,
            expected_cell_counts: ExpectedCellCounts {
                min_expected: round_to(min_expected, 2),
                cells_below_5,
                fisher_recommended,
            },
            exact_test: exact,
            yates_corrected: yates,
        },
        warnings: Vec::new(),
    })
}
