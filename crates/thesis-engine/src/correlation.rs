//! Pearson and Spearman correlation tests

use crate::record::{
    AnalysisResult, DegreesOfFreedom, EffectBlock, EffectLabel, EffectMetric, TestDetails,
    Variables,
};
use crate::selector::{CorrelationMethod, TestSelector};
use crate::{Error, Result};
use thesis_core::distributions::t_two_sided_p;
use thesis_core::round4;
use thesis_effect::{
    fisher_z_interval, CorrelationDirection, CorrelationStrength, PairedEffectSize,
    PearsonCorrelation, SpearmanCorrelation,
};
use tracing::debug;

/// Correlation between two complete, aligned columns
///
/// The p-value comes from `t = r·sqrt((n-2)/(1-r²))` on `n - 2` df for both
/// methods; the interval is the Fisher z interval at 95%.
pub fn correlate(
    x: &[f64],
    y: &[f64],
    method: CorrelationMethod,
    variable1: &str,
    variable2: &str,
    alpha: f64,
) -> Result<AnalysisResult> {
    let n = x.len();
    if n < 3 {
        return Err(Error::InvalidInput(format!(
            "Correlation requires at least 3 complete pairs, found {n}"
        )));
    }
    let effect = match method {
        CorrelationMethod::Pearson => PearsonCorrelation::new().compute_paired(x, y)?,
        CorrelationMethod::Spearman => SpearmanCorrelation::new().compute_paired(x, y)?,
    };
    let r = effect.magnitude.clamp(-1.0, 1.0);
    let df = (n - 2) as f64;
    let t = if r.abs() < 1.0 {
        r * (df / (1.0 - r * r)).sqrt()
    } else {
        r.signum() * f64::INFINITY
    };
    let p = t_two_sided_p(t, df)?;
    let ci = if r.abs() < 1.0 {
        fisher_z_interval(r, n, 1.96)?
    } else {
        (r, r)
    };
    debug!(r, n, ?method, "correlation");

    let test_type = match method {
        CorrelationMethod::Pearson => "Pearson Correlation",
        CorrelationMethod::Spearman => "Spearman Rank Correlation",
    };
    let ci_95 = (round4(ci.0), round4(ci.1));
    let mut block = EffectBlock::new(
        EffectMetric::R,
        round4(r),
        EffectLabel::Magnitude(effect.interpretation),
    );
    block.ci_95 = Some(ci_95);

    Ok(AnalysisResult {
        test_type: test_type.to_string(),
        selector: TestSelector::Correlation,
        statistic: round4(r),
        degrees_of_freedom: DegreesOfFreedom::Scalar(n - 2),
        p_value: round4(p),
        significant: p < alpha,
        alpha,
        sample_size: n,
        effect_size: block,
        variables: Variables::pair(variable1, variable2),
        details: TestDetails::Correlation {
            r: round4(r),
            r_squared: round4(r * r),
            ci_95,
            strength: CorrelationStrength::from_r(r),
            direction: CorrelationDirection::from_r(r),
        },
        warnings: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_pearson_strong_positive() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [1.1, 2.3, 2.9, 4.2, 4.8, 6.1];
        let r = correlate(&x, &y, CorrelationMethod::Pearson, "x", "y", 0.05).unwrap();
        assert!(r.statistic > 0.99);
        assert!(r.significant);
        assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::Scalar(4));
        let TestDetails::Correlation {
            strength,
            direction,
            ci_95,
            ..
        } = r.details
        else {
            panic!("wrong details");
        };
        assert_eq!(strength, CorrelationStrength::VeryStrong);
        assert_eq!(direction, CorrelationDirection::Positive);
        assert!(ci_95.0 < r.statistic && r.statistic < ci_95.1);
    }

    #[test]
    fn test_spearman_on_monotone_data() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 4.0, 9.0, 16.0, 100.0];
        let r = correlate(&x, &y, CorrelationMethod::Spearman, "x", "y", 0.05).unwrap();
        assert_eq!(r.test_type, "Spearman Rank Correlation");
        assert_abs_diff_eq!(r.statistic, 1.0, epsilon = 1e-12);
        assert_eq!(r.p_value, 0.0);
    }

    #[test]
    fn test_too_few_pairs() {
        let err = correlate(&[1.0, 2.0], &[2.0, 1.0], CorrelationMethod::Pearson, "x", "y", 0.05)
            .unwrap_err();
        assert!(err.to_string().contains("at least 3"));
    }
}
