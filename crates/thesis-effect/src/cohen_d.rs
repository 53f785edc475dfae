//! Cohen's d effect size
//!
//! Cohen's d expresses the difference between two group means in units of
//! the pooled standard deviation.

use crate::{EffectSize, EffectSizeEstimator, EffectSizeType, TwoSampleEffectSize};
use thesis_core::{distributions, numeric, Error, Result};

/// Cohen's d effect size estimator
///
/// d = (mean₁ - mean₂) / s_pooled, with
/// s_pooled = sqrt(((n₁-1)s₁² + (n₂-1)s₂²) / (n₁+n₂-2)).
///
/// A zero pooled standard deviation yields d = 0 rather than an error.
#[derive(Debug, Clone, Copy)]
pub struct CohenD {
    /// Confidence level for the normal-approximation interval
    confidence_level: f64,
}

impl CohenD {
    /// Create a new Cohen's d estimator with a 95% interval
    pub fn new() -> Self {
        Self {
            confidence_level: 0.95,
        }
    }

    /// Use a different confidence level for the interval
    pub fn with_confidence_level(mut self, confidence_level: f64) -> Self {
        self.confidence_level = confidence_level;
        self
    }

    /// Pooled sample standard deviation of two groups
    pub fn pooled_std(group1: &[f64], group2: &[f64]) -> Result<f64> {
        let n1 = group1.len();
        let n2 = group2.len();
        if n1 + n2 < 3 || n1 == 0 || n2 == 0 {
            return Err(Error::InsufficientData {
                expected: 3,
                actual: n1 + n2,
            });
        }
        let ss1 = if n1 > 1 { numeric::variance(group1)? * (n1 - 1) as f64 } else { 0.0 };
        let ss2 = if n2 > 1 { numeric::variance(group2)? * (n2 - 1) as f64 } else { 0.0 };
        Ok(((ss1 + ss2) / (n1 + n2 - 2) as f64).sqrt())
    }

    /// Normal-approximation interval for d (Hedges & Olkin)
    pub fn interval(&self, d: f64, n1: usize, n2: usize) -> Result<(f64, f64)> {
        let n1 = n1 as f64;
        let n2 = n2 as f64;
        let se = ((n1 + n2) / (n1 * n2) + d * d / (2.0 * (n1 + n2))).sqrt();
        let z = distributions::normal_quantile((1.0 + self.confidence_level) / 2.0)?;
        Ok((d - z * se, d + z * se))
    }
}

impl Default for CohenD {
    fn default() -> Self {
        Self::new()
    }
}

impl TwoSampleEffectSize for CohenD {
    fn compute(&self, group1: &[f64], group2: &[f64]) -> Result<EffectSize> {
        if group1.is_empty() || group2.is_empty() {
            return Err(Error::InvalidInput(
                "Both groups must be non-empty".to_string(),
            ));
        }

        let pooled = Self::pooled_std(group1, group2)?;
        let d = if pooled == 0.0 {
            0.0
        } else {
            (numeric::mean(group1)? - numeric::mean(group2)?) / pooled
        };
        let (lower, upper) = self.interval(d, group1.len(), group2.len())?;

        Ok(EffectSize::new(
            d,
            EffectSizeType::StandardizedMeanDifference,
            Some((group1.len(), group2.len())),
        )
        .with_confidence_interval(lower, upper))
    }
}

impl EffectSizeEstimator for CohenD {
    fn effect_size_type(&self) -> EffectSizeType {
        EffectSizeType::StandardizedMeanDifference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EffectSizeInterpretation;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cohen_d_basic() {
        let group1 = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let group2 = vec![6.0, 7.0, 8.0, 9.0, 10.0];

        let effect = CohenD::new().compute(&group1, &group2).unwrap();

        // pooled sd = sqrt(2.5), mean difference -5
        assert_abs_diff_eq!(effect.magnitude, -5.0 / 2.5f64.sqrt(), epsilon = 1e-12);
        assert_eq!(effect.interpretation, EffectSizeInterpretation::Large);
        assert_eq!(effect.sample_sizes, Some((5, 5)));
    }

    #[test]
    fn test_cohen_d_interval() {
        let d = 0.5;
        let (lo, hi) = CohenD::new().interval(d, 20, 20).unwrap();
        let se = (40.0f64 / 400.0 + 0.25 / 80.0).sqrt();
        assert_abs_diff_eq!(hi - lo, 2.0 * 1.959_963_985 * se, epsilon = 1e-6);
        assert_abs_diff_eq!((lo + hi) / 2.0, d, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_pooled_std() {
        let effect = CohenD::new().compute(&[3.0, 3.0, 3.0], &[3.0, 3.0]).unwrap();
        assert_eq!(effect.magnitude, 0.0);
        assert_eq!(effect.interpretation, EffectSizeInterpretation::Negligible);
    }

    #[test]
    fn test_antisymmetric() {
        let a = [2.0, 4.0, 6.0, 5.0];
        let b = [1.0, 3.0, 2.0, 2.5, 1.5];
        let d_ab = CohenD::new().compute(&a, &b).unwrap().magnitude;
        let d_ba = CohenD::new().compute(&b, &a).unwrap().magnitude;
        assert_abs_diff_eq!(d_ab, -d_ba, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_group() {
        assert!(CohenD::new().compute(&[], &[1.0, 2.0]).is_err());
    }
}
