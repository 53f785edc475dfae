//! Correlation-based effect size measures

use crate::{EffectSize, EffectSizeEstimator, EffectSizeType, PairedEffectSize};
use serde::{Deserialize, Serialize};
use std::fmt;
use thesis_core::{numeric, Error, Result};

/// Pearson product-moment correlation
#[derive(Debug, Clone, Copy, Default)]
pub struct PearsonCorrelation;

impl PearsonCorrelation {
    pub fn new() -> Self {
        Self
    }
}

impl PairedEffectSize for PearsonCorrelation {
    fn compute_paired(&self, x: &[f64], y: &[f64]) -> Result<EffectSize> {
        let r = numeric::pearson(x, y)?;
        Ok(EffectSize::new(r, EffectSizeType::Correlation, Some((x.len(), y.len()))))
    }
}

impl EffectSizeEstimator for PearsonCorrelation {
    fn effect_size_type(&self) -> EffectSizeType {
        EffectSizeType::Correlation
    }
}

/// Spearman rank correlation (Pearson r of average ranks)
#[derive(Debug, Clone, Copy, Default)]
pub struct SpearmanCorrelation;

impl SpearmanCorrelation {
    pub fn new() -> Self {
        Self
    }
}

impl PairedEffectSize for SpearmanCorrelation {
    fn compute_paired(&self, x: &[f64], y: &[f64]) -> Result<EffectSize> {
        if x.len() != y.len() {
            return Err(Error::size_mismatch(x.len(), y.len(), "spearman correlation"));
        }
        let r = numeric::pearson(&numeric::ranks(x), &numeric::ranks(y))?;
        Ok(EffectSize::new(r, EffectSizeType::Correlation, Some((x.len(), y.len()))))
    }
}

impl EffectSizeEstimator for SpearmanCorrelation {
    fn effect_size_type(&self) -> EffectSizeType {
        EffectSizeType::Correlation
    }
}

/// Rank-biserial correlation from a Mann-Whitney U statistic
///
/// r = 1 - 2U / (n₁ n₂)
#[derive(Debug, Clone, Copy, Default)]
pub struct RankBiserial;

impl RankBiserial {
    pub fn new() -> Self {
        Self
    }

    pub fn from_u(&self, u: f64, n1: usize, n2: usize) -> Result<EffectSize> {
        if n1 == 0 || n2 == 0 {
            return Err(Error::InvalidInput(
                "Both groups must be non-empty".to_string(),
            ));
        }
        let r = 1.0 - 2.0 * u / (n1 * n2) as f64;
        Ok(EffectSize::new(r, EffectSizeType::Correlation, Some((n1, n2))))
    }
}

impl EffectSizeEstimator for RankBiserial {
    fn effect_size_type(&self) -> EffectSizeType {
        EffectSizeType::Correlation
    }
}

/// Confidence interval for r via the Fisher z transform
///
/// z = atanh(r), se = 1/sqrt(n - 3), bounds tanh(z ± crit·se).
pub fn fisher_z_interval(r: f64, n: usize, crit: f64) -> Result<(f64, f64)> {
    if n < 3 {
        return Err(Error::InsufficientData {
            expected: 3,
            actual: n,
        });
    }
    let z = r.atanh();
    let se = 1.0 / ((n - 3) as f64).sqrt();
    Ok(((z - crit * se).tanh(), (z + crit * se).tanh()))
}

/// Verbal strength of a correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Negligible,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl CorrelationStrength {
    pub fn from_r(r: f64) -> Self {
        let abs_r = r.abs();
        if abs_r.is_nan() || abs_r < 0.1 {
            Self::Negligible
        } else if abs_r < 0.3 {
            Self::Weak
        } else if abs_r < 0.5 {
            Self::Moderate
        } else if abs_r < 0.7 {
            Self::Strong
        } else {
            Self::VeryStrong
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negligible => "negligible",
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
            Self::VeryStrong => "very strong",
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sign of a correlation; zero counts as negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

impl CorrelationDirection {
    pub fn from_r(r: f64) -> Self {
        if r > 0.0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for CorrelationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
