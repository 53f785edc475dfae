//! Variance explained effect size measures (eta-squared, omega-squared,
//! epsilon-squared)

use crate::{EffectSize, EffectSizeEstimator, EffectSizeType, GroupedEffectSize};
use serde::{Deserialize, Serialize};
use thesis_core::{numeric, Error, Result};

/// One-way decomposition of the total sum of squares
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SumsOfSquares {
    pub between: f64,
    pub within: f64,
    pub total: f64,
    /// Number of groups
    pub k: usize,
    /// Total number of observations
    pub n: usize,
}

impl SumsOfSquares {
    /// Decompose the variation of `groups` around the grand mean
    pub fn from_groups(groups: &[&[f64]]) -> Result<Self> {
        if groups.is_empty() || groups.iter().any(|g| g.is_empty()) {
            return Err(Error::InvalidInput(
                "All groups must be non-empty".to_string(),
            ));
        }

        let n: usize = groups.iter().map(|g| g.len()).sum();
        let grand_mean =
            groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n as f64;

        let mut between = 0.0;
        let mut within = 0.0;
        for g in groups {
            let m = numeric::mean(g)?;
            between += g.len() as f64 * (m - grand_mean).powi(2);
            within += numeric::sum_of_squares(g, m);
        }
        let total: f64 = groups
            .iter()
            .map(|g| numeric::sum_of_squares(g, grand_mean))
            .sum();

        Ok(Self {
            between,
            within,
            total,
            k: groups.len(),
            n,
        })
    }

    /// Mean square within groups
    pub fn ms_within(&self) -> f64 {
        self.within / (self.n - self.k) as f64
    }

    /// Mean square between groups
    pub fn ms_between(&self) -> f64 {
        self.between / (self.k - 1) as f64
    }

    /// η² = SS_between / SS_total (0 when there is no variation)
    pub fn eta_squared(&self) -> f64 {
        if self.total > 0.0 {
            self.between / self.total
        } else {
            0.0
        }
    }

    /// ω² = (SS_between - (k-1) MS_within) / (SS_total + MS_within)
    pub fn omega_squared(&self) -> f64 {
        let ms_within = self.ms_within();
        let denominator = self.total + ms_within;
        if denominator > 0.0 {
            (self.between - (self.k - 1) as f64 * ms_within) / denominator
        } else {
            0.0
        }
    }
}

fn check_groups(groups: &[&[f64]]) -> Result<()> {
    if groups.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "Need at least 2 groups, got {}",
            groups.len()
        )));
    }
    let n: usize = groups.iter().map(|g| g.len()).sum();
    if n <= groups.len() {
        return Err(Error::InsufficientData {
            expected: groups.len() + 1,
            actual: n,
        });
    }
    Ok(())
}

/// Eta-squared (η²) effect size estimator
///
/// The proportion of total variance explained by group membership.
#[derive(Debug, Clone, Copy, Default)]
pub struct EtaSquared;

impl EtaSquared {
    pub fn new() -> Self {
        Self
    }
}

impl GroupedEffectSize for EtaSquared {
    fn compute_groups(&self, groups: &[&[f64]]) -> Result<EffectSize> {
        check_groups(groups)?;
        let ss = SumsOfSquares::from_groups(groups)?;
        Ok(EffectSize::new(
            ss.eta_squared(),
            EffectSizeType::VarianceExplained,
            None,
        ))
    }
}

impl EffectSizeEstimator for EtaSquared {
    fn effect_size_type(&self) -> EffectSizeType {
        EffectSizeType::VarianceExplained
    }

    fn is_symmetric(&self) -> bool {
        false
    }
}

/// Omega-squared (ω²) effect size estimator
///
/// A less biased estimate of the population variance explained than η²,
/// especially with small samples. May be negative when the group effect is
/// weaker than chance.
#[derive(Debug, Clone, Copy, Default)]
pub struct OmegaSquared;

impl OmegaSquared {
    pub fn new() -> Self {
        Self
    }
}

impl GroupedEffectSize for OmegaSquared {
    fn compute_groups(&self, groups: &[&[f64]]) -> Result<EffectSize> {
        check_groups(groups)?;
        let ss = SumsOfSquares::from_groups(groups)?;
        Ok(EffectSize::new(
            ss.omega_squared(),
            EffectSizeType::VarianceExplained,
            None,
        ))
    }
}

impl EffectSizeEstimator for OmegaSquared {
    fn effect_size_type(&self) -> EffectSizeType {
        EffectSizeType::VarianceExplained
    }

    fn is_symmetric(&self) -> bool {
        false
    }
}

/// Epsilon-squared (ε²) for the Kruskal-Wallis H statistic
///
/// ε² = H / (n - 1), interpreted on the η² scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpsilonSquared;

impl EpsilonSquared {
    pub fn new() -> Self {
        Self
    }

    pub fn from_h(&self, h: f64, n: usize) -> Result<EffectSize> {
        if n < 2 {
            return Err(Error::InsufficientData {
                expected: 2,
                actual: n,
            });
        }
        Ok(EffectSize::new(
            h / (n - 1) as f64,
            EffectSizeType::VarianceExplained,
            None,
        ))
    }
}

impl EffectSizeEstimator for EpsilonSquared {
    fn effect_size_type(&self) -> EffectSizeType {
        EffectSizeType::VarianceExplained
    }

    fn is_symmetric(&self) -> bool {
        false
    }
}
