//! Model fit measures (R², McFadden pseudo-R²)

use crate::{EffectSize, EffectSizeEstimator, EffectSizeType};
use serde::{Deserialize, Serialize};
use std::fmt;
use thesis_core::{Error, Result};

/// Coefficient of determination as an effect size
#[derive(Debug, Clone, Copy, Default)]
pub struct RSquared;

impl RSquared {
    pub fn new() -> Self {
        Self
    }

    pub fn from_value(&self, r_squared: f64, n: usize) -> Result<EffectSize> {
        if !r_squared.is_finite() {
            return Err(Error::non_finite("R-squared"));
        }
        Ok(EffectSize::new(r_squared, EffectSizeType::ModelFit, Some((n, 0))))
    }
}

impl EffectSizeEstimator for RSquared {
    fn effect_size_type(&self) -> EffectSizeType {
        EffectSizeType::ModelFit
    }

    fn is_symmetric(&self) -> bool {
        false
    }
}

/// McFadden pseudo-R² = 1 - llf / llnull
pub fn mcfadden_r2(log_likelihood: f64, null_log_likelihood: f64) -> f64 {
    if null_log_likelihood == 0.0 {
        return 0.0;
    }
    1.0 - log_likelihood / null_log_likelihood
}

/// Verbal quality of a McFadden pseudo-R²
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PseudoR2Quality {
    Acceptable,
    Good,
    Excellent,
}

impl PseudoR2Quality {
    pub fn from_value(r2: f64) -> Self {
        if r2 > 0.4 {
            Self::Excellent
        } else if r2 > 0.2 {
            Self::Good
        } else {
            Self::Acceptable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acceptable => "acceptable",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

impl fmt::Display for PseudoR2Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
