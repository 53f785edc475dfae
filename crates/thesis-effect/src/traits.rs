//! Core traits for effect size estimation

use crate::types::{EffectSize, EffectSizeType};
use thesis_core::Result;

/// Base trait for effect size estimators
pub trait EffectSizeEstimator {
    /// Get the type of effect size this estimator computes
    fn effect_size_type(&self) -> EffectSizeType;

    /// Check if the estimator is symmetric (effect_size(A,B) = -effect_size(B,A))
    fn is_symmetric(&self) -> bool {
        true
    }
}

/// Effect sizes comparing two independent samples
pub trait TwoSampleEffectSize: EffectSizeEstimator {
    /// Compute effect size directly from the data
    fn compute(&self, group1: &[f64], group2: &[f64]) -> Result<EffectSize>;
}

/// Effect sizes over k >= 2 groups
pub trait GroupedEffectSize: EffectSizeEstimator {
    fn compute_groups(&self, groups: &[&[f64]]) -> Result<EffectSize>;
}

/// Effect sizes over paired observations `(x_i, y_i)`
pub trait PairedEffectSize: EffectSizeEstimator {
    fn compute_paired(&self, x: &[f64], y: &[f64]) -> Result<EffectSize>;
}
