//! Effect size values and their qualitative labels

use serde::{Deserialize, Serialize};
use std::fmt;

/// Effect size families; each family has one threshold table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSizeType {
    /// Cohen's d
    StandardizedMeanDifference,
    /// r and rank-biserial r
    Correlation,
    /// η², ω², ε²
    VarianceExplained,
    /// Cramér's V, φ
    Association,
    /// R² of a fitted model
    ModelFit,
}

impl EffectSizeType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::StandardizedMeanDifference => "Cohen's d",
            Self::Correlation => "r",
            Self::VarianceExplained => "Variance explained",
            Self::Association => "Cramér's V",
            Self::ModelFit => "R²",
        }
    }

    /// (small, medium, large) lower bounds on `|value|`
    pub fn thresholds(&self) -> (f64, f64, f64) {
        match self {
            Self::StandardizedMeanDifference => (0.2, 0.5, 0.8),
            Self::Correlation | Self::Association => (0.1, 0.3, 0.5),
            Self::VarianceExplained => (0.01, 0.06, 0.14),
            Self::ModelFit => (0.02, 0.13, 0.26),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSize {
    /// Signed where the metric has a direction (d, r)
    pub magnitude: f64,
    pub effect_type: EffectSizeType,
    pub interpretation: EffectSizeInterpretation,
    /// Group sizes, or (n, 0) for single-sample metrics
    pub sample_sizes: Option<(usize, usize)>,
    pub confidence_interval: Option<(f64, f64)>,
}

impl EffectSize {
    /// The label is derived from `magnitude` here and never set separately
    pub fn new(
        magnitude: f64,
        effect_type: EffectSizeType,
        sample_sizes: Option<(usize, usize)>,
    ) -> Self {
        Self {
            magnitude,
            effect_type,
            interpretation: EffectSizeInterpretation::from_magnitude(magnitude, effect_type),
            sample_sizes,
            confidence_interval: None,
        }
    }

    pub fn with_confidence_interval(mut self, lower: f64, upper: f64) -> Self {
        self.confidence_interval = Some((lower, upper));
        self
    }
}

impl fmt::Display for EffectSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {:.3} ({})",
            self.effect_type.label(),
            self.magnitude,
            self.interpretation
        )?;
        if let Some((lo, hi)) = self.confidence_interval {
            write!(f, ", 95% CI [{lo:.3}, {hi:.3}]")?;
        }
        Ok(())
    }
}

/// Cohen-style magnitude tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectSizeInterpretation {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectSizeInterpretation {
    /// Tier for `|magnitude|` with strict `<` boundaries: a value equal to a
    /// threshold lands in the upper tier. NaN reads as negligible.
    pub fn from_magnitude(magnitude: f64, effect_type: EffectSizeType) -> Self {
        let (small, medium, large) = effect_type.thresholds();
        match magnitude.abs() {
            m if m.is_nan() || m < small => Self::Negligible,
            m if m < medium => Self::Small,
            m if m < large => Self::Medium,
            _ => Self::Large,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negligible => "negligible",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for EffectSizeInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
