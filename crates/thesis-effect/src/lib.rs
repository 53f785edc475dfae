//! Effect size measurement for thesis statistics
//!
//! Effect sizes quantify the magnitude of a difference or relationship
//! independently of sample size. Every measure here carries a qualitative
//! label (negligible / small / medium / large) taken from a fixed published
//! threshold table for its family:
//!
//! | Family | Metric | small | medium | large |
//! |---|---|---|---|---|
//! | Standardized mean difference | Cohen's d | 0.2 | 0.5 | 0.8 |
//! | Correlation | r, rank-biserial r | 0.1 | 0.3 | 0.5 |
//! | Variance explained | η², ω², ε² | 0.01 | 0.06 | 0.14 |
//! | Association | Cramér's V | 0.1 | 0.3 | 0.5 |
//! | Model fit | R² | 0.02 | 0.13 | 0.26 |
//!
//! Labels compare `|value|` against the thresholds with strict `<`, so they
//! never decrease as the magnitude grows.
//!
//! # Examples
//!
//! ```rust
//! use thesis_effect::{CohenD, EffectSizeInterpretation, TwoSampleEffectSize};
//!
//! let group1 = vec![1.0, 2.0, 3.0, 4.0, 5.0];
//! let group2 = vec![6.0, 7.0, 8.0, 9.0, 10.0];
//!
//! let effect = CohenD::new().compute(&group1, &group2).unwrap();
//! assert_eq!(effect.interpretation, EffectSizeInterpretation::Large);
//! ```

mod association;
mod cohen_d;
mod correlation;
mod model_fit;
mod traits;
mod types;
mod variance_explained;

// Re-exports
pub use association::{odds_ratio, phi, CramersV};
pub use cohen_d::CohenD;
pub use correlation::{
    fisher_z_interval, CorrelationDirection, CorrelationStrength, PearsonCorrelation,
    RankBiserial, SpearmanCorrelation,
};
pub use model_fit::{mcfadden_r2, PseudoR2Quality, RSquared};
pub use traits::{EffectSizeEstimator, GroupedEffectSize, PairedEffectSize, TwoSampleEffectSize};
pub use types::{EffectSize, EffectSizeInterpretation, EffectSizeType};
pub use variance_explained::{EpsilonSquared, EtaSquared, OmegaSquared, SumsOfSquares};

// Convenience constructors
pub fn cohen_d() -> CohenD {
    CohenD::new()
}

pub fn cramers_v() -> CramersV {
    CramersV::new()
}
