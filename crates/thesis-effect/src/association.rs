//! Association measures for contingency tables

use crate::{EffectSize, EffectSizeEstimator, EffectSizeType};
use thesis_core::{Error, Result};

/// Cramér's V = sqrt(χ² / (n · (min(r, c) - 1)))
///
/// Computed from the Pearson χ² without continuity correction. A table with a
/// single row or column has V = 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct CramersV;

impl CramersV {
    pub fn new() -> Self {
        Self
    }

    pub fn from_chi2(&self, chi2: f64, n: f64, rows: usize, cols: usize) -> Result<EffectSize> {
        if n <= 0.0 {
            return Err(Error::InvalidInput(
                "Contingency table is empty".to_string(),
            ));
        }
        let min_dim = rows.min(cols).saturating_sub(1);
        let v = if min_dim > 0 {
            (chi2 / (n * min_dim as f64)).sqrt().min(1.0)
        } else {
            0.0
        };
        Ok(EffectSize::new(v, EffectSizeType::Association, None))
    }
}

impl EffectSizeEstimator for CramersV {
    fn effect_size_type(&self) -> EffectSizeType {
        EffectSizeType::Association
    }

    fn is_symmetric(&self) -> bool {
        false
    }
}

/// Phi coefficient sqrt(χ² / n), defined for 2×2 tables only
pub fn phi(chi2: f64, n: f64, rows: usize, cols: usize) -> Option<f64> {
    if rows == 2 && cols == 2 && n > 0.0 {
        Some((chi2 / n).sqrt())
    } else {
        None
    }
}

/// Sample odds ratio (a·d)/(b·c) of a 2×2 table `[[a, b], [c, d]]`
///
/// Infinite when either off-diagonal cell is empty.
pub fn odds_ratio(table: [[f64; 2]; 2]) -> f64 {
    let [[a, b], [c, d]] = table;
    if b > 0.0 && c > 0.0 {
        a * d / (b * c)
    } else {
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EffectSizeInterpretation;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cramers_v_perfect_association() {
        let v = CramersV::new().from_chi2(20.0, 20.0, 2, 2).unwrap();
        assert_abs_diff_eq!(v.magnitude, 1.0);
        assert_eq!(v.interpretation, EffectSizeInterpretation::Large);
    }

    #[test]
    fn test_cramers_v_larger_table() {
        // 3x4 table: min_dim = 2
        let v = CramersV::new().from_chi2(8.0, 100.0, 3, 4).unwrap();
        assert_abs_diff_eq!(v.magnitude, 0.2, epsilon = 1e-12);
        let v = CramersV::new().from_chi2(8.0, 100.0, 1, 4).unwrap();
        assert_eq!(v.magnitude, 0.0);
    }

    #[test]
    fn test_phi_only_for_2x2() {
        assert_abs_diff_eq!(phi(4.0, 100.0, 2, 2).unwrap(), 0.2);
        assert!(phi(4.0, 100.0, 2, 3).is_none());
    }

    #[test]
    fn test_odds_ratio() {
        assert_abs_diff_eq!(odds_ratio([[10.0, 5.0], [2.0, 8.0]]), 8.0);
        assert!(odds_ratio([[10.0, 0.0], [0.0, 10.0]]).is_infinite());
    }
}
