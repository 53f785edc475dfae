//! Ordinary least squares through the SVD of the column-scaled design

use crate::distributions::{f_upper_p, t_quantile, t_two_sided_p};
use crate::{Error, Result};
use nalgebra::{DMatrix, DVector, SVD};
use tracing::debug;

/// Smallest singular value, relative to the largest, of the column-scaled
/// design that still counts as full rank
pub const RANK_TOLERANCE: f64 = 1e-10;

/// A fitted linear model `y = X b + e`
///
/// When fitted with an intercept the first coefficient is the constant and
/// `sst` is the centred total sum of squares; otherwise `sst` is uncentred.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Number of observations
    pub n: usize,
    /// Number of estimated parameters (intercept included)
    pub n_params: usize,
    /// Whether column 0 of the design is a constant
    pub intercept: bool,
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub t_values: Vec<f64>,
    pub p_values: Vec<f64>,
    pub fitted: Vec<f64>,
    pub residuals: Vec<f64>,
    /// Residual sum of squares
    pub ssr: f64,
    /// Total sum of squares
    pub sst: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub df_model: f64,
    pub df_resid: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    design: DMatrix<f64>,
}

impl OlsFit {
    /// Fit `y` on the given predictor columns
    ///
    /// Each entry of `predictors` is one column and must have `y.len()` rows.
    pub fn fit(y: &[f64], predictors: &[Vec<f64>], intercept: bool) -> Result<Self> {
        let n = y.len();
        for col in predictors {
            if col.len() != n {
                return Err(Error::size_mismatch(n, col.len(), "OLS design column"));
            }
        }
        if y.iter().chain(predictors.iter().flatten()).any(|v| !v.is_finite()) {
            return Err(Error::non_finite("OLS input"));
        }

        let offset = usize::from(intercept);
        let p = predictors.len() + offset;
        if p == 0 {
            return Err(Error::InvalidParameter(
                "OLS requires at least one regressor".to_string(),
            ));
        }
        if n <= p {
            return Err(Error::InsufficientData {
                expected: p + 1,
                actual: n,
            });
        }

        let design = DMatrix::from_fn(n, p, |i, j| {
            if intercept && j == 0 {
                1.0
            } else {
                predictors[j - offset][i]
            }
        });
        let yv = DVector::from_column_slice(y);

        let rank_deficient =
            || Error::SingularMatrix("design matrix is rank deficient".to_string());

        // equilibrate columns so the rank test does not depend on their scale
        // or offset, then solve through the SVD
        let scales: Vec<f64> = (0..p).map(|j| design.column(j).norm()).collect();
        if scales.iter().any(|&s| s == 0.0) {
            return Err(rank_deficient());
        }
        let scaled = DMatrix::from_fn(n, p, |i, j| design[(i, j)] / scales[j]);
        let SVD {
            u,
            v_t,
            singular_values,
        } = scaled.svd(true, true);
        let (u, v_t) = u
            .zip(v_t)
            .ok_or_else(|| Error::Computation("SVD of the design matrix failed".to_string()))?;
        let s_max = singular_values.max();
        if singular_values.iter().any(|&s| s <= RANK_TOLERANCE * s_max) {
            return Err(rank_deficient());
        }

        let d_inv = DMatrix::from_diagonal(&DVector::from_iterator(
            p,
            scales.iter().map(|s| 1.0 / s),
        ));
        let v_s = v_t.transpose() * DMatrix::from_diagonal(&singular_values.map(|s| 1.0 / s));
        let beta = &d_inv * &v_s * u.transpose() * &yv;
        let xtx_inv = &d_inv * (&v_s * v_s.transpose()) * &d_inv;

        let fitted_v = &design * &beta;
        let resid_v = &yv - &fitted_v;
        let ssr = resid_v.norm_squared();

        let nf = n as f64;
        let sst = if intercept {
            let m = yv.mean();
            yv.iter().map(|v| (v - m).powi(2)).sum::<f64>()
        } else {
            yv.norm_squared()
        };

        let df_resid = (n - p) as f64;
        let df_model = (p - offset) as f64;
        let sigma2 = ssr / df_resid;

        let mut std_errors = Vec::with_capacity(p);
        let mut t_values = Vec::with_capacity(p);
        let mut p_values = Vec::with_capacity(p);
        for j in 0..p {
            let se = (sigma2 * xtx_inv[(j, j)]).max(0.0).sqrt();
            let t = if se > 0.0 {
                beta[j] / se
            } else if beta[j] == 0.0 {
                0.0
            } else {
                f64::INFINITY * beta[j].signum()
            };
            std_errors.push(se);
            t_values.push(t);
            p_values.push(t_two_sided_p(t, df_resid)?);
        }

        let r_squared = if sst > 0.0 { 1.0 - ssr / sst } else { 0.0 };
        let adj_r_squared = 1.0 - (1.0 - r_squared) * (nf - offset as f64) / df_resid;

        let (f_statistic, f_p_value) = if df_model > 0.0 {
            let ess = (sst - ssr).max(0.0);
            let f = if ssr > 0.0 {
                (ess / df_model) / (ssr / df_resid)
            } else {
                f64::INFINITY
            };
            (f, f_upper_p(f, df_model, df_resid)?)
        } else {
            (f64::NAN, f64::NAN)
        };

        let log_likelihood = if ssr > 0.0 {
            -nf / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (ssr / nf).ln() + 1.0)
        } else {
            f64::INFINITY
        };
        let k = p as f64;
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let bic = -2.0 * log_likelihood + k * nf.ln();

        debug!(n, p, r_squared, "fitted OLS model");

        Ok(Self {
            n,
            n_params: p,
            intercept,
            coefficients: beta.iter().copied().collect(),
            std_errors,
            t_values,
            p_values,
            fitted: fitted_v.iter().copied().collect(),
            residuals: resid_v.iter().copied().collect(),
            ssr,
            sst,
            r_squared,
            adj_r_squared,
            f_statistic,
            f_p_value,
            df_model,
            df_resid,
            log_likelihood,
            aic,
            bic,
            design,
        })
    }

    /// Two-sided `(1 - alpha)` confidence intervals for every coefficient
    pub fn conf_int(&self, alpha: f64) -> Result<Vec<(f64, f64)>> {
        let crit = t_quantile(1.0 - alpha / 2.0, self.df_resid)?;
        Ok(self
            .coefficients
            .iter()
            .zip(&self.std_errors)
            .map(|(b, se)| (b - crit * se, b + crit * se))
            .collect())
    }

    /// The design matrix the model was fitted on
    pub fn design(&self) -> &DMatrix<f64> {
        &self.design
    }

    /// Column `j` of the design matrix
    pub fn design_column(&self, j: usize) -> Vec<f64> {
        self.design.column(j).iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_regression() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.1, 3.9, 6.2, 7.8, 10.1];
        let fit = OlsFit::fit(&y, &[x], true).unwrap();

        // numpy.polyfit(x, y, 1) -> [1.99, 0.05]
        assert_abs_diff_eq!(fit.coefficients[1], 1.99, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.coefficients[0], 0.05, epsilon = 1e-10);
        assert!(fit.r_squared > 0.99);
        assert_eq!(fit.df_resid, 3.0);
        assert_eq!(fit.df_model, 1.0);
        assert_abs_diff_eq!(fit.residuals.iter().sum::<f64>(), 0.0, epsilon = 1e-10);
        // with one predictor F equals t^2
        assert_abs_diff_eq!(fit.f_statistic, fit.t_values[1].powi(2), epsilon = 1e-6);
    }

    #[test]
    fn test_conf_int_contains_estimate() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = vec![1.0, 3.0, 2.0, 5.0, 4.0, 6.0];
        let fit = OlsFit::fit(&y, &[x], true).unwrap();
        for ((lo, hi), b) in fit.conf_int(0.05).unwrap().iter().zip(&fit.coefficients) {
            assert!(lo < b && b < hi);
        }
    }

    #[test]
    fn test_singular_design() {
        let x1 = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let x2 = x1.iter().map(|v| v * 2.0).collect::<Vec<_>>();
        let y = vec![1.0, 2.0, 3.0, 5.0, 4.0];
        let err = OlsFit::fit(&y, &[x1, x2], true).unwrap_err();
        assert!(matches!(err, Error::SingularMatrix(_)));
    }

    #[test]
    fn test_large_offset_predictor_is_full_rank() {
        let x: Vec<f64> = (0..20).map(|i| 1e6 + i as f64).collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| 3.0 + 2.0 * v + if i % 3 == 0 { 0.2 } else { -0.1 })
            .collect();
        let fit = OlsFit::fit(&y, &[x], true).unwrap();
        assert_abs_diff_eq!(fit.coefficients[1], 2.0, epsilon = 1e-2);
        assert!(fit.r_squared > 0.99);
        assert!(fit.std_errors.iter().all(|se| se.is_finite() && *se > 0.0));
        assert_abs_diff_eq!(fit.residuals.iter().sum::<f64>(), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_constant_predictor_with_intercept_is_singular() {
        let y = vec![1.0, 2.0, 3.0, 5.0, 4.0];
        let err = OlsFit::fit(&y, &[vec![7.0; 5]], true).unwrap_err();
        assert!(matches!(err, Error::SingularMatrix(_)));
    }

    #[test]
    fn test_insufficient_rows() {
        let err = OlsFit::fit(&[1.0, 2.0], &[vec![1.0, 2.0]], true).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { .. }));
    }

    #[test]
    fn test_information_criteria() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let y = vec![1.2, 1.9, 3.2, 3.8, 5.1, 6.3, 6.8];
        let fit = OlsFit::fit(&y, &[x], true).unwrap();
        assert_abs_diff_eq!(fit.aic, -2.0 * fit.log_likelihood + 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            fit.bic,
            -2.0 * fit.log_likelihood + 2.0 * (7.0f64).ln(),
            epsilon = 1e-12
        );
    }
}
