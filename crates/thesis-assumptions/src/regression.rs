//! Regression diagnostics
//!
//! Predictors are passed column-wise and must already be listwise complete
//! and of equal length; the checker does the row filtering.

use crate::types::{
    Autocorrelation, HeteroscedasticityResult, HighCorrelation, IndependenceResult,
    LinearityResult, MulticollinearityResult, Recommendation, SubTest, TestStatistic, VifEntry,
};
use crate::{Error, Result};
use std::collections::BTreeMap;
use thesis_core::distributions::{chi2_upper_p, f_upper_p};
use thesis_core::numeric::pearson;
use thesis_core::{round4, OlsFit};
use tracing::{debug, instrument};

const VIF_CONCERN: f64 = 5.0;
const VIF_SEVERE: f64 = 10.0;
const HIGH_CORRELATION: f64 = 0.8;
const RESIDUAL_CORRELATION_CONCERN: f64 = 0.3;
const RAINBOW_FRACTION: f64 = 0.5;

/// Variance inflation factor of every predictor
///
/// Each predictor is regressed on all others with an intercept;
/// VIF = 1 / (1 - R²). Perfect collinearity yields infinity.
pub fn vif(columns: &[Vec<f64>]) -> thesis_core::Result<Vec<f64>> {
    if columns.len() < 2 {
        return Err(thesis_core::Error::InsufficientData {
            expected: 2,
            actual: columns.len(),
        });
    }
    (0..columns.len())
        .map(|j| {
            let others: Vec<Vec<f64>> = columns
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != j)
                .map(|(_, c)| c.clone())
                .collect();
            let fit = OlsFit::fit(&columns[j], &others, true)?;
            let tolerance = 1.0 - fit.r_squared;
            Ok(if tolerance <= 0.0 {
                f64::INFINITY
            } else {
                1.0 / tolerance
            })
        })
        .collect()
}

/// VIF table, correlation matrix and high pairwise correlations
#[instrument(skip(names, columns), fields(predictors = names.len()))]
pub fn check_multicollinearity(
    names: &[String],
    columns: &[Vec<f64>],
) -> Result<MulticollinearityResult> {
    if names.len() != columns.len() {
        return Err(Error::InvalidInput(format!(
            "{} names given for {} predictors",
            names.len(),
            columns.len()
        )));
    }
    if names.len() < 2 {
        return Err(Error::InvalidInput(
            "Need at least 2 predictors for multicollinearity check".to_string(),
        ));
    }

    let vif: Vec<VifEntry> = vif(columns)?
        .into_iter()
        .zip(names)
        .map(|(v, name)| VifEntry {
            variable: name.clone(),
            vif: round4(v),
            concern: v > VIF_CONCERN,
            severe: v > VIF_SEVERE,
        })
        .collect();

    let mut correlation_matrix: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    let mut high_correlations = Vec::new();
    for (i, a) in names.iter().enumerate() {
        for (j, b) in names.iter().enumerate() {
            let r = if i == j {
                1.0
            } else {
                round4(pearson(&columns[i], &columns[j])?)
            };
            correlation_matrix
                .entry(a.clone())
                .or_default()
                .insert(b.clone(), r);
            if j > i && r.abs() > HIGH_CORRELATION {
                high_correlations.push(HighCorrelation {
                    variable1: a.clone(),
                    variable2: b.clone(),
                    correlation: r,
                });
            }
        }
    }

    let multicollinearity_present = vif.iter().any(|v| v.concern);
    let severe_multicollinearity = vif.iter().any(|v| v.severe);
    Ok(MulticollinearityResult {
        vif,
        correlation_matrix,
        high_correlations,
        multicollinearity_present,
        severe_multicollinearity,
        recommendation: if severe_multicollinearity {
            Recommendation::ConsiderRemoving
        } else {
            Recommendation::Proceed
        },
    })
}

/// Durbin-Watson statistic of a residual series
pub fn durbin_watson(residuals: &[f64]) -> thesis_core::Result<f64> {
    if residuals.len() < 2 {
        return Err(thesis_core::Error::InsufficientData {
            expected: 2,
            actual: residuals.len(),
        });
    }
    let ss: f64 = residuals.iter().map(|e| e * e).sum();
    if ss == 0.0 {
        return Err(thesis_core::Error::Computation(
            "Durbin-Watson is undefined for all-zero residuals".to_string(),
        ));
    }
    let diff: f64 = residuals.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();
    Ok(diff / ss)
}

pub fn check_independence(residuals: &[f64]) -> Result<IndependenceResult> {
    let clean: Vec<f64> = residuals.iter().copied().filter(|v| v.is_finite()).collect();
    let dw = durbin_watson(&clean)?;
    let autocorrelation = Autocorrelation::from_durbin_watson(dw);
    let concern = autocorrelation != Autocorrelation::None;
    Ok(IndependenceResult {
        durbin_watson: round4(dw),
        autocorrelation,
        interpretation: autocorrelation.describe().to_string(),
        concern,
        recommendation: if concern {
            Recommendation::ConsiderTimeSeriesMethods
        } else {
            Recommendation::Proceed
        },
    })
}

/// Utts' rainbow test on the central `frac` of observations
///
/// The central window is taken in row order, as statsmodels does when no
/// ordering is requested. Sort the rows by a predictor first to contrast
/// the middle of its range with the whole sample.
pub fn rainbow(y: &[f64], predictors: &[Vec<f64>], frac: f64) -> thesis_core::Result<TestStatistic> {
    if !(frac > 0.0 && frac < 1.0) {
        return Err(thesis_core::Error::InvalidParameter(format!(
            "rainbow fraction {frac} must be in (0, 1)"
        )));
    }
    let full = OlsFit::fit(y, predictors, true)?;
    let n = y.len();

    let low = (0.5 * (1.0 - frac) * n as f64).ceil() as usize;
    let high = ((low as f64 + frac * n as f64).floor() as usize).min(n);
    let y_mid = &y[low..high];
    let x_mid: Vec<Vec<f64>> = predictors.iter().map(|c| c[low..high].to_vec()).collect();
    let mid = OlsFit::fit(y_mid, &x_mid, true)?;
    if mid.ssr <= 0.0 {
        return Err(thesis_core::Error::Computation(
            "rainbow test is undefined for a perfect central fit".to_string(),
        ));
    }

    let df1 = (n - (high - low)) as f64;
    let df2 = mid.df_resid;
    let f = ((full.ssr - mid.ssr) / df1) / (mid.ssr / df2);
    Ok(TestStatistic::new(f, f_upper_p(f, df1, df2)?))
}

/// Linearity of `y` in a single predictor `x`
///
/// Pairs with a non-finite value on either side are dropped.
#[instrument(skip(x, y), fields(n = x.len()))]
pub fn check_linearity(x: &[f64], y: &[f64], alpha: f64) -> Result<LinearityResult> {
    thesis_core::check_alpha(alpha)?;
    if x.len() != y.len() {
        return Err(thesis_core::Error::size_mismatch(x.len(), y.len(), "linearity check").into());
    }
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .unzip();
    let predictors = vec![xs];
    let fit = OlsFit::fit(&ys, &predictors, true)?;

    let corr = if fit.ssr <= 0.0 {
        0.0
    } else {
        pearson(&fit.fitted, &fit.residuals).unwrap_or(0.0)
    };
    let rainbow_test = match rainbow(&ys, &predictors, RAINBOW_FRACTION) {
        Ok(t) => Some(SubTest::from_statistic(t, alpha)),
        Err(e) => {
            debug!(error = %e, "rainbow test omitted");
            None
        }
    };

    let linear = corr.abs() < RESIDUAL_CORRELATION_CONCERN;
    Ok(LinearityResult {
        residual_fitted_correlation: round4(corr),
        correlation_concern: corr.abs() > RESIDUAL_CORRELATION_CONCERN,
        rainbow_test,
        linear,
        recommendation: if linear {
            Recommendation::Proceed
        } else {
            Recommendation::ConsiderTransformation
        },
    })
}

fn lagrange_multiplier(
    residuals: &[f64],
    regressors: &[Vec<f64>],
) -> thesis_core::Result<TestStatistic> {
    let squared: Vec<f64> = residuals.iter().map(|e| e * e).collect();
    let aux = OlsFit::fit(&squared, regressors, true)?;
    let lm = residuals.len() as f64 * aux.r_squared;
    Ok(TestStatistic::new(lm, chi2_upper_p(lm, aux.df_model)?))
}

/// Breusch-Pagan test, studentized (Koenker) form
pub fn breusch_pagan(
    residuals: &[f64],
    predictors: &[Vec<f64>],
) -> thesis_core::Result<TestStatistic> {
    lagrange_multiplier(residuals, predictors)
}

/// White's test: predictors, their squares and pairwise products
pub fn white(residuals: &[f64], predictors: &[Vec<f64>]) -> thesis_core::Result<TestStatistic> {
    let mut regressors = predictors.to_vec();
    for i in 0..predictors.len() {
        for j in i..predictors.len() {
            regressors.push(
                predictors[i]
                    .iter()
                    .zip(&predictors[j])
                    .map(|(a, b)| a * b)
                    .collect(),
            );
        }
    }
    lagrange_multiplier(residuals, &regressors)
}

/// Heteroscedasticity of regression residuals
///
/// Breusch-Pagan decides the verdict; a White test that cannot be computed
/// is omitted without affecting it.
#[instrument(skip(residuals, predictors), fields(n = residuals.len()))]
pub fn check_heteroscedasticity(
    residuals: &[f64],
    predictors: &[Vec<f64>],
    alpha: f64,
) -> Result<HeteroscedasticityResult> {
    thesis_core::check_alpha(alpha)?;
    let breusch_pagan = SubTest::from_statistic(breusch_pagan(residuals, predictors)?, alpha);
    let white = match white(residuals, predictors) {
        Ok(t) => Some(SubTest::from_statistic(t, alpha)),
        Err(e) => {
            debug!(error = %e, "white test omitted");
            None
        }
    };
    let homoscedastic = breusch_pagan.assumption_met;
    Ok(HeteroscedasticityResult {
        breusch_pagan,
        white,
        homoscedastic,
        recommendation: if homoscedastic {
            Recommendation::Proceed
        } else {
            Recommendation::UseRobustStandardErrors
        },
    })
}
