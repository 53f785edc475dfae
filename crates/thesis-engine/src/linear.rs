//! Simple and multiple linear regression with residual diagnostics

use crate::record::{
    AnalysisResult, DegreesOfFreedom, EffectBlock, EffectLabel, EffectMetric, LinearCoefficient,
    LinearModelSummary, ResidualDiagnostics, TestDetails, Variables,
};
use crate::selector::TestSelector;
use crate::{Error, Result};
use thesis_assumptions::normality::{shapiro_wilk, SHAPIRO_MAX_N, SHAPIRO_MIN_N};
use thesis_assumptions::regression::{breusch_pagan, durbin_watson, vif};
use thesis_assumptions::{Autocorrelation, SubTest, VifEntry};
use thesis_core::numeric::std_dev;
use thesis_core::{round4, OlsFit};
use thesis_effect::RSquared;
use tracing::debug;

const VIF_CONCERN: f64 = 5.0;
const VIF_SEVERE: f64 = 10.0;

fn vif_table(predictors: &[String], columns: &[Vec<f64>]) -> Option<Vec<VifEntry>> {
    if columns.len() < 2 {
        return None;
    }
    match vif(columns) {
        Ok(values) => Some(
            predictors
                .iter()
                .zip(values)
                .map(|(name, v)| VifEntry {
                    variable: name.clone(),
                    vif: round4(v),
                    concern: v > VIF_CONCERN,
                    severe: v > VIF_SEVERE,
                })
                .collect(),
        ),
        Err(e) => {
            debug!(error = %e, "VIF not computable");
            None
        }
    }
}

fn diagnostics(residuals: &[f64], columns: &[Vec<f64>], alpha: f64) -> ResidualDiagnostics {
    let normality = if (SHAPIRO_MIN_N..=SHAPIRO_MAX_N).contains(&residuals.len()) {
        shapiro_wilk(residuals)
            .ok()
            .map(|t| SubTest::from_statistic(t, alpha))
    } else {
        None
    };
    let dw = durbin_watson(residuals).ok();
    ResidualDiagnostics {
        normality,
        breusch_pagan: breusch_pagan(residuals, columns)
            .ok()
            .map(|t| SubTest::from_statistic(t, alpha)),
        durbin_watson: dw.map(round4),
        autocorrelation: dw.map(|d| Autocorrelation::from_durbin_watson(d).describe().to_string()),
    }
}

/// OLS of `y` on the predictor columns with an intercept
///
/// `columns` must already be listwise complete and aligned with `y`.
pub fn regress(
    y: &[f64],
    columns: &[Vec<f64>],
    outcome: &str,
    predictors: &[String],
    alpha: f64,
) -> Result<AnalysisResult> {
    let n = y.len();
    let k = columns.len();
    if n <= k + 1 {
        return Err(Error::InvalidInput(format!(
            "Linear regression with {k} predictors needs more than {} complete rows, found {n}",
            k + 1
        )));
    }
    let sd_y = std_dev(y)?;
    if sd_y == 0.0 {
        return Err(Error::InvalidInput(format!(
            "Outcome '{outcome}' has zero variance"
        )));
    }

    let fit = OlsFit::fit(y, columns, true)?;
    let ci = fit.conf_int(0.05)?;
    debug!(n, k, r_squared = fit.r_squared, "linear regression");

    let names = std::iter::once("const").chain(predictors.iter().map(String::as_str));
    let coefficients = names
        .enumerate()
        .map(|(i, name)| -> Result<LinearCoefficient> {
            let b = fit.coefficients[i];
            let beta = if i == 0 {
                None
            } else {
                Some(round4(b * std_dev(&columns[i - 1])? / sd_y))
            };
            Ok(LinearCoefficient {
                variable: name.to_string(),
                b: round4(b),
                se: round4(fit.std_errors[i]),
                beta,
                t: round4(fit.t_values[i]),
                p: round4(fit.p_values[i]),
                ci_95: (round4(ci[i].0), round4(ci[i].1)),
                significant: fit.p_values[i] < alpha,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let r2 = RSquared::new().from_value(fit.r_squared, n)?;
    let effect = EffectBlock::new(
        EffectMetric::RSquared,
        round4(fit.r_squared),
        EffectLabel::Magnitude(r2.interpretation),
    );
    let p = fit.f_p_value;

    Ok(AnalysisResult {
        test_type: if k > 1 {
            "Multiple Linear Regression".to_string()
        } else {
            "Simple Linear Regression".to_string()
        },
        selector: TestSelector::LinearModel,
        statistic: round4(fit.f_statistic),
        degrees_of_freedom: DegreesOfFreedom::Split {
            between: fit.df_model as usize,
            within: fit.df_resid as usize,
        },
        p_value: round4(p),
        significant: p < alpha,
        alpha,
        sample_size: n,
        effect_size: effect,
        variables: Variables::model(outcome, predictors),
        details: TestDetails::LinearModel {
            model_summary: LinearModelSummary {
                r_squared: round4(fit.r_squared),
                r_squared_adj: round4(fit.adj_r_squared),
                f_statistic: round4(fit.f_statistic),
                f_pvalue: round4(p),
                significant: p < alpha,
                aic: round4(fit.aic),
                bic: round4(fit.bic),
            },
            coefficients,
            multicollinearity: vif_table(predictors, columns),
            diagnostics: diagnostics(&fit.residuals, columns, alpha),
        },
        warnings: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_simple_regression_recovers_line() {
        let x: Vec<f64> = (0..12).map(f64::from).collect();
        let noise = [0.1, -0.2, 0.15, -0.05, 0.0, 0.2, -0.1, 0.05, -0.15, 0.1, -0.05, 0.0];
        let y: Vec<f64> = x.iter().zip(noise).map(|(x, e)| 1.0 + 2.0 * x + e).collect();
        let r = regress(&y, &[x], "y", &names(&["x"]), 0.05).unwrap();
        assert_eq!(r.test_type, "Simple Linear Regression");
        assert_eq!(
            r.degrees_of_freedom,
            DegreesOfFreedom::Split {
                between: 1,
                within: 10
            }
        );
        let TestDetails::LinearModel {
            coefficients,
            multicollinearity,
            diagnostics,
            ..
        } = &r.details
        else {
            panic!("wrong details");
        };
        assert_eq!(coefficients[0].variable, "const");
        assert!(coefficients[0].beta.is_none());
        assert_abs_diff_eq!(coefficients[1].b, 2.0, epsilon = 0.05);
        // with one predictor beta equals r
        assert!(coefficients[1].beta.unwrap() > 0.99);
        assert!(multicollinearity.is_none());
        assert!(diagnostics.durbin_watson.is_some());
        assert!(r.significant);
    }

    #[test]
    fn test_multiple_regression_reports_vif() {
        let x1: Vec<f64> = (0..20).map(|i| f64::from(i % 7)).collect();
        let x2: Vec<f64> = (0..20).map(|i| f64::from((i * 3) % 5)).collect();
        let y: Vec<f64> = x1
            .iter()
            .zip(&x2)
            .enumerate()
            .map(|(i, (a, b))| a - 0.5 * b + (i % 3) as f64 * 0.1)
            .collect();
        let r = regress(&y, &[x1, x2], "y", &names(&["x1", "x2"]), 0.05).unwrap();
        assert_eq!(r.test_type, "Multiple Linear Regression");
        let TestDetails::LinearModel {
            multicollinearity, ..
        } = &r.details
        else {
            panic!("wrong details");
        };
        let vifs = multicollinearity.as_ref().unwrap();
        assert_eq!(vifs.len(), 2);
        assert!(vifs.iter().all(|v| v.vif >= 1.0));
    }

    #[test]
    fn test_constant_outcome_rejected() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let err = regress(&[2.0; 4], &[x], "y", &names(&["x"]), 0.05).unwrap_err();
        assert!(err.to_string().contains("zero variance"));
    }
}
