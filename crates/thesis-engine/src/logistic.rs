//! Binary logistic regression fitted by Newton-Raphson

use crate::record::{
    AnalysisResult, Classification, DegreesOfFreedom, EffectBlock, EffectLabel, EffectMetric,
    LogisticCoefficient, LogisticModelSummary, TestDetails, Variables,
};
use crate::selector::TestSelector;
use crate::{Error, Result};
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeSet;
use thesis_core::distributions::{chi2_upper_p, normal_quantile, normal_two_sided_p};
use thesis_core::round4;
use thesis_data::{format_number, Dataset};
use thesis_effect::{mcfadden_r2, PseudoR2Quality};
use tracing::{debug, warn};

pub const MAX_ITERATIONS: usize = 35;
pub const TOLERANCE: f64 = 1e-8;
const SEPARATION_EPS: f64 = 1e-6;

/// Outcome coded 0/1 with listwise-complete predictor columns
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOutcome {
    pub y: Vec<f64>,
    pub columns: Vec<Vec<f64>>,
    /// Original values coded as 0 and 1, in sorted order
    pub levels: [String; 2],
}

impl BinaryOutcome {
    /// Listwise-complete rows of `outcome` and `predictors`, outcome coded
    /// by the sorted order of its two distinct values
    pub fn from_dataset(dataset: &Dataset, outcome: &str, predictors: &[String]) -> Result<Self> {
        let raw: Vec<Vec<Option<f64>>> = predictors
            .iter()
            .map(|p| dataset.numeric(p))
            .collect::<thesis_data::Result<_>>()?;
        let numeric_outcome = dataset.is_numeric(outcome)?;
        let keys: Vec<Option<OutcomeKey>> = if numeric_outcome {
            dataset
                .numeric(outcome)?
                .into_iter()
                .map(|v| v.map(OutcomeKey::Number))
                .collect()
        } else {
            dataset
                .labels(outcome)?
                .into_iter()
                .map(|v| v.map(OutcomeKey::Text))
                .collect()
        };

        let rows: Vec<usize> = (0..dataset.height())
            .filter(|&i| keys[i].is_some() && raw.iter().all(|c| c[i].is_some()))
            .collect();
        let distinct: BTreeSet<&OutcomeKey> = rows.iter().filter_map(|&i| keys[i].as_ref()).collect();
        let [low, high] = <[&OutcomeKey; 2]>::try_from(distinct.into_iter().collect::<Vec<_>>())
            .map_err(|found| {
                Error::InvalidInput(format!(
                    "Logistic regression requires binary outcome. Found {} unique values.",
                    found.len()
                ))
            })?;

        let y = rows
            .iter()
            .map(|&i| if keys[i].as_ref() == Some(high) { 1.0 } else { 0.0 })
            .collect();
        let columns = raw
            .iter()
            .map(|c| rows.iter().filter_map(|&i| c[i]).collect())
            .collect();
        Ok(Self {
            y,
            columns,
            levels: [low.label(), high.label()],
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum OutcomeKey {
    Number(f64),
    Text(String),
}

impl Eq for OutcomeKey {}

impl PartialOrd for OutcomeKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OutcomeKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => std::cmp::Ordering::Less,
            (Self::Text(_), Self::Number(_)) => std::cmp::Ordering::Greater,
        }
    }
}

impl OutcomeKey {
    fn label(&self) -> String {
        match self {
            Self::Number(x) => format_number(*x),
            Self::Text(s) => s.clone(),
        }
    }
}

fn sigmoid(eta: f64) -> f64 {
    if eta >= 0.0 {
        1.0 / (1.0 + (-eta).exp())
    } else {
        let e = eta.exp();
        e / (1.0 + e)
    }
}

/// ln(1 + e^x) without overflow
fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

/// Maximum-likelihood logit fit
#[derive(Debug, Clone)]
pub struct LogitFit {
    /// Constant first, then one per predictor
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub probabilities: Vec<f64>,
    pub log_likelihood: f64,
    pub null_log_likelihood: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl LogitFit {
    pub fn fit(y: &[f64], columns: &[Vec<f64>]) -> Result<Self> {
        let n = y.len();
        let p = columns.len() + 1;
        if n <= p {
            return Err(Error::InvalidInput(format!(
                "Logistic regression with {} predictors needs more than {p} complete rows, found {n}",
                columns.len()
            )));
        }
        let x = DMatrix::from_fn(n, p, |i, j| if j == 0 { 1.0 } else { columns[j - 1][i] });
        let yv = DVector::from_column_slice(y);
        let mut beta = DVector::<f64>::zeros(p);
        let mut converged = false;
        let mut iterations = 0;

        while iterations < MAX_ITERATIONS {
            iterations += 1;
            let probs = (&x * &beta).map(sigmoid);
            let hessian = information(&x, &probs);
            let gradient = x.transpose() * (&yv - &probs);
            let step = hessian
                .cholesky()
                .ok_or_else(|| singular("Hessian"))?
                .solve(&gradient);
            beta += &step;

            let probs = (&x * &beta).map(sigmoid);
            if probs.iter().zip(y).all(|(p, y)| (p - y).abs() < SEPARATION_EPS) {
                return Err(Error::InvalidInput(
                    "Perfect separation detected, results not available".to_string(),
                ));
            }
            if step.amax() < TOLERANCE {
                converged = true;
                break;
            }
        }
        if !converged {
            warn!(iterations, "logistic regression did not converge");
        }

        let eta = &x * &beta;
        let probs = eta.map(sigmoid);
        let covariance = information(&x, &probs)
            .try_inverse()
            .ok_or_else(|| singular("information matrix"))?;
        let log_likelihood: f64 = eta
            .iter()
            .zip(y)
            .map(|(e, y)| y * e - softplus(*e))
            .sum();
        let p0 = y.iter().sum::<f64>() / n as f64;
        let null_log_likelihood = n as f64 * (p0 * p0.ln() + (1.0 - p0) * (1.0 - p0).ln());
        debug!(iterations, converged, log_likelihood, "logit fit");

        Ok(Self {
            coefficients: beta.iter().copied().collect(),
            std_errors: (0..p).map(|j| covariance[(j, j)].max(0.0).sqrt()).collect(),
            probabilities: probs.iter().copied().collect(),
            log_likelihood,
            null_log_likelihood,
            iterations,
            converged,
        })
    }
}

fn singular(what: &str) -> Error {
    thesis_core::Error::SingularMatrix(format!("{what} is not positive definite")).into()
}

/// Fisher information X' W X with W = p(1 - p)
fn information(x: &DMatrix<f64>, probs: &DVector<f64>) -> DMatrix<f64> {
    let weighted = DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| {
        x[(i, j)] * probs[i] * (1.0 - probs[i])
    });
    x.transpose() * weighted
}

/// Binary logistic regression on a prepared outcome
pub fn logit(
    data: &BinaryOutcome,
    outcome: &str,
    predictors: &[String],
    alpha: f64,
) -> Result<AnalysisResult> {
    let fit = LogitFit::fit(&data.y, &data.columns)?;
    let n = data.y.len();
    let k = data.columns.len();
    let n_params = (k + 1) as f64;
    let crit = normal_quantile(0.975)?;

    let names = std::iter::once("const").chain(predictors.iter().map(String::as_str));
    let coefficients = names
        .zip(fit.coefficients.iter().zip(&fit.std_errors))
        .map(|(name, (&b, &se))| {
            let z = b / se;
            let p = normal_two_sided_p(z);
            let (lo, hi) = (b - crit * se, b + crit * se);
            LogisticCoefficient {
                variable: name.to_string(),
                b: round4(b),
                se: round4(se),
                wald: round4(z * z),
                z: round4(z),
                p: round4(p),
                odds_ratio: round4(b.exp()),
                odds_ratio_ci: (round4(lo.exp()), round4(hi.exp())),
                significant: p < alpha,
            }
        })
        .collect();

    let llf = fit.log_likelihood;
    let llnull = fit.null_log_likelihood;
    let pseudo = mcfadden_r2(llf, llnull);
    let llr = (2.0 * (llf - llnull)).max(0.0);
    let llr_p = chi2_upper_p(llr, k as f64)?;
    let aic = -2.0 * llf + 2.0 * n_params;
    let bic = -2.0 * llf + n_params * (n as f64).ln();

    let mut confusion = [[0usize; 2]; 2];
    for (prob, y) in fit.probabilities.iter().zip(&data.y) {
        let observed = usize::from(*y == 1.0);
        let predicted = usize::from(*prob > 0.5);
        confusion[observed][predicted] += 1;
    }
    let correct = confusion[0][0] + confusion[1][1];

    let mut warnings = Vec::new();
    if !fit.converged {
        warnings.push(format!(
            "Maximum likelihood did not converge after {} iterations",
            fit.iterations
        ));
    }

    Ok(AnalysisResult {
        test_type: "Binary Logistic Regression".to_string(),
        selector: TestSelector::LogisticModel,
        statistic: round4(llr),
        degrees_of_freedom: DegreesOfFreedom::Scalar(k),
        p_value: round4(llr_p),
        significant: llr_p < alpha,
        alpha,
        sample_size: n,
        effect_size: EffectBlock::new(
            EffectMetric::PseudoRSquared,
            round4(pseudo),
            EffectLabel::ModelQuality(PseudoR2Quality::from_value(pseudo)),
        ),
        variables: Variables::model(outcome, predictors),
        details: TestDetails::LogisticModel {
            model_summary: LogisticModelSummary {
                pseudo_r_squared: round4(pseudo),
                log_likelihood: round4(llf),
                aic: round4(aic),
                bic: round4(bic),
                llr_pvalue: round4(llr_p),
                significant: llr_p < alpha,
                iterations: fit.iterations,
                converged: fit.converged,
            },
            coefficients,
            classification: Classification {
                accuracy: round4(correct as f64 / n as f64),
                confusion_matrix: confusion,
            },
            outcome_levels: data.levels.clone(),
        },
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use thesis_data::ColumnData;

    fn overlapping() -> BinaryOutcome {
        let x: Vec<f64> = (1..=20).map(f64::from).collect();
        let y = vec![
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0,
            1.0, 1.0, 1.0,
        ];
        BinaryOutcome {
            y,
            columns: vec![x],
            levels: ["0".into(), "1".into()],
        }
    }

    #[test]
    fn test_logit_converges_on_overlapping_classes() {
        let data = overlapping();
        let r = logit(&data, "y", &["x".to_string()], 0.05).unwrap();
        let TestDetails::LogisticModel {
            model_summary,
            coefficients,
            classification,
            ..
        } = &r.details
        else {
            panic!("wrong details");
        };
        assert!(model_summary.converged);
        assert!(coefficients[1].b > 0.0);
        assert!(coefficients[1].odds_ratio > 1.0);
        assert!(model_summary.pseudo_r_squared > 0.0 && model_summary.pseudo_r_squared < 1.0);
        let total: usize = classification.confusion_matrix.iter().flatten().sum();
        assert_eq!(total, 20);
        assert!(classification.accuracy > 0.5);
        assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::Scalar(1));
    }

    #[test]
    fn test_score_equations_hold_at_optimum() {
        let data = overlapping();
        let fit = LogitFit::fit(&data.y, &data.columns).unwrap();
        let residual_sum: f64 = fit
            .probabilities
            .iter()
            .zip(&data.y)
            .map(|(p, y)| y - p)
            .sum();
        assert!(residual_sum.abs() < 1e-6);
    }

    #[test]
    fn test_perfect_separation_is_an_error() {
        let x: Vec<f64> = (1..=10).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|&v| if v > 5.0 { 1.0 } else { 0.0 }).collect();
        assert!(LogitFit::fit(&y, &[x]).is_err());
    }

    #[test]
    fn test_text_outcome_coded_by_sorted_order() {
        let ds = Dataset::from_columns(
            "d",
            vec![
                ("passed", ColumnData::text(["yes", "no", "yes", "no"])),
                ("hours", ColumnData::numeric([3.0, 1.0, 4.0, 2.0])),
            ],
        )
        .unwrap();
        let data = BinaryOutcome::from_dataset(&ds, "passed", &["hours".to_string()]).unwrap();
        assert_eq!(data.levels, ["no".to_string(), "yes".to_string()]);
        assert_eq!(data.y, vec![1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_three_level_outcome_rejected() {
        let ds = Dataset::from_columns(
            "d",
            vec![
                ("y", ColumnData::numeric([0.0, 1.0, 2.0, 1.0])),
                ("x", ColumnData::numeric([1.0, 2.0, 3.0, 4.0])),
            ],
        )
        .unwrap();
        let err = BinaryOutcome::from_dataset(&ds, "y", &["x".to_string()]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Logistic regression requires binary outcome. Found 3 unique values."
        );
    }
}
