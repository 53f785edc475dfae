//! Assumption checker entry points
//!
//! Every entry point returns a [`CheckResult`]: a failing check carries only
//! its error message and never aborts sibling checks.

use crate::homogeneity::check_homogeneity;
use crate::normality::check_normality;
use crate::regression::{
    check_heteroscedasticity, check_independence, check_linearity, check_multicollinearity,
};
use crate::types::{
    AllChecks, CheckResult, HeteroscedasticityResult, HomogeneityResult, IndependenceResult,
    LinearityResult, MulticollinearityResult, NormalityResult,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thesis_core::{OlsFit, DEFAULT_ALPHA};
use thesis_data::Dataset;
use tracing::{debug, instrument};

pub const REGRESSION_NOTE: &str =
    "Run regression first, then check residuals for linearity and homoscedasticity";

/// Which diagnostic to run against a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum AssumptionRequest {
    Normality {
        variable: String,
    },
    Homogeneity {
        outcome: String,
        group: String,
    },
    Multicollinearity {
        predictors: Vec<String>,
    },
    Independence {
        outcome: String,
        predictors: Vec<String>,
    },
    Linearity {
        outcome: String,
        predictor: String,
    },
    Heteroscedasticity {
        outcome: String,
        predictors: Vec<String>,
    },
    All {
        outcome: String,
        predictors: Vec<String>,
    },
}

/// Result of an [`AssumptionRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", content = "result", rename_all = "snake_case")]
pub enum AssumptionReport {
    Normality(CheckResult<NormalityResult>),
    Homogeneity(CheckResult<HomogeneityResult>),
    Multicollinearity(CheckResult<MulticollinearityResult>),
    Independence(CheckResult<IndependenceResult>),
    Linearity(CheckResult<LinearityResult>),
    Heteroscedasticity(CheckResult<HeteroscedasticityResult>),
    All(AllChecks),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssumptionChecker {
    alpha: f64,
}

impl Default for AssumptionChecker {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl AssumptionChecker {
    pub fn new(alpha: f64) -> Result<Self> {
        Ok(Self {
            alpha: thesis_core::check_alpha(alpha)?,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn normality(&self, data: &[f64], variable: Option<&str>) -> CheckResult<NormalityResult> {
        CheckResult::from_result(check_normality(data, variable, self.alpha))
    }

    pub fn homogeneity(
        &self,
        groups: &[Vec<f64>],
        group_names: Option<&[String]>,
    ) -> CheckResult<HomogeneityResult> {
        CheckResult::from_result(check_homogeneity(groups, group_names, self.alpha))
    }

    pub fn multicollinearity(
        &self,
        names: &[String],
        columns: &[Vec<f64>],
    ) -> CheckResult<MulticollinearityResult> {
        CheckResult::from_result(check_multicollinearity(names, columns))
    }

    pub fn independence(&self, residuals: &[f64]) -> CheckResult<IndependenceResult> {
        CheckResult::from_result(check_independence(residuals))
    }

    pub fn linearity(&self, x: &[f64], y: &[f64]) -> CheckResult<LinearityResult> {
        CheckResult::from_result(check_linearity(x, y, self.alpha))
    }

    pub fn heteroscedasticity(
        &self,
        residuals: &[f64],
        predictors: &[Vec<f64>],
    ) -> CheckResult<HeteroscedasticityResult> {
        CheckResult::from_result(check_heteroscedasticity(residuals, predictors, self.alpha))
    }

    /// Pre-regression batch: outcome normality and, with two or more
    /// predictors, multicollinearity
    #[instrument(skip(self, dataset), fields(dataset = dataset.name()))]
    pub fn run_all_checks(
        &self,
        dataset: &Dataset,
        outcome: &str,
        predictors: &[String],
    ) -> AllChecks {
        let normality = CheckResult::from_result(
            dataset
                .numeric(outcome)
                .map_err(Error::from)
                .and_then(|values| {
                    let values: Vec<f64> = values.into_iter().flatten().collect();
                    check_normality(&values, Some(outcome), self.alpha)
                }),
        );
        let multicollinearity = (predictors.len() > 1).then(|| {
            CheckResult::from_result(
                complete_columns(dataset, predictors)
                    .and_then(|columns| check_multicollinearity(predictors, &columns)),
            )
        });
        AllChecks {
            normality,
            multicollinearity,
            note: REGRESSION_NOTE.to_string(),
        }
    }

    /// Run one diagnostic against dataset columns
    #[instrument(skip(self, dataset), fields(dataset = dataset.name()))]
    pub fn check(&self, dataset: &Dataset, request: &AssumptionRequest) -> AssumptionReport {
        match request {
            AssumptionRequest::Normality { variable } => AssumptionReport::Normality(
                CheckResult::from_result(dataset.numeric(variable).map_err(Error::from).and_then(
                    |values| {
                        let values: Vec<f64> = values.into_iter().flatten().collect();
                        check_normality(&values, Some(variable), self.alpha)
                    },
                )),
            ),
            AssumptionRequest::Homogeneity { outcome, group } => AssumptionReport::Homogeneity(
                CheckResult::from_result(grouped(dataset, outcome, group).and_then(
                    |(names, groups)| check_homogeneity(&groups, Some(names.as_slice()), self.alpha),
                )),
            ),
            AssumptionRequest::Multicollinearity { predictors } => {
                AssumptionReport::Multicollinearity(CheckResult::from_result(
                    complete_columns(dataset, predictors)
                        .and_then(|columns| check_multicollinearity(predictors, &columns)),
                ))
            }
            AssumptionRequest::Independence {
                outcome,
                predictors,
            } => AssumptionReport::Independence(CheckResult::from_result(
                residuals(dataset, outcome, predictors)
                    .and_then(|(resid, _)| check_independence(&resid)),
            )),
            AssumptionRequest::Linearity { outcome, predictor } => {
                AssumptionReport::Linearity(CheckResult::from_result(
                    complete_columns(dataset, &[predictor.clone(), outcome.clone()])
                        .and_then(|cols| check_linearity(&cols[0], &cols[1], self.alpha)),
                ))
            }
            AssumptionRequest::Heteroscedasticity {
                outcome,
                predictors,
            } => AssumptionReport::Heteroscedasticity(CheckResult::from_result(
                residuals(dataset, outcome, predictors)
                    .and_then(|(resid, x)| check_heteroscedasticity(&resid, &x, self.alpha)),
            )),
            AssumptionRequest::All {
                outcome,
                predictors,
            } => AssumptionReport::All(self.run_all_checks(dataset, outcome, predictors)),
        }
    }
}

/// Listwise-complete numeric columns, in the order requested
pub fn complete_columns(dataset: &Dataset, columns: &[String]) -> Result<Vec<Vec<f64>>> {
    let raw: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|c| dataset.numeric(c))
        .collect::<thesis_data::Result<_>>()?;
    let keep: Vec<bool> = (0..dataset.height())
        .map(|i| raw.iter().all(|col| col[i].is_some()))
        .collect();
    let out: Vec<Vec<f64>> = raw
        .into_iter()
        .map(|col| {
            col.into_iter()
                .zip(&keep)
                .filter_map(|(v, &k)| if k { v } else { None })
                .collect()
        })
        .collect();
    debug!(
        rows = out.first().map_or(0, Vec::len),
        dropped = keep.iter().filter(|k| !**k).count(),
        "listwise deletion"
    );
    Ok(out)
}

/// Outcome values split by group label, labels in sorted order
fn grouped(dataset: &Dataset, outcome: &str, group: &str) -> Result<(Vec<String>, Vec<Vec<f64>>)> {
    let values = dataset.numeric(outcome)?;
    let labels = dataset.labels(group)?;
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (v, label) in values.into_iter().zip(labels) {
        if let (Some(v), Some(label)) = (v, label) {
            groups.entry(label).or_default().push(v);
        }
    }
    Ok(groups.into_iter().unzip())
}

/// Residuals of `outcome ~ predictors` with the predictor columns used
fn residuals(
    dataset: &Dataset,
    outcome: &str,
    predictors: &[String],
) -> Result<(Vec<f64>, Vec<Vec<f64>>)> {
    if predictors.is_empty() {
        return Err(Error::InvalidInput(
            "At least one predictor is required".to_string(),
        ));
    }
    let mut names = predictors.to_vec();
    names.push(outcome.to_string());
    let mut columns = complete_columns(dataset, &names)?;
    let y = columns.pop().unwrap_or_default();
    let fit = OlsFit::fit(&y, &columns, true)?;
    Ok((fit.residuals, columns))
}
