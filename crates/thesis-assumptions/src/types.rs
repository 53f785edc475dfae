//! Result records for assumption checks

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thesis_core::round4;

/// A test statistic with its p-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestStatistic {
    pub statistic: f64,
    pub p_value: f64,
}

impl TestStatistic {
    pub fn new(statistic: f64, p_value: f64) -> Self {
        Self { statistic, p_value }
    }

    /// Whether the "assumption holds" null survives at `alpha`
    pub fn holds(&self, alpha: f64) -> bool {
        self.p_value > alpha
    }
}

/// One executed diagnostic test with its verdict
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubTest {
    pub statistic: f64,
    pub p_value: f64,
    /// `p_value > alpha`
    pub assumption_met: bool,
}

impl SubTest {
    pub fn from_statistic(t: TestStatistic, alpha: f64) -> Self {
        Self {
            statistic: round4(t.statistic),
            p_value: round4(t.p_value),
            assumption_met: t.holds(alpha),
        }
    }
}

/// Outcome of a single check: its record, or only the reason it failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckResult<T> {
    Completed(T),
    Failed { error: String },
}

impl<T> CheckResult<T> {
    pub fn from_result<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Self::Completed(v),
            Err(e) => Self::Failed {
                error: e.to_string(),
            },
        }
    }

    pub fn completed(&self) -> Option<&T> {
        match self {
            Self::Completed(v) => Some(v),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { error } => Some(error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Parametric,
    NonParametric,
    Proceed,
    UseWelchOrNonparametric,
    ConsiderRemoving,
    ConsiderTimeSeriesMethods,
    ConsiderTransformation,
    UseRobustStandardErrors,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parametric => "parametric",
            Self::NonParametric => "non-parametric",
            Self::Proceed => "proceed",
            Self::UseWelchOrNonparametric => "use_welch_or_nonparametric",
            Self::ConsiderRemoving => "consider_removing",
            Self::ConsiderTimeSeriesMethods => "consider_time_series_methods",
            Self::ConsiderTransformation => "consider_transformation",
            Self::UseRobustStandardErrors => "use_robust_standard_errors",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeIndicators {
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    /// |skewness| > 2
    pub skewness_concern: bool,
    /// |excess kurtosis| > 7
    pub kurtosis_concern: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalityResult {
    pub variable: Option<String>,
    pub sample_size: usize,
    pub shapiro_wilk: Option<SubTest>,
    pub dagostino_pearson: Option<SubTest>,
    pub descriptive: ShapeIndicators,
    /// `None` when no test could run; otherwise true only if every executed
    /// test accepts normality
    pub normal: Option<bool>,
    pub recommendation: Recommendation,
}

impl NormalityResult {
    pub fn tests_run(&self) -> usize {
        usize::from(self.shapiro_wilk.is_some()) + usize::from(self.dagostino_pearson.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupVariance {
    pub group: String,
    pub n: usize,
    pub variance: f64,
    pub std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomogeneityResult {
    pub n_groups: usize,
    pub levene: SubTest,
    pub bartlett: Option<SubTest>,
    pub group_variances: Vec<GroupVariance>,
    /// Largest over smallest positive group variance
    pub variance_ratio: Option<f64>,
    pub variance_ratio_concern: bool,
    pub equal_variance: bool,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VifEntry {
    pub variable: String,
    #[serde(rename = "VIF")]
    pub vif: f64,
    /// VIF > 5
    pub concern: bool,
    /// VIF > 10
    pub severe: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighCorrelation {
    pub variable1: String,
    pub variable2: String,
    pub correlation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MulticollinearityResult {
    pub vif: Vec<VifEntry>,
    pub correlation_matrix: BTreeMap<String, BTreeMap<String, f64>>,
    pub high_correlations: Vec<HighCorrelation>,
    pub multicollinearity_present: bool,
    pub severe_multicollinearity: bool,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Autocorrelation {
    Positive,
    Negative,
    None,
}

impl Autocorrelation {
    /// Bands of the Durbin-Watson statistic: below 1.5, above 2.5, between
    pub fn from_durbin_watson(dw: f64) -> Self {
        if dw < 1.5 {
            Self::Positive
        } else if dw > 2.5 {
            Self::Negative
        } else {
            Self::None
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Positive => "positive autocorrelation",
            Self::Negative => "negative autocorrelation",
            Self::None => "no significant autocorrelation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndependenceResult {
    pub durbin_watson: f64,
    pub autocorrelation: Autocorrelation,
    pub interpretation: String,
    pub concern: bool,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearityResult {
    pub residual_fitted_correlation: f64,
    /// |correlation| > 0.3
    pub correlation_concern: bool,
    pub rainbow_test: Option<SubTest>,
    pub linear: bool,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeteroscedasticityResult {
    pub breusch_pagan: SubTest,
    pub white: Option<SubTest>,
    pub homoscedastic: bool,
    pub recommendation: Recommendation,
}

/// Checks run together before a regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllChecks {
    pub normality: CheckResult<NormalityResult>,
    pub multicollinearity: Option<CheckResult<MulticollinearityResult>>,
    pub note: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_is_strict() {
        let t = TestStatistic::new(1.0, 0.05);
        assert!(!t.holds(0.05));
        assert!(t.holds(0.04));
    }

    #[test]
    fn test_durbin_watson_bands() {
        assert_eq!(Autocorrelation::from_durbin_watson(1.2), Autocorrelation::Positive);
        assert_eq!(Autocorrelation::from_durbin_watson(2.0), Autocorrelation::None);
        assert_eq!(Autocorrelation::from_durbin_watson(1.5), Autocorrelation::None);
        assert_eq!(Autocorrelation::from_durbin_watson(2.7), Autocorrelation::Negative);
    }

    #[test]
    fn test_failed_check_serializes_error_only() {
        let r: CheckResult<SubTest> = CheckResult::from_result(Err::<SubTest, _>("boom"));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json, serde_json::json!({"error": "boom"}));
        assert_eq!(r.error(), Some("boom"));
    }
}
