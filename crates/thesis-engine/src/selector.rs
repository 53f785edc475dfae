//! Test selection and per-test parameters

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The test families the engine can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestSelector {
    #[serde(rename = "ttest")]
    TwoSample,
    #[serde(rename = "paired_ttest")]
    Paired,
    #[serde(rename = "anova")]
    KGroup,
    #[serde(rename = "chisquare")]
    Association,
    #[serde(rename = "correlation")]
    Correlation,
    #[serde(rename = "linear_regression")]
    LinearModel,
    #[serde(rename = "logistic_regression")]
    LogisticModel,
    #[serde(rename = "mannwhitney")]
    RankTwoSample,
    #[serde(rename = "kruskal")]
    RankKGroup,
}

impl TestSelector {
    pub const ALL: [TestSelector; 9] = [
        Self::TwoSample,
        Self::Paired,
        Self::KGroup,
        Self::Association,
        Self::Correlation,
        Self::LinearModel,
        Self::LogisticModel,
        Self::RankTwoSample,
        Self::RankKGroup,
    ];

    /// Stable wire name
    pub fn name(&self) -> &'static str {
        match self {
            Self::TwoSample => "ttest",
            Self::Paired => "paired_ttest",
            Self::KGroup => "anova",
            Self::Association => "chisquare",
            Self::Correlation => "correlation",
            Self::LinearModel => "linear_regression",
            Self::LogisticModel => "logistic_regression",
            Self::RankTwoSample => "mannwhitney",
            Self::RankKGroup => "kruskal",
        }
    }

    /// Human-readable family name
    pub fn description(&self) -> &'static str {
        match self {
            Self::TwoSample => "Independent samples t-test",
            Self::Paired => "Paired samples t-test",
            Self::KGroup => "One-way ANOVA with Tukey HSD",
            Self::Association => "Chi-square test of independence",
            Self::Correlation => "Pearson or Spearman correlation",
            Self::LinearModel => "Linear regression",
            Self::LogisticModel => "Binary logistic regression",
            Self::RankTwoSample => "Mann-Whitney U test",
            Self::RankKGroup => "Kruskal-Wallis H test",
        }
    }
}

impl fmt::Display for TestSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TestSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|sel| sel.name() == s)
            .ok_or_else(|| Error::UnknownSelector(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
}

/// Column names and options for one test run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestParameters {
    pub group: Option<String>,
    pub outcome: Option<String>,
    pub variable1: Option<String>,
    pub variable2: Option<String>,
    pub predictors: Vec<String>,
    pub method: Option<CorrelationMethod>,
    /// Overrides the engine's α for this run
    pub alpha: Option<f64>,
}

impl TestParameters {
    pub fn grouped(group: impl Into<String>, outcome: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            outcome: Some(outcome.into()),
            ..Self::default()
        }
    }

    pub fn pair(variable1: impl Into<String>, variable2: impl Into<String>) -> Self {
        Self {
            variable1: Some(variable1.into()),
            variable2: Some(variable2.into()),
            ..Self::default()
        }
    }

    pub fn model<S: Into<String>>(outcome: impl Into<String>, predictors: Vec<S>) -> Self {
        Self {
            outcome: Some(outcome.into()),
            predictors: predictors.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: CorrelationMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub(crate) fn require<'a>(
        &'a self,
        selector: TestSelector,
        parameter: &'static str,
    ) -> Result<&'a str> {
        let value = match parameter {
            "group" => self.group.as_deref(),
            "outcome" => self.outcome.as_deref(),
            "variable1" => self.variable1.as_deref(),
            "variable2" => self.variable2.as_deref(),
            _ => None,
        };
        value.ok_or(Error::MissingParameter {
            selector: selector.name(),
            parameter,
        })
    }

    pub(crate) fn require_predictors(&self, selector: TestSelector) -> Result<&[String]> {
        if self.predictors.is_empty() {
            return Err(Error::MissingParameter {
                selector: selector.name(),
                parameter: "predictors",
            });
        }
        Ok(&self.predictors)
    }
}

/// A selector with its parameters, as received from a caller
///
/// ```json
/// {"test": "ttest", "group": "condition", "outcome": "score"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSpecification {
    #[serde(rename = "test")]
    pub selector: TestSelector,
    #[serde(flatten)]
    pub parameters: TestParameters,
}

impl TestSpecification {
    pub fn new(selector: TestSelector, parameters: TestParameters) -> Self {
        Self {
            selector,
            parameters,
        }
    }
}

/// Required and optional parameters of one test family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParameterSchema {
    pub selector: TestSelector,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

pub fn parameter_schema(selector: TestSelector) -> ParameterSchema {
    use TestSelector::*;
    let (required, optional): (&'static [&'static str], &'static [&'static str]) = match selector {
        TwoSample | Paired | KGroup | RankTwoSample | RankKGroup => {
            (&["group", "outcome"], &["alpha"])
        }
        Association => (&["variable1", "variable2"], &["alpha"]),
        Correlation => (&["variable1", "variable2"], &["method", "alpha"]),
        LinearModel | LogisticModel => (&["outcome", "predictors"], &["alpha"]),
    };
    ParameterSchema {
        selector,
        required,
        optional,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for sel in TestSelector::ALL {
            assert_eq!(sel.name().parse::<TestSelector>().unwrap(), sel);
            let json = serde_json::to_string(&sel).unwrap();
            assert_eq!(json, format!("\"{}\"", sel.name()));
        }
        assert!(matches!(
            "ztest".parse::<TestSelector>(),
            Err(Error::UnknownSelector(_))
        ));
    }

    #[test]
    fn test_schema_lists_required_columns() {
        let s = parameter_schema(TestSelector::Correlation);
        assert_eq!(s.required, ["variable1", "variable2"]);
        assert!(s.optional.contains(&"method"));
        let s = parameter_schema(TestSelector::LogisticModel);
        assert_eq!(s.required, ["outcome", "predictors"]);
    }

    #[test]
    fn test_missing_parameter() {
        let p = TestParameters::grouped("g", "y");
        assert_eq!(p.require(TestSelector::TwoSample, "group").unwrap(), "g");
        let err = p.require(TestSelector::Association, "variable1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing parameter 'variable1' for chisquare"
        );
    }

    #[test]
    fn test_parameters_deserialize_with_defaults() {
        let p: TestParameters =
            serde_json::from_str(r#"{"variable1": "a", "variable2": "b", "method": "spearman"}"#)
                .unwrap();
        assert_eq!(p.method, Some(CorrelationMethod::Spearman));
        assert!(p.predictors.is_empty());
    }

    #[test]
    fn test_specification_from_flat_json() {
        let spec: TestSpecification = serde_json::from_str(
            r#"{"test": "linear_regression", "outcome": "y", "predictors": ["x1", "x2"], "alpha": 0.01}"#,
        )
        .unwrap();
        assert_eq!(spec.selector, TestSelector::LinearModel);
        assert_eq!(spec.parameters.predictors, vec!["x1", "x2"]);
        assert_eq!(spec.parameters.alpha, Some(0.01));
    }
}
