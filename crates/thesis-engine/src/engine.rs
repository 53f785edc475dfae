//! Dispatch from a selector and parameters to a test family

use crate::association::{crosstab, independence};
use crate::correlation::correlate;
use crate::descriptive::{describe, Descriptives};
use crate::groups::Groups;
use crate::linear::regress;
use crate::logistic::{logit, BinaryOutcome};
use crate::rank::{kruskal_wallis, mann_whitney};
use crate::record::{AnalysisResult, ResultRecord};
use crate::selector::{TestParameters, TestSelector, TestSpecification};
use crate::{anova, two_sample, Result};
use thesis_assumptions::complete_columns;
use thesis_core::numeric::pairwise_complete;
use thesis_core::{check_alpha, DEFAULT_ALPHA};
use thesis_data::Dataset;
use tracing::{info, instrument, warn};

/// Runs statistical tests against a dataset at a default α
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestEngine {
    alpha: f64,
}

impl Default for TestEngine {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl TestEngine {
    /// Engine with a default α, which must lie in (0, 1)
    pub fn new(alpha: f64) -> Result<Self> {
        Ok(Self {
            alpha: check_alpha(alpha)?,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Run one test; every failure becomes an error-only record
    #[instrument(skip(self, dataset, params), fields(dataset = dataset.name(), test = %selector))]
    pub fn run(
        &self,
        dataset: &Dataset,
        selector: TestSelector,
        params: &TestParameters,
    ) -> ResultRecord {
        match self.try_run(dataset, selector, params) {
            Ok(result) => {
                info!(p = result.p_value, significant = result.significant, "test complete");
                result.into()
            }
            Err(e) => {
                warn!(error = %e, "test failed");
                ResultRecord::failed(e)
            }
        }
    }

    pub fn run_spec(&self, dataset: &Dataset, spec: &TestSpecification) -> ResultRecord {
        self.run(dataset, spec.selector, &spec.parameters)
    }

    /// Run one test, returning failures as `Err`
    pub fn try_run(
        &self,
        dataset: &Dataset,
        selector: TestSelector,
        params: &TestParameters,
    ) -> Result<AnalysisResult> {
        let alpha = match params.alpha {
            Some(a) => check_alpha(a)?,
            None => self.alpha,
        };
        use TestSelector::*;
        match selector {
            TwoSample | Paired | KGroup | RankTwoSample | RankKGroup => {
                let group = params.require(selector, "group")?;
                let outcome = params.require(selector, "outcome")?;
                let groups = Groups::from_dataset(dataset, group, outcome)?;
                match selector {
                    TwoSample => two_sample::independent_t(&groups, group, outcome, alpha),
                    Paired => two_sample::paired_t(&groups, group, outcome, alpha),
                    KGroup => anova::one_way(&groups, group, outcome, alpha),
                    RankTwoSample => mann_whitney(&groups, group, outcome, alpha),
                    _ => kruskal_wallis(&groups, group, outcome, alpha),
                }
            }
            Association => {
                let v1 = params.require(selector, "variable1")?;
                let v2 = params.require(selector, "variable2")?;
                independence(crosstab(dataset, v1, v2)?, v1, v2, alpha)
            }
            Correlation => {
                let v1 = params.require(selector, "variable1")?;
                let v2 = params.require(selector, "variable2")?;
                let (x, y) = pairwise_complete(&dataset.numeric(v1)?, &dataset.numeric(v2)?);
                correlate(&x, &y, params.method.unwrap_or_default(), v1, v2, alpha)
            }
            LinearModel => {
                let outcome = params.require(selector, "outcome")?;
                let predictors = params.require_predictors(selector)?;
                let mut names = vec![outcome.to_string()];
                names.extend_from_slice(predictors);
                let mut columns = complete_columns(dataset, &names)?;
                let y = columns.remove(0);
                regress(&y, &columns, outcome, predictors, alpha)
            }
            LogisticModel => {
                let outcome = params.require(selector, "outcome")?;
                let predictors = params.require_predictors(selector)?;
                let data = BinaryOutcome::from_dataset(dataset, outcome, predictors)?;
                logit(&data, outcome, predictors, alpha)
            }
        }
    }

    /// Descriptive statistics of the named columns, or all columns
    pub fn describe(&self, dataset: &Dataset, variables: Option<&[String]>) -> Result<Descriptives> {
        describe(dataset, variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thesis_data::ColumnData;

    fn two_groups() -> Dataset {
        Dataset::from_columns(
            "scores",
            vec![
                (
                    "group",
                    ColumnData::text(["A", "A", "A", "A", "A", "B", "B", "B", "B", "B"]),
                ),
                (
                    "score",
                    ColumnData::numeric([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        assert!(TestEngine::new(0.0).is_err());
        assert!(TestEngine::new(1.0).is_err());
        assert_eq!(TestEngine::new(0.01).unwrap().alpha(), 0.01);
    }

    #[test]
    fn test_missing_parameter_becomes_error_record() {
        let engine = TestEngine::default();
        let record = engine.run(
            &two_groups(),
            TestSelector::TwoSample,
            &TestParameters::default(),
        );
        assert_eq!(
            record.error(),
            Some("Missing parameter 'group' for ttest")
        );
    }

    #[test]
    fn test_alpha_override_validated() {
        let engine = TestEngine::default();
        let params = TestParameters::grouped("group", "score").with_alpha(1.5);
        let record = engine.run(&two_groups(), TestSelector::TwoSample, &params);
        assert!(!record.is_complete());
    }

    #[test]
    fn test_alpha_override_reported() {
        let engine = TestEngine::default();
        let params = TestParameters::grouped("group", "score").with_alpha(0.001);
        let record = engine.run(&two_groups(), TestSelector::TwoSample, &params);
        let result = record.result().unwrap();
        assert_eq!(result.alpha, 0.001);
        // p ≈ 0.00105
        assert!(!result.significant);
    }

    #[test]
    fn test_unknown_column_becomes_error_record() {
        let engine = TestEngine::default();
        let record = engine.run(
            &two_groups(),
            TestSelector::KGroup,
            &TestParameters::grouped("cohort", "score"),
        );
        assert!(record.error().is_some());
    }
}
