//! Result records
//!
//! A [`ResultRecord`] is either a complete [`AnalysisResult`] or an error
//! message, never both. All numbers are rounded with [`thesis_core::round4`]
//! when the record is built; consumers must not round again.

use crate::selector::TestSelector;
use serde::{Deserialize, Serialize};
use thesis_assumptions::{SubTest, VifEntry};
use thesis_effect::{
    CorrelationDirection, CorrelationStrength, EffectSizeInterpretation, PseudoR2Quality,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultRecord {
    Complete(Box<AnalysisResult>),
    Failed { error: String },
}

impl ResultRecord {
    pub fn failed(error: impl ToString) -> Self {
        Self::Failed {
            error: error.to_string(),
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Complete(r) => Some(r),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Complete(_) => None,
            Self::Failed { error } => Some(error),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

impl From<AnalysisResult> for ResultRecord {
    fn from(r: AnalysisResult) -> Self {
        Self::Complete(Box::new(r))
    }
}

/// Degrees of freedom in the shape each family reports them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DegreesOfFreedom {
    Scalar(usize),
    Split { between: usize, within: usize },
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMetric {
    CohensD,
    EtaSquared,
    CramersV,
    R,
    RankBiserialR,
    EpsilonSquared,
    RSquared,
    PseudoRSquared,
}

impl EffectMetric {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CohensD => "Cohen's d",
            Self::EtaSquared => "η²",
            Self::CramersV => "Cramér's V",
            Self::R => "r",
            Self::RankBiserialR => "rank-biserial r",
            Self::EpsilonSquared => "ε²",
            Self::RSquared => "R²",
            Self::PseudoRSquared => "McFadden R²",
        }
    }
}

/// Qualitative reading of an effect size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EffectLabel {
    Magnitude(EffectSizeInterpretation),
    ModelQuality(PseudoR2Quality),
}

impl EffectLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Magnitude(m) => m.as_str(),
            Self::ModelQuality(q) => q.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectBlock {
    pub metric: EffectMetric,
    pub value: f64,
    pub interpretation: EffectLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_95: Option<(f64, f64)>,
    /// Bias-corrected companion of η²
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omega_squared: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odds_ratio: Option<f64>,
}

impl EffectBlock {
    pub fn new(metric: EffectMetric, value: f64, interpretation: EffectLabel) -> Self {
        Self {
            metric,
            value,
            interpretation,
            ci_95: None,
            omega_squared: None,
            phi: None,
            odds_ratio: None,
        }
    }
}

/// Columns the test was run on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variables {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub groups: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable2: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub predictors: Vec<String>,
}

impl Variables {
    pub fn grouped(group: &str, outcome: &str, groups: Vec<String>) -> Self {
        Self {
            group: Some(group.to_string()),
            outcome: Some(outcome.to_string()),
            groups,
            ..Self::default()
        }
    }

    pub fn pair(variable1: &str, variable2: &str) -> Self {
        Self {
            variable1: Some(variable1.to_string()),
            variable2: Some(variable2.to_string()),
            ..Self::default()
        }
    }

    pub fn model(outcome: &str, predictors: &[String]) -> Self {
        Self {
            outcome: Some(outcome.to_string()),
            predictors: predictors.to_vec(),
            ..Self::default()
        }
    }
}

/// Fields shared by every test family plus the family-specific details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub test_type: String,
    pub selector: TestSelector,
    pub statistic: f64,
    pub degrees_of_freedom: DegreesOfFreedom,
    pub p_value: f64,
    /// `p < alpha` on the unrounded p-value, so a rounded `p_value` equal
    /// to `alpha` can still be significant
    pub significant: bool,
    pub alpha: f64,
    pub sample_size: usize,
    pub effect_size: EffectBlock,
    pub variables: Variables,
    pub details: TestDetails,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStatistics {
    pub group: String,
    pub n: usize,
    pub mean: f64,
    pub std: f64,
    pub se: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankGroupStatistics {
    pub group: String,
    pub n: usize,
    pub median: f64,
    pub iqr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanDifference {
    pub value: f64,
    pub ci_95: (f64, f64),
}

/// Shapiro-Wilk on one group; `None` when the group is too small or constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupNormality {
    pub group: String,
    pub shapiro_wilk: Option<SubTest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseComparison {
    pub group1: String,
    pub group2: String,
    /// Mean of `group2` minus mean of `group1`
    pub mean_diff: f64,
    pub p_adj: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub significant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostHoc {
    pub method: String,
    pub comparisons: Vec<PairwiseComparison>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SumsOfSquaresBlock {
    pub between: f64,
    pub within: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingencyTable {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    pub observed: Vec<Vec<u64>>,
    /// Expected counts under independence, rounded to 2 decimals
    pub expected: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedCellCounts {
    pub min_expected: f64,
    pub cells_below_5: usize,
    pub fisher_recommended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearCoefficient {
    pub variable: String,
    #[serde(rename = "B")]
    pub b: f64,
    #[serde(rename = "SE")]
    pub se: f64,
    /// Standardized coefficient; `None` for the constant
    pub beta: Option<f64>,
    pub t: f64,
    pub p: f64,
    pub ci_95: (f64, f64),
    pub significant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModelSummary {
    pub r_squared: f64,
    pub r_squared_adj: f64,
    pub f_statistic: f64,
    pub f_pvalue: f64,
    pub significant: bool,
    pub aic: f64,
    pub bic: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualDiagnostics {
    pub normality: Option<SubTest>,
    pub breusch_pagan: Option<SubTest>,
    pub durbin_watson: Option<f64>,
    pub autocorrelation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticCoefficient {
    pub variable: String,
    #[serde(rename = "B")]
    pub b: f64,
    #[serde(rename = "SE")]
    pub se: f64,
    #[serde(rename = "Wald")]
    pub wald: f64,
    pub z: f64,
    pub p: f64,
    #[serde(rename = "OR")]
    pub odds_ratio: f64,
    #[serde(rename = "OR_ci_95")]
    pub odds_ratio_ci: (f64, f64),
    pub significant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModelSummary {
    pub pseudo_r_squared: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub llr_pvalue: f64,
    pub significant: bool,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub accuracy: f64,
    /// Rows are observed class, columns predicted class, classes in
    /// `outcome_levels` order
    pub confusion_matrix: [[usize; 2]; 2],
}

/// Family-specific part of a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum TestDetails {
    TwoSample {
        equal_variance: bool,
        /// `None` when every group's deviations are constant
        levene: Option<SubTest>,
        /// Welch-Satterthwaite df when the Welch variant was chosen
        welch_df: Option<f64>,
        mean_difference: MeanDifference,
        group_statistics: Vec<GroupStatistics>,
        normality: Vec<GroupNormality>,
    },
    Paired {
        mean_difference: MeanDifference,
        group_statistics: Vec<GroupStatistics>,
        normality: Vec<GroupNormality>,
    },
    KGroup {
        sums_of_squares: SumsOfSquaresBlock,
        group_statistics: Vec<GroupStatistics>,
        posthoc: PostHoc,
        levene: Option<SubTest>,
    },
    Association {
        contingency_table: ContingencyTable,
        expected_cell_counts: ExpectedCellCounts,
        exact_test: bool,
        yates_corrected: bool,
    },
    Correlation {
        r: f64,
        r_squared: f64,
        ci_95: (f64, f64),
        strength: CorrelationStrength,
        direction: CorrelationDirection,
    },
    LinearModel {
        model_summary: LinearModelSummary,
        coefficients: Vec<LinearCoefficient>,
        multicollinearity: Option<Vec<VifEntry>>,
        diagnostics: ResidualDiagnostics,
    },
    LogisticModel {
        model_summary: LogisticModelSummary,
        coefficients: Vec<LogisticCoefficient>,
        classification: Classification,
        outcome_levels: [String; 2],
    },
    RankTwoSample {
        exact: bool,
        group_statistics: Vec<RankGroupStatistics>,
    },
    RankKGroup {
        group_statistics: Vec<RankGroupStatistics>,
    },
}
