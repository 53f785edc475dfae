//! Statistical test engine
//!
//! [`TestEngine::run`] maps a dataset, a [`TestSelector`] and
//! [`TestParameters`] to a [`ResultRecord`]. A record is either a complete
//! [`AnalysisResult`] or an error message alone: precondition violations and
//! computational failures (degenerate input, singular matrices) never escape
//! as `Err` or panics.
//!
//! Test families:
//!
//! | Selector | Test | Effect size |
//! |---|---|---|
//! | `ttest` | Independent t (pooled or Welch by Levene) | Cohen's d |
//! | `paired_ttest` | Paired t | Cohen's d |
//! | `anova` | One-way ANOVA + Tukey HSD | η², ω² |
//! | `chisquare` | χ² independence / Fisher exact | Cramér's V |
//! | `correlation` | Pearson or Spearman | r |
//! | `linear_regression` | OLS | R² |
//! | `logistic_regression` | Logit MLE | McFadden R² |
//! | `mannwhitney` | Mann-Whitney U | rank-biserial r |
//! | `kruskal` | Kruskal-Wallis H | ε² |
//!
//! ```rust
//! use thesis_data::{ColumnData, Dataset};
//! use thesis_engine::{TestEngine, TestParameters, TestSelector};
//!
//! let ds = Dataset::from_columns(
//!     "demo",
//!     vec![
//!         ("group", ColumnData::text(["a", "a", "a", "b", "b", "b"])),
//!         ("score", ColumnData::numeric([1.0, 2.0, 3.0, 7.0, 8.0, 9.0])),
//!     ],
//! )
//! .unwrap();
//!
//! let engine = TestEngine::default();
//! let record = engine.run(&ds, TestSelector::TwoSample, &TestParameters::grouped("group", "score"));
//! let result = record.result().unwrap();
//! assert_eq!(result.significant, result.p_value < result.alpha);
//! ```

pub mod anova;
pub mod association;
pub mod correlation;
pub mod descriptive;
mod engine;
mod error;
mod groups;
pub mod linear;
pub mod logistic;
pub mod rank;
mod record;
mod selector;
pub mod two_sample;

pub use descriptive::{describe, CategoricalSummary, ContinuousSummary, Descriptives};
pub use engine::TestEngine;
pub use error::{Error, Result};
pub use groups::Groups;
pub use record::*;
pub use selector::{
    parameter_schema, CorrelationMethod, ParameterSchema, TestParameters, TestSelector,
    TestSpecification,
};
