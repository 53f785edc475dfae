//! Assumption checks for classical tests
//!
//! Each diagnostic family has a free function returning `Result` and a
//! method on [`AssumptionChecker`] that wraps the outcome in a
//! [`CheckResult`], so one failing check never hides the others.
//!
//! Verdicts compare the p-value with α strictly: an assumption is met when
//! `p > α`. The variance-ratio and skew/kurtosis flags use fixed thresholds
//! instead.
//!
//! ```rust
//! use thesis_assumptions::AssumptionChecker;
//!
//! let checker = AssumptionChecker::default();
//! let result = checker.normality(&[1.0, 2.0], Some("score"));
//! let normality = result.completed().unwrap();
//! assert_eq!(normality.tests_run(), 0);
//! assert_eq!(normality.normal, None);
//! ```

mod checker;
mod error;
pub mod homogeneity;
pub mod normality;
pub mod regression;
mod types;

pub use checker::{
    complete_columns, AssumptionChecker, AssumptionReport, AssumptionRequest, REGRESSION_NOTE,
};
pub use error::{Error, Result};
pub use types::*;
