//! Core primitives for thesis statistical analysis
//!
//! This crate provides the foundation shared by every other thesis-stats
//! crate: a single error type, descriptive numeric helpers, tail
//! probabilities for the reference distributions used by classical tests,
//! and an ordinary least squares fitter.
//!
//! # Rounding contract
//!
//! Every statistic that leaves the engine is rounded with [`round4`]. Table
//! rendering and narrative prompts assume pre-rounded values, so new code
//! building result records must round at construction time.
//!
//! # Example
//!
//! ```rust
//! use thesis_core::{distributions, numeric, round4};
//!
//! let a = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let m = numeric::mean(&a).unwrap();
//! let p = distributions::t_two_sided_p(-5.0, 8.0).unwrap();
//! assert_eq!(m, 3.0);
//! assert!(round4(p) < 0.01);
//! ```

pub mod distributions;
pub mod error;
pub mod numeric;
pub mod ols;

pub use error::{check_alpha, Error, Result};
pub use numeric::{round4, round_to};
pub use ols::OlsFit;

/// Default significance level
pub const DEFAULT_ALPHA: f64 = 0.05;
