//! # thesis-stats
//!
//! Inferential statistics for thesis data analysis: versioned datasets with
//! an audit trail, nine hypothesis-test families behind one dispatch point,
//! assumption diagnostics, APA-style tables, and narrative interpretation
//! with an ordered provider fallback.
//!
//! ## Crate Organization
//!
//! - [`thesis_core`]: numeric primitives, distributions, the shared error type
//! - [`thesis_effect`]: effect size interpretation thresholds
//! - [`thesis_data`]: CSV import, dataset store, transformations, audit trail
//! - [`thesis_assumptions`]: normality, homogeneity, VIF, Durbin-Watson, RESET,
//!   Breusch-Pagan
//! - [`thesis_engine`]: the statistical test engine and its result records
//! - [`thesis_report`]: APA tables and p-value formatting
//! - [`thesis_narrative`]: interpretation prompts and the provider fallback chain
//!
//! The [`Workbench`] ties these together for a single dataset id.
//!
//! ## Quick Start
//!
//! ```rust
//! use thesis_stats::{TestParameters, TestSelector, Workbench, WorkbenchConfig};
//!
//! let mut config = WorkbenchConfig::default();
//! config.narrative.enabled = false;
//! let bench = Workbench::in_memory(config).unwrap();
//!
//! let csv = "group,score\na,1\na,2\na,3\nb,7\nb,8\nb,9\n";
//! let id = bench.import_csv("scores.csv", csv.as_bytes()).unwrap();
//!
//! let outcome = bench
//!     .run_analysis(
//!         &id,
//!         TestSelector::TwoSample,
//!         &TestParameters::grouped("group", "score"),
//!         None,
//!         false,
//!     )
//!     .unwrap();
//! assert!(outcome.record.result().unwrap().significant);
//! assert!(outcome.tables.is_some());
//! ```

pub mod config;
mod error;
pub mod workbench;

pub use config::WorkbenchConfig;
pub use error::{Error, Result};
pub use workbench::{AnalysisOutcome, ResultsPackage, Workbench, DEFAULT_OBJECTIVE};

pub use thesis_assumptions;
pub use thesis_core;
pub use thesis_data;
pub use thesis_effect;
pub use thesis_engine;
pub use thesis_narrative;
pub use thesis_report;

pub use thesis_assumptions::{AssumptionChecker, AssumptionReport, AssumptionRequest};
pub use thesis_data::{Dataset, DatasetId, DatasetStore, InMemoryStore};
pub use thesis_engine::{
    AnalysisResult, ResultRecord, TestEngine, TestParameters, TestSelector, TestSpecification,
};
pub use thesis_narrative::{Interpretation, NarrativeProvider, NarrativeRequestor};
pub use thesis_report::{build_tables, format_p_value, ReportTables, Table};
