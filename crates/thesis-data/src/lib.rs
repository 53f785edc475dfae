//! Dataset handling for thesis-stats
//!
//! Datasets are polars `DataFrame`s behind a thin typed wrapper. A
//! [`DatasetStore`] keeps every version of each dataset together with an
//! append-only [`AuditTrail`] of the transformations that produced them.
//!
//! # Examples
//!
//! ```rust
//! use thesis_data::{import, DatasetStore, InMemoryStore, Transformation};
//!
//! let csv = "group,score\na,1\nb,2\na,\nb,4\n";
//! let imported = import::from_reader("survey.csv", csv.as_bytes()).unwrap();
//!
//! let store = InMemoryStore::new();
//! let id = store
//!     .create(Some("survey.csv"), imported.dataset.into_frame())
//!     .unwrap();
//!
//! let op = Transformation::HandleMissing {
//!     column: "score".into(),
//!     method: thesis_data::MissingMethod::Mean,
//!     fill_value: None,
//! };
//! let (version, _report) = store
//!     .modify(&id, "cleaned", op.action(), &mut |ds| {
//!         op.apply(ds).map(|t| (t.frame, t.report))
//!     })
//!     .unwrap();
//! assert_eq!(version, "v2_cleaned");
//! assert_eq!(store.audit(&id).unwrap().len(), 1);
//! ```

pub mod audit;
mod dataset;
mod error;
pub mod import;
pub mod quality;
pub mod reliability;
mod store;
pub mod transform;

pub use audit::{AuditEntry, AuditSummary, AuditTrail};
pub use dataset::{
    format_number, ColumnData, ColumnKind, ColumnMetadata, Dataset, DatasetMetadata,
    CONTINUOUS_UNIQUE_THRESHOLD,
};
pub use error::{Error, Result};
pub use quality::{DataDictionary, QualityReport};
pub use reliability::{cronbach_alpha, ReliabilityAnalysis};
pub use store::{
    DatasetId, DatasetStore, DatasetSummary, InMemoryStore, ModifyOp, VersionComparison,
    VersionInfo, INITIAL_VERSION,
};
pub use transform::{
    CategoryMethod, Keep, MissingMethod, ScoreMethod, StandardizeMethod, Transformation,
    Transformed,
};
