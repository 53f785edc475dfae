//! APA-style tables for thesis-stats results
//!
//! [`build_tables`] turns a complete [`thesis_engine::ResultRecord`] into
//! one or more [`Table`]s, an optional model summary line and a fixed-format
//! footnote. It performs no computation and no I/O. Error-only records are
//! rejected with [`Error::ErrorRecord`] carrying the original message.
//!
//! Numeric cells render with four decimals, the precision every record is
//! rounded to, so [`numeric_cells`] recovers the record's values exactly
//! from the markdown text. p-values use the APA form (`< .001`, `.032`).
//!
//! ```rust
//! use thesis_data::{ColumnData, Dataset};
//! use thesis_engine::{TestEngine, TestParameters, TestSelector};
//! use thesis_report::build_tables;
//!
//! let ds = Dataset::from_columns(
//!     "demo",
//!     vec![
//!         ("group", ColumnData::text(["a", "a", "a", "b", "b", "b"])),
//!         ("score", ColumnData::numeric([1.0, 2.0, 3.0, 7.0, 8.0, 9.0])),
//!     ],
//! )
//! .unwrap();
//! let record = TestEngine::default().run(
//!     &ds,
//!     TestSelector::TwoSample,
//!     &TestParameters::grouped("group", "score"),
//! );
//!
//! let report = build_tables(&record).unwrap();
//! assert!(report.note.starts_with("Note. N = 6."));
//! println!("{}", report.to_markdown());
//! ```

mod builder;
mod characteristics;
mod error;
pub mod format;
mod table;

pub use builder::{build_tables, ReportTables};
pub use characteristics::{correlation_matrix, sample_characteristics};
pub use error::{Error, Result};
pub use format::{format_p_value, Cell};
pub use table::{numeric_cells, Table};
