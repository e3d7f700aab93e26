//! Group-level QC table for diffusion MRI preprocessing reports.
//!
//! Every report run produces one [`MetricRecord`] for one subject. The
//! accumulator appends it to a [`GroupTable`] persisted as right-aligned
//! fixed-width text, creating the file on first use.
//!
//! The table file is shared state addressed by path. An append is a
//! read-modify-write cycle without locking, so runs that target the same
//! file must be serialized by the caller.

pub mod accumulator;
pub mod error;
pub mod fixed_width;
pub mod format;
pub mod record;
pub mod summary;
pub mod table;

pub use accumulator::{append_record, AppendOutcome, GroupTableFile};
pub use error::{ParseError, TableError, TableResult};
pub use record::{Cell, MetricRecord};
pub use summary::{summarize, ColumnSummary, GroupSummary};
pub use table::GroupTable;

/// Name of the field that identifies the subject of a record.
pub const SUBJECT_FIELD: &str = "Sub";

/// Token written for missing cells.
pub const NULL_TOKEN: &str = "NaN";
