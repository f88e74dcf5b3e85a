//! Bulk export pipeline.
//!
//! This module turns one search query into a downloadable file:
//!
//! 1. **PageWalker**: walks every page of the paginated backend,
//!    strictly sequentially
//! 2. **flatten / ColumnSchema**: normalize arbitrarily nested records
//!    into uniform tabular rows
//! 3. **RecordEncoder**: serializes the accumulated set as JSON or CSV
//! 4. **ProgressTracker**: derives completion from the walk position
//!
//! These components are orchestrated by the **ExportCoordinator**, which
//! owns the job lifecycle and the single-job guard.

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, RegsearchError};

pub mod flatten;
pub mod job;
pub mod progress;
pub mod schema;
pub mod walker;
pub mod writers;

pub use flatten::{flatten, FlatRecord};
pub use job::{ExportCoordinator, ExportFile};
pub use progress::ProgressTracker;
pub use schema::{ColumnPolicy, ColumnSchema};
pub use walker::PageWalker;
pub use writers::{CsvEncoder, JsonEncoder, RecordEncoder};

/// Supported download formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty-printed JSON array of raw records.
    Json,

    /// Header row plus one CSV row per record.
    Csv,
}

impl FromStr for ExportFormat {
    type Err = RegsearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ConfigError::InvalidValue {
                field: "format".to_string(),
                value: other.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
        }
    }
}
