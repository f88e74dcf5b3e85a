//! Format encoders for export operations.
//!
//! This module provides a unified interface for serializing the accumulated
//! result set to the supported download formats (JSON, CSV).

use serde_json::Value;

use crate::config::ExportConfig;
use crate::error::Result;

use super::ExportFormat;

pub mod csv;
pub mod json;

pub use csv::CsvEncoder;
pub use json::JsonEncoder;

/// Trait for encoding the accumulated records to one output format.
///
/// Encoders see the full result set at once: tabular output needs every
/// record before its column schema is stable.
pub trait RecordEncoder: Send {
    /// Serialize the records to the output byte buffer.
    fn encode(&self, records: &[Value]) -> Result<Vec<u8>>;

    /// MIME type of the produced buffer.
    fn content_type(&self) -> &'static str;

    /// File extension, without the dot.
    fn extension(&self) -> &'static str;
}

/// Build the encoder for a format from the export configuration.
pub fn encoder_for(format: ExportFormat, config: &ExportConfig) -> Box<dyn RecordEncoder> {
    match format {
        ExportFormat::Json => Box::new(JsonEncoder),
        ExportFormat::Csv => Box::new(CsvEncoder::new(
            config.column_policy(),
            config.exclude_empty_containers,
        )),
    }
}
