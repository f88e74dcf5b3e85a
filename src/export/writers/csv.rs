//! CSV encoder for export operations.
//!
//! Serializes records as comma-separated values with a header row. Columns
//! come from the derived [`ColumnSchema`]; a record missing a column's path
//! contributes an empty cell, never an error.

use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::export::flatten::flatten;
use crate::export::schema::{ColumnPolicy, ColumnSchema};

use super::RecordEncoder;

/// Encoder for CSV format.
pub struct CsvEncoder {
    policy: ColumnPolicy,
    exclude_empty_containers: bool,
}

impl CsvEncoder {
    /// Create a new CSV encoder.
    ///
    /// # Arguments
    /// * `policy` - Column admission policy
    /// * `exclude_empty_containers` - Drop empty containers while flattening
    pub fn new(policy: ColumnPolicy, exclude_empty_containers: bool) -> Self {
        Self {
            policy,
            exclude_empty_containers,
        }
    }

    /// Render one record's cell for a column.
    ///
    /// Missing paths and nulls are empty cells; empty-container markers
    /// render empty as well since they carry no tabular value.
    fn cell(value: Option<&Value>) -> String {
        match value {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Null) | Some(Value::Array(_)) | Some(Value::Object(_)) | None => {
                String::new()
            }
        }
    }

    /// Escape a CSV value if necessary.
    ///
    /// # Arguments
    /// * `value` - Value to escape
    ///
    /// # Returns
    /// * `String` - Escaped value
    fn escape_csv_value(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r')
        {
            // Wrap in quotes and escape internal quotes by doubling them
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }
}

impl RecordEncoder for CsvEncoder {
    fn encode(&self, records: &[Value]) -> Result<Vec<u8>> {
        let schema = ColumnSchema::build(records, &self.policy, self.exclude_empty_containers)?;
        if schema.is_empty() {
            // zero admitted columns is an empty body, not a fault
            debug!("column schema is empty, emitting empty CSV body");
            return Ok(Vec::new());
        }

        let mut out = String::new();
        out.push_str(&schema.columns().join(","));
        out.push('\n');

        for record in records {
            let flat = flatten(record, self.exclude_empty_containers)?;
            let row: Vec<String> = schema
                .columns()
                .iter()
                .map(|column| Self::escape_csv_value(&Self::cell(flat.get(column))))
                .collect();
            out.push_str(&row.join(","));
            out.push('\n');
        }

        debug!(
            records = records.len(),
            columns = schema.len(),
            "encoded CSV export"
        );
        Ok(out.into_bytes())
    }

    fn content_type(&self) -> &'static str {
        "text/csv"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }
}
