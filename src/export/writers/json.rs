//! JSON encoder for export operations.
//!
//! Serializes the raw, unflattened records as a pretty-printed JSON array
//! with 2-space indentation.

use serde_json::Value;
use tracing::debug;

use crate::error::{ExportError, Result};

use super::RecordEncoder;

/// Encoder for JSON format.
pub struct JsonEncoder;

impl RecordEncoder for JsonEncoder {
    fn encode(&self, records: &[Value]) -> Result<Vec<u8>> {
        let bytes = serde_json::to_vec_pretty(records)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        debug!(records = records.len(), bytes = bytes.len(), "encoded JSON export");
        Ok(bytes)
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encodes_pretty_array_with_two_space_indent() {
        let records = vec![json!({"Name": {"Value": "a"}})];
        let out = String::from_utf8(JsonEncoder.encode(&records).unwrap()).unwrap();
        assert!(out.starts_with("[\n  {"));
        assert!(out.contains("  \"Name\""));

        // records survive the round trip unflattened
        let parsed: Vec<Value> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_empty_set_encodes_as_empty_array() {
        let out = String::from_utf8(JsonEncoder.encode(&[]).unwrap()).unwrap();
        assert_eq!(out, "[]");
    }
}
