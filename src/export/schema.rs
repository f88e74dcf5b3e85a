//! Column schema derivation for tabular export.
//!
//! The schema is the ordered, deduplicated set of structural paths used as
//! CSV columns. Records in one result set are sparse and differently
//! shaped, so the schema is the union of every record's flattened paths:
//! each record is flattened under a synthetic `[i]` index, the index
//! segment is stripped so keys from different records unify, and first-seen
//! order is preserved.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::Result;

use super::flatten::flatten_at;

/// Which flattened paths become output columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnPolicy {
    /// Every leaf path.
    AllLeaves,

    /// Only paths whose trailing segment is one of the given leaf field
    /// names.
    LeafAllowList(Vec<String>),
}

impl ColumnPolicy {
    /// The leaf field names carrying tabular data in registry records.
    pub fn default_allow_list() -> Vec<String> {
        ["Value", "Decimals", "Precision", "StartTime", "EndTime", "Unit"]
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn admits(&self, path: &str) -> bool {
        match self {
            ColumnPolicy::AllLeaves => true,
            ColumnPolicy::LeafAllowList(names) => {
                let last = path.rsplit_once('.').map(|(_, last)| last).unwrap_or(path);
                names.iter().any(|name| name == last)
            }
        }
    }
}

impl Default for ColumnPolicy {
    fn default() -> Self {
        ColumnPolicy::LeafAllowList(Self::default_allow_list())
    }
}

/// Ordered, deduplicated set of output columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: Vec<String>,
}

impl ColumnSchema {
    /// Derive the schema for a set of records.
    ///
    /// # Arguments
    /// * `records` - The full accumulated result set
    /// * `policy` - Column admission policy
    /// * `exclude_empty_containers` - Passed through to flattening
    pub fn build(
        records: &[Value],
        policy: &ColumnPolicy,
        exclude_empty_containers: bool,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();

        for (index, record) in records.iter().enumerate() {
            let flat = flatten_at(record, format!("[{index}]"), exclude_empty_containers)?;
            for (path, _) in flat.iter() {
                let key = strip_record_index(path);
                if seen.insert(key.to_string()) && policy.admits(key) {
                    columns.push(key.to_string());
                }
            }
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Strip the synthetic per-record index segment from a path key.
///
/// `[3].Address.Line1.Value` becomes `Address.Line1.Value`.
fn strip_record_index(path: &str) -> &str {
    path.split_once('.').map(|(_, rest)| rest).unwrap_or(path)
}
