//! Record flattening.
//!
//! Converts an arbitrarily nested JSON value into a flat mapping from
//! structural path to scalar. Object fields extend the path with `.field`
//! (no leading dot at the root), array elements with `[index]`. Empty
//! containers are kept as explicit markers unless the caller excludes them.
//!
//! Flattening is deterministic and pure: identical input produces identical
//! path keys and values, in traversal order.

use serde_json::Value;

use crate::error::{ExportError, Result};

/// Nesting depth guard.
///
/// Wire payloads are acyclic and shallow in practice; anything deeper than
/// this is malformed input and aborts the export instead of overflowing the
/// stack.
pub const MAX_DEPTH: usize = 128;

/// One record flattened to path/scalar pairs, in traversal order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord {
    entries: Vec<(String, Value)>,
}

impl FlatRecord {
    /// Value at a structural path, if the record has it.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == path)
            .map(|(_, value)| value)
    }

    /// Path/value pairs in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Flatten a value into a path/scalar mapping.
///
/// # Arguments
/// * `value` - Value to flatten
/// * `exclude_empty_containers` - Drop empty arrays/objects instead of
///   keeping them as present-but-empty markers
pub fn flatten(value: &Value, exclude_empty_containers: bool) -> Result<FlatRecord> {
    flatten_at(value, String::new(), exclude_empty_containers)
}

/// Flatten a value with an explicit root path.
///
/// The schema builder uses this to prefix each record of a result set with
/// its synthetic `[i]` index so path keys from different records unify
/// after the index is stripped.
pub(crate) fn flatten_at(
    value: &Value,
    root: String,
    exclude_empty_containers: bool,
) -> Result<FlatRecord> {
    let mut record = FlatRecord::default();
    recurse(value, root, 0, exclude_empty_containers, &mut record.entries)?;
    Ok(record)
}

fn recurse(
    value: &Value,
    path: String,
    depth: usize,
    exclude_empty: bool,
    out: &mut Vec<(String, Value)>,
) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(ExportError::Flatten(format!(
            "nesting depth exceeds {MAX_DEPTH} at path '{path}'"
        ))
        .into());
    }
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                if !exclude_empty {
                    out.push((path, Value::Array(Vec::new())));
                }
            } else {
                for (index, item) in items.iter().enumerate() {
                    recurse(item, format!("{path}[{index}]"), depth + 1, exclude_empty, out)?;
                }
            }
        }
        Value::Object(fields) => {
            if fields.is_empty() {
                if !exclude_empty {
                    out.push((path, Value::Object(serde_json::Map::new())));
                }
            } else {
                for (name, field) in fields {
                    let child = if path.is_empty() {
                        name.clone()
                    } else {
                        format!("{path}.{name}")
                    };
                    recurse(field, child, depth + 1, exclude_empty, out)?;
                }
            }
        }
        // scalars, null included; null is a scalar, never an empty object
        scalar => out.push((path, scalar.clone())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_flattens_to_root_path() {
        let flat = flatten(&json!(42), false).unwrap();
        assert_eq!(flat.get(""), Some(&json!(42)));
        assert_eq!(flat.len(), 1);
    }

    #[test]
    fn test_array_of_scalars() {
        let flat = flatten(&json!(["a", "b"]), false).unwrap();
        assert_eq!(flat.get("[0]"), Some(&json!("a")));
        assert_eq!(flat.get("[1]"), Some(&json!("b")));
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn test_nested_object_paths() {
        let flat = flatten(
            &json!({"Address": {"Line1": {"Value": "12 Main St"}}, "Contacts": [{"Email": "x@y.z"}]}),
            false,
        )
        .unwrap();
        assert_eq!(flat.get("Address.Line1.Value"), Some(&json!("12 Main St")));
        assert_eq!(flat.get("Contacts[0].Email"), Some(&json!("x@y.z")));
    }

    #[test]
    fn test_empty_container_markers() {
        let flat = flatten(&json!({}), false).unwrap();
        assert_eq!(flat.get(""), Some(&json!({})));

        let flat = flatten(&json!({}), true).unwrap();
        assert!(flat.is_empty());

        let flat = flatten(&json!({"Polygons": []}), false).unwrap();
        assert_eq!(flat.get("Polygons"), Some(&json!([])));

        let flat = flatten(&json!({"Polygons": []}), true).unwrap();
        assert!(flat.is_empty());
    }

    #[test]
    fn test_null_is_a_scalar_not_an_object() {
        let flat = flatten(&json!({"Name": null}), false).unwrap();
        assert_eq!(flat.get("Name"), Some(&Value::Null));
    }

    #[test]
    fn test_flattening_is_deterministic() {
        let value = json!({"B": [1, {"C": true}], "A": "x"});
        let first = flatten(&value, false).unwrap();
        let second = flatten(&value, false).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_depth_guard_rejects_pathological_nesting() {
        let mut value = json!("leaf");
        for _ in 0..(MAX_DEPTH + 2) {
            value = json!([value]);
        }
        assert!(flatten(&value, false).is_err());
    }
}
