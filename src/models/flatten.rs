use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// A JSON object flattened to dotted column names, e.g.
/// `{"principal_investigator": {"email": ..}}` becomes
/// `{"principal_investigator.email": ..}`.
///
/// Arrays and scalars are kept as leaf values.
pub type FlatRow = BTreeMap<String, Value>;

/// Flatten a JSON object. Non-object values yield an empty row.
pub fn flatten(value: &Value) -> FlatRow {
    let mut row = FlatRow::new();
    if let Value::Object(map) = value {
        flatten_into(&mut row, "", map);
    }
    row
}

fn flatten_into(row: &mut FlatRow, prefix: &str, map: &Map<String, Value>) {
    for (key, value) in map {
        let column = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(row, &column, inner),
            _ => {
                row.insert(column, value.clone());
            }
        }
    }
}

/// Render a JSON value as a table cell.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
