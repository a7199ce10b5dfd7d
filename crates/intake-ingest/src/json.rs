//! JSON payloads into column grids.
//!
//! Two shapes are accepted, tried in order:
//! - an array of flat records: `[{"Name": "Ann", "Age": 25}, ...]`
//! - an object of columns: `{"Name": ["Ann"], "Age": [25]}`

use indexmap::{IndexMap, IndexSet};
use intake_model::ColumnGrid;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Sheet name reported for JSON uploads.
pub const JSON_SHEET_NAME: &str = "JSON";

pub fn decode_json(bytes: &[u8]) -> Result<ColumnGrid> {
    let array_error = match serde_json::from_slice::<Vec<Option<Map<String, Value>>>>(bytes) {
        Ok(records) => return Ok(records_to_grid(&records)),
        Err(error) => error,
    };
    match serde_json::from_slice::<IndexMap<String, Vec<Value>>>(bytes) {
        Ok(columns) => Ok(columns_to_grid(columns)),
        Err(object_error) => Err(IngestError::JsonShape {
            array: array_error.to_string(),
            object: object_error.to_string(),
        }),
    }
}

fn records_to_grid(records: &[Option<Map<String, Value>>]) -> ColumnGrid {
    let mut columns: IndexSet<&str> = IndexSet::new();
    for record in records.iter().flatten() {
        columns.extend(record.keys().map(String::as_str));
    }

    let mut grid = ColumnGrid::new();
    for (position, column) in columns.iter().enumerate() {
        let values = records
            .iter()
            .map(|record| {
                record
                    .as_ref()
                    .and_then(|record| record.get(*column))
                    .map(render_value)
                    .unwrap_or_default()
            })
            .collect();
        grid.insert_column(*column, Some(position), values);
    }
    debug!(
        records = records.len(),
        columns = grid.len(),
        "decoded JSON records"
    );
    grid
}

fn columns_to_grid(columns: IndexMap<String, Vec<Value>>) -> ColumnGrid {
    let mut grid = ColumnGrid::new();
    for (position, (name, values)) in columns.into_iter().enumerate() {
        grid.insert_column(name, Some(position), values.iter().map(render_value).collect());
    }
    grid.pad_to_rectangle();
    debug!(
        columns = grid.len(),
        rows = grid.row_count(),
        "decoded JSON columns"
    );
    grid
}

/// Cell text for a JSON value: strings verbatim, `null` empty, everything
/// else as compact JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_become_columns_in_first_seen_order() {
        let grid = decode_json(
            br#"[{"Name": "Ann", "Age": 25}, null, {"Email": "b@x.io", "Name": "Bob", "Tags": [1, 2]}]"#,
        )
        .unwrap();
        let names: Vec<&str> = grid.column_names().collect();
        assert_eq!(names, vec!["Name", "Age", "Email", "Tags"]);
        assert_eq!(
            grid.values("Name").unwrap(),
            &["Ann".to_string(), String::new(), "Bob".to_string()]
        );
        assert_eq!(
            grid.values("Age").unwrap(),
            &["25".to_string(), String::new(), String::new()]
        );
        assert_eq!(grid.values("Tags").unwrap()[2], "[1,2]");
        assert_eq!(grid.position("Email"), Some(2));
    }

    #[test]
    fn columns_are_padded_to_longest() {
        let grid = decode_json(br#"{"Rate": ["12%", 0.5, true], "Note": [null]}"#).unwrap();
        assert_eq!(
            grid.values("Rate").unwrap(),
            &["12%".to_string(), "0.5".to_string(), "true".to_string()]
        );
        assert_eq!(
            grid.values("Note").unwrap(),
            &[String::new(), String::new(), String::new()]
        );
    }

    #[test]
    fn empty_array_is_an_empty_grid() {
        let grid = decode_json(b"[]").unwrap();
        assert!(grid.is_empty());
    }

    #[test]
    fn other_shapes_are_rejected() {
        for payload in [&b"42"[..], b"[1, 2]", br#"{"a": 1}"#, b"not json"] {
            assert!(matches!(
                decode_json(payload),
                Err(IngestError::JsonShape { .. })
            ));
        }
    }
}
