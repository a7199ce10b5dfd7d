//! Column-oriented grid of cell text.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One column of the grid: its position in the source plus the cell text
/// of every data row (header excluded).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridColumn {
    /// Zero-based position in the source sheet or JSON key order.
    pub position: Option<usize>,
    pub values: Vec<String>,
}

/// Ordered mapping of column name to column values.
///
/// Insertion order is first-seen order; re-inserting a name replaces its
/// values and position but keeps the original slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnGrid {
    columns: IndexMap<String, GridColumn>,
}

impl ColumnGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        position: Option<usize>,
        values: Vec<String>,
    ) {
        self.columns
            .insert(name.into(), GridColumn { position, values });
    }

    pub fn column(&self, name: &str) -> Option<&GridColumn> {
        self.columns.get(name)
    }

    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.columns.get(name).map(|column| column.values.as_slice())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.get(name).and_then(|column| column.position)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GridColumn)> {
        self.columns
            .iter()
            .map(|(name, column)| (name.as_str(), column))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of data rows (the longest column).
    pub fn row_count(&self) -> usize {
        self.columns
            .values()
            .map(|column| column.values.len())
            .max()
            .unwrap_or(0)
    }

    /// Pad every column with empty strings up to the longest column.
    pub fn pad_to_rectangle(&mut self) {
        let rows = self.row_count();
        for column in self.columns.values_mut() {
            column.values.resize(rows, String::new());
        }
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<String>)> for ColumnGrid {
    fn from_iter<I: IntoIterator<Item = (S, Vec<String>)>>(iter: I) -> Self {
        let mut grid = ColumnGrid::new();
        for (index, (name, values)) in iter.into_iter().enumerate() {
            grid.insert_column(name, Some(index), values);
        }
        grid
    }
}

// Serialized as `{ "column": ["v1", "v2"] }`, the shape callers display.
impl Serialize for ColumnGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, column) in &self.columns {
            map.serialize_entry(name, &column.values)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reinsert_keeps_slot_and_replaces_values() {
        let mut grid = ColumnGrid::new();
        grid.insert_column("A", Some(0), vec!["1".into()]);
        grid.insert_column("B", Some(1), vec!["2".into()]);
        grid.insert_column("A", Some(2), vec!["3".into()]);

        let names: Vec<&str> = grid.column_names().collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(grid.position("A"), Some(2));
        assert_eq!(grid.values("A"), Some(&["3".to_string()][..]));
    }

    #[test]
    fn pad_to_rectangle_fills_short_columns() {
        let mut grid: ColumnGrid = vec![
            ("A", vec!["1".to_string(), "2".to_string()]),
            ("B", vec!["x".to_string()]),
        ]
        .into_iter()
        .collect();
        grid.pad_to_rectangle();
        assert_eq!(grid.values("B"), Some(&["x".to_string(), String::new()][..]));
        assert_eq!(grid.row_count(), 2);
    }

    #[test]
    fn serializes_as_name_to_values() {
        let grid: ColumnGrid = vec![("Age", vec!["25".to_string()])].into_iter().collect();
        let json = serde_json::to_string(&grid).expect("serialize grid");
        assert_eq!(json, r#"{"Age":["25"]}"#);
    }
}
