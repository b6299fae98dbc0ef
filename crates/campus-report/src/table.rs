//! Flattening report bodies into rows and columns.

use serde::Serialize;
use serde_json::Value;

/// A report body laid out as a table.
///
/// Report bodies are arbitrary JSON computed by the backend. Arrays of
/// objects become one row per element with the union of their keys as
/// columns; a single object becomes key/value rows; anything else becomes
/// a single `value` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) if items.iter().all(Value::is_object) => {
                let mut headers: Vec<String> = Vec::new();
                for item in items.iter().filter_map(Value::as_object) {
                    for key in item.keys() {
                        if !headers.contains(key) {
                            headers.push(key.clone());
                        }
                    }
                }
                let rows = items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|item| {
                        headers
                            .iter()
                            .map(|h| item.get(h).map(cell).unwrap_or_default())
                            .collect()
                    })
                    .collect();
                Self { headers, rows }
            }
            Value::Array(items) => Self {
                headers: vec!["value".into()],
                rows: items.iter().map(|v| vec![cell(v)]).collect(),
            },
            Value::Object(map) => Self {
                headers: vec!["key".into(), "value".into()],
                rows: map.iter().map(|(k, v)| vec![k.clone(), cell(v)]).collect(),
            },
            other => Self {
                headers: vec!["value".into()],
                rows: vec![vec![cell(other)]],
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Render one JSON value as cell text.
fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
