//! JSON reader.
//!
//! Two layouts are accepted:
//! - records: `[{"id": 1, "name": "Ada"}, ...]`
//! - columns: `{"id": {"0": 1, "1": 2}, "name": {"0": "Ada", "1": "Grace"}}`
//!   or `{"id": [1, 2], "name": ["Ada", "Grace"]}`
//!
//! In the keyed columns layout rows are ordered by their labels, numerically
//! when every label is an integer. A column missing a label yields NULL for
//! that row.

use super::{FormatReader, SourceFormat, check_header, open_failed};
use crate::Result;
use crate::error::AdbLoaderError;
use crate::models::{RawValue, Record, SourceData};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;

/// Reads a JSON document of records or columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReader;

impl JsonReader {
    /// Parses a JSON document held in memory; `path` is used for messages.
    pub fn read_slice(&self, bytes: &[u8], path: &Path) -> Result<SourceData> {
        let document: Value = serde_json::from_slice(bytes)
            .map_err(|e| AdbLoaderError::parse(path, format!("invalid JSON: {}", e)))?;

        match document {
            Value::Array(rows) => records_layout(rows, path),
            Value::Object(columns) => columns_layout(columns, path),
            other => Err(AdbLoaderError::parse(
                path,
                format!(
                    "expected an array of objects or an object of columns, found {}",
                    json_kind(&other)
                ),
            )),
        }
    }
}

impl FormatReader for JsonReader {
    fn format(&self) -> SourceFormat {
        SourceFormat::Json
    }

    fn read(&self, path: &Path) -> Result<SourceData> {
        let bytes = std::fs::read(path).map_err(|e| open_failed(path, e))?;
        self.read_slice(&bytes, path)
    }
}

fn records_layout(rows: Vec<Value>, path: &Path) -> Result<SourceData> {
    let mut columns: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        let fields = match row {
            Value::Object(fields) => fields,
            other => {
                return Err(AdbLoaderError::parse(
                    path,
                    format!(
                        "element {} is {}, expected an object",
                        index,
                        json_kind(&other)
                    ),
                ));
            }
        };

        let mut record = Record::new();
        for (name, value) in fields {
            if !columns.contains(&name) {
                columns.push(name.clone());
            }
            record.insert(name, raw_value(value));
        }
        records.push(record);
    }

    check_header(path, &columns)?;
    Ok(SourceData { columns, records })
}

fn columns_layout(document: Map<String, Value>, path: &Path) -> Result<SourceData> {
    let columns: Vec<String> = document.keys().cloned().collect();
    check_header(path, &columns)?;

    let mut keyed: Vec<(String, Map<String, Value>)> = Vec::new();
    let mut listed: Vec<(String, Vec<Value>)> = Vec::new();
    for (name, column) in document {
        match column {
            Value::Object(cells) => keyed.push((name, cells)),
            Value::Array(cells) => listed.push((name, cells)),
            other => {
                return Err(AdbLoaderError::parse(
                    path,
                    format!(
                        "column '{}' is {}, expected an object or array of values",
                        name,
                        json_kind(&other)
                    ),
                ));
            }
        }
    }
    if !keyed.is_empty() && !listed.is_empty() {
        return Err(AdbLoaderError::parse(
            path,
            "columns mix keyed objects and arrays",
        ));
    }

    let records = if listed.is_empty() {
        keyed_rows(keyed)
    } else {
        listed_rows(listed, path)?
    };
    Ok(SourceData { columns, records })
}

fn keyed_rows(mut columns: Vec<(String, Map<String, Value>)>) -> Vec<Record> {
    let unique: HashSet<&str> = columns
        .iter()
        .flat_map(|(_, cells)| cells.keys().map(String::as_str))
        .collect();
    let mut labels: Vec<String> = unique.into_iter().map(str::to_owned).collect();
    sort_labels(&mut labels);

    labels
        .iter()
        .map(|label| {
            let mut record = Record::new();
            for (name, cells) in &mut columns {
                let value = cells.remove(label).map_or(RawValue::Null, raw_value);
                record.insert(name.as_str(), value);
            }
            record
        })
        .collect()
}

fn listed_rows(columns: Vec<(String, Vec<Value>)>, path: &Path) -> Result<Vec<Record>> {
    let row_count = columns.first().map_or(0, |(_, cells)| cells.len());
    if let Some((name, cells)) = columns.iter().find(|(_, cells)| cells.len() != row_count) {
        return Err(AdbLoaderError::parse(
            path,
            format!(
                "column '{}' has {} values, expected {}",
                name,
                cells.len(),
                row_count
            ),
        ));
    }

    let mut records = vec![Record::new(); row_count];
    for (name, cells) in columns {
        for (record, value) in records.iter_mut().zip(cells) {
            record.insert(name.as_str(), raw_value(value));
        }
    }
    Ok(records)
}

/// Orders labels numerically when all of them are integers.
fn sort_labels(labels: &mut [String]) {
    if labels.iter().all(|l| l.parse::<i64>().is_ok()) {
        labels.sort_by_cached_key(|l| l.parse::<i64>().unwrap_or_default());
    } else {
        labels.sort_unstable();
    }
}

fn raw_value(value: Value) -> RawValue {
    match value {
        Value::Null => RawValue::Null,
        Value::Bool(b) => RawValue::Bool(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                RawValue::Integer(i)
            } else if n.is_u64() {
                // Beyond i64; keep every digit
                RawValue::Text(n.to_string())
            } else {
                n.as_f64().map_or(RawValue::Null, RawValue::Float)
            }
        }
        Value::String(s) => RawValue::Text(s),
        nested @ (Value::Array(_) | Value::Object(_)) => RawValue::Json(nested),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
