//! Core data models shared by the introspection, reading and loading paths.
//!
//! The destination side is described by [`TableSchema`], fetched from the
//! catalog on every run. The source side is described by [`SourceData`],
//! produced by a format reader. The two only meet inside the bulk loader.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Supported destination database types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
    PostgreSQL,
    MySQL,
    SQLite,
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseType::PostgreSQL => write!(f, "PostgreSQL"),
            DatabaseType::MySQL => write!(f, "MySQL"),
            DatabaseType::SQLite => write!(f, "SQLite"),
        }
    }
}

/// Semantic column type, independent of the destination engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnifiedDataType {
    /// String/text types with optional length
    String { max_length: Option<u32> },
    /// Integer types with bit width
    Integer { bits: u8, signed: bool },
    /// Floating point types
    Float { precision: Option<u8> },
    /// Exact numeric types
    Decimal {
        precision: Option<u8>,
        scale: Option<u8>,
    },
    /// Boolean type
    Boolean,
    /// Date and time types
    DateTime { with_timezone: bool },
    /// Date only
    Date,
    /// Time only
    Time { with_timezone: bool },
    /// Binary data
    Binary { max_length: Option<u32> },
    /// JSON/JSONB data
    Json,
    /// UUID type
    Uuid,
    /// Custom/database-specific types, loaded as text
    Custom { type_name: String },
}

impl std::fmt::Display for UnifiedDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String {
                max_length: Some(n),
            } => write!(f, "text({})", n),
            Self::String { max_length: None } => write!(f, "text"),
            Self::Integer { bits, signed: true } => write!(f, "integer({} bit)", bits),
            Self::Integer {
                bits,
                signed: false,
            } => write!(f, "unsigned integer({} bit)", bits),
            Self::Float { .. } => write!(f, "float"),
            Self::Decimal {
                precision: Some(p),
                scale: Some(s),
            } => write!(f, "decimal({},{})", p, s),
            Self::Decimal { .. } => write!(f, "decimal"),
            Self::Boolean => write!(f, "boolean"),
            Self::DateTime {
                with_timezone: true,
            } => write!(f, "datetime with time zone"),
            Self::DateTime { .. } => write!(f, "datetime"),
            Self::Date => write!(f, "date"),
            Self::Time { .. } => write!(f, "time"),
            Self::Binary { .. } => write!(f, "binary"),
            Self::Json => write!(f, "json"),
            Self::Uuid => write!(f, "uuid"),
            Self::Custom { type_name } => write!(f, "{}", type_name),
        }
    }
}

/// Destination column information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: UnifiedDataType,
    /// Backend-native type expression. For PostgreSQL this is a quoted,
    /// schema-qualified type name usable in a cast.
    pub native_type: String,
    pub is_nullable: bool,
    pub ordinal_position: u32,
}

/// Destination table definition as reported by the catalog.
///
/// Columns are kept in the table's defined order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Resolved schema name (never empty, defaults already applied)
    pub schema: String,
    pub table: String,
    pub columns: Vec<Column>,
}

impl TableSchema {
    /// Looks up a column by its exact name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column name → semantic type, in table order.
    pub fn column_types(&self) -> Vec<(&str, &UnifiedDataType)> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), &c.data_type))
            .collect()
    }

    /// `schema.table` for log lines.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

/// A value as it came out of a source file, before any schema is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    DateTime(chrono::NaiveDateTime),
    /// Nested arrays or objects from structured sources
    Json(serde_json::Value),
}

impl RawValue {
    /// Short label used in coercion error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "boolean",
            RawValue::Integer(_) => "integer",
            RawValue::Float(_) => "float",
            RawValue::Text(_) => "text",
            RawValue::DateTime(_) => "datetime",
            RawValue::Json(_) => "json",
        }
    }
}

impl std::fmt::Display for RawValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawValue::Null => write!(f, "NULL"),
            RawValue::Bool(v) => write!(f, "{}", v),
            RawValue::Integer(v) => write!(f, "{}", v),
            RawValue::Float(v) => write!(f, "{}", v),
            RawValue::Text(v) => write!(f, "{}", v),
            RawValue::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f")),
            RawValue::Json(v) => write!(f, "{}", v),
        }
    }
}

/// One source row: column name → raw value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: HashMap<String, RawValue>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any earlier value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: RawValue) {
        self.values.insert(name.into(), value);
    }

    /// Builder form of [`Record::insert`].
    pub fn with(mut self, name: impl Into<String>, value: RawValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Gets a field by source column name.
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.values.get(name)
    }

    /// Field names present in this record (unordered).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Fully parsed source file.
///
/// Readers only ever hand this out after the whole file parsed, so a
/// structurally broken file never yields a partial record stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceData {
    /// Source column names; readers keep the file's header order
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl SourceData {
    /// Builds source data, deriving the column list from the records.
    ///
    /// Records do not keep field order, so the names each record adds are
    /// appended sorted: record order decides which names come first, and
    /// names first seen in the same record are ordered alphabetically.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            let mut fresh: Vec<&str> = record
                .names()
                .filter(|name| seen.insert(*name))
                .collect();
            fresh.sort_unstable();
            columns.extend(fresh.into_iter().map(str::to_owned));
        }
        Self { columns, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> TableSchema {
        TableSchema {
            schema: "main".to_string(),
            table: "people".to_string(),
            columns: vec![
                Column {
                    name: "id".to_string(),
                    data_type: UnifiedDataType::Integer {
                        bits: 64,
                        signed: true,
                    },
                    native_type: "INTEGER".to_string(),
                    is_nullable: false,
                    ordinal_position: 1,
                },
                Column {
                    name: "name".to_string(),
                    data_type: UnifiedDataType::String { max_length: None },
                    native_type: "TEXT".to_string(),
                    is_nullable: true,
                    ordinal_position: 2,
                },
            ],
        }
    }

    #[test]
    fn test_column_types_keep_table_order() {
        let schema = sample_schema();
        let names: Vec<&str> = schema.column_types().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["id", "name"]);
        assert_eq!(schema.qualified_name(), "main.people");
        assert!(schema.column("name").is_some());
        assert!(schema.column("NAME").is_none());
    }

    #[test]
    fn test_source_data_orders_columns_by_record_then_name() {
        let records = vec![
            Record::new().with("b", RawValue::Integer(1)),
            Record::new()
                .with("b", RawValue::Integer(2))
                .with("a", RawValue::Text("x".to_string())),
            Record::new()
                .with("z", RawValue::Null)
                .with("c", RawValue::Null)
                .with("a", RawValue::Null),
        ];
        let data = SourceData::from_records(records);
        assert_eq!(data.columns, vec!["b", "a", "c", "z"]);
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_unified_type_display() {
        assert_eq!(
            UnifiedDataType::Decimal {
                precision: Some(10),
                scale: Some(2)
            }
            .to_string(),
            "decimal(10,2)"
        );
        assert_eq!(
            UnifiedDataType::String {
                max_length: Some(20)
            }
            .to_string(),
            "text(20)"
        );
    }

    #[test]
    fn test_raw_value_kind() {
        assert_eq!(RawValue::Null.kind(), "null");
        assert_eq!(RawValue::Text("1".to_string()).kind(), "text");
        assert_eq!(RawValue::Json(serde_json::json!([1])).kind(), "json");
    }
}
