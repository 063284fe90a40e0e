//! Schema-typed bulk loader.
//!
//! Source records are matched to destination columns by name, coerced to
//! each column's [`UnifiedDataType`](crate::models::UnifiedDataType) and
//! appended in consecutive batches. Batches run strictly one after another;
//! a failed batch stops the load and leaves earlier batches committed.

use crate::Result;
use crate::adapters::{Destination, LoadConfig};
use crate::coercion::{SqlValue, coerce};
use crate::error::AdbLoaderError;
use crate::models::{Column, RawValue, Record, SourceData, TableSchema};
use serde::{Deserialize, Serialize};

/// Outcome of a completed load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Batches appended
    pub batches: usize,
    /// Rows appended across all batches
    pub rows: u64,
}

/// Source column to destination column assignment, in destination order.
///
/// Destination columns without a source counterpart are left out so their
/// defaults apply.
#[derive(Debug, Clone)]
pub struct ColumnPlan<'a> {
    entries: Vec<(String, &'a Column)>,
}

impl<'a> ColumnPlan<'a> {
    /// Matches every source column to a destination column.
    ///
    /// Exact names win. With `case_insensitive` set, a source column with no
    /// exact match takes the single destination column equal to it ignoring
    /// ASCII case.
    ///
    /// # Errors
    /// Returns a `Mapping` error for a source column with no counterpart, an
    /// ambiguous case-insensitive match, or two source columns claiming the
    /// same destination column.
    pub fn resolve(
        target: &'a TableSchema,
        source_columns: &[String],
        case_insensitive: bool,
    ) -> Result<Self> {
        let mut assigned: Vec<(String, &'a Column)> = Vec::with_capacity(source_columns.len());

        for source in source_columns {
            let column = match target.column(source) {
                Some(column) => column,
                None if case_insensitive => {
                    let candidates: Vec<&Column> = target
                        .columns
                        .iter()
                        .filter(|c| c.name.eq_ignore_ascii_case(source))
                        .collect();
                    match candidates.as_slice() {
                        [column] => *column,
                        [] => return Err(unknown_column(target, source)),
                        _ => {
                            return Err(AdbLoaderError::mapping(format!(
                                "source column '{}' matches {} columns of {} that differ only in case",
                                source,
                                candidates.len(),
                                target.qualified_name()
                            )));
                        }
                    }
                }
                None => return Err(unknown_column(target, source)),
            };

            if let Some((other, _)) = assigned.iter().find(|(_, c)| c.name == column.name) {
                return Err(AdbLoaderError::mapping(format!(
                    "source columns '{}' and '{}' both map to {}.{}",
                    other,
                    source,
                    target.qualified_name(),
                    column.name
                )));
            }
            if source != &column.name {
                tracing::debug!("Source column '{}' loads into '{}'", source, column.name);
            }
            assigned.push((source.clone(), column));
        }

        assigned.sort_by_key(|(_, column)| column.ordinal_position);
        Ok(Self { entries: assigned })
    }

    /// Destination columns in INSERT order.
    pub fn columns(&self) -> Vec<&'a Column> {
        self.entries.iter().map(|(_, column)| *column).collect()
    }

    /// Source column feeding each destination column, in INSERT order.
    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(source, _)| source.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Coerces one record into a row in plan order.
    ///
    /// Fields absent from the record load as NULL.
    fn coerce_record(
        &self,
        record: &Record,
    ) -> std::result::Result<Vec<SqlValue>, (&str, crate::coercion::CoercionError)> {
        self.entries
            .iter()
            .map(|(source, column)| {
                let raw = record.get(source).unwrap_or(&RawValue::Null);
                coerce(raw, &column.data_type).map_err(|e| (source.as_str(), e))
            })
            .collect()
    }
}

fn unknown_column(target: &TableSchema, source: &str) -> AdbLoaderError {
    let known: Vec<&str> = target.columns.iter().map(|c| c.name.as_str()).collect();
    AdbLoaderError::mapping(format!(
        "source column '{}' does not exist in {} (columns: {})",
        source,
        target.qualified_name(),
        known.join(", ")
    ))
}

/// Appends source records to a destination table in fixed-size batches.
#[derive(Debug, Clone, Default)]
pub struct BulkLoader {
    config: LoadConfig,
}

impl BulkLoader {
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Loads `data` into `target` through `destination`.
    ///
    /// Batch `n` (1-based) starts only after batch `n - 1` committed. Rows
    /// are never updated or deleted.
    ///
    /// # Errors
    /// - `Configuration` for an invalid [`LoadConfig`]
    /// - `Mapping` before any batch when source columns do not match
    /// - `Load` naming the failing batch and the rows committed before it,
    ///   for a coercion failure or a database error during append
    pub async fn load(
        &self,
        destination: &dyn Destination,
        target: &TableSchema,
        data: &SourceData,
    ) -> Result<LoadSummary> {
        self.config.validate()?;

        let plan = ColumnPlan::resolve(target, &data.columns, self.config.case_insensitive_columns)?;
        if data.is_empty() {
            tracing::info!("Source has no records; nothing to load");
            return Ok(LoadSummary::default());
        }
        if plan.is_empty() {
            return Err(AdbLoaderError::mapping("source records have no columns"));
        }

        let columns = plan.columns();
        let total_batches = data.len().div_ceil(self.config.batch_size);
        tracing::info!(
            "Loading {} records into {} in {} batch(es) of up to {}",
            data.len(),
            target.qualified_name(),
            total_batches,
            self.config.batch_size
        );

        let mut summary = LoadSummary::default();
        for (index, chunk) in data.records.chunks(self.config.batch_size).enumerate() {
            let batch = index + 1;
            let first_row = index * self.config.batch_size + 1;

            let mut rows = Vec::with_capacity(chunk.len());
            for (offset, record) in chunk.iter().enumerate() {
                let row = plan.coerce_record(record).map_err(|(column, e)| {
                    let context = format!("record {} column '{}': {}", first_row + offset, column, e);
                    AdbLoaderError::load_failed(batch, summary.rows, context, e)
                })?;
                rows.push(row);
            }

            let written = destination
                .append_batch(target, &columns, &rows)
                .await
                .map_err(|e| e.at_batch(batch, summary.rows))?;

            summary.batches = batch;
            summary.rows += written;
            tracing::info!(
                "Batch {}/{} committed: {} rows ({} total)",
                batch,
                total_batches,
                written,
                summary.rows
            );
        }

        Ok(summary)
    }
}
