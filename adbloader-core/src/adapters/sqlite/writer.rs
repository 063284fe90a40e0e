//! Transactional batch append for SQLite.

use crate::Result;
use crate::adapters::helpers::{SQLITE_BIND_LIMIT, column_list, qualified_table, rows_per_statement};
use crate::coercion::SqlValue;
use crate::error::AdbLoaderError;
use crate::models::{Column, DatabaseType, TableSchema};
use sqlx::query_builder::Separated;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// Inserts `rows` into `target` inside one transaction.
pub(crate) async fn append_rows(
    pool: &SqlitePool,
    target: &TableSchema,
    columns: &[&Column],
    rows: &[Vec<SqlValue>],
) -> Result<u64> {
    if rows.is_empty() {
        return Ok(0);
    }

    let table = qualified_table(DatabaseType::SQLite, &target.schema, &target.table);
    let insert_prefix = format!(
        "INSERT INTO {} ({}) ",
        table,
        column_list(DatabaseType::SQLite, columns.iter().map(|c| c.name.as_str()))
    );

    let mut tx = pool.begin().await.map_err(|e| {
        AdbLoaderError::append_failed(format!("Failed to begin transaction on {}", table), e)
    })?;

    let mut written = 0u64;
    for chunk in rows.chunks(rows_per_statement(SQLITE_BIND_LIMIT, columns.len())) {
        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(&insert_prefix);
        builder.push_values(chunk, |mut values, row| {
            for value in row {
                push_value(&mut values, value);
            }
        });

        let result = builder.build().execute(&mut *tx).await.map_err(|e| {
            AdbLoaderError::append_failed(format!("INSERT into {} failed", table), e)
        })?;
        written += result.rows_affected();
    }

    tx.commit().await.map_err(|e| {
        AdbLoaderError::append_failed(format!("Failed to commit batch into {}", table), e)
    })?;

    Ok(written)
}

fn push_value(values: &mut Separated<'_, '_, Sqlite, &'static str>, value: &SqlValue) {
    match value {
        SqlValue::Null => values.push_bind(None::<String>),
        SqlValue::Bool(v) => values.push_bind(*v),
        SqlValue::Int(v) => values.push_bind(*v),
        SqlValue::Float(v) => values.push_bind(*v),
        SqlValue::Decimal(v) | SqlValue::Text(v) => values.push_bind(v.clone()),
        SqlValue::Date(v) => values.push_bind(*v),
        SqlValue::Time(v) => values.push_bind(*v),
        SqlValue::DateTime(v) => values.push_bind(*v),
        SqlValue::DateTimeUtc(v) => values.push_bind(*v),
        SqlValue::Bytes(v) => values.push_bind(v.clone()),
        SqlValue::Json(v) => values.push_bind(v.to_string()),
        SqlValue::Uuid(v) => values.push_bind(v.to_string()),
    };
}
