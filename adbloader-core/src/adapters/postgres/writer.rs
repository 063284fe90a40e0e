//! Transactional batch append for PostgreSQL.
//!
//! Every bind parameter is cast to the column's catalog type, so enum,
//! domain and array columns accept their text input form and NULLs carry a
//! concrete type.

use crate::Result;
use crate::adapters::helpers::{
    POSTGRES_BIND_LIMIT, column_list, qualified_table, rows_per_statement,
};
use crate::coercion::SqlValue;
use crate::error::AdbLoaderError;
use crate::models::{Column, DatabaseType, TableSchema};
use sqlx::query_builder::Separated;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Inserts `rows` into `target` inside one transaction.
pub(crate) async fn append_rows(
    pool: &PgPool,
    target: &TableSchema,
    columns: &[&Column],
    rows: &[Vec<SqlValue>],
) -> Result<u64> {
    if rows.is_empty() {
        return Ok(0);
    }

    let table = qualified_table(DatabaseType::PostgreSQL, &target.schema, &target.table);
    let insert_prefix = format!(
        "INSERT INTO {} ({}) ",
        table,
        column_list(DatabaseType::PostgreSQL, columns.iter().map(|c| c.name.as_str()))
    );

    let mut tx = pool.begin().await.map_err(|e| {
        AdbLoaderError::append_failed(format!("Failed to begin transaction on {}", table), e)
    })?;

    let mut written = 0u64;
    for chunk in rows.chunks(rows_per_statement(POSTGRES_BIND_LIMIT, columns.len())) {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(&insert_prefix);
        builder.push_values(chunk, |mut values, row| {
            for (value, column) in row.iter().zip(columns) {
                push_value(&mut values, value);
                values.push_unseparated(format!("::{}", column.native_type));
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

fn push_value(values: &mut Separated<'_, '_, Postgres, &'static str>, value: &SqlValue) {
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
        SqlValue::Uuid(v) => values.push_bind(*v),
    };
}
