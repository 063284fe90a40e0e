//! MySQL column introspection.
//!
//! `information_schema` columns are returned as binary strings by some
//! server versions, so every text column is cast to CHAR.

use super::type_mapping::map_mysql_type;
use crate::Result;
use crate::adapters::helpers::{catalog_u8, catalog_u32, is_nullable_flag};
use crate::error::AdbLoaderError;
use crate::models::{Column, TableSchema};
use sqlx::{MySqlPool, Row};

const COLUMNS_QUERY: &str = r#"
    SELECT
        CAST(table_schema AS CHAR) AS table_schema,
        CAST(column_name AS CHAR) AS column_name,
        CAST(data_type AS CHAR) AS data_type,
        CAST(column_type AS CHAR) AS column_type,
        CAST(is_nullable AS CHAR) AS is_nullable,
        CAST(ordinal_position AS SIGNED) AS ordinal_position,
        CAST(character_maximum_length AS SIGNED) AS character_maximum_length,
        CAST(numeric_precision AS SIGNED) AS numeric_precision,
        CAST(numeric_scale AS SIGNED) AS numeric_scale
    FROM information_schema.columns
    WHERE table_schema = COALESCE(?, DATABASE())
      AND table_name = ?
    ORDER BY ordinal_position
"#;

/// Reads a table definition from `information_schema.columns`.
///
/// A schema of `None` resolves to the connection's current database.
pub(crate) async fn describe_table(
    pool: &MySqlPool,
    schema: Option<&str>,
    table: &str,
) -> Result<TableSchema> {
    let shown_schema = schema.unwrap_or("<current database>");

    let rows = sqlx::query(COLUMNS_QUERY)
        .bind(schema)
        .bind(table)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!("Column query for {}.{} failed: {}", shown_schema, table, e);
            AdbLoaderError::schema_lookup(shown_schema, table, format!("catalog query failed: {}", e))
        })?;

    if rows.is_empty() {
        return Err(AdbLoaderError::schema_lookup(
            shown_schema,
            table,
            "table does not exist or is not visible to the connected user",
        ));
    }

    let bad_field = |name: &str, e: sqlx::Error| {
        AdbLoaderError::schema_lookup(shown_schema, table, format!("bad {}: {}", name, e))
    };

    let mut resolved_schema = String::new();
    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let text = |name: &str| -> Result<String> {
            row.try_get::<Option<String>, _>(name)
                .map(Option::unwrap_or_default)
                .map_err(|e| bad_field(name, e))
        };
        let number = |name: &str| -> Result<Option<i64>> {
            row.try_get::<Option<i64>, _>(name)
                .map_err(|e| bad_field(name, e))
        };

        if resolved_schema.is_empty() {
            resolved_schema = text("table_schema")?;
        }
        let column_type = text("column_type")?;

        columns.push(Column {
            name: text("column_name")?,
            data_type: map_mysql_type(
                &text("data_type")?,
                &column_type,
                catalog_u32(number("character_maximum_length")?),
                catalog_u8(number("numeric_precision")?),
                catalog_u8(number("numeric_scale")?),
            ),
            native_type: column_type,
            is_nullable: is_nullable_flag(&text("is_nullable")?),
            ordinal_position: catalog_u32(number("ordinal_position")?).unwrap_or_default(),
        });
    }

    Ok(TableSchema {
        schema: resolved_schema,
        table: table.to_string(),
        columns,
    })
}
