//! PostgreSQL column introspection.

use super::type_mapping::map_postgresql_type;
use crate::Result;
use crate::adapters::helpers::{catalog_u8, catalog_u32, is_nullable_flag, quote_identifier};
use crate::error::AdbLoaderError;
use crate::models::{Column, DatabaseType, TableSchema};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const COLUMNS_QUERY: &str = r#"
    SELECT
        c.table_schema::text AS table_schema,
        c.column_name::text AS column_name,
        c.data_type::text AS data_type,
        c.udt_schema::text AS udt_schema,
        c.udt_name::text AS udt_name,
        c.is_nullable::text AS is_nullable,
        c.ordinal_position::int8 AS ordinal_position,
        c.character_maximum_length::int8 AS character_maximum_length,
        c.numeric_precision::int8 AS numeric_precision,
        c.numeric_scale::int8 AS numeric_scale
    FROM information_schema.columns c
    WHERE c.table_schema = COALESCE($1::text, current_schema()::text)
      AND c.table_name = $2
    ORDER BY c.ordinal_position
"#;

/// Reads a table definition from `information_schema.columns`.
///
/// A schema of `None` resolves to `current_schema()`.
pub(crate) async fn describe_table(
    pool: &PgPool,
    schema: Option<&str>,
    table: &str,
) -> Result<TableSchema> {
    let shown_schema = schema.unwrap_or("<current schema>");

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

    let mut resolved_schema = String::new();
    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let field = |name: &str| -> Result<Option<String>> {
            row_field(row, name, shown_schema, table)
        };
        let number = |name: &str| -> Result<Option<i64>> {
            row.try_get::<Option<i64>, _>(name).map_err(|e| {
                AdbLoaderError::schema_lookup(shown_schema, table, format!("bad {}: {}", name, e))
            })
        };

        if resolved_schema.is_empty() {
            resolved_schema = field("table_schema")?.unwrap_or_default();
        }
        let data_type = field("data_type")?.unwrap_or_default();
        let udt_schema = field("udt_schema")?.unwrap_or_else(|| "pg_catalog".to_string());
        let udt_name = field("udt_name")?.unwrap_or_else(|| data_type.clone());

        columns.push(Column {
            name: field("column_name")?.unwrap_or_default(),
            data_type: map_postgresql_type(
                &data_type,
                &udt_name,
                catalog_u32(number("character_maximum_length")?),
                catalog_u8(number("numeric_precision")?),
                catalog_u8(number("numeric_scale")?),
            ),
            native_type: format!(
                "{}.{}",
                quote_identifier(DatabaseType::PostgreSQL, &udt_schema),
                quote_identifier(DatabaseType::PostgreSQL, &udt_name)
            ),
            is_nullable: is_nullable_flag(&field("is_nullable")?.unwrap_or_default()),
            ordinal_position: catalog_u32(number("ordinal_position")?).unwrap_or_default(),
        });
    }

    Ok(TableSchema {
        schema: resolved_schema,
        table: table.to_string(),
        columns,
    })
}

fn row_field(row: &PgRow, name: &str, schema: &str, table: &str) -> Result<Option<String>> {
    row.try_get::<Option<String>, _>(name).map_err(|e| {
        AdbLoaderError::schema_lookup(schema, table, format!("bad {}: {}", name, e))
    })
}
