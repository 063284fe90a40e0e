//! SQLite column introspection via the `pragma_table_info` table-valued
//! function.

use super::type_mapping::map_sqlite_type;
use crate::Result;
use crate::error::AdbLoaderError;
use crate::models::{Column, TableSchema};
use sqlx::{Row, SqlitePool};

const DEFAULT_SCHEMA: &str = "main";

const COLUMNS_QUERY: &str = r#"
    SELECT name, type, "notnull", cid
    FROM pragma_table_info(?1, ?2)
    ORDER BY cid
"#;

/// Reads a table definition. A schema of `None` means `main`.
pub(crate) async fn describe_table(
    pool: &SqlitePool,
    schema: Option<&str>,
    table: &str,
) -> Result<TableSchema> {
    let schema = schema.unwrap_or(DEFAULT_SCHEMA);

    let rows = sqlx::query(COLUMNS_QUERY)
        .bind(table)
        .bind(schema)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!("pragma_table_info for {}.{} failed: {}", schema, table, e);
            AdbLoaderError::schema_lookup(schema, table, format!("catalog query failed: {}", e))
        })?;

    if rows.is_empty() {
        return Err(AdbLoaderError::schema_lookup(
            schema,
            table,
            "table does not exist",
        ));
    }

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let bad_field = |name: &str, e: sqlx::Error| {
            AdbLoaderError::schema_lookup(schema, table, format!("bad {}: {}", name, e))
        };
        let name: String = row.try_get("name").map_err(|e| bad_field("name", e))?;
        let declared: String = row
            .try_get::<Option<String>, _>("type")
            .map_err(|e| bad_field("type", e))?
            .unwrap_or_default();
        let not_null: i64 = row.try_get("notnull").map_err(|e| bad_field("notnull", e))?;
        let cid: i64 = row.try_get("cid").map_err(|e| bad_field("cid", e))?;

        columns.push(Column {
            name,
            data_type: map_sqlite_type(&declared),
            native_type: declared,
            is_nullable: not_null == 0,
            ordinal_position: u32::try_from(cid + 1).unwrap_or_default(),
        });
    }

    Ok(TableSchema {
        schema: schema.to_string(),
        table: table.to_string(),
        columns,
    })
}
