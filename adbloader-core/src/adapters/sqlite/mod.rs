//! SQLite destination.
//!
//! # Module Structure
//! - `connection`: opens an existing database file
//! - `type_mapping`: declared type to unified type via affinity rules
//! - `schema_collection`: column introspection via `pragma_table_info`
//! - `writer`: transactional multi-row INSERT
//!
//! SQLite has no users, so vaulted credentials are accepted and ignored.
//! Text is always stored as UTF-8.

mod connection;
mod schema_collection;
mod type_mapping;
mod writer;


use super::{ConnectionConfig, Destination};
use crate::Result;
use crate::coercion::SqlValue;
use crate::error::AdbLoaderError;
use crate::models::{Column, DatabaseType, TableSchema};
use async_trait::async_trait;
use sqlx::SqlitePool;

pub use type_mapping::map_sqlite_type;

/// SQLite destination holding a single connection to one database file.
pub struct SqliteDestination {
    pub pool: SqlitePool,
    pub config: ConnectionConfig,
}

impl std::fmt::Debug for SqliteDestination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDestination")
            .field("config", &self.config.to_string())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Destination for SqliteDestination {
    async fn test_connection(&self) -> Result<()> {
        let result: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AdbLoaderError::connection_failed("SQLite ping failed", e))?;

        if result != 1 {
            return Err(AdbLoaderError::connection(
                "Basic connectivity test failed: unexpected result",
            ));
        }
        Ok(())
    }

    async fn describe_table(&self, schema: Option<&str>, table: &str) -> Result<TableSchema> {
        schema_collection::describe_table(&self.pool, schema, table).await
    }

    async fn append_batch(
        &self,
        target: &TableSchema,
        columns: &[&Column],
        rows: &[Vec<SqlValue>],
    ) -> Result<u64> {
        writer::append_rows(&self.pool, target, columns, rows).await
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::SQLite
    }

    fn connection_config(&self) -> &ConnectionConfig {
        &self.config
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
