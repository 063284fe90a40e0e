//! MySQL and MariaDB destination.
//!
//! # Module Structure
//! - `connection`: session setup with vaulted credentials
//! - `type_mapping`: MySQL to unified data type conversion
//! - `schema_collection`: column introspection via `information_schema`
//! - `writer`: transactional multi-row INSERT
//!
//! # Security Guarantees
//! - Credentials are applied to driver options, never to URLs or logs
//! - Connection strings are sanitized in error messages

mod connection;
mod schema_collection;
mod type_mapping;
mod writer;

#[cfg(test)]
mod tests;

use super::{ConnectionConfig, Destination};
use crate::Result;
use crate::coercion::SqlValue;
use crate::models::{Column, DatabaseType, TableSchema};
use async_trait::async_trait;
use sqlx::MySqlPool;

pub use type_mapping::map_mysql_type;

/// MySQL destination backed by a single-connection pool.
pub struct MySqlDestination {
    pub pool: MySqlPool,
    pub config: ConnectionConfig,
}

impl std::fmt::Debug for MySqlDestination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlDestination")
            .field("config", &self.config.to_string())
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

#[async_trait]
impl Destination for MySqlDestination {
    async fn test_connection(&self) -> Result<()> {
        let result: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| crate::error::AdbLoaderError::connection_failed("MySQL ping failed", e))?;

        if result != 1 {
            return Err(crate::error::AdbLoaderError::connection(
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
        DatabaseType::MySQL
    }

    fn connection_config(&self) -> &ConnectionConfig {
        &self.config
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
