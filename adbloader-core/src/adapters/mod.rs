//! Destination adapters: schema introspection and batch append.
//!
//! Every supported backend implements [`Destination`] so the loader and
//! pipeline never touch driver types directly.
//!
//! # Module Structure
//! - `config`: `ConnectionConfig`, `SessionLocale`, `LoadConfig`
//! - `helpers`: identifier quoting and bind-limit arithmetic
//! - `targets`: alias → URL resolution through `targets.json`
//! - `session`: `ConnectionFactory` and the scoped `Session`
//! - Backend modules (postgres, mysql, sqlite), each behind a cargo feature

use crate::Result;
use crate::coercion::SqlValue;
use crate::models::{Column, DatabaseType, TableSchema};
use crate::security::Credentials;
use async_trait::async_trait;

pub mod config;
pub mod helpers;
pub mod session;
pub mod targets;

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgresql")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::{
    ConnectionConfig, DEFAULT_BATCH_SIZE, DEFAULT_NLS_LANG, LoadConfig, SessionLocale,
    detect_database_type,
};
pub use session::{ConnectionFactory, Session};
pub use targets::{TARGETS_FILE, TargetDirectory};

/// A destination database the loader can append into.
///
/// # Object Safety
/// This trait is object-safe, allowing for dynamic dispatch through
/// `Box<dyn Destination>`.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Round-trips a trivial query.
    ///
    /// # Errors
    /// Returns a `Connection` error if the session is unusable
    async fn test_connection(&self) -> Result<()>;

    /// Reads the table's columns, in defined order, from the catalog.
    ///
    /// `schema` of `None` means the session's default schema.
    ///
    /// # Errors
    /// Returns a `SchemaLookup` error if the table is missing or invisible
    async fn describe_table(&self, schema: Option<&str>, table: &str) -> Result<TableSchema>;

    /// Appends `rows` to `target` in one transaction.
    ///
    /// Each row holds one value per entry of `columns`, in the same order.
    /// Returns the number of rows written.
    ///
    /// # Errors
    /// Returns a `Load` error; nothing from this call is committed
    async fn append_batch(
        &self,
        target: &TableSchema,
        columns: &[&Column],
        rows: &[Vec<SqlValue>],
    ) -> Result<u64>;

    /// Returns the database type this destination writes to.
    fn database_type(&self) -> DatabaseType;

    /// Gets the connection configuration (never contains credentials).
    fn connection_config(&self) -> &ConnectionConfig;

    /// Releases the underlying connection.
    async fn close(&self);
}

/// Opens a destination for `config`, authenticating with `credentials`.
///
/// # Security
/// - The URL in `config` must be credential-free; credentials are applied
///   to the driver options directly
/// - Connection strings are redacted in all error messages
///
/// # Errors
/// Returns error if:
/// - The configuration is invalid or the backend is not compiled in
/// - The database rejects the connection
pub async fn create_destination(
    config: &ConnectionConfig,
    credentials: &Credentials,
) -> Result<Box<dyn Destination>> {
    config.validate()?;

    match config.database_type()? {
        #[cfg(feature = "postgresql")]
        DatabaseType::PostgreSQL => {
            let destination =
                postgres::PostgresDestination::connect(config.clone(), credentials).await?;
            Ok(Box::new(destination))
        }
        #[cfg(not(feature = "postgresql"))]
        DatabaseType::PostgreSQL => Err(crate::error::AdbLoaderError::configuration(
            "PostgreSQL support not compiled in; rebuild with --features postgresql",
        )),
        #[cfg(feature = "mysql")]
        DatabaseType::MySQL => {
            let destination = mysql::MySqlDestination::connect(config.clone(), credentials).await?;
            Ok(Box::new(destination))
        }
        #[cfg(not(feature = "mysql"))]
        DatabaseType::MySQL => Err(crate::error::AdbLoaderError::configuration(
            "MySQL support not compiled in; rebuild with --features mysql",
        )),
        #[cfg(feature = "sqlite")]
        DatabaseType::SQLite => {
            let destination =
                sqlite::SqliteDestination::connect(config.clone(), credentials).await?;
            Ok(Box::new(destination))
        }
        #[cfg(not(feature = "sqlite"))]
        DatabaseType::SQLite => Err(crate::error::AdbLoaderError::configuration(
            "SQLite support not compiled in; rebuild with --features sqlite",
        )),
    }
}
