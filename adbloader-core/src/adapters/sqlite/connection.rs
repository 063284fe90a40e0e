//! SQLite connection handling.
//!
//! # Connection Forms
//! - `sqlite:///abs/path/to/database.db`
//! - `sqlite:relative.db` (resolved against the targets directory beforehand)
//! - `sqlite::memory:` for tests
//!
//! Missing database files are never created: a typo in a target URL must not
//! silently produce an empty database.

use super::SqliteDestination;
use crate::Result;
use crate::adapters::ConnectionConfig;
use crate::error::{AdbLoaderError, redact_database_url};
use crate::security::Credentials;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

impl SqliteDestination {
    /// Opens the database file named by the configuration.
    ///
    /// # Errors
    /// Returns a `Configuration` error for a non UTF-8 session locale or an
    /// unparseable URL, and a `Connection` error if the file cannot be opened.
    pub async fn connect(config: ConnectionConfig, credentials: &Credentials) -> Result<Self> {
        tracing::debug!(
            "SQLite ignores credentials for user {}",
            credentials.username()
        );
        let options = connect_options(&config)?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(0)
            .acquire_timeout(config.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                AdbLoaderError::connection_failed(
                    format!(
                        "Failed to open SQLite database {}",
                        redact_database_url(&config.url)
                    ),
                    e,
                )
            })?;

        Ok(Self { pool, config })
    }
}

pub(crate) fn connect_options(config: &ConnectionConfig) -> Result<SqliteConnectOptions> {
    if !config.locale.is_utf8() {
        return Err(AdbLoaderError::configuration(format!(
            "SQLite stores text as UTF-8; character set {} is not supported",
            config.locale.charset
        )));
    }

    let options = SqliteConnectOptions::from_str(&config.url).map_err(|e| {
        AdbLoaderError::configuration(format!(
            "invalid SQLite URL {}: {}",
            redact_database_url(&config.url),
            e
        ))
    })?;

    Ok(options.create_if_missing(false).foreign_keys(true))
}
