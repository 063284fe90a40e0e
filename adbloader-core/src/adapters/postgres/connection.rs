//! PostgreSQL session setup.
//!
//! PostgreSQL sessions always speak UTF-8 to the client; a locale with any
//! other character set is rejected before connecting.

use super::PostgresDestination;
use crate::Result;
use crate::adapters::ConnectionConfig;
use crate::error::{AdbLoaderError, redact_database_url};
use crate::security::Credentials;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;

impl PostgresDestination {
    /// Opens a session to the configured PostgreSQL database.
    ///
    /// # Errors
    /// Returns a `Configuration` error for an invalid URL or non-UTF-8
    /// locale and a `Connection` error if the server rejects the session.
    pub async fn connect(config: ConnectionConfig, credentials: &Credentials) -> Result<Self> {
        let options = connect_options(&config, credentials)?;

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .min_connections(0)
            .acquire_timeout(config.connect_timeout)
            .test_before_acquire(true)
            .connect_with(options)
            .await
            .map_err(|e| {
                AdbLoaderError::connection_failed(
                    format!(
                        "Failed to connect to PostgreSQL at {}",
                        redact_database_url(&config.url)
                    ),
                    e,
                )
            })?;

        tracing::debug!("Connected to PostgreSQL at {}", redact_database_url(&config.url));
        Ok(Self { pool, config })
    }
}

/// Builds driver options from the credential-free URL plus vaulted credentials.
pub(crate) fn connect_options(
    config: &ConnectionConfig,
    credentials: &Credentials,
) -> Result<PgConnectOptions> {
    if !config.locale.is_utf8() {
        return Err(AdbLoaderError::configuration(format!(
            "PostgreSQL sessions only support UTF-8; locale {} requests {}",
            config.locale, config.locale.charset
        )));
    }

    let options = PgConnectOptions::from_str(&config.url).map_err(|e| {
        AdbLoaderError::configuration(format!(
            "invalid PostgreSQL URL {}: {}",
            redact_database_url(&config.url),
            e
        ))
    })?;

    Ok(options
        .username(credentials.username())
        .password(credentials.secret())
        .application_name(&format!("adbloader-{}", env!("CARGO_PKG_VERSION"))))
}
