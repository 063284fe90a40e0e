//! MySQL session setup.
//!
//! The session locale's character set becomes the connection charset; all
//! UTF-8 spellings map to `utf8mb4`.

use super::MySqlDestination;
use crate::Result;
use crate::adapters::ConnectionConfig;
use crate::error::{AdbLoaderError, redact_database_url};
use crate::security::Credentials;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use std::str::FromStr;

impl MySqlDestination {
    /// Opens a session to the configured MySQL database.
    ///
    /// # Errors
    /// Returns a `Configuration` error for an invalid URL and a `Connection`
    /// error if the server rejects the session or the charset.
    pub async fn connect(config: ConnectionConfig, credentials: &Credentials) -> Result<Self> {
        let options = connect_options(&config, credentials)?;

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .min_connections(0)
            .acquire_timeout(config.connect_timeout)
            .test_before_acquire(true)
            .connect_with(options)
            .await
            .map_err(|e| {
                AdbLoaderError::connection_failed(
                    format!(
                        "Failed to connect to MySQL at {} with charset {}",
                        redact_database_url(&config.url),
                        config.locale.mysql_charset()
                    ),
                    e,
                )
            })?;

        tracing::debug!(
            "Connected to MySQL at {} (charset {})",
            redact_database_url(&config.url),
            config.locale.mysql_charset()
        );
        Ok(Self { pool, config })
    }
}

/// Builds driver options from the credential-free URL plus vaulted credentials.
pub(crate) fn connect_options(
    config: &ConnectionConfig,
    credentials: &Credentials,
) -> Result<MySqlConnectOptions> {
    let url = match config.url.strip_prefix("mariadb://") {
        Some(rest) => format!("mysql://{}", rest),
        None => config.url.clone(),
    };

    let options = MySqlConnectOptions::from_str(&url).map_err(|e| {
        AdbLoaderError::configuration(format!(
            "invalid MySQL URL {}: {}",
            redact_database_url(&config.url),
            e
        ))
    })?;

    Ok(options
        .username(credentials.username())
        .password(credentials.secret())
        .charset(&config.locale.mysql_charset()))
}
