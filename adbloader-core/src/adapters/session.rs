//! Opening and releasing destination sessions.

use super::config::{ConnectionConfig, SessionLocale};
use super::targets::TargetDirectory;
use super::{Destination, create_destination};
use crate::Result;
use crate::error::redact_database_url;
use crate::models::TableSchema;
use crate::security::{CredentialVault, VaultedCredential};
use std::time::Duration;

/// Combines the vaulted credential with a target alias to open sessions.
#[derive(Debug, Clone)]
pub struct ConnectionFactory {
    vault: CredentialVault,
    targets: TargetDirectory,
    connect_timeout: Duration,
    locale: SessionLocale,
}

impl ConnectionFactory {
    pub fn new(vault: CredentialVault, targets: TargetDirectory) -> Self {
        Self {
            vault,
            targets,
            connect_timeout: Duration::from_secs(30),
            locale: SessionLocale::default(),
        }
    }

    /// Builder method to set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builder method to set the session locale.
    pub fn with_locale(mut self, locale: SessionLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Decrypts the stored secret, resolves the target and opens a session.
    ///
    /// # Errors
    /// - `Setup` if no credentials are stored
    /// - `Key` if the key pair is missing or unreadable
    /// - `Decryption` if the secret does not decrypt
    /// - `Configuration` for an unknown alias or invalid URL
    /// - `Connection` if the database rejects the session
    pub async fn connect(&self) -> Result<Session> {
        let VaultedCredential {
            credentials,
            target_alias,
        } = self.vault.unlock()?;

        let url = self.targets.resolve(&target_alias)?;
        let config = ConnectionConfig::new(url)
            .with_connect_timeout(self.connect_timeout)
            .with_locale(self.locale.clone());

        tracing::info!(
            "Connecting to '{}' ({}) as '{}'",
            target_alias,
            redact_database_url(&config.url),
            credentials.username()
        );
        tracing::debug!(
            "Session locale {} (language {}, territory {})",
            config.locale,
            config.locale.language,
            config.locale.territory
        );

        let destination = create_destination(&config, &credentials).await?;
        Ok(Session::new(destination, target_alias))
    }
}

/// A live destination session.
///
/// Must be released with [`Session::close`] once the run is over, whether
/// it succeeded or not.
pub struct Session {
    destination: Box<dyn Destination>,
    target_alias: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("target_alias", &self.target_alias)
            .field("database_type", &self.destination.database_type())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(destination: Box<dyn Destination>, target_alias: impl Into<String>) -> Self {
        Self {
            destination,
            target_alias: target_alias.into(),
        }
    }

    pub fn target_alias(&self) -> &str {
        &self.target_alias
    }

    pub fn destination(&self) -> &dyn Destination {
        self.destination.as_ref()
    }

    /// Fetches the destination table definition.
    pub async fn describe(&self, schema: Option<&str>, table: &str) -> Result<TableSchema> {
        let described = self.destination.describe_table(schema, table).await?;
        tracing::debug!(
            "{} has {} columns",
            described.qualified_name(),
            described.columns.len()
        );
        Ok(described)
    }

    /// Releases the session.
    pub async fn close(self) {
        self.destination.close().await;
        tracing::debug!("Closed session to '{}'", self.target_alias);
    }
}
