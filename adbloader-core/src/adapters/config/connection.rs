//! Destination connection configuration.
//!
//! This module provides the `ConnectionConfig` struct for opening a
//! destination session, and `SessionLocale` for its character set.

use crate::error::AdbLoaderError;
use crate::models::DatabaseType;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Locale used when `NLS_LANG` is not set
pub const DEFAULT_NLS_LANG: &str = "AMERICAN_AMERICA.AL32UTF8";

/// Session language, territory and character set.
///
/// Parsed from the `LANGUAGE_TERRITORY.CHARSET` form. Missing parts fall
/// back to `AMERICAN`, `AMERICA` and `AL32UTF8`.
///
/// # Example
/// ```rust
/// use adbloader_core::adapters::SessionLocale;
///
/// let locale: SessionLocale = "GERMAN_GERMANY.WE8ISO8859P1".parse().unwrap();
/// assert_eq!(locale.language, "GERMAN");
/// assert_eq!(locale.territory, "GERMANY");
/// assert!(!locale.is_utf8());
/// assert_eq!(locale.mysql_charset(), "latin1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLocale {
    pub language: String,
    pub territory: String,
    pub charset: String,
}

impl Default for SessionLocale {
    fn default() -> Self {
        Self {
            language: "AMERICAN".to_string(),
            territory: "AMERICA".to_string(),
            charset: "AL32UTF8".to_string(),
        }
    }
}

impl std::str::FromStr for SessionLocale {
    type Err = AdbLoaderError;

    fn from_str(s: &str) -> crate::Result<Self> {
        let defaults = Self::default();
        let s = s.trim();
        if s.is_empty() {
            return Ok(defaults);
        }

        let (lang_territory, charset) = match s.rsplit_once('.') {
            Some((head, charset)) => (head, charset.trim()),
            None => (s, ""),
        };
        if charset.chars().any(|c| c.is_whitespace()) {
            return Err(AdbLoaderError::configuration(format!(
                "invalid character set '{}' in locale '{}'",
                charset, s
            )));
        }
        let (language, territory) = match lang_territory.split_once('_') {
            Some((language, territory)) => (language.trim(), territory.trim()),
            None => (lang_territory.trim(), ""),
        };

        let pick = |value: &str, fallback: String| {
            if value.is_empty() {
                fallback
            } else {
                value.to_ascii_uppercase()
            }
        };

        Ok(Self {
            language: pick(language, defaults.language),
            territory: pick(territory, defaults.territory),
            charset: pick(charset, defaults.charset),
        })
    }
}

impl std::fmt::Display for SessionLocale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}.{}", self.language, self.territory, self.charset)
    }
}

impl SessionLocale {
    /// Whether the character set is a UTF-8 encoding.
    pub fn is_utf8(&self) -> bool {
        matches!(
            self.charset.as_str(),
            "AL32UTF8" | "UTF8" | "UTF-8" | "UTF8MB4"
        )
    }

    /// MySQL connection character set name for this locale.
    pub fn mysql_charset(&self) -> String {
        if self.is_utf8() {
            return "utf8mb4".to_string();
        }
        match self.charset.as_str() {
            "WE8ISO8859P1" | "WE8MSWIN1252" => "latin1".to_string(),
            "US7ASCII" => "ascii".to_string(),
            other => other.to_ascii_lowercase(),
        }
    }
}

/// Configuration for one destination session.
///
/// # Security
/// The target URL must not carry credentials; the username and secret come
/// from the credential vault and are handed to the driver separately.
///
/// # Example
/// ```rust
/// use adbloader_core::adapters::ConnectionConfig;
/// use std::time::Duration;
///
/// let config = ConnectionConfig::new("postgres://db.internal:5432/warehouse")
///     .with_connect_timeout(Duration::from_secs(10));
///
/// assert!(config.validate().is_ok());
/// assert!(ConnectionConfig::new("postgres://u:p@db/warehouse").validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Credential-free destination URL
    pub url: String,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Session character set
    pub locale: SessionLocale,
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ConnectionConfig({}, {})",
            crate::error::redact_database_url(&self.url),
            self.locale
        )
    }
}

impl ConnectionConfig {
    /// Creates a new connection config with default timeout and locale.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
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

    /// Destination backend, from the URL scheme.
    pub fn database_type(&self) -> crate::Result<DatabaseType> {
        detect_database_type(&self.url)
    }

    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns error if the URL is empty, unparseable, unsupported or carries
    /// credentials, or if the timeout is zero.
    pub fn validate(&self) -> crate::Result<()> {
        if self.url.trim().is_empty() {
            return Err(AdbLoaderError::configuration("target URL cannot be empty"));
        }

        self.database_type()?;

        let parsed = url::Url::parse(&self.url).map_err(|e| {
            AdbLoaderError::configuration(format!(
                "invalid target URL {}: {}",
                crate::error::redact_database_url(&self.url),
                e
            ))
        })?;
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(AdbLoaderError::configuration(format!(
                "target URL {} must not contain credentials; they come from the vault",
                crate::error::redact_database_url(&self.url)
            )));
        }

        if self.connect_timeout.is_zero() {
            return Err(AdbLoaderError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Detects the destination backend from a URL scheme.
///
/// # Errors
/// Returns a configuration error for any other scheme.
pub fn detect_database_type(url: &str) -> crate::Result<DatabaseType> {
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Ok(DatabaseType::PostgreSQL)
    } else if url.starts_with("mysql://") || url.starts_with("mariadb://") {
        Ok(DatabaseType::MySQL)
    } else if url.starts_with("sqlite:") {
        Ok(DatabaseType::SQLite)
    } else {
        Err(AdbLoaderError::configuration(format!(
            "unsupported target URL {}: expected postgres://, mysql:// or sqlite:",
            crate::error::redact_database_url(url)
        )))
    }
}
