//! Target alias resolution.
//!
//! The client configuration directory holds `targets.json`, a flat map from
//! alias to a credential-free connection URL:
//!
//! ```json
//! {
//!   "warehouse": "postgres://db.internal:5432/warehouse",
//!   "reporting": "mysql://mysql.internal/reporting",
//!   "scratch":   "sqlite:scratch.db"
//! }
//! ```
//!
//! Relative SQLite paths are resolved against the configuration directory.

use crate::Result;
use crate::error::{AdbLoaderError, redact_database_url};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the alias file inside the client configuration directory
pub const TARGETS_FILE: &str = "targets.json";

/// Alias → URL entries from one configuration directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDirectory {
    dir: PathBuf,
    entries: BTreeMap<String, String>,
}

impl TargetDirectory {
    /// Reads `targets.json` from `dir`.
    ///
    /// # Errors
    /// Returns a `Setup` error if the file is missing and a `Serialization`
    /// error if it is not a JSON object of strings.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(TARGETS_FILE);
        let bytes = std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AdbLoaderError::setup(
                format!("{} not found", path.display()),
                format!(
                    "Create {} mapping each target alias to a connection URL without credentials,\n\
                     e.g. {{ \"warehouse\": \"postgres://db.internal:5432/warehouse\" }}",
                    path.display()
                ),
            ),
            _ => AdbLoaderError::io(format!("Failed to read {}", path.display()), e),
        })?;

        let entries: BTreeMap<String, String> = serde_json::from_slice(&bytes).map_err(|e| {
            AdbLoaderError::serialization(format!("Invalid target file {}", path.display()), e)
        })?;

        tracing::debug!(
            "Loaded {} target aliases from {}",
            entries.len(),
            path.display()
        );
        Ok(Self::from_entries(dir, entries))
    }

    /// Builds a directory from in-memory entries.
    pub fn from_entries(dir: impl Into<PathBuf>, entries: BTreeMap<String, String>) -> Self {
        Self {
            dir: dir.into(),
            entries,
        }
    }

    /// Known aliases, sorted.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Resolves an alias to its connection URL.
    ///
    /// Lookup is exact first, then case-insensitive.
    ///
    /// # Errors
    /// Returns a `Configuration` error for an unknown alias or a URL that
    /// embeds credentials.
    pub fn resolve(&self, alias: &str) -> Result<String> {
        let url = self
            .entries
            .get(alias)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(alias))
                    .map(|(_, url)| url)
            })
            .ok_or_else(|| {
                let known: Vec<&str> = self.aliases().collect();
                AdbLoaderError::configuration(format!(
                    "target alias '{}' is not defined in {} (known: {})",
                    alias,
                    self.dir.join(TARGETS_FILE).display(),
                    if known.is_empty() {
                        "none".to_string()
                    } else {
                        known.join(", ")
                    }
                ))
            })?;

        if let Ok(parsed) = url::Url::parse(url)
            && (!parsed.username().is_empty() || parsed.password().is_some())
        {
            return Err(AdbLoaderError::configuration(format!(
                "target '{}' ({}) must not embed credentials; they come from the vault",
                alias,
                redact_database_url(url)
            )));
        }

        Ok(self.absolutize_sqlite(url))
    }

    fn absolutize_sqlite(&self, url: &str) -> String {
        let Some(rest) = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
        else {
            return url.to_string();
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };
        if path.is_empty() || path == ":memory:" || Path::new(path).is_absolute() {
            return url.to_string();
        }

        let absolute = self.dir.join(path);
        match query {
            Some(query) => format!("sqlite://{}?{}", absolute.display(), query),
            None => format!("sqlite://{}", absolute.display()),
        }
    }
}
