//! Environment preflight.
//!
//! The loader depends on three environment-derived settings it does not
//! own: the database client installation, the client configuration
//! directory holding `targets.json`, and the session locale. They are read
//! once at entry into an [`Environment`] and checked by
//! [`Environment::check`], which turns every missing prerequisite into a
//! `Setup` error carrying the shell commands that fix it.

use crate::Result;
use crate::adapters::{SessionLocale, TARGETS_FILE};
use crate::error::AdbLoaderError;
use std::path::{Path, PathBuf};

/// Database client installation directory.
pub const ADB_CLIENT_HOME: &str = "ADB_CLIENT_HOME";
/// Client configuration directory containing `targets.json`.
pub const TNS_ADMIN: &str = "TNS_ADMIN";
/// Session locale in `LANGUAGE_TERRITORY.CHARSET` form.
pub const NLS_LANG: &str = "NLS_LANG";

/// Snapshot of the environment-derived settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub client_home: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,
    pub nls_lang: Option<String>,
}

/// Result of a successful preflight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preflight {
    pub client_home: PathBuf,
    pub config_dir: PathBuf,
    pub targets_file: PathBuf,
    pub locale: SessionLocale,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Environment {
    /// Reads the process environment. Empty variables count as unset.
    pub fn from_env() -> Self {
        Self {
            client_home: non_empty_var(ADB_CLIENT_HOME).map(PathBuf::from),
            config_dir: non_empty_var(TNS_ADMIN).map(PathBuf::from),
            nls_lang: non_empty_var(NLS_LANG),
        }
    }

    pub fn with_client_home(mut self, dir: impl Into<PathBuf>) -> Self {
        self.client_home = Some(dir.into());
        self
    }

    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    pub fn with_nls_lang(mut self, nls_lang: impl Into<String>) -> Self {
        self.nls_lang = Some(nls_lang.into());
        self
    }

    /// Parses the configured locale, falling back to the default.
    ///
    /// # Errors
    /// Returns a `Configuration` error for a malformed locale string.
    pub fn locale(&self) -> Result<SessionLocale> {
        match &self.nls_lang {
            Some(value) => value.parse(),
            None => Ok(SessionLocale::default()),
        }
    }

    /// Verifies every prerequisite of a load run.
    ///
    /// # Errors
    /// Returns a `Setup` error naming the first missing prerequisite, or a
    /// `Configuration` error for a malformed locale.
    pub fn check(&self) -> Result<Preflight> {
        let client_home = require_dir(
            self.client_home.as_deref(),
            ADB_CLIENT_HOME,
            "the database client installation",
            "/opt/dbclient",
        )?;
        let config_dir = require_dir(
            self.config_dir.as_deref(),
            TNS_ADMIN,
            "the client configuration directory",
            "/opt/dbclient/network/admin",
        )?;

        let targets_file = config_dir.join(TARGETS_FILE);
        if !targets_file.is_file() {
            return Err(AdbLoaderError::setup(
                format!("{} not found in {}", TARGETS_FILE, config_dir.display()),
                format!(
                    "Create {} mapping each target alias to a connection URL, for example:\n    \
                     {{ \"warehouse\": \"postgres://db.example.com:5432/warehouse\" }}",
                    targets_file.display()
                ),
            ));
        }

        let locale = self.locale()?;
        tracing::debug!(
            "Preflight passed: client home {}, config dir {}, locale {}",
            client_home.display(),
            config_dir.display(),
            locale
        );

        Ok(Preflight {
            client_home,
            config_dir,
            targets_file,
            locale,
        })
    }
}

fn require_dir(value: Option<&Path>, variable: &str, what: &str, example: &str) -> Result<PathBuf> {
    let remediation = format!(
        "Point {variable} at {what}, for example:\n    \
         export {variable}={example}\n\
         and add the export to your shell profile so later sessions pick it up."
    );

    let Some(dir) = value else {
        return Err(AdbLoaderError::setup(
            format!("{} is not set", variable),
            remediation,
        ));
    };
    if !dir.is_dir() {
        return Err(AdbLoaderError::setup(
            format!("{}={} is not a directory", variable, dir.display()),
            remediation,
        ));
    }
    Ok(dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ready_environment(root: &TempDir) -> Environment {
        let home = root.path().join("client");
        let admin = home.join("admin");
        std::fs::create_dir_all(&admin).unwrap();
        std::fs::write(admin.join(TARGETS_FILE), "{}").unwrap();
        Environment::default()
            .with_client_home(home)
            .with_config_dir(admin)
    }

    #[test]
    fn test_check_passes_with_complete_setup() {
        let root = TempDir::new().unwrap();
        let preflight = ready_environment(&root).check().unwrap();
        assert!(preflight.targets_file.ends_with(TARGETS_FILE));
        assert_eq!(preflight.locale, SessionLocale::default());
    }

    #[test]
    fn test_missing_client_home_is_setup_error_with_remediation() {
        let error = Environment::default().check().unwrap_err();
        assert_eq!(error.exit_code(), 3);
        let message = error.to_string();
        assert!(message.contains("ADB_CLIENT_HOME is not set"));
        assert!(message.contains("export ADB_CLIENT_HOME="));
    }

    #[test]
    fn test_config_dir_must_exist() {
        let root = TempDir::new().unwrap();
        let env = ready_environment(&root).with_config_dir(root.path().join("nowhere"));
        let error = env.check().unwrap_err();
        assert!(error.to_string().contains("TNS_ADMIN="));
        assert!(error.to_string().contains("is not a directory"));
    }

    #[test]
    fn test_missing_targets_file_is_setup_error() {
        let root = TempDir::new().unwrap();
        let env = ready_environment(&root);
        std::fs::remove_file(env.config_dir.as_ref().unwrap().join(TARGETS_FILE)).unwrap();
        let error = env.check().unwrap_err();
        assert!(matches!(error, AdbLoaderError::Setup { .. }));
        assert!(error.to_string().contains("targets.json not found"));
    }

    #[test]
    fn test_locale_from_nls_lang() {
        let root = TempDir::new().unwrap();
        let preflight = ready_environment(&root)
            .with_nls_lang("GERMAN_GERMANY.WE8ISO8859P1")
            .check()
            .unwrap();
        assert_eq!(preflight.locale.language, "GERMAN");
        assert!(!preflight.locale.is_utf8());
    }
}
