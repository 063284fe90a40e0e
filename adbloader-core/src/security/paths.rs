//! Locations of the local vault files.

use crate::Result;
use crate::error::AdbLoaderError;
use std::path::{Path, PathBuf};

/// Directory name of the vault under the operator's home directory
pub const VAULT_DIR_NAME: &str = ".adb";
/// Private key file name
pub const PRIVATE_KEY_FILE: &str = "private.pem";
/// Public key file name
pub const PUBLIC_KEY_FILE: &str = "public.pem";
/// Vault record file name
pub const RECORD_FILE: &str = "config.json";

/// Paths of the key pair and vault record inside one vault directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultPaths {
    dir: PathBuf,
}

impl VaultPaths {
    /// Uses an explicit vault directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The fixed default location, `~/.adb`.
    ///
    /// # Errors
    /// Returns a setup error if no home directory can be determined.
    pub fn default_location() -> Result<Self> {
        let base = directories::BaseDirs::new().ok_or_else(|| {
            AdbLoaderError::setup(
                "cannot determine the home directory for the credential vault",
                "Set HOME, or pass --vault-dir / ADB_VAULT_DIR explicitly.",
            )
        })?;
        Ok(Self::new(base.home_dir().join(VAULT_DIR_NAME)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn private_key(&self) -> PathBuf {
        self.dir.join(PRIVATE_KEY_FILE)
    }

    pub fn public_key(&self) -> PathBuf {
        self.dir.join(PUBLIC_KEY_FILE)
    }

    pub fn record(&self) -> PathBuf {
        self.dir.join(RECORD_FILE)
    }

    /// Creates the vault directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            AdbLoaderError::io(
                format!("Failed to create vault directory {}", self.dir.display()),
                e,
            )
        })?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.dir, std::fs::Permissions::from_mode(0o700)).map_err(
                |e| {
                    AdbLoaderError::io(
                        format!("Failed to restrict vault directory {}", self.dir.display()),
                        e,
                    )
                },
            )?;
        }
        Ok(())
    }
}
