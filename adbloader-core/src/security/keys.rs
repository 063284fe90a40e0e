//! RSA key pair lifecycle for the credential vault.
//!
//! A key pair is generated at most once per installation. Presence of the
//! private key file is the only thing checked; an existing but corrupted key
//! is left alone and surfaces later as a decryption failure.
//!
//! # Security
//! - The private key is written with mode 0600 and never leaves the vault
//!   directory
//! - Both halves are staged as temporary files and renamed into place, so a
//!   failed write never leaves a lone key file behind

use super::paths::VaultPaths;
use crate::Result;
use crate::error::AdbLoaderError;
use rand_core::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use zeroize::Zeroizing;

/// Default RSA modulus size in bits
pub const DEFAULT_KEY_BITS: usize = 2048;
/// Smallest modulus accepted for new keys
pub const MIN_KEY_BITS: usize = 2048;
/// Largest modulus accepted for new keys
pub const MAX_KEY_BITS: usize = 8192;

/// PEM flavour used when writing new keys.
///
/// Reading always accepts both flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyFormat {
    /// `RSA PRIVATE KEY` / `RSA PUBLIC KEY`
    #[default]
    Pkcs1,
    /// `PRIVATE KEY` / `PUBLIC KEY`
    Pkcs8,
}

impl std::fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pkcs1 => write!(f, "pkcs1"),
            Self::Pkcs8 => write!(f, "pkcs8"),
        }
    }
}

impl std::str::FromStr for KeyFormat {
    type Err = AdbLoaderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pkcs1" => Ok(Self::Pkcs1),
            "pkcs8" => Ok(Self::Pkcs8),
            other => Err(AdbLoaderError::configuration(format!(
                "unknown key format '{}': expected pkcs1 or pkcs8",
                other
            ))),
        }
    }
}

/// Key generation settings.
///
/// # Example
/// ```rust
/// use adbloader_core::security::{KeyConfig, KeyFormat};
///
/// let config = KeyConfig::default().with_bits(3072).with_format(KeyFormat::Pkcs8);
/// assert!(config.validate().is_ok());
/// assert!(KeyConfig::default().with_bits(1024).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyConfig {
    pub bits: usize,
    pub format: KeyFormat,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            bits: DEFAULT_KEY_BITS,
            format: KeyFormat::Pkcs1,
        }
    }
}

impl KeyConfig {
    pub fn with_bits(mut self, bits: usize) -> Self {
        self.bits = bits;
        self
    }

    pub fn with_format(mut self, format: KeyFormat) -> Self {
        self.format = format;
        self
    }

    /// Validates key generation parameters.
    pub fn validate(&self) -> Result<()> {
        if self.bits < MIN_KEY_BITS {
            return Err(AdbLoaderError::configuration(format!(
                "key size must be at least {} bits, got {}",
                MIN_KEY_BITS, self.bits
            )));
        }
        if self.bits > MAX_KEY_BITS {
            return Err(AdbLoaderError::configuration(format!(
                "key size must not exceed {} bits, got {}",
                MAX_KEY_BITS, self.bits
            )));
        }
        Ok(())
    }
}

/// Outcome of [`KeyManager::ensure_key_pair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    /// A new key pair was written
    Generated,
    /// A key pair was already present and left untouched
    Existing,
}

/// Creates and loads the installation's key pair.
#[derive(Debug, Clone)]
pub struct KeyManager {
    paths: VaultPaths,
    config: KeyConfig,
}

impl KeyManager {
    pub fn new(paths: VaultPaths, config: KeyConfig) -> Self {
        Self { paths, config }
    }

    pub fn paths(&self) -> &VaultPaths {
        &self.paths
    }

    /// Whether a key pair is already installed.
    pub fn exists(&self) -> bool {
        self.paths.private_key().exists()
    }

    /// Generates and persists a key pair unless one already exists.
    ///
    /// Creates the vault directory if needed. Existing files are never
    /// inspected or rewritten.
    ///
    /// # Errors
    /// Returns a `Configuration` error for invalid key settings and a `Key`
    /// error if generation or any filesystem write fails.
    pub fn ensure_key_pair(&self) -> Result<KeyStatus> {
        self.paths.ensure_dir()?;

        if self.exists() {
            tracing::debug!(
                "Key pair already present in {}",
                self.paths.dir().display()
            );
            return Ok(KeyStatus::Existing);
        }

        self.config.validate()?;

        tracing::info!(
            "Generating {}-bit RSA key pair in {}",
            self.config.bits,
            self.paths.dir().display()
        );
        let private_key = RsaPrivateKey::new(&mut OsRng, self.config.bits)
            .map_err(|e| AdbLoaderError::key_failed("RSA key generation failed", e))?;
        let public_key = RsaPublicKey::from(&private_key);

        let (private_pem, public_pem) = encode_pair(&private_key, &public_key, self.config.format)?;
        self.persist_pair(&private_pem, &public_pem)?;

        tracing::info!("Key pair written");
        Ok(KeyStatus::Generated)
    }

    /// Writes both halves, renaming the private key into place last.
    fn persist_pair(&self, private_pem: &str, public_pem: &str) -> Result<()> {
        let dir = self.paths.dir();
        let public_tmp = stage_file(dir, public_pem.as_bytes())?;
        let private_tmp = stage_file(dir, private_pem.as_bytes())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            public_tmp
                .as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))
                .map_err(|e| AdbLoaderError::key_failed("Failed to set public key mode", e))?;
        }

        let public_path = self.paths.public_key();
        public_tmp
            .persist(&public_path)
            .map_err(|e| AdbLoaderError::key_failed("Failed to write public key", e.error))?;

        if let Err(e) = private_tmp.persist(self.paths.private_key()) {
            if let Err(cleanup) = std::fs::remove_file(&public_path) {
                tracing::error!(
                    "Failed to remove {} after private key write failure: {}",
                    public_path.display(),
                    cleanup
                );
            }
            return Err(AdbLoaderError::key_failed(
                "Failed to write private key",
                e.error,
            ));
        }

        Ok(())
    }

    /// Loads the public half.
    pub fn load_public_key(&self) -> Result<RsaPublicKey> {
        let path = self.paths.public_key();
        let pem = read_key_file(&path)?;
        decode_public_key(&pem)
            .map_err(|e| AdbLoaderError::key(format!("{}: {}", path.display(), e)))
    }

    /// Loads the private half.
    pub fn load_private_key(&self) -> Result<RsaPrivateKey> {
        let path = self.paths.private_key();
        let pem = read_key_file(&path)?;
        decode_private_key(&pem)
            .map_err(|e| AdbLoaderError::key(format!("{}: {}", path.display(), e)))
    }
}

fn encode_pair(
    private_key: &RsaPrivateKey,
    public_key: &RsaPublicKey,
    format: KeyFormat,
) -> Result<(Zeroizing<String>, String)> {
    match format {
        KeyFormat::Pkcs1 => {
            let private_pem = private_key
                .to_pkcs1_pem(LineEnding::LF)
                .map_err(|e| AdbLoaderError::key(format!("PKCS#1 encoding failed: {}", e)))?;
            let public_pem = public_key
                .to_pkcs1_pem(LineEnding::LF)
                .map_err(|e| AdbLoaderError::key(format!("PKCS#1 encoding failed: {}", e)))?;
            Ok((private_pem, public_pem))
        }
        KeyFormat::Pkcs8 => {
            let private_pem = private_key
                .to_pkcs8_pem(LineEnding::LF)
                .map_err(|e| AdbLoaderError::key(format!("PKCS#8 encoding failed: {}", e)))?;
            let public_pem = public_key
                .to_public_key_pem(LineEnding::LF)
                .map_err(|e| AdbLoaderError::key(format!("SPKI encoding failed: {}", e)))?;
            Ok((private_pem, public_pem))
        }
    }
}

fn stage_file(dir: &Path, contents: &[u8]) -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| AdbLoaderError::key_failed("Failed to stage key file", e))?;
    file.write_all(contents)
        .and_then(|()| file.as_file().sync_all())
        .map_err(|e| AdbLoaderError::key_failed("Failed to stage key file", e))?;
    Ok(file)
}

fn read_key_file(path: &Path) -> Result<Zeroizing<String>> {
    std::fs::read_to_string(path)
        .map(Zeroizing::new)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AdbLoaderError::key(format!(
                "{} not found; run `adbloader keygen` first",
                path.display()
            )),
            _ => AdbLoaderError::key_failed(format!("Failed to read {}", path.display()), e),
        })
}

/// Decodes a PEM private key in either PKCS#1 or PKCS#8 form.
pub fn decode_private_key(pem: &str) -> std::result::Result<RsaPrivateKey, String> {
    if pem.contains("BEGIN RSA PRIVATE KEY") {
        RsaPrivateKey::from_pkcs1_pem(pem).map_err(|e| e.to_string())
    } else if pem.contains("BEGIN PRIVATE KEY") {
        RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| e.to_string())
    } else {
        Err("not a PEM encoded RSA private key".to_string())
    }
}

/// Decodes a PEM public key in either PKCS#1 or SPKI form.
pub fn decode_public_key(pem: &str) -> std::result::Result<RsaPublicKey, String> {
    if pem.contains("BEGIN RSA PUBLIC KEY") {
        RsaPublicKey::from_pkcs1_pem(pem).map_err(|e| e.to_string())
    } else if pem.contains("BEGIN PUBLIC KEY") {
        RsaPublicKey::from_public_key_pem(pem).map_err(|e| e.to_string())
    } else {
        Err("not a PEM encoded RSA public key".to_string())
    }
}
