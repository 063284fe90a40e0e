//! Encrypted storage of the single database secret.
//!
//! The vault record keeps the username and target alias in clear text; only
//! the secret is RSA-encrypted under the installation's public key and
//! base64-armored. Decryption requires the matching private key from the
//! same vault directory, so a record copied to another machine is useless.

use super::credentials::{Credentials, VaultedCredential};
use super::keys::KeyManager;
use crate::Result;
use crate::error::AdbLoaderError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use std::io::Write;
use zeroize::Zeroizing;

/// Asymmetric padding scheme used for the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Padding {
    /// PKCS#1 v1.5, readable by records written before padding was recorded
    #[default]
    #[serde(rename = "pkcs1v15")]
    Pkcs1v15,
    /// OAEP with SHA-256
    #[serde(rename = "oaep-sha256")]
    OaepSha256,
}

impl Padding {
    /// Largest plaintext, in bytes, a key of `key_size` bytes can encrypt.
    pub fn max_plaintext_len(self, key_size: usize) -> usize {
        let overhead = match self {
            Self::Pkcs1v15 => 11,
            // 2 * SHA-256 output + 2
            Self::OaepSha256 => 66,
        };
        key_size.saturating_sub(overhead)
    }
}

impl std::fmt::Display for Padding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pkcs1v15 => write!(f, "pkcs1v15"),
            Self::OaepSha256 => write!(f, "oaep-sha256"),
        }
    }
}

impl std::str::FromStr for Padding {
    type Err = AdbLoaderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pkcs1v15" | "pkcs1" => Ok(Self::Pkcs1v15),
            "oaep-sha256" | "oaep" => Ok(Self::OaepSha256),
            other => Err(AdbLoaderError::configuration(format!(
                "unknown padding '{}': expected pkcs1v15 or oaep-sha256",
                other
            ))),
        }
    }
}

/// On-disk vault record (`config.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRecord {
    /// Database username, stored in clear text
    pub user: String,
    /// Base64-armored ciphertext of the secret
    pub passwd: String,
    /// Target alias, stored in clear text
    #[serde(rename = "TNS")]
    pub tns: String,
    #[serde(default)]
    pub padding: Padding,
}

/// Encrypts `secret` under `public_key` and returns the armored ciphertext.
///
/// # Errors
/// Returns a `Configuration` error if the secret is longer than the key and
/// padding allow, and a `Key` error if encryption itself fails.
pub fn encrypt(secret: &str, public_key: &RsaPublicKey, padding: Padding) -> Result<String> {
    let limit = padding.max_plaintext_len(public_key.size());
    if secret.len() > limit {
        return Err(AdbLoaderError::configuration(format!(
            "secret is {} bytes; a {}-bit key with {:?} padding encrypts at most {} bytes",
            secret.len(),
            public_key.size() * 8,
            padding,
            limit
        )));
    }

    let ciphertext = match padding {
        Padding::Pkcs1v15 => public_key.encrypt(&mut OsRng, Pkcs1v15Encrypt, secret.as_bytes()),
        Padding::OaepSha256 => public_key.encrypt(
            &mut OsRng,
            Oaep::new::<sha2::Sha256>(),
            secret.as_bytes(),
        ),
    }
    .map_err(|e| AdbLoaderError::key_failed("Secret encryption failed", e))?;

    Ok(STANDARD.encode(ciphertext))
}

/// Reverses [`encrypt`].
///
/// Whitespace inside the armor is ignored, so line-wrapped base64 decodes.
///
/// # Errors
/// Returns a `Decryption` error for a mismatched key, corrupt or truncated
/// ciphertext, or a plaintext that is not UTF-8.
pub fn decrypt(
    armored: &str,
    private_key: &RsaPrivateKey,
    padding: Padding,
) -> Result<Zeroizing<String>> {
    let compact: String = armored
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let ciphertext = STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| AdbLoaderError::decryption("stored secret is not valid base64"))?;

    let plaintext = match padding {
        Padding::Pkcs1v15 => private_key.decrypt(Pkcs1v15Encrypt, &ciphertext),
        Padding::OaepSha256 => private_key.decrypt(Oaep::new::<sha2::Sha256>(), &ciphertext),
    }
    .map(Zeroizing::new)
    .map_err(|_| {
        AdbLoaderError::decryption(
            "stored secret does not decrypt under the installed private key",
        )
    })?;

    let text = std::str::from_utf8(&plaintext)
        .map_err(|_| AdbLoaderError::decryption("decrypted secret is not valid UTF-8"))?;
    Ok(Zeroizing::new(text.to_string()))
}

/// Reads and writes the vault record of one installation.
#[derive(Debug, Clone)]
pub struct CredentialVault {
    keys: KeyManager,
    padding: Padding,
}

impl CredentialVault {
    pub fn new(keys: KeyManager) -> Self {
        Self {
            keys,
            padding: Padding::default(),
        }
    }

    /// Padding used for newly stored secrets.
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn keys(&self) -> &KeyManager {
        &self.keys
    }

    /// Whether a vault record is present.
    pub fn exists(&self) -> bool {
        self.keys.paths().record().exists()
    }

    /// Encrypts `secret` and writes the vault record, replacing any earlier one.
    ///
    /// The key pair must already exist.
    pub fn store(&self, username: &str, secret: &str, target_alias: &str) -> Result<()> {
        if username.trim().is_empty() {
            return Err(AdbLoaderError::configuration("username cannot be empty"));
        }
        if target_alias.trim().is_empty() {
            return Err(AdbLoaderError::configuration("target alias cannot be empty"));
        }

        let public_key = self.keys.load_public_key()?;
        let record = VaultRecord {
            user: username.to_string(),
            passwd: encrypt(secret, &public_key, self.padding)?,
            tns: target_alias.to_string(),
            padding: self.padding,
        };

        let json = serde_json::to_vec_pretty(&record)
            .map_err(|e| AdbLoaderError::serialization("Failed to encode vault record", e))?;

        let paths = self.keys.paths();
        paths.ensure_dir()?;
        let path = paths.record();
        let mut staged = tempfile::NamedTempFile::new_in(paths.dir())
            .map_err(|e| AdbLoaderError::io("Failed to stage vault record", e))?;
        staged
            .write_all(&json)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|e| AdbLoaderError::io("Failed to write vault record", e))?;
        staged.persist(&path).map_err(|e| {
            AdbLoaderError::io(format!("Failed to write {}", path.display()), e.error)
        })?;

        tracing::info!(
            "Stored credentials for user '{}' targeting '{}'",
            record.user,
            record.tns
        );
        Ok(())
    }

    /// Reads the vault record without decrypting anything.
    ///
    /// # Errors
    /// A missing record is a `Setup` error pointing at `adbloader configure`.
    pub fn load(&self) -> Result<VaultRecord> {
        let path = self.keys.paths().record();
        let bytes = std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AdbLoaderError::setup(
                format!("no stored credentials at {}", path.display()),
                "Run `adbloader configure` to store the database username, password and target alias.",
            ),
            _ => AdbLoaderError::io(format!("Failed to read {}", path.display()), e),
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            AdbLoaderError::serialization(format!("Invalid vault record {}", path.display()), e)
        })
    }

    /// Loads the record and the private key and decrypts the secret.
    pub fn unlock(&self) -> Result<VaultedCredential> {
        let record = self.load()?;
        let private_key = self.keys.load_private_key()?;
        let secret = decrypt(&record.passwd, &private_key, record.padding)?;

        tracing::debug!("Unlocked credentials for user '{}'", record.user);
        Ok(VaultedCredential {
            credentials: Credentials::from_secret(record.user, secret),
            target_alias: record.tns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::{KeyConfig, VaultPaths};
    use std::sync::OnceLock;

    fn shared_key() -> &'static RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, 2048).unwrap())
    }

    #[test]
    fn test_vault_encrypt_decrypt_both_paddings() {
        let private_key = shared_key();
        let public_key = RsaPublicKey::from(private_key);

        for padding in [Padding::Pkcs1v15, Padding::OaepSha256] {
            let armored = encrypt("tiger", &public_key, padding).unwrap();
            assert_ne!(armored, "tiger");
            let secret = decrypt(&armored, private_key, padding).unwrap();
            assert_eq!(secret.as_str(), "tiger");
        }
    }

    #[test]
    fn test_vault_decrypt_accepts_wrapped_base64() {
        let private_key = shared_key();
        let public_key = RsaPublicKey::from(private_key);
        let armored = encrypt("wrapped", &public_key, Padding::Pkcs1v15).unwrap();

        let wrapped: String = armored
            .as_bytes()
            .chunks(76)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join("\n");
        let secret = decrypt(&wrapped, private_key, Padding::Pkcs1v15).unwrap();
        assert_eq!(secret.as_str(), "wrapped");
    }

    #[test]
    fn test_vault_secret_length_limit() {
        let public_key = RsaPublicKey::from(shared_key());
        // 256-byte modulus
        assert_eq!(Padding::Pkcs1v15.max_plaintext_len(256), 245);
        assert_eq!(Padding::OaepSha256.max_plaintext_len(256), 190);

        assert!(encrypt(&"x".repeat(245), &public_key, Padding::Pkcs1v15).is_ok());
        let error = encrypt(&"x".repeat(246), &public_key, Padding::Pkcs1v15).unwrap_err();
        assert!(matches!(error, AdbLoaderError::Configuration { .. }));
        let error = encrypt(&"x".repeat(191), &public_key, Padding::OaepSha256).unwrap_err();
        assert!(matches!(error, AdbLoaderError::Configuration { .. }));
    }

    #[test]
    fn test_vault_decrypt_rejects_garbage() {
        let private_key = shared_key();
        assert!(matches!(
            decrypt("not base64 !!", private_key, Padding::Pkcs1v15),
            Err(AdbLoaderError::Decryption { .. })
        ));
        assert!(matches!(
            decrypt("AAAA", private_key, Padding::Pkcs1v15),
            Err(AdbLoaderError::Decryption { .. })
        ));
    }

    #[test]
    fn test_vault_record_without_padding_defaults_to_pkcs1() {
        let record: VaultRecord =
            serde_json::from_str(r#"{"user": "scott", "passwd": "AAAA", "TNS": "orcl_high"}"#)
                .unwrap();
        assert_eq!(record.padding, Padding::Pkcs1v15);
        assert_eq!(record.tns, "orcl_high");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["TNS"], "orcl_high");
        assert_eq!(json["padding"], "pkcs1v15");
    }

    #[test]
    fn test_vault_store_and_unlock() {
        let root = tempfile::tempdir().unwrap();
        let keys = KeyManager::new(VaultPaths::new(root.path().join(".adb")), KeyConfig::default());
        keys.ensure_key_pair().unwrap();
        let vault = CredentialVault::new(keys).with_padding(Padding::OaepSha256);

        assert!(!vault.exists());
        assert!(matches!(vault.load(), Err(AdbLoaderError::Setup { .. })));

        vault.store("scott", "tiger", "warehouse").unwrap();
        assert!(vault.exists());

        let on_disk = std::fs::read_to_string(vault.keys().paths().record()).unwrap();
        assert!(on_disk.contains("scott"));
        assert!(!on_disk.contains("tiger"));

        let unlocked = vault.unlock().unwrap();
        assert_eq!(unlocked.credentials.username(), "scott");
        assert_eq!(unlocked.credentials.secret(), "tiger");
        assert_eq!(unlocked.target_alias, "warehouse");
    }

    #[test]
    fn test_vault_store_requires_key_pair() {
        let root = tempfile::tempdir().unwrap();
        let keys = KeyManager::new(VaultPaths::new(root.path()), KeyConfig::default());
        let vault = CredentialVault::new(keys);
        assert!(matches!(
            vault.store("scott", "tiger", "warehouse"),
            Err(AdbLoaderError::Key { .. })
        ));
    }

    #[test]
    fn test_padding_from_str() {
        assert_eq!("OAEP".parse::<Padding>().unwrap(), Padding::OaepSha256);
        assert_eq!("pkcs1v15".parse::<Padding>().unwrap(), Padding::Pkcs1v15);
        assert!("none".parse::<Padding>().is_err());
    }
}
