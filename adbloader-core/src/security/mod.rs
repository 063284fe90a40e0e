//! Local credential vault: key pair lifecycle and secret encryption.
//!
//! # Security Guarantees
//! - The database secret is only ever written RSA-encrypted
//! - The private key never leaves the vault directory
//! - Decrypted secrets live in `Zeroizing` containers and never reach logs
//!
//! # Module Structure
//! - `paths`: vault directory layout (`~/.adb`)
//! - `keys`: RSA key pair generation and PEM loading
//! - `vault`: encrypt/decrypt and the `config.json` vault record
//! - `credentials`: decrypted credential container

mod credentials;
mod keys;
mod paths;
mod vault;

pub use credentials::{Credentials, VaultedCredential};
pub use keys::{
    DEFAULT_KEY_BITS, KeyConfig, KeyFormat, KeyManager, KeyStatus, MAX_KEY_BITS, MIN_KEY_BITS,
    decode_private_key, decode_public_key,
};
pub use paths::{PRIVATE_KEY_FILE, PUBLIC_KEY_FILE, RECORD_FILE, VAULT_DIR_NAME, VaultPaths};
pub use vault::{CredentialVault, Padding, VaultRecord, decrypt, encrypt};
