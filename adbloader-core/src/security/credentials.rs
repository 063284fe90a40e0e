//! Decrypted credential container with automatic memory zeroing.
//!
//! # Security
//! - Both fields live in `Zeroizing` containers and are cleared on drop
//! - The secret never appears in `Debug` output

use zeroize::Zeroizing;

/// Username and decrypted secret for one destination session.
///
/// # Example
///
/// ```rust
/// use adbloader_core::security::Credentials;
///
/// let creds = Credentials::new("loader", "s3cret");
/// assert_eq!(creds.username(), "loader");
/// assert!(!format!("{:?}", creds).contains("s3cret"));
/// // The secret is zeroed when `creds` is dropped
/// ```
#[derive(Clone)]
pub struct Credentials {
    username: Zeroizing<String>,
    secret: Zeroizing<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: Zeroizing::new(username.into()),
            secret: Zeroizing::new(secret.into()),
        }
    }

    /// Wraps an already-protected secret without copying it out.
    pub fn from_secret(username: impl Into<String>, secret: Zeroizing<String>) -> Self {
        Self {
            username: Zeroizing::new(username.into()),
            secret,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Exposes the secret for handing to a database driver.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Checks if a non-empty secret is present without exposing it.
    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username.as_str())
            .field("secret", &"****")
            .finish()
    }
}

/// Decrypted vault contents: who to connect as and where.
#[derive(Debug, Clone)]
pub struct VaultedCredential {
    pub credentials: Credentials,
    /// Target alias, resolved through the client target directory
    pub target_alias: String,
}
