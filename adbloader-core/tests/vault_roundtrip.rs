//! Credential vault properties: round trip under a matched key pair and
//! typed failure under a mismatched one.

use adbloader_core::security::{
    CredentialVault, KeyConfig, KeyManager, KeyStatus, Padding, VaultPaths, decrypt, encrypt,
};
use adbloader_core::{AdbLoaderError, Result};
use proptest::prelude::*;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::sync::OnceLock;
use tempfile::TempDir;

/// Two independent installations sharing nothing but the test process.
fn key_pairs() -> &'static [(RsaPrivateKey, RsaPublicKey); 2] {
    static KEYS: OnceLock<[(RsaPrivateKey, RsaPublicKey); 2]> = OnceLock::new();
    KEYS.get_or_init(|| {
        let pair = || {
            let dir = TempDir::new().unwrap();
            let keys = KeyManager::new(VaultPaths::new(dir.path()), KeyConfig::default());
            keys.ensure_key_pair().unwrap();
            (keys.load_private_key().unwrap(), keys.load_public_key().unwrap())
        };
        [pair(), pair()]
    })
}

fn padding() -> impl Strategy<Value = Padding> {
    prop_oneof![Just(Padding::Pkcs1v15), Just(Padding::OaepSha256)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_vault_roundtrip_matched_pair(secret in "\\PC{0,40}", padding in padding()) {
        let (private_key, public_key) = &key_pairs()[0];
        let armored = encrypt(&secret, public_key, padding).unwrap();
        let decrypted = decrypt(&armored, private_key, padding).unwrap();
        prop_assert_eq!(decrypted.as_str(), secret.as_str());
    }

    #[test]
    fn test_vault_mismatched_key_is_decryption_error(secret in "[ -~]{1,40}") {
        let (_, public_key) = &key_pairs()[0];
        let (other_private, _) = &key_pairs()[1];
        let armored = encrypt(&secret, public_key, Padding::OaepSha256).unwrap();
        let error = decrypt(&armored, other_private, Padding::OaepSha256).unwrap_err();
        prop_assert!(matches!(error, AdbLoaderError::Decryption { .. }), "unexpected error: {}", error);
    }
}

#[test]
fn test_vault_installation_lifecycle() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let vault = CredentialVault::new(KeyManager::new(
        VaultPaths::new(dir.path().join(".adb")),
        KeyConfig::default(),
    ));

    assert_eq!(vault.keys().ensure_key_pair()?, KeyStatus::Generated);
    let private_before = std::fs::read(vault.keys().paths().private_key()).unwrap();
    let public_before = std::fs::read(vault.keys().paths().public_key()).unwrap();

    assert_eq!(vault.keys().ensure_key_pair()?, KeyStatus::Existing);
    assert_eq!(
        std::fs::read(vault.keys().paths().private_key()).unwrap(),
        private_before
    );
    assert_eq!(
        std::fs::read(vault.keys().paths().public_key()).unwrap(),
        public_before
    );

    vault.store("scott", "tiger", "warehouse")?;
    let record = vault.load()?;
    assert_eq!(record.user, "scott");
    assert_eq!(record.tns, "warehouse");
    assert_ne!(record.passwd, "tiger");

    let unlocked = vault.unlock()?;
    assert_eq!(unlocked.credentials.secret(), "tiger");
    assert_eq!(unlocked.target_alias, "warehouse");
    Ok(())
}

#[test]
fn test_vault_record_from_other_installation_fails_to_decrypt() -> Result<()> {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let vault_for = |dir: &TempDir| {
        CredentialVault::new(KeyManager::new(
            VaultPaths::new(dir.path()),
            KeyConfig::default(),
        ))
    };

    let source = vault_for(&first).with_padding(Padding::OaepSha256);
    source.keys().ensure_key_pair()?;
    source.store("scott", "tiger", "warehouse")?;

    let copied = vault_for(&second);
    copied.keys().ensure_key_pair()?;
    std::fs::copy(source.keys().paths().record(), copied.keys().paths().record()).unwrap();

    let error = copied.unlock().unwrap_err();
    assert!(matches!(error, AdbLoaderError::Decryption { .. }));
    assert_eq!(error.exit_code(), 5);
    Ok(())
}
