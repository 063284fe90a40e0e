//! Credential vault and schema-typed bulk loader.
//!
//! This crate provides everything behind the `adbloader` binary: a local
//! RSA-protected credential vault, destination sessions opened with the
//! vaulted credential, catalog introspection of the destination table and
//! a batched loader that coerces source records to the discovered column
//! types.
//!
//! # Security Guarantees
//! - Only the database secret is encrypted; username and target alias are
//!   stored in clear text
//! - The private key never leaves the local vault directory
//! - Decrypted secrets live in zeroizing buffers and are never logged
//! - Connection URLs are redacted in logs and error messages
//!
//! # Load Flow
//! ```text
//! KeyManager -> CredentialVault -> ConnectionFactory -> Session::describe
//!                                                          |
//!                         formats::read_source ------> BulkLoader::load
//! ```

pub mod adapters;
pub mod coercion;
pub mod environment;
pub mod error;
pub mod formats;
pub mod loader;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod security;
pub mod validation;

// Re-export commonly used types
pub use adapters::{
    ConnectionConfig, ConnectionFactory, Destination, LoadConfig, Session, SessionLocale,
    TargetDirectory,
};
pub use environment::{Environment, Preflight};
pub use error::{AdbLoaderError, Result};
pub use formats::{ReaderConfig, SourceFormat};
pub use loader::{BulkLoader, LoadSummary};
pub use logging::{LogFormat, init_logging};
pub use models::{Column, DatabaseType, RawValue, Record, SourceData, TableSchema, UnifiedDataType};
pub use pipeline::{LoadRequest, run_load};
pub use security::{CredentialVault, Credentials, KeyConfig, KeyManager, Padding, VaultPaths};
