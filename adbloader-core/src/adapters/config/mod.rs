//! Configuration types for destination adapters.
//!
//! - `ConnectionConfig`: destination URL, connect timeout and session locale
//! - `LoadConfig`: batch size and column matching
//!
//! # Security
//! These configuration structs intentionally do NOT store passwords or credentials.
//! Credentials come from the security module's vault.

mod connection;
mod load;

pub use connection::{ConnectionConfig, DEFAULT_NLS_LANG, SessionLocale, detect_database_type};
pub use load::{DEFAULT_BATCH_SIZE, LoadConfig, MAX_BATCH_SIZE};
