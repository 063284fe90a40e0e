//! Bulk load configuration.

use crate::error::AdbLoaderError;
use serde::{Deserialize, Serialize};

/// Default number of records per batch
pub const DEFAULT_BATCH_SIZE: usize = 10_000;
/// Upper bound on records per batch
pub const MAX_BATCH_SIZE: usize = 1_000_000;

/// Configuration for the bulk loader.
///
/// # Example
/// ```rust
/// use adbloader_core::adapters::LoadConfig;
///
/// let config = LoadConfig::default().with_batch_size(500);
/// assert!(config.validate().is_ok());
/// assert!(LoadConfig::default().with_batch_size(0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Maximum records per batch
    pub batch_size: usize,
    /// Fall back to a unique case-insensitive match when a source column
    /// has no exact destination counterpart
    pub case_insensitive_columns: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            case_insensitive_columns: true,
        }
    }
}

impl LoadConfig {
    /// Builder method to set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Builder method to toggle case-insensitive column matching.
    pub fn with_case_insensitive_columns(mut self, enabled: bool) -> Self {
        self.case_insensitive_columns = enabled;
        self
    }

    /// Validates load configuration parameters.
    pub fn validate(&self) -> crate::Result<()> {
        if self.batch_size == 0 {
            return Err(AdbLoaderError::configuration(
                "batch_size must be greater than 0",
            ));
        }
        if self.batch_size > MAX_BATCH_SIZE {
            return Err(AdbLoaderError::configuration(format!(
                "batch_size should not exceed {}",
                MAX_BATCH_SIZE
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_default() {
        let config = LoadConfig::default();
        assert_eq!(config.batch_size, 10_000);
        assert!(config.case_insensitive_columns);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_bounds() {
        assert!(LoadConfig::default().with_batch_size(1).validate().is_ok());
        assert!(
            LoadConfig::default()
                .with_batch_size(MAX_BATCH_SIZE + 1)
                .validate()
                .is_err()
        );
    }
}
