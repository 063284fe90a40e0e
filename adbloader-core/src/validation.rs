//! Input validation for operator-supplied names and textual values.
//!
//! Patterns are compiled once and shared across threads.

use crate::Result;
use crate::error::AdbLoaderError;
use regex::Regex;
use std::sync::OnceLock;

/// Longest identifier accepted for a schema, table or alias
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Pre-compiled patterns for value validation.
struct ValidationPatterns {
    decimal: Regex,
    alias: Regex,
}

impl ValidationPatterns {
    /// Gets the shared pattern set, or `None` if compilation failed.
    fn instance() -> Option<&'static Self> {
        static PATTERNS: OnceLock<Option<ValidationPatterns>> = OnceLock::new();
        PATTERNS.get_or_init(Self::compile).as_ref()
    }

    fn compile() -> Option<Self> {
        Some(Self {
            decimal: Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$").ok()?,
            alias: Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.\-]*$").ok()?,
        })
    }
}

/// Checks whether `text` is a plain decimal literal (`12`, `-0.5`, `1.2e3`).
///
/// # Example
/// ```rust
/// use adbloader_core::validation::is_decimal_literal;
///
/// assert!(is_decimal_literal("-12.50"));
/// assert!(is_decimal_literal("1e-3"));
/// assert!(!is_decimal_literal("12,50"));
/// assert!(!is_decimal_literal("NaN"));
/// ```
pub fn is_decimal_literal(text: &str) -> bool {
    match ValidationPatterns::instance() {
        Some(patterns) => patterns.decimal.is_match(text),
        None => text.parse::<f64>().is_ok_and(f64::is_finite),
    }
}

/// Validates a schema or table name supplied on the command line.
///
/// Names are always quoted when used in SQL, so only emptiness, length and
/// control characters are rejected.
pub fn validate_identifier(kind: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AdbLoaderError::configuration(format!(
            "{} name cannot be empty",
            kind
        )));
    }
    if value.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(AdbLoaderError::configuration(format!(
            "{} name exceeds {} characters",
            kind, MAX_IDENTIFIER_LENGTH
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(AdbLoaderError::configuration(format!(
            "{} name contains control characters",
            kind
        )));
    }
    Ok(())
}

/// Validates a target alias before it is stored in the vault record.
pub fn validate_alias(alias: &str) -> Result<()> {
    validate_identifier("target alias", alias)?;
    let valid = match ValidationPatterns::instance() {
        Some(patterns) => patterns.alias.is_match(alias),
        None => !alias.chars().any(char::is_whitespace),
    };
    if !valid {
        return Err(AdbLoaderError::configuration(format!(
            "target alias '{}' may only contain letters, digits, '_', '.' and '-'",
            alias
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_literals() {
        for ok in ["0", "+1", "-1.", ".5", "3.14159", "6.02e23", "1E-9"] {
            assert!(is_decimal_literal(ok), "{ok} should be accepted");
        }
        for bad in ["", ".", "-", "1.2.3", "1e", "abc", "inf", " 1"] {
            assert!(!is_decimal_literal(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("table", "Orders 2024").is_ok());
        assert!(validate_identifier("table", "  ").is_err());
        assert!(validate_identifier("schema", "bad\nname").is_err());
        assert!(validate_identifier("schema", &"x".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_alias() {
        assert!(validate_alias("warehouse_high").is_ok());
        assert!(validate_alias("db-prod.eu").is_ok());
        assert!(validate_alias("has space").is_err());
        assert!(validate_alias("").is_err());
    }
}
