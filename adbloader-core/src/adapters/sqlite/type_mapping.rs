//! SQLite to unified data type conversion.
//!
//! SQLite derives a column's affinity from its declared type name:
//! 1. Contains "INT" -> INTEGER affinity
//! 2. Contains "CHAR", "CLOB", or "TEXT" -> TEXT affinity
//! 3. Contains "BLOB" or no type specified -> BLOB affinity
//! 4. Contains "REAL", "FLOA", or "DOUB" -> REAL affinity
//! 5. Otherwise -> NUMERIC affinity
//!
//! Common declared names that fall into NUMERIC affinity (DATE, BOOLEAN,
//! DECIMAL, JSON) are mapped to the richer type their name announces.

use crate::models::UnifiedDataType;

/// Maps a SQLite declared type to the unified data type system.
///
/// # Example
/// ```rust
/// use adbloader_core::adapters::sqlite::map_sqlite_type;
/// use adbloader_core::models::UnifiedDataType;
///
/// let unified = map_sqlite_type("VARCHAR(255)");
/// assert_eq!(unified, UnifiedDataType::String { max_length: Some(255) });
/// ```
pub fn map_sqlite_type(declared_type: &str) -> UnifiedDataType {
    let upper = declared_type.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return UnifiedDataType::Binary { max_length: None };
    }

    let (base, first, second) = split_type_arguments(&upper);

    if base.contains("INT") {
        return map_integer_type(base);
    }
    if base.contains("CHAR") || base.contains("CLOB") || base.contains("TEXT") {
        return UnifiedDataType::String { max_length: first };
    }
    if base.contains("BLOB") {
        return UnifiedDataType::Binary { max_length: first };
    }
    if base == "FLOAT" {
        return UnifiedDataType::Float {
            precision: Some(24),
        };
    }
    if base.contains("REAL") || base.contains("FLOA") || base.contains("DOUB") {
        return UnifiedDataType::Float {
            precision: Some(53),
        };
    }

    match base {
        "BOOLEAN" | "BOOL" => UnifiedDataType::Boolean,
        "DATE" => UnifiedDataType::Date,
        "TIME" => UnifiedDataType::Time {
            with_timezone: false,
        },
        "DATETIME" | "TIMESTAMP" => UnifiedDataType::DateTime {
            with_timezone: false,
        },
        "TIMESTAMPTZ" => UnifiedDataType::DateTime {
            with_timezone: true,
        },
        "JSON" | "JSONB" => UnifiedDataType::Json,
        "UUID" | "GUID" => UnifiedDataType::Uuid,
        "BINARY" | "VARBINARY" => UnifiedDataType::Binary { max_length: first },
        "STRING" => UnifiedDataType::String { max_length: first },
        _ if base.contains("NUM") || base.contains("DEC") => UnifiedDataType::Decimal {
            precision: first.and_then(|p| u8::try_from(p).ok()),
            scale: second.and_then(|s| u8::try_from(s).ok()),
        },
        _ => UnifiedDataType::Custom {
            type_name: declared_type.trim().to_string(),
        },
    }
}

/// SQLite stores every integer in up to 8 bytes; narrower names only hint
/// at the intended range.
fn map_integer_type(base: &str) -> UnifiedDataType {
    let bits = match base {
        "TINYINT" => 8,
        "SMALLINT" | "INT2" => 16,
        "MEDIUMINT" => 24,
        _ => 64,
    };
    UnifiedDataType::Integer { bits, signed: true }
}

/// Splits `DECIMAL(10, 2)` into `("DECIMAL", Some(10), Some(2))`.
fn split_type_arguments(declared: &str) -> (&str, Option<u32>, Option<u32>) {
    let Some((base, rest)) = declared.split_once('(') else {
        return (declared, None, None);
    };
    let arguments = rest.trim_end_matches(')');
    let mut numbers = arguments
        .split(',')
        .map(|part| part.trim().parse::<u32>().ok());

    let first = numbers.next().flatten();
    let second = numbers.next().flatten();
    (base.trim(), first, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_integer_types() {
        assert_eq!(
            map_sqlite_type("INTEGER"),
            UnifiedDataType::Integer {
                bits: 64,
                signed: true
            }
        );
        assert_eq!(
            map_sqlite_type("smallint"),
            UnifiedDataType::Integer {
                bits: 16,
                signed: true
            }
        );
        assert_eq!(
            map_sqlite_type("UNSIGNED BIG INT"),
            UnifiedDataType::Integer {
                bits: 64,
                signed: true
            }
        );
    }

    #[test]
    fn test_map_affinity_families() {
        assert_eq!(
            map_sqlite_type("NVARCHAR(40)"),
            UnifiedDataType::String {
                max_length: Some(40)
            }
        );
        assert_eq!(map_sqlite_type("TEXT"), UnifiedDataType::String { max_length: None });
        assert_eq!(map_sqlite_type(""), UnifiedDataType::Binary { max_length: None });
        assert_eq!(
            map_sqlite_type("DOUBLE PRECISION"),
            UnifiedDataType::Float {
                precision: Some(53)
            }
        );
    }

    #[test]
    fn test_map_numeric_affinity_names() {
        assert_eq!(
            map_sqlite_type("DECIMAL(10, 2)"),
            UnifiedDataType::Decimal {
                precision: Some(10),
                scale: Some(2)
            }
        );
        assert_eq!(
            map_sqlite_type("NUMERIC"),
            UnifiedDataType::Decimal {
                precision: None,
                scale: None
            }
        );
        assert_eq!(map_sqlite_type("boolean"), UnifiedDataType::Boolean);
        assert_eq!(map_sqlite_type("DATE"), UnifiedDataType::Date);
        assert_eq!(map_sqlite_type("json"), UnifiedDataType::Json);
        assert_eq!(
            map_sqlite_type("GEOMETRY"),
            UnifiedDataType::Custom {
                type_name: "GEOMETRY".to_string()
            }
        );
    }

    #[test]
    fn test_split_type_arguments() {
        assert_eq!(split_type_arguments("INTEGER"), ("INTEGER", None, None));
        assert_eq!(split_type_arguments("CHAR(8)"), ("CHAR", Some(8), None));
        assert_eq!(
            split_type_arguments("NUMERIC (12,4)"),
            ("NUMERIC", Some(12), Some(4))
        );
    }
}
