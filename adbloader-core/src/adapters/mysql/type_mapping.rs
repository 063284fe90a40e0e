//! MySQL to unified data type conversion.

use crate::models::UnifiedDataType;

/// Maps a MySQL column type to the unified data type system.
///
/// # Arguments
/// * `data_type` - bare type name from `information_schema.columns.data_type`
/// * `column_type` - full declaration (`tinyint(1)`, `int(10) unsigned`, ...)
/// * `char_max_length` - declared length of character and binary types
/// * `numeric_precision` / `numeric_scale` - declared precision of exact numerics
///
/// `TINYINT(1)` and `BIT(1)` are treated as booleans.
///
/// # Example
/// ```rust
/// use adbloader_core::adapters::mysql::map_mysql_type;
/// use adbloader_core::models::UnifiedDataType;
///
/// let unified = map_mysql_type("int", "int unsigned", None, Some(10), Some(0));
/// assert_eq!(unified, UnifiedDataType::Integer { bits: 32, signed: false });
/// ```
pub fn map_mysql_type(
    data_type: &str,
    column_type: &str,
    char_max_length: Option<u32>,
    numeric_precision: Option<u8>,
    numeric_scale: Option<u8>,
) -> UnifiedDataType {
    let column_type = column_type.to_ascii_lowercase();
    let signed = !column_type.contains("unsigned");
    let integer = |bits: u8| UnifiedDataType::Integer { bits, signed };

    match data_type.to_ascii_lowercase().as_str() {
        "char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" => {
            UnifiedDataType::String {
                max_length: char_max_length,
            }
        }

        "tinyint" if column_type.starts_with("tinyint(1)") => UnifiedDataType::Boolean,
        "tinyint" => integer(8),
        "smallint" => integer(16),
        "mediumint" => integer(24),
        "int" | "integer" => integer(32),
        "bigint" => integer(64),
        "year" => UnifiedDataType::Integer {
            bits: 16,
            signed: false,
        },

        "decimal" | "numeric" => UnifiedDataType::Decimal {
            precision: numeric_precision,
            scale: numeric_scale,
        },
        "float" => UnifiedDataType::Float {
            precision: Some(24),
        },
        "double" | "real" => UnifiedDataType::Float {
            precision: Some(53),
        },

        "boolean" | "bool" => UnifiedDataType::Boolean,
        "bit" if column_type.starts_with("bit(1)") => UnifiedDataType::Boolean,

        "date" => UnifiedDataType::Date,
        "time" => UnifiedDataType::Time {
            with_timezone: false,
        },
        "datetime" => UnifiedDataType::DateTime {
            with_timezone: false,
        },
        // Stored as UTC, converted from the session time zone
        "timestamp" => UnifiedDataType::DateTime {
            with_timezone: true,
        },

        "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob" => {
            UnifiedDataType::Binary {
                max_length: char_max_length,
            }
        }

        "json" => UnifiedDataType::Json,

        // enum, set, bit(n), geometry: loaded through their text form
        _ => UnifiedDataType::Custom {
            type_name: column_type,
        },
    }
}
