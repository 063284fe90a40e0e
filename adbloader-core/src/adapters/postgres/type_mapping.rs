//! PostgreSQL to unified data type conversion.

use crate::models::UnifiedDataType;

/// Maps an `information_schema.columns` type description to a unified type.
///
/// # Arguments
/// * `data_type` - `data_type` column (`character varying`, `ARRAY`, `USER-DEFINED`, ...)
/// * `udt_name` - underlying type name (`varchar`, `_int4`, `mood`, ...)
/// * `char_max_length` - declared length of character types
/// * `numeric_precision` / `numeric_scale` - declared precision of exact numerics
///
/// Arrays, enums, domains and other user-defined types map to
/// [`UnifiedDataType::Custom`] and are loaded through their text input form.
///
/// # Example
/// ```rust
/// use adbloader_core::adapters::postgres::map_postgresql_type;
/// use adbloader_core::models::UnifiedDataType;
///
/// let mapped = map_postgresql_type("numeric", "numeric", None, Some(10), Some(2));
/// assert_eq!(mapped, UnifiedDataType::Decimal { precision: Some(10), scale: Some(2) });
/// ```
pub fn map_postgresql_type(
    data_type: &str,
    udt_name: &str,
    char_max_length: Option<u32>,
    numeric_precision: Option<u8>,
    numeric_scale: Option<u8>,
) -> UnifiedDataType {
    match data_type.to_ascii_lowercase().as_str() {
        "character varying" | "varchar" | "character" | "char" => UnifiedDataType::String {
            max_length: char_max_length,
        },
        "text" | "name" | "citext" => UnifiedDataType::String { max_length: None },

        "smallint" | "int2" => UnifiedDataType::Integer {
            bits: 16,
            signed: true,
        },
        "integer" | "int" | "int4" => UnifiedDataType::Integer {
            bits: 32,
            signed: true,
        },
        "bigint" | "int8" => UnifiedDataType::Integer {
            bits: 64,
            signed: true,
        },

        "real" | "float4" => UnifiedDataType::Float {
            precision: Some(24),
        },
        "double precision" | "float8" => UnifiedDataType::Float {
            precision: Some(53),
        },
        "numeric" | "decimal" => UnifiedDataType::Decimal {
            precision: numeric_precision,
            scale: numeric_scale,
        },
        // Text form is locale-formatted; load through numeric input
        "money" => UnifiedDataType::Decimal {
            precision: None,
            scale: Some(2),
        },

        "boolean" | "bool" => UnifiedDataType::Boolean,

        "timestamp without time zone" | "timestamp" => UnifiedDataType::DateTime {
            with_timezone: false,
        },
        "timestamp with time zone" | "timestamptz" => UnifiedDataType::DateTime {
            with_timezone: true,
        },
        "date" => UnifiedDataType::Date,
        "time without time zone" | "time" => UnifiedDataType::Time {
            with_timezone: false,
        },
        "time with time zone" | "timetz" => UnifiedDataType::Time {
            with_timezone: true,
        },

        "json" | "jsonb" => UnifiedDataType::Json,
        "uuid" => UnifiedDataType::Uuid,
        "bytea" => UnifiedDataType::Binary { max_length: None },

        "array" => UnifiedDataType::Custom {
            type_name: format!("{}[]", udt_name.trim_start_matches('_')),
        },
        "user-defined" => match udt_name {
            "citext" => UnifiedDataType::String { max_length: None },
            _ => UnifiedDataType::Custom {
                type_name: udt_name.to_string(),
            },
        },

        _ => UnifiedDataType::Custom {
            type_name: data_type.to_string(),
        },
    }
}
