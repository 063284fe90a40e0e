//! Helper utilities shared by the destination adapters.
//!
//! Identifier quoting, bind-parameter budgeting and catalog value
//! conversion live here so each backend's writer and introspection code
//! stays focused on its SQL.

use crate::models::DatabaseType;

/// Bind parameters PostgreSQL accepts in one statement
pub const POSTGRES_BIND_LIMIT: usize = 65_535;
/// Bind parameters MySQL accepts in one prepared statement
pub const MYSQL_BIND_LIMIT: usize = 65_535;
/// Default `SQLITE_MAX_VARIABLE_NUMBER` of the bundled SQLite
pub const SQLITE_BIND_LIMIT: usize = 32_766;

/// Quotes an identifier for the given backend, doubling embedded quotes.
///
/// # Example
/// ```rust
/// use adbloader_core::adapters::helpers::quote_identifier;
/// use adbloader_core::models::DatabaseType;
///
/// assert_eq!(quote_identifier(DatabaseType::PostgreSQL, "Order"), "\"Order\"");
/// assert_eq!(quote_identifier(DatabaseType::MySQL, "a`b"), "`a``b`");
/// ```
pub fn quote_identifier(database_type: DatabaseType, identifier: &str) -> String {
    match database_type {
        DatabaseType::MySQL => format!("`{}`", identifier.replace('`', "``")),
        DatabaseType::PostgreSQL | DatabaseType::SQLite => {
            format!("\"{}\"", identifier.replace('"', "\"\""))
        }
    }
}

/// Quoted `schema.table` reference.
pub fn qualified_table(database_type: DatabaseType, schema: &str, table: &str) -> String {
    format!(
        "{}.{}",
        quote_identifier(database_type, schema),
        quote_identifier(database_type, table)
    )
}

/// Comma-separated quoted column list.
pub fn column_list<'a>(
    database_type: DatabaseType,
    names: impl IntoIterator<Item = &'a str>,
) -> String {
    names
        .into_iter()
        .map(|name| quote_identifier(database_type, name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rows that fit in one INSERT without exceeding `bind_limit` parameters.
pub fn rows_per_statement(bind_limit: usize, columns: usize) -> usize {
    (bind_limit / columns.max(1)).max(1)
}

/// Converts a catalog length/precision into a `u32`, dropping nonsense values.
pub fn catalog_u32(value: Option<i64>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}

/// Converts a catalog precision/scale into a `u8`, dropping nonsense values.
pub fn catalog_u8(value: Option<i64>) -> Option<u8> {
    value.and_then(|v| u8::try_from(v).ok())
}

/// `information_schema` reports nullability as `YES` / `NO`.
pub fn is_nullable_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("YES")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes() {
        assert_eq!(
            quote_identifier(DatabaseType::SQLite, "we\"ird"),
            "\"we\"\"ird\""
        );
        assert_eq!(
            qualified_table(DatabaseType::MySQL, "app", "orders"),
            "`app`.`orders`"
        );
        assert_eq!(
            column_list(DatabaseType::PostgreSQL, ["id", "name"]),
            "\"id\", \"name\""
        );
    }

    #[test]
    fn test_rows_per_statement() {
        assert_eq!(rows_per_statement(SQLITE_BIND_LIMIT, 2), 16_383);
        assert_eq!(rows_per_statement(POSTGRES_BIND_LIMIT, 0), 65_535);
        assert_eq!(rows_per_statement(10, 100), 1);
    }

    #[test]
    fn test_catalog_conversions() {
        assert_eq!(catalog_u32(Some(255)), Some(255));
        assert_eq!(catalog_u32(Some(4_294_967_296)), None);
        assert_eq!(catalog_u32(Some(-1)), None);
        assert_eq!(catalog_u8(Some(38)), Some(38));
        assert_eq!(catalog_u8(Some(1000)), None);
        assert!(is_nullable_flag("YES"));
        assert!(!is_nullable_flag("NO"));
    }
}
