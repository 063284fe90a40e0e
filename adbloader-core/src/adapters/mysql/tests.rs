//! Unit tests for the MySQL destination.

use super::connection::connect_options;
use super::*;
use crate::adapters::{ConnectionConfig, SessionLocale};
use crate::models::UnifiedDataType;
use crate::security::Credentials;

#[test]
fn test_connect_options_apply_credentials_and_charset() {
    let locale: SessionLocale = "GERMAN_GERMANY.WE8ISO8859P1".parse().unwrap();
    let config = ConnectionConfig::new("mysql://db.internal:3307/warehouse").with_locale(locale);
    let credentials = Credentials::new("loader", "s3cret");

    let options = connect_options(&config, &credentials).unwrap();
    assert_eq!(options.get_host(), "db.internal");
    assert_eq!(options.get_port(), 3307);
    assert_eq!(options.get_username(), "loader");
    assert_eq!(options.get_database(), Some("warehouse"));
    assert_eq!(options.get_charset(), "latin1");
}

#[test]
fn test_connect_options_accept_mariadb_scheme() {
    let config = ConnectionConfig::new("mariadb://db/warehouse");
    let options = connect_options(&config, &Credentials::new("u", "p")).unwrap();
    assert_eq!(options.get_host(), "db");
    assert_eq!(options.get_charset(), "utf8mb4");
}

#[test]
fn test_map_mysql_type_integers_and_booleans() {
    assert_eq!(
        map_mysql_type("tinyint", "tinyint(1)", None, Some(3), Some(0)),
        UnifiedDataType::Boolean
    );
    assert_eq!(
        map_mysql_type("tinyint", "tinyint(4)", None, Some(3), Some(0)),
        UnifiedDataType::Integer {
            bits: 8,
            signed: true
        }
    );
    assert_eq!(
        map_mysql_type("bigint", "bigint(20) unsigned", None, Some(20), Some(0)),
        UnifiedDataType::Integer {
            bits: 64,
            signed: false
        }
    );
    assert_eq!(
        map_mysql_type("bit", "bit(1)", None, Some(1), None),
        UnifiedDataType::Boolean
    );
}

#[test]
fn test_map_mysql_type_other_families() {
    assert_eq!(
        map_mysql_type("varchar", "varchar(64)", Some(64), None, None),
        UnifiedDataType::String {
            max_length: Some(64)
        }
    );
    assert_eq!(
        map_mysql_type("decimal", "decimal(12,2)", None, Some(12), Some(2)),
        UnifiedDataType::Decimal {
            precision: Some(12),
            scale: Some(2)
        }
    );
    assert_eq!(
        map_mysql_type("timestamp", "timestamp", None, None, None),
        UnifiedDataType::DateTime {
            with_timezone: true
        }
    );
    assert_eq!(
        map_mysql_type("enum", "enum('a','b')", None, None, None),
        UnifiedDataType::Custom {
            type_name: "enum('a','b')".to_string()
        }
    );
}
