//! Tests for raw value coercion against destination column types.

use super::*;
use serde_json::json;

fn text(value: &str) -> RawValue {
    RawValue::Text(value.to_string())
}

const INT32: UnifiedDataType = UnifiedDataType::Integer {
    bits: 32,
    signed: true,
};

// =============================================================================
// Null handling
// =============================================================================

#[test]
fn test_null_and_empty_text() {
    assert_eq!(coerce(&RawValue::Null, &INT32).unwrap(), SqlValue::Null);
    assert_eq!(coerce(&text(""), &INT32).unwrap(), SqlValue::Null);
    assert_eq!(coerce(&text("   "), &UnifiedDataType::Date).unwrap(), SqlValue::Null);

    // Empty strings survive for text columns
    let string = UnifiedDataType::String { max_length: None };
    assert_eq!(
        coerce(&text(""), &string).unwrap(),
        SqlValue::Text(String::new())
    );
    assert_eq!(coerce(&RawValue::Null, &string).unwrap(), SqlValue::Null);
}

// =============================================================================
// Numeric types
// =============================================================================

#[test]
fn test_integer_coercion() {
    assert_eq!(coerce(&RawValue::Integer(7), &INT32).unwrap(), SqlValue::Int(7));
    assert_eq!(coerce(&RawValue::Float(3.0), &INT32).unwrap(), SqlValue::Int(3));
    assert_eq!(coerce(&text("-15"), &INT32).unwrap(), SqlValue::Int(-15));
    assert_eq!(coerce(&text("2.0"), &INT32).unwrap(), SqlValue::Int(2));
    assert_eq!(coerce(&RawValue::Bool(true), &INT32).unwrap(), SqlValue::Int(1));

    assert!(coerce(&RawValue::Float(3.5), &INT32).is_err());
    assert!(coerce(&text("12abc"), &INT32).is_err());
    assert!(coerce(&RawValue::Json(json!([1])), &INT32).is_err());
}

#[test]
fn test_integer_range_checks() {
    let small = UnifiedDataType::Integer {
        bits: 16,
        signed: true,
    };
    assert!(coerce(&RawValue::Integer(32_767), &small).is_ok());
    assert!(coerce(&RawValue::Integer(32_768), &small).is_err());
    assert!(coerce(&RawValue::Integer(-32_768), &small).is_ok());
    assert!(coerce(&RawValue::Integer(-32_769), &small).is_err());

    let unsigned = UnifiedDataType::Integer {
        bits: 8,
        signed: false,
    };
    assert!(coerce(&RawValue::Integer(255), &unsigned).is_ok());
    assert!(coerce(&RawValue::Integer(256), &unsigned).is_err());
    assert!(coerce(&RawValue::Integer(-1), &unsigned).is_err());

    let big = UnifiedDataType::Integer {
        bits: 64,
        signed: true,
    };
    assert_eq!(
        coerce(&RawValue::Integer(i64::MIN), &big).unwrap(),
        SqlValue::Int(i64::MIN)
    );
}

#[test]
fn test_float_and_decimal_coercion() {
    let float = UnifiedDataType::Float {
        precision: Some(53),
    };
    assert_eq!(coerce(&RawValue::Integer(2), &float).unwrap(), SqlValue::Float(2.0));
    assert_eq!(coerce(&text("1.25"), &float).unwrap(), SqlValue::Float(1.25));
    assert!(coerce(&text("one"), &float).is_err());

    let decimal = UnifiedDataType::Decimal {
        precision: Some(10),
        scale: Some(2),
    };
    assert_eq!(
        coerce(&text(" 19.99 "), &decimal).unwrap(),
        SqlValue::Decimal("19.99".to_string())
    );
    assert_eq!(
        coerce(&RawValue::Float(0.5), &decimal).unwrap(),
        SqlValue::Decimal("0.5".to_string())
    );
    assert_eq!(
        coerce(&RawValue::Integer(100), &decimal).unwrap(),
        SqlValue::Decimal("100".to_string())
    );
    assert!(coerce(&text("19,99"), &decimal).is_err());
    assert!(coerce(&RawValue::Float(f64::NAN), &decimal).is_err());
}

// =============================================================================
// Booleans
// =============================================================================

#[test]
fn test_boolean_spellings() {
    for yes in ["true", "TRUE", "yes", "Y", "t", "1"] {
        assert_eq!(
            coerce(&text(yes), &UnifiedDataType::Boolean).unwrap(),
            SqlValue::Bool(true),
            "{yes}"
        );
    }
    for no in ["false", "No", "n", "F", "0"] {
        assert_eq!(
            coerce(&text(no), &UnifiedDataType::Boolean).unwrap(),
            SqlValue::Bool(false),
            "{no}"
        );
    }
    assert_eq!(
        coerce(&RawValue::Integer(1), &UnifiedDataType::Boolean).unwrap(),
        SqlValue::Bool(true)
    );
    assert!(coerce(&text("maybe"), &UnifiedDataType::Boolean).is_err());
    assert!(coerce(&RawValue::Integer(2), &UnifiedDataType::Boolean).is_err());
}

// =============================================================================
// Temporal types
// =============================================================================

#[test]
fn test_date_formats() {
    let expected = SqlValue::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    for value in ["2024-03-09", "2024/03/09", "09.03.2024", "2024-03-09 00:00:00"] {
        assert_eq!(
            coerce(&text(value), &UnifiedDataType::Date).unwrap(),
            expected,
            "{value}"
        );
    }
    assert!(coerce(&text("2024-13-01"), &UnifiedDataType::Date).is_err());
    assert!(coerce(&RawValue::Integer(20240309), &UnifiedDataType::Date).is_err());
}

#[test]
fn test_datetime_with_and_without_timezone() {
    let naive = NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();
    let plain = UnifiedDataType::DateTime {
        with_timezone: false,
    };
    let zoned = UnifiedDataType::DateTime {
        with_timezone: true,
    };

    assert_eq!(
        coerce(&text("2024-03-09T10:30:00"), &plain).unwrap(),
        SqlValue::DateTime(naive)
    );
    assert_eq!(
        coerce(&text("2024-03-09 10:30"), &plain).unwrap(),
        SqlValue::DateTime(naive)
    );
    assert_eq!(
        coerce(&RawValue::DateTime(naive), &zoned).unwrap(),
        SqlValue::DateTimeUtc(naive.and_utc())
    );
    // Offsets are normalised to UTC for zoned columns
    assert_eq!(
        coerce(&text("2024-03-09T12:30:00+02:00"), &zoned).unwrap(),
        SqlValue::DateTimeUtc(naive.and_utc())
    );
    // and dropped for plain ones, keeping the wall clock
    assert_eq!(
        coerce(&text("2024-03-09T10:30:00+02:00"), &plain).unwrap(),
        SqlValue::DateTime(naive)
    );
    assert!(coerce(&text("yesterday"), &plain).is_err());
}

#[test]
fn test_spreadsheet_serials() {
    let plain = UnifiedDataType::DateTime {
        with_timezone: false,
    };
    let zoned = UnifiedDataType::DateTime {
        with_timezone: true,
    };
    let time = UnifiedDataType::Time {
        with_timezone: false,
    };
    let naive = NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();

    assert_eq!(
        coerce(&RawValue::Float(45360.4375), &plain).unwrap(),
        SqlValue::DateTime(naive)
    );
    assert_eq!(
        coerce(&RawValue::Float(45360.4375), &zoned).unwrap(),
        SqlValue::DateTimeUtc(naive.and_utc())
    );
    assert_eq!(
        coerce(&RawValue::Float(45360.4375), &UnifiedDataType::Date).unwrap(),
        SqlValue::Date(naive.date())
    );
    assert_eq!(
        coerce(&RawValue::Integer(45360), &UnifiedDataType::Date).unwrap(),
        SqlValue::Date(naive.date())
    );
    // time-only cells carry just the fraction
    assert_eq!(
        coerce(&RawValue::Float(0.4375), &time).unwrap(),
        SqlValue::Time(naive.time())
    );
    assert_eq!(
        coerce(&RawValue::Float(0.0), &UnifiedDataType::Date).unwrap(),
        SqlValue::Date(NaiveDate::from_ymd_opt(1899, 12, 30).unwrap())
    );

    assert!(coerce(&RawValue::Float(-1.0), &UnifiedDataType::Date).is_err());
    assert!(coerce(&RawValue::Float(f64::NAN), &plain).is_err());
    assert!(coerce(&RawValue::Float(3.0e6), &plain).is_err());
}

#[test]
fn test_time_formats() {
    let time = UnifiedDataType::Time {
        with_timezone: false,
    };
    assert_eq!(
        coerce(&text("08:15"), &time).unwrap(),
        SqlValue::Time(NaiveTime::from_hms_opt(8, 15, 0).unwrap())
    );
    assert_eq!(
        coerce(&text("08:15:30.5"), &time).unwrap(),
        SqlValue::Time(NaiveTime::from_hms_milli_opt(8, 15, 30, 500).unwrap())
    );
    assert!(coerce(&text("25:00"), &time).is_err());
}

// =============================================================================
// Structured and text types
// =============================================================================

#[test]
fn test_json_passthrough_and_parse() {
    assert_eq!(
        coerce(&RawValue::Json(json!({"a": 1})), &UnifiedDataType::Json).unwrap(),
        SqlValue::Json(json!({"a": 1}))
    );
    assert_eq!(
        coerce(&text("[1, 2]"), &UnifiedDataType::Json).unwrap(),
        SqlValue::Json(json!([1, 2]))
    );
    assert_eq!(
        coerce(&RawValue::Integer(5), &UnifiedDataType::Json).unwrap(),
        SqlValue::Json(json!(5))
    );
    assert!(coerce(&text("{not json"), &UnifiedDataType::Json).is_err());
}

#[test]
fn test_uuid_and_binary() {
    let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
    assert_eq!(
        coerce(&text(id), &UnifiedDataType::Uuid).unwrap(),
        SqlValue::Uuid(uuid::Uuid::parse_str(id).unwrap())
    );
    assert!(coerce(&text("not-a-uuid"), &UnifiedDataType::Uuid).is_err());

    let binary = UnifiedDataType::Binary {
        max_length: Some(4),
    };
    assert_eq!(
        coerce(&text("abcd"), &binary).unwrap(),
        SqlValue::Bytes(b"abcd".to_vec())
    );
    assert!(coerce(&text("abcde"), &binary).is_err());
    assert!(coerce(&RawValue::Integer(1), &binary).is_err());
}

#[test]
fn test_string_length_and_rendering() {
    let short = UnifiedDataType::String {
        max_length: Some(3),
    };
    assert_eq!(
        coerce(&RawValue::Integer(123), &short).unwrap(),
        SqlValue::Text("123".to_string())
    );
    // Limits count characters, not bytes
    assert!(coerce(&text("äöü"), &short).is_ok());
    let error = coerce(&text("abcd"), &short).unwrap_err();
    assert!(error.reason.contains("limit of 3"));
    assert_eq!(error.expected, "text(3)");

    assert_eq!(
        coerce(&RawValue::Bool(false), &UnifiedDataType::String { max_length: None }).unwrap(),
        SqlValue::Text("false".to_string())
    );
}

#[test]
fn test_custom_types_load_as_text() {
    let custom = UnifiedDataType::Custom {
        type_name: "inet".to_string(),
    };
    assert_eq!(
        coerce(&text("10.0.0.1"), &custom).unwrap(),
        SqlValue::Text("10.0.0.1".to_string())
    );
}

#[test]
fn test_error_truncates_long_values() {
    let long = "x".repeat(500);
    let error = coerce(&text(&long), &INT32).unwrap_err();
    assert!(error.value.len() < 100);
    assert!(error.value.ends_with("..."));
}
