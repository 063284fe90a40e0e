//! Conversion of raw source values into typed SQL values.
//!
//! The destination column's [`UnifiedDataType`] is the only authority for
//! how a value is converted. Nothing is inferred from the source file.
//!
//! Empty text is treated as NULL for every type except strings, where an
//! empty string is a legitimate value.

use crate::models::{RawValue, UnifiedDataType};
use crate::validation::is_decimal_literal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use thiserror::Error;

/// A value ready to be bound into an INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Exact numeric kept as validated text
    Decimal(String),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    DateTimeUtc(DateTime<Utc>),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Uuid(uuid::Uuid),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// A raw value that cannot be represented in the destination column type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("value '{value}' cannot be loaded as {expected}: {reason}")]
pub struct CoercionError {
    /// Source value, truncated for display
    pub value: String,
    /// Destination type description
    pub expected: String,
    pub reason: String,
}

impl CoercionError {
    fn new(raw: &RawValue, target: &UnifiedDataType, reason: impl Into<String>) -> Self {
        const MAX_SHOWN: usize = 64;
        let mut value = raw.to_string();
        if value.chars().count() > MAX_SHOWN {
            value = value.chars().take(MAX_SHOWN).collect::<String>() + "...";
        }
        Self {
            value,
            expected: target.to_string(),
            reason: reason.into(),
        }
    }
}

type Coerced = std::result::Result<SqlValue, CoercionError>;

/// Converts one raw value according to the destination column type.
///
/// # Example
/// ```rust
/// use adbloader_core::coercion::{SqlValue, coerce};
/// use adbloader_core::models::{RawValue, UnifiedDataType};
///
/// let int = UnifiedDataType::Integer { bits: 32, signed: true };
/// assert_eq!(coerce(&RawValue::Text(" 42 ".into()), &int).unwrap(), SqlValue::Int(42));
/// assert_eq!(coerce(&RawValue::Null, &int).unwrap(), SqlValue::Null);
/// assert!(coerce(&RawValue::Text("abc".into()), &int).is_err());
/// ```
pub fn coerce(raw: &RawValue, target: &UnifiedDataType) -> Coerced {
    if matches!(raw, RawValue::Null) {
        return Ok(SqlValue::Null);
    }
    if let RawValue::Text(text) = raw
        && text.trim().is_empty()
        && !matches!(target, UnifiedDataType::String { .. })
    {
        return Ok(SqlValue::Null);
    }

    match target {
        UnifiedDataType::Integer { bits, signed } => coerce_integer(raw, target, *bits, *signed),
        UnifiedDataType::Float { .. } => coerce_float(raw, target),
        UnifiedDataType::Decimal { .. } => coerce_decimal(raw, target),
        UnifiedDataType::Boolean => coerce_bool(raw, target),
        UnifiedDataType::Date => coerce_date(raw, target),
        UnifiedDataType::Time { .. } => coerce_time(raw, target),
        UnifiedDataType::DateTime { with_timezone } => coerce_datetime(raw, target, *with_timezone),
        UnifiedDataType::Binary { max_length } => coerce_binary(raw, target, *max_length),
        UnifiedDataType::Json => coerce_json(raw, target),
        UnifiedDataType::Uuid => coerce_uuid(raw, target),
        UnifiedDataType::String { max_length } => coerce_string(raw, target, *max_length),
        UnifiedDataType::Custom { .. } => Ok(SqlValue::Text(raw.to_string())),
    }
}

fn integer_bounds(bits: u8, signed: bool) -> (i128, i128) {
    let bits = u32::from(bits.clamp(1, 64));
    if signed {
        (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
    } else {
        // Unsigned 64-bit values above i64::MAX cannot be bound
        (0, ((1i128 << bits) - 1).min(i128::from(i64::MAX)))
    }
}

fn float_to_integer(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.2e18 {
        Some(value as i64)
    } else {
        None
    }
}

fn coerce_integer(raw: &RawValue, target: &UnifiedDataType, bits: u8, signed: bool) -> Coerced {
    let value = match raw {
        RawValue::Integer(v) => *v,
        RawValue::Bool(v) => i64::from(*v),
        RawValue::Float(v) => float_to_integer(*v)
            .ok_or_else(|| CoercionError::new(raw, target, "not a whole number"))?,
        RawValue::Text(text) => {
            let text = text.trim();
            match text.parse::<i64>() {
                Ok(v) => v,
                Err(_) => text
                    .parse::<f64>()
                    .ok()
                    .and_then(float_to_integer)
                    .ok_or_else(|| CoercionError::new(raw, target, "not an integer"))?,
            }
        }
        _ => {
            return Err(CoercionError::new(
                raw,
                target,
                format!("{} values are not integers", raw.kind()),
            ));
        }
    };

    let (min, max) = integer_bounds(bits, signed);
    if i128::from(value) < min || i128::from(value) > max {
        return Err(CoercionError::new(
            raw,
            target,
            format!("out of range [{}, {}]", min, max),
        ));
    }
    Ok(SqlValue::Int(value))
}

fn coerce_float(raw: &RawValue, target: &UnifiedDataType) -> Coerced {
    match raw {
        RawValue::Float(v) => Ok(SqlValue::Float(*v)),
        RawValue::Integer(v) => Ok(SqlValue::Float(*v as f64)),
        RawValue::Text(text) => text
            .trim()
            .parse::<f64>()
            .map(SqlValue::Float)
            .map_err(|_| CoercionError::new(raw, target, "not a number")),
        _ => Err(CoercionError::new(
            raw,
            target,
            format!("{} values are not numbers", raw.kind()),
        )),
    }
}

fn coerce_decimal(raw: &RawValue, target: &UnifiedDataType) -> Coerced {
    match raw {
        RawValue::Integer(v) => Ok(SqlValue::Decimal(v.to_string())),
        RawValue::Float(v) if v.is_finite() => Ok(SqlValue::Decimal(v.to_string())),
        RawValue::Float(_) => Err(CoercionError::new(raw, target, "not a finite number")),
        RawValue::Text(text) => {
            let text = text.trim();
            if is_decimal_literal(text) {
                Ok(SqlValue::Decimal(text.to_string()))
            } else {
                Err(CoercionError::new(raw, target, "not a decimal number"))
            }
        }
        _ => Err(CoercionError::new(
            raw,
            target,
            format!("{} values are not numbers", raw.kind()),
        )),
    }
}

fn coerce_bool(raw: &RawValue, target: &UnifiedDataType) -> Coerced {
    let value = match raw {
        RawValue::Bool(v) => Some(*v),
        RawValue::Integer(0) => Some(false),
        RawValue::Integer(1) => Some(true),
        RawValue::Float(v) if *v == 0.0 => Some(false),
        RawValue::Float(v) if *v == 1.0 => Some(true),
        RawValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "t" | "1" => Some(true),
            "false" | "no" | "n" | "f" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    };
    value
        .map(SqlValue::Bool)
        .ok_or_else(|| CoercionError::new(raw, target, "not a boolean"))
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn parse_offset_datetime(text: &str) -> Option<DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(text).ok().or_else(|| {
        OFFSET_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
    })
}

fn parse_naive_datetime(text: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| parse_date(text).map(|d| d.and_time(NaiveTime::MIN)))
}

/// Largest spreadsheet serial, 9999-12-31.
const MAX_SERIAL: f64 = 2_958_466.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Converts a spreadsheet day serial (epoch 1899-12-30, fraction = time of day).
fn serial_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..MAX_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    // bounded by MAX_SERIAL, fits in i64
    let millis = (serial * MILLIS_PER_DAY).round() as i64;
    epoch.checked_add_signed(chrono::TimeDelta::try_milliseconds(millis)?)
}

fn numeric_serial(raw: &RawValue) -> Option<NaiveDateTime> {
    match raw {
        RawValue::Float(v) => serial_datetime(*v),
        RawValue::Integer(v) => serial_datetime(*v as f64),
        _ => None,
    }
}

fn coerce_date(raw: &RawValue, target: &UnifiedDataType) -> Coerced {
    match raw {
        RawValue::DateTime(v) => Ok(SqlValue::Date(v.date())),
        RawValue::Float(_) | RawValue::Integer(_) => numeric_serial(raw)
            .map(|v| SqlValue::Date(v.date()))
            .ok_or_else(|| CoercionError::new(raw, target, "not a spreadsheet date serial")),
        RawValue::Text(text) => {
            let text = text.trim();
            parse_date(text)
                .or_else(|| parse_naive_datetime(text).map(|v| v.date()))
                .or_else(|| parse_offset_datetime(text).map(|v| v.date_naive()))
                .map(SqlValue::Date)
                .ok_or_else(|| CoercionError::new(raw, target, "not a date"))
        }
        _ => Err(CoercionError::new(
            raw,
            target,
            format!("{} values are not dates", raw.kind()),
        )),
    }
}

fn coerce_time(raw: &RawValue, target: &UnifiedDataType) -> Coerced {
    match raw {
        RawValue::DateTime(v) => Ok(SqlValue::Time(v.time())),
        RawValue::Float(_) | RawValue::Integer(_) => numeric_serial(raw)
            .map(|v| SqlValue::Time(v.time()))
            .ok_or_else(|| CoercionError::new(raw, target, "not a spreadsheet time serial")),
        RawValue::Text(text) => {
            let text = text.trim();
            TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
                .or_else(|| parse_naive_datetime(text).map(|v| v.time()))
                .map(SqlValue::Time)
                .ok_or_else(|| CoercionError::new(raw, target, "not a time of day"))
        }
        _ => Err(CoercionError::new(
            raw,
            target,
            format!("{} values are not times", raw.kind()),
        )),
    }
}

fn coerce_datetime(raw: &RawValue, target: &UnifiedDataType, with_timezone: bool) -> Coerced {
    let finish = |naive: NaiveDateTime| {
        if with_timezone {
            SqlValue::DateTimeUtc(naive.and_utc())
        } else {
            SqlValue::DateTime(naive)
        }
    };

    match raw {
        RawValue::DateTime(v) => Ok(finish(*v)),
        RawValue::Float(_) | RawValue::Integer(_) => numeric_serial(raw)
            .map(finish)
            .ok_or_else(|| CoercionError::new(raw, target, "not a spreadsheet date serial")),
        RawValue::Text(text) => {
            let text = text.trim();
            if let Some(parsed) = parse_offset_datetime(text) {
                return Ok(if with_timezone {
                    SqlValue::DateTimeUtc(parsed.with_timezone(&Utc))
                } else {
                    SqlValue::DateTime(parsed.naive_local())
                });
            }
            parse_naive_datetime(text)
                .map(finish)
                .ok_or_else(|| CoercionError::new(raw, target, "not a date/time"))
        }
        _ => Err(CoercionError::new(
            raw,
            target,
            format!("{} values are not date/times", raw.kind()),
        )),
    }
}

fn coerce_binary(raw: &RawValue, target: &UnifiedDataType, max_length: Option<u32>) -> Coerced {
    let RawValue::Text(text) = raw else {
        return Err(CoercionError::new(
            raw,
            target,
            format!("{} values cannot be stored as binary", raw.kind()),
        ));
    };
    if let Some(max) = max_length
        && text.len() > max as usize
    {
        return Err(CoercionError::new(
            raw,
            target,
            format!("{} bytes exceeds the column limit of {}", text.len(), max),
        ));
    }
    Ok(SqlValue::Bytes(text.as_bytes().to_vec()))
}

fn coerce_json(raw: &RawValue, target: &UnifiedDataType) -> Coerced {
    let value = match raw {
        RawValue::Json(v) => v.clone(),
        RawValue::Text(text) => serde_json::from_str(text)
            .map_err(|e| CoercionError::new(raw, target, format!("invalid JSON: {}", e)))?,
        RawValue::Bool(v) => serde_json::Value::Bool(*v),
        RawValue::Integer(v) => serde_json::Value::from(*v),
        RawValue::Float(v) => serde_json::Number::from_f64(*v)
            .map(serde_json::Value::Number)
            .ok_or_else(|| CoercionError::new(raw, target, "not representable in JSON"))?,
        RawValue::DateTime(_) => serde_json::Value::String(raw.to_string()),
        RawValue::Null => serde_json::Value::Null,
    };
    Ok(SqlValue::Json(value))
}

fn coerce_uuid(raw: &RawValue, target: &UnifiedDataType) -> Coerced {
    match raw {
        RawValue::Text(text) => uuid::Uuid::parse_str(text.trim())
            .map(SqlValue::Uuid)
            .map_err(|e| CoercionError::new(raw, target, e.to_string())),
        _ => Err(CoercionError::new(
            raw,
            target,
            format!("{} values are not UUIDs", raw.kind()),
        )),
    }
}

fn coerce_string(raw: &RawValue, target: &UnifiedDataType, max_length: Option<u32>) -> Coerced {
    let text = match raw {
        RawValue::Text(text) => text.clone(),
        other => other.to_string(),
    };
    if let Some(max) = max_length {
        let chars = text.chars().count();
        if chars > max as usize {
            return Err(CoercionError::new(
                raw,
                target,
                format!("{} characters exceeds the column limit of {}", chars, max),
            ));
        }
    }
    Ok(SqlValue::Text(text))
}

#[cfg(test)]
mod tests;
