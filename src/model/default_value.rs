//! Typed interpretation of column default values
//!
//! Model files carry defaults as raw strings. Comparing two defaults must be
//! done on the typed value (`1.50` and `1.5` are the same NUMERIC default),
//! so the raw string is parsed according to the column's type code.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use super::TypeCode;

static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([+-]?)(\d*)(?:\.(\d*))?$").unwrap());

static FUNCTION_CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][\w.]*\s*\(.*\)$").unwrap());

/// A default value parsed according to its column's type
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Boolean(bool),
    Integer(i64),
    /// Canonical decimal text: no leading zeros, no trailing fraction zeros
    Decimal(String),
    Float(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    /// Text defaults and anything that did not parse as the column's type
    /// (for example `getdate()`)
    Text(String),
}

/// Parse a raw default for the given type code.
///
/// Returns `None` when there is no default. Values that do not parse as the
/// column type are kept verbatim as [`DefaultValue::Text`].
pub fn parse_default_value(raw: Option<&str>, type_code: TypeCode) -> Option<DefaultValue> {
    let raw = raw?;
    if raw.is_empty() {
        return if type_code.is_numeric() || type_code.is_date_time() {
            None
        } else {
            Some(DefaultValue::Text(String::new()))
        };
    }

    let value = strip_parens(raw.trim());
    let parsed = if type_code.is_boolean_like() {
        parse_boolean(value).map(DefaultValue::Boolean)
    } else if type_code.is_integral() {
        value.parse::<i64>().ok().map(DefaultValue::Integer)
    } else if matches!(type_code, TypeCode::Numeric | TypeCode::Decimal) {
        canonical_decimal(value).map(DefaultValue::Decimal)
    } else if matches!(
        type_code,
        TypeCode::Real | TypeCode::Float | TypeCode::Double
    ) {
        value.parse::<f64>().ok().map(DefaultValue::Float)
    } else if type_code == TypeCode::Date {
        NaiveDate::parse_from_str(unquote(value), "%Y-%m-%d")
            .ok()
            .map(DefaultValue::Date)
    } else if matches!(type_code, TypeCode::Time | TypeCode::TimeTz) {
        NaiveTime::parse_from_str(unquote(value), "%H:%M:%S%.f")
            .ok()
            .map(DefaultValue::Time)
    } else if type_code.is_date_time() {
        parse_timestamp(unquote(value)).map(DefaultValue::Timestamp)
    } else {
        None
    };

    Some(parsed.unwrap_or_else(|| DefaultValue::Text(raw.to_string())))
}

/// Whether a raw default may be written for a column of the given type.
///
/// An empty default is only meaningful for character-like columns.
pub fn is_valid_default_value(raw: Option<&str>, type_code: TypeCode) -> bool {
    match raw {
        None => false,
        Some(raw) => !raw.is_empty() || (!type_code.is_numeric() && !type_code.is_date_time()),
    }
}

/// Convert a BIT/BOOLEAN default to the SMALLINT form ASE stores it as.
pub fn convert_boolean_default(raw: &str) -> String {
    match parse_boolean(strip_parens(raw.trim())) {
        Some(true) => "1".to_string(),
        Some(false) => "0".to_string(),
        None => raw.to_string(),
    }
}

/// True when the default is a function call such as `getdate()`
pub fn is_function_call(raw: &str) -> bool {
    FUNCTION_CALL_RE.is_match(raw.trim())
}

fn parse_boolean(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn canonical_decimal(value: &str) -> Option<String> {
    let caps = DECIMAL_RE.captures(value)?;
    let sign = caps.get(1).map_or("", |m| m.as_str());
    let int_part = caps.get(2).map_or("", |m| m.as_str()).trim_start_matches('0');
    let frac_part = caps.get(3).map_or("", |m| m.as_str()).trim_end_matches('0');

    if caps.get(2).map_or(true, |m| m.as_str().is_empty())
        && caps.get(3).map_or(true, |m| m.as_str().is_empty())
    {
        return None;
    }

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let mut result = String::new();
    if sign == "-" && (int_part != "0" || !frac_part.is_empty()) {
        result.push('-');
    }
    result.push_str(int_part);
    if !frac_part.is_empty() {
        result.push('.');
        result.push_str(frac_part);
    }
    Some(result)
}

/// Strip redundant outer parentheses, as in `((0))`
fn strip_parens(mut value: &str) -> &str {
    while value.len() >= 2 && value.starts_with('(') && value.ends_with(')') {
        value = value[1..value.len() - 1].trim();
    }
    value
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
