//! Lenient readers for values that come back from the certificate backend.
//!
//! The backend serializes the same field in different shapes depending on the
//! entity and the serializer in use: decimals can be plain numbers, numeric
//! strings or wrapper objects (`{"value": ..}`, `{"$numberDecimal": ..}`), and
//! flags can be booleans, `0`/`1` or `"true"`/`"false"`. Everything is parsed
//! once here, every reader returns `None` for absent or unusable input and the
//! caller decides the default.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Keys under which a decimal wrapper object stores its number.
const DECIMAL_WRAPPER_KEYS: [&str; 2] = ["value", "$numberDecimal"];

pub(crate) trait LooseValue {
    fn as_loose_number(&self) -> Option<f64>;

    fn as_loose_flag(&self) -> Option<bool>;

    fn as_loose_text(&self) -> Option<String>;
}

impl LooseValue for Value {
    fn as_loose_number(&self) -> Option<f64> {
        match self {
            Value::Number(number) => number.as_f64().filter(|n| n.is_finite()),
            Value::String(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                text.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            Value::Object(map) => DECIMAL_WRAPPER_KEYS
                .iter()
                .find_map(|key| map.get(*key))
                .and_then(|inner| inner.as_loose_number()),
            _ => None,
        }
    }

    fn as_loose_flag(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            Value::Number(number) => match number.as_f64() {
                Some(n) if n == 1.0 => Some(true),
                Some(n) if n == 0.0 => Some(false),
                _ => None,
            },
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "activo" => Some(true),
                "0" | "false" | "inactivo" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    fn as_loose_text(&self) -> Option<String> {
        match self {
            Value::String(text) => Some(text.to_owned()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }
}

/// Extract a finite number from a number, a numeric string or a decimal wrapper.
pub fn number(obj: Option<&Value>) -> Option<f64> {
    obj.and_then(LooseValue::as_loose_number)
}

/// Like [`number`] but only accepts integral values.
pub fn integer(obj: Option<&Value>) -> Option<i64> {
    number(obj)
        .filter(|n| n.fract() == 0.0)
        .filter(|n| *n >= i64::MIN as f64 && *n <= i64::MAX as f64)
        .map(|n| n as i64)
}

/// `true`/`false`, `1`/`0`, `"1"`/`"0"`, `"true"`/`"false"` and the
/// `"activo"`/`"inactivo"` state names. Anything else is `None`.
pub fn flag(obj: Option<&Value>) -> Option<bool> {
    obj.and_then(LooseValue::as_loose_flag)
}

pub fn text(obj: Option<&Value>) -> Option<String> {
    obj.and_then(LooseValue::as_loose_text)
}

/// ISO-8601 timestamps with or without offset, plain dates, or epoch milliseconds.
pub fn datetime(obj: Option<&Value>) -> Option<DateTime<Utc>> {
    match obj? {
        Value::String(text) => parse_datetime(text.trim()),
        Value::Number(number) => number
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

/// Binary payloads arrive either as a base64 string or as an array of byte values.
pub fn bytes(obj: Option<&Value>) -> Option<Vec<u8>> {
    match obj? {
        Value::String(encoded) => match base64::decode(encoded.trim()) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                log::warn!("Binary field is not valid base64. Err: {}", err);
                None
            }
        },
        Value::Array(list) => {
            let mut result = Vec::with_capacity(list.len());
            for item in list {
                match item.as_i64() {
                    // Signed bytes keep their two's complement representation.
                    Some(byte) if (-128..=255).contains(&byte) => result.push(byte as u8),
                    _ => {
                        log::warn!("Binary field contains a non byte value: {}", item);
                        return None;
                    }
                }
            }
            Some(result)
        }
        _ => None,
    }
}

fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if text.is_empty() {
        return None;
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
