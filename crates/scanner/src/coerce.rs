//! Loose conversions applied to native payloads and to arguments arriving through `dispatch`.

use serde_json::Value;

/// `payload == 1` under loose equality: `true`, `1`, `1.0` and `"1"` are true.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn loosely_one(payload: &Value) -> bool {
    match payload {
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(text) => text.trim().parse::<f64>() == Ok(1.0),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

/// Truthiness of an argument: `null`, `false`, `0`, `NaN` and `""` are false.
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Success payloads that carry nothing become `true`, so a success always has a result.
#[must_use]
pub fn non_empty(payload: Value) -> Value {
    match payload {
        Value::Null => Value::Bool(true),
        Value::String(text) if text.is_empty() => Value::Bool(true),
        other => other,
    }
}

/// Text form used when an argument is spliced into an action string.
pub(crate) fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Reads an integer argument; integral floats and numeric strings are accepted.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64().filter(|f| f.fract() == 0.0 && f.is_finite()).map(|f| f as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
