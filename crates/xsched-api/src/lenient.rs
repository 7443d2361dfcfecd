//! Forgiving field decoders for scheduler payloads.
//!
//! The scheduler stringifies almost everything but not consistently:
//! the same field can arrive as `"42"`, `42`, `""` or be missing. These
//! helpers plug into `#[serde(deserialize_with = ...)]` and never fail on
//! shape, only collapse to a neutral value.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Render a scalar as text. Null, arrays and objects become `""`.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Interpret a scalar as a boolean flag. Strings match `"true"` ignoring case.
pub fn flag_of(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    }
}

/// Interpret a scalar as a signed integer, defaulting to 0.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub fn int_of(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or_default()
        }
        _ => 0,
    }
}

pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_of(&Value::deserialize(deserializer)?))
}

/// Like [`string`] but empty text becomes `None`.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = text_of(&Value::deserialize(deserializer)?);
    Ok((!text.is_empty()).then_some(text))
}

pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(flag_of(&Value::deserialize(deserializer)?))
}

/// Non-negative integer; negatives clamp to 0.
pub fn uint<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(u64::try_from(int_of(&Value::deserialize(deserializer)?)).unwrap_or_default())
}
