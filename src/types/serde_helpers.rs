//! Custom serde deserializers for flexible type handling
//!
//! LinguaLeo's API is not consistent about scalar types across revisions:
//! identifiers and counters arrive as numbers or as numeric strings, flags
//! as booleans or as 0/1. These deserializers absorb that variance at the
//! boundary so the rest of the crate works with plain Rust types.

use serde::{Deserialize, Deserializer, de};

/// Deserialize a flexible boolean value that can be:
/// - JSON boolean: `true`, `false`
/// - Integer: `0` (false), any positive integer (true)
/// - String: `"0"`, `"1"`, `"false"`, `"true"` (case-insensitive)
///
/// Strings like "yes"/"no" and empty strings are rejected to keep the
/// accepted grammar explicit.
pub fn deserialize_flexible_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleBool {
        Bool(bool),
        Int(i64),
        String(String),
    }

    let value: Option<FlexibleBool> = Option::deserialize(deserializer)?;

    match value {
        None => Ok(None),
        Some(FlexibleBool::Bool(b)) => Ok(Some(b)),
        Some(FlexibleBool::Int(i)) => Ok(Some(i > 0)),
        Some(FlexibleBool::String(s)) => {
            let s_lower = s.trim().to_lowercase();
            match s_lower.as_str() {
                "true" | "1" => Ok(Some(true)),
                "false" | "0" => Ok(Some(false)),
                _ => Err(de::Error::custom(format!("invalid boolean string: {}", s))),
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlexibleNumber {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    String(String),
}

/// Deserialize an optional unsigned identifier that may arrive as a number
/// or as a numeric string. Empty strings and null count as absent.
pub fn deserialize_flexible_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<FlexibleNumber> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(number) => flexible_to_u64::<D>(number),
    }
}

/// Deserialize a required unsigned identifier, number or numeric string.
pub fn deserialize_required_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = FlexibleNumber::deserialize(deserializer)?;
    flexible_to_u64::<D>(number)?
        .ok_or_else(|| de::Error::custom("missing numeric identifier"))
}

fn flexible_to_u64<'de, D>(number: FlexibleNumber) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match number {
        FlexibleNumber::Unsigned(n) => Ok(Some(n)),
        FlexibleNumber::Signed(i) if i >= 0 => Ok(Some(i as u64)),
        FlexibleNumber::Signed(i) => Err(de::Error::custom(format!(
            "negative value for unsigned field: {}",
            i
        ))),
        FlexibleNumber::Float(f) if f >= 0.0 && f.fract() == 0.0 => Ok(Some(f as u64)),
        FlexibleNumber::Float(f) => Err(de::Error::custom(format!(
            "non-integral value for unsigned field: {}",
            f
        ))),
        FlexibleNumber::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<u64>()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("invalid numeric string: {}", s)))
        }
    }
}

/// Deserialize an optional signed integer (progress percent, status codes)
/// that may arrive as an integer, a float or a numeric string.
pub fn deserialize_flexible_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<FlexibleNumber> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(FlexibleNumber::Unsigned(n)) => Ok(Some(n as i64)),
        Some(FlexibleNumber::Signed(i)) => Ok(Some(i)),
        Some(FlexibleNumber::Float(f)) => Ok(Some(f as i64)),
        Some(FlexibleNumber::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(|f| Some(f as i64))
                .map_err(|_| de::Error::custom(format!("invalid numeric string: {}", s)))
        }
    }
}

/// Deserialize an optional string that may arrive as a number.
pub fn deserialize_flexible_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleString {
        String(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
    }

    let value: Option<FlexibleString> = Option::deserialize(deserializer)?;
    Ok(match value {
        None => None,
        Some(FlexibleString::String(s)) => Some(s),
        Some(FlexibleString::Unsigned(n)) => Some(n.to_string()),
        Some(FlexibleString::Signed(i)) => Some(i.to_string()),
        Some(FlexibleString::Float(f)) => Some(f.to_string()),
    })
}
