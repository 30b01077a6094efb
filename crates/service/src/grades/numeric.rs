//! Lenient number parsing for request payloads.
//!
//! Clients send scores and ids either as JSON numbers or as numeric strings
//! (`"7.5"`, `"12"`); both are accepted.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreRepr {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Int(u64),
    Text(String),
}

/// A finite score from a number or numeric string.
pub fn score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match ScoreRepr::deserialize(deserializer)? {
        ScoreRepr::Number(n) => n,
        ScoreRepr::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("value `{s}` is not a number")))?,
    };
    if !value.is_finite() {
        return Err(de::Error::custom("value must be a finite number"));
    }
    Ok(value)
}

/// An optional record id. `null`, a missing field and `""` all mean "no id".
pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IdRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IdRepr::Int(n)) => Ok(Some(n)),
        Some(IdRepr::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(IdRepr::Text(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("id `{s}` is not an integer"))),
    }
}
