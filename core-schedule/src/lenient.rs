//! Lenient leaf deserializers.
//!
//! Schedule documents are produced by an old servlet that leaves numeric and
//! boolean leaves empty or fills them with junk. Each helper here accepts any
//! text and falls back to the zero value instead of failing the document:
//!
//! | helper   | accepted                                   | fallback |
//! |----------|--------------------------------------------|----------|
//! | [`int`]  | optional sign and decimal digits, trimmed  | `0`      |
//! | [`flag`] | `1 t T TRUE true True` / `0 f F FALSE ...` | `false`  |
//!
//! Use with `#[serde(default, deserialize_with = "lenient::int")]`.

use serde::{Deserialize, Deserializer};

/// Integer leaf; missing, empty, or malformed text becomes `0`.
pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(parse_int(raw.as_deref()))
}

/// Boolean leaf; anything outside the recognised spellings becomes `false`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(parse_flag(raw.as_deref()))
}

pub(crate) fn parse_int(raw: Option<&str>) -> i64 {
    raw.map(str::trim)
        .and_then(|text| text.parse::<i64>().ok())
        .unwrap_or(0)
}

pub(crate) fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(str::trim),
        Some("1" | "t" | "T" | "TRUE" | "true" | "True")
    )
}
