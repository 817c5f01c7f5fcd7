// src/models/compat.rs

//! Normalization of legacy record shapes.
//!
//! Older revisions of the console stored ids as numbers in some places and
//! strings in others, and the backend emits timestamps with or without a
//! timezone. These deserializers accept every observed shape and produce the
//! canonical one.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

/// Accept a string or an integer, yielding a trimmed string.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Text(s) => s.trim().to_string(),
        StringOrNumber::Unsigned(n) => n.to_string(),
        StringOrNumber::Signed(n) => n.to_string(),
    })
}

/// Optional variant of [`string_or_number`]; blank strings become `None`.
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<StringOrNumber> = Option::deserialize(deserializer)?;
    Ok(value
        .map(|v| match v {
            StringOrNumber::Text(s) => s.trim().to_string(),
            StringOrNumber::Unsigned(n) => n.to_string(),
            StringOrNumber::Signed(n) => n.to_string(),
        })
        .filter(|s| !s.is_empty()))
}

/// Accept an unsigned integer or a numeric string.
pub fn number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Unsigned(n) => Ok(n),
        StringOrNumber::Signed(n) => u64::try_from(n)
            .map_err(|_| de::Error::custom(format!("negative id: {n}"))),
        StringOrNumber::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid numeric id: {s:?}"))),
    }
}

/// Parse a timestamp in any of the shapes the backend has produced.
///
/// RFC 3339 is tried first, then a naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as
/// UTC), then a bare date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Deserialize a timestamp leniently (see [`parse_timestamp`]).
pub fn flexible_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "string_or_number")]
        text: String,
        #[serde(deserialize_with = "number_or_string")]
        id: u64,
    }

    #[test]
    fn test_mixed_id_shapes() {
        let a: Probe = serde_json::from_str(r#"{"text": 4821, "id": "17"}"#).unwrap();
        assert_eq!(a.text, "4821");
        assert_eq!(a.id, 17);

        let b: Probe = serde_json::from_str(r#"{"text": " 978-x ", "id": 3}"#).unwrap();
        assert_eq!(b.text, "978-x");
        assert_eq!(b.id, 3);
    }

    #[test]
    fn test_rejects_negative_and_garbage_ids() {
        assert!(serde_json::from_str::<Probe>(r#"{"text": "a", "id": -1}"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{"text": "a", "id": "abc"}"#).is_err());
    }

    #[test]
    fn test_parse_timestamp_shapes() {
        let rfc = parse_timestamp("2024-03-05T10:30:00.000Z").unwrap();
        assert_eq!((rfc.year(), rfc.month(), rfc.day(), rfc.hour()), (2024, 3, 5, 10));

        let offset = parse_timestamp("2024-03-05T10:30:00+05:30").unwrap();
        assert_eq!(offset.hour(), 5);

        let naive = parse_timestamp("2024-03-05T10:30:00.1234567").unwrap();
        assert_eq!(naive.minute(), 30);

        let date = parse_timestamp("2024-03-05").unwrap();
        assert_eq!(date.hour(), 0);

        assert!(parse_timestamp("yesterday").is_none());
    }
}
