//! Human-readable byte size formatting and parsing

use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseSizeError {
    #[error("Invalid size format: {0}")]
    InvalidFormat(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(#[from] std::num::ParseIntError),

    #[error("Invalid unit: {0}")]
    InvalidUnit(String),
}

const UNITS: &[(&str, u64)] = &[
    ("B", 1),
    ("KB", 1024),
    ("MB", 1024 * 1024),
    ("GB", 1024 * 1024 * 1024),
    ("TB", 1024 * 1024 * 1024 * 1024),
];

/// Format a byte count for log and report lines, e.g. `1.5MB`.
pub fn format_bytes(n: u64) -> String {
    for &(unit, divisor) in UNITS.iter().rev() {
        if n >= divisor {
            let value = n / divisor;
            let decimal = (n % divisor) * 10 / divisor;
            if decimal > 0 {
                return format!("{value}.{decimal}{unit}");
            }
            return format!("{value}{unit}");
        }
    }
    format!("{n}B")
}

/// Parse a size like `"5MB"`, `"1G"` or a bare integer into bytes.
pub fn parse_bytes(s: &str) -> Result<u64, ParseSizeError> {
    let s = s.trim().to_uppercase();

    if let Ok(num) = s.parse::<u64>() {
        return Ok(num);
    }

    let Some(pos) = s.find(|c: char| !c.is_ascii_digit()) else {
        return Err(ParseSizeError::InvalidFormat(s));
    };
    let num: u64 = s[..pos].parse()?;

    let multiplier = match s[pos..].trim() {
        "B" => 1,
        "K" | "KB" | "KIB" => 1024,
        "M" | "MB" | "MIB" => 1024 * 1024,
        "G" | "GB" | "GIB" => 1024 * 1024 * 1024,
        "T" | "TB" | "TIB" => 1024 * 1024 * 1024 * 1024,
        unit => return Err(ParseSizeError::InvalidUnit(unit.to_string())),
    };

    num.checked_mul(multiplier)
        .ok_or(ParseSizeError::InvalidFormat(s))
}

/// `deserialize_with` helper: accepts `"5MB"`, `"1G"`, a bare integer, or
/// absence, for optional size fields in TOML config.
pub fn de_opt_bytes<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) => parse_bytes(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_units() {
        assert_eq!(parse_bytes("1024").unwrap(), 1024);
        assert_eq!(parse_bytes("1KB").unwrap(), 1024);
        assert_eq!(parse_bytes("5M").unwrap(), 5 * 1024 * 1024);
        assert_eq!(parse_bytes("50GB").unwrap(), 50 * 1024 * 1024 * 1024);
        assert_eq!(parse_bytes("1TiB").unwrap(), 1024 * 1024 * 1024 * 1024);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_bytes("5XB"),
            Err(ParseSizeError::InvalidUnit(_))
        ));
        assert!(parse_bytes("MB").is_err());
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert!(matches!(
            parse_bytes("999999999999999999TB"),
            Err(ParseSizeError::InvalidFormat(_))
        ));
        // A large but representable value still parses
        assert_eq!(
            parse_bytes("16777215TB").unwrap(),
            16_777_215 * 1024u64.pow(4)
        );
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(1024), "1KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5MB");
        assert_eq!(format_bytes(1024 * 1024 + 512 * 1024), "1.5MB");
    }

    #[test]
    fn test_deserialize_optional_size() {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(default, deserialize_with = "de_opt_bytes")]
            cap: Option<u64>,
        }

        let parsed: Probe = serde_json::from_str(r#"{"cap": "10MB"}"#).unwrap();
        assert_eq!(parsed.cap, Some(10 * 1024 * 1024));

        let parsed: Probe = serde_json::from_str(r#"{"cap": 1024}"#).unwrap();
        assert_eq!(parsed.cap, Some(1024));

        let parsed: Probe = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(parsed.cap, None);
    }
}
