//! Environment variable parsing utilities.

use std::str::FromStr;
use std::time::Duration;

use super::ConfigError;

/// Get environment variable with default value.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse environment variable with type conversion.
pub fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v.trim().parse().map_err(|e: T::Err| ConfigError::Parse {
            key: key.into(),
            value: v,
            error: e.to_string(),
        }),
        _ => Ok(default),
    }
}

/// Parse duration string (e.g., "250ms", "30s", "2m", "1h", "1d").
/// Returns None for "off" or any zero length. A bare number is read as seconds.
pub fn parse_duration(s: &str) -> Result<Option<Duration>, String> {
    let s = s.trim().to_lowercase();

    if s == "off" || s == "0" || s.is_empty() {
        return Ok(None);
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (num_str, unit) = s.split_at(split);

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    let duration = match unit {
        "ms" => Duration::from_millis(num),
        "" | "s" => Duration::from_secs(num),
        "m" => Duration::from_secs(scale_secs(num, 60)?),
        "h" => Duration::from_secs(scale_secs(num, 3600)?),
        "d" => Duration::from_secs(scale_secs(num, 86400)?),
        _ => return Err(format!("invalid unit: {}", unit)),
    };

    if duration.is_zero() {
        return Ok(None);
    }
    Ok(Some(duration))
}

fn scale_secs(num: u64, factor: u64) -> Result<u64, String> {
    num.checked_mul(factor)
        .ok_or_else(|| "duration too large".to_string())
}

/// Parse environment variable as duration.
pub fn env_duration(key: &str, default: &str) -> Result<Option<Duration>, ConfigError> {
    let value = env_or(key, default);
    parse_duration(&value).map_err(|e| ConfigError::Parse {
        key: key.into(),
        value,
        error: e,
    })
}
