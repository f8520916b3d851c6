//! # Duration Parsing
//!
//! Parses Kubernetes-style duration strings used by command-line flags.

use anyhow::Result;
use regex::Regex;
use std::time::Duration;

/// Parse Kubernetes duration string into std::time::Duration
/// Supports formats: "500ms", "30s", "1m", "5m", "1h", "2h", "1d"
/// Returns Duration or error if format is invalid
pub fn parse_kubernetes_duration(duration_str: &str) -> Result<Duration> {
    let duration_trimmed = duration_str.trim();

    if duration_trimmed.is_empty() {
        return Err(anyhow::anyhow!("Duration string cannot be empty"));
    }

    // Matches: <number><unit> where unit is ms, s, m, h or d (case insensitive)
    let duration_regex = Regex::new(r"^(?P<number>\d+)(?P<unit>ms|[smhd])$")
        .map_err(|e| anyhow::anyhow!("Failed to compile regex: {e}"))?;

    let interval_lower = duration_trimmed.to_lowercase();

    let captures = duration_regex
        .captures(&interval_lower)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid duration format '{}'. Expected format: <number><unit> (e.g., '2s', '1m', '1h')",
                duration_trimmed
            )
        })?;

    let number_str = captures
        .name("number")
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Failed to extract number from duration '{}'",
                duration_trimmed
            )
        })?
        .as_str();

    let unit = captures
        .name("unit")
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Failed to extract unit from duration '{}'",
                duration_trimmed
            )
        })?
        .as_str();

    let number: u64 = number_str.parse().map_err(|e| {
        anyhow::anyhow!(
            "Invalid duration number '{}' in '{}': {}",
            number_str,
            duration_trimmed,
            e
        )
    })?;

    if number == 0 {
        return Err(anyhow::anyhow!(
            "Duration number must be greater than 0, got '{}'",
            duration_trimmed
        ));
    }

    let seconds_per_unit = |factor: u64| {
        number.checked_mul(factor).map(Duration::from_secs).ok_or_else(|| {
            anyhow::anyhow!("Duration '{}' is too large", duration_trimmed)
        })
    };

    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => seconds_per_unit(60)?,
        "h" => seconds_per_unit(3600)?,
        "d" => seconds_per_unit(86400)?,
        _ => {
            return Err(anyhow::anyhow!(
                "Invalid unit '{}' in duration '{}'. Expected: ms, s, m, h, or d",
                unit,
                duration_trimmed
            ));
        }
    };

    Ok(duration)
}
