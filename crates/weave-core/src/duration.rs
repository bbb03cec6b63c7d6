//! Human-readable duration parsing (`500ms`, `2s`, `1.5s`, `1m`).

use std::time::Duration;

/// Error parsing a duration string.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration '{0}' (expected e.g. 500ms, 2s, 1m)")]
pub struct DurationError(String);

/// Parse a duration such as `500ms`, `2s`, `1.5s` or `1m`.
///
/// A bare number is read as seconds.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use weave_core::parse_duration;
///
/// assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
/// assert_eq!(parse_duration("5"), Ok(Duration::from_secs(5)));
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| DurationError(input.to_owned()))?;

    let seconds = match unit.trim() {
        "ms" => value / 1000.0,
        "" | "s" => value,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        _ => return Err(DurationError(input.to_owned())),
    };

    Duration::try_from_secs_f64(seconds).map_err(|_| DurationError(input.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_duration("2s"), Ok(Duration::from_secs(2)));
        assert_eq!(parse_duration("1m"), Ok(Duration::from_secs(60)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn test_fractional() {
        assert_eq!(parse_duration("1.5s"), Ok(Duration::from_millis(1500)));
    }

    #[test]
    fn test_bare_number_is_seconds() {
        assert_eq!(parse_duration("5"), Ok(Duration::from_secs(5)));
        assert_eq!(parse_duration(" 0 "), Ok(Duration::ZERO));
    }

    #[test]
    fn test_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("5 fortnights").is_err());
        assert!(parse_duration("1.2.3s").is_err());
    }

    #[test]
    fn test_error_message() {
        let err = parse_duration("soon").unwrap_err();
        assert!(err.to_string().contains("soon"));
    }
}
