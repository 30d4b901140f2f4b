use crate::ConfigError;
use std::time::Duration;

/// Parses a human duration such as `90s`, `1500ms`, `5m` or `2h`
///
/// A bare number is read as seconds. Used for `--stopafter`,
/// `--cancelafter` and `--memstats`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use parts_spider::config::parse_duration;
///
/// assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
/// assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
/// assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
/// ```
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    let trimmed = value.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);

    let amount: u64 = digits
        .parse()
        .map_err(|_| ConfigError::InvalidDuration(value.to_string()))?;

    let duration = match unit.trim() {
        "" | "s" => Duration::from_secs(amount),
        "ms" => Duration::from_millis(amount),
        "m" => Duration::from_secs(amount * 60),
        "h" => Duration::from_secs(amount * 3600),
        _ => return Err(ConfigError::InvalidDuration(value.to_string())),
    };

    Ok(duration)
}
