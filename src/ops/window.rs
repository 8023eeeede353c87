//! Time windows (`--since`) and quick-mode query rewriting

use chrono::{DateTime, Duration, Utc};

use crate::error::RadarError;

/// Accepted `--since` format, quoted in validation errors
pub const SINCE_FORMAT_HINT: &str = "--since must be like 1h, 3h, 12h, 1d, 7d";

/// Parses `<number>h` or `<number>d` into a duration
///
/// Case and surrounding whitespace are ignored and the number may be
/// fractional (`1.5h`). Negative, non-finite, or out-of-range values are
/// rejected.
pub fn parse_since(value: &str) -> Result<Duration, RadarError> {
    let invalid = || RadarError::Validation(format!("{SINCE_FORMAT_HINT} (got '{value}')"));

    let raw = value.trim().to_lowercase();
    let (number, unit_ms) = if let Some(n) = raw.strip_suffix('h') {
        (n, 3_600_000.0)
    } else if let Some(n) = raw.strip_suffix('d') {
        (n, 86_400_000.0)
    } else {
        return Err(invalid());
    };

    let amount: f64 = number.trim().parse().map_err(|_| invalid())?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(invalid());
    }

    let millis = amount * unit_ms;
    if millis >= i64::MAX as f64 {
        return Err(invalid());
    }
    Duration::try_milliseconds(millis as i64).ok_or_else(invalid)
}

/// Absolute UTC lower bound for a `--since` window, formatted for the X API
pub fn window_start(now: DateTime<Utc>, since: &str) -> Result<String, RadarError> {
    let window = parse_since(since)?;
    let start = now.checked_sub_signed(window).ok_or_else(|| {
        RadarError::Validation(format!("{SINCE_FORMAT_HINT} (got '{since}')"))
    })?;
    Ok(start.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

/// Appends noise exclusions for quick mode
///
/// ` -is:retweet` and ` -is:reply` are added unless the query already
/// mentions that qualifier. The check is a case-insensitive substring match,
/// so a qualifier inside quoted text also suppresses the exclusion.
pub fn apply_quick_filters(query: &str) -> String {
    let lowered = query.to_lowercase();
    let mut rewritten = query.to_string();
    if !lowered.contains("is:retweet") {
        rewritten.push_str(" -is:retweet");
    }
    if !lowered.contains("is:reply") {
        rewritten.push_str(" -is:reply");
    }
    rewritten
}
