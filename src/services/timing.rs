//! Timing alias lookup, duration parsing, and start-time normalization.
//!
//! Normalization is closed-form arithmetic on the elapsed-window count
//! rather than a step-by-step walk forward from `starts_at`, so it
//! terminates in a single division regardless of how far in the past
//! `starts_at` is.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::domain::errors::DomainError;

/// Fixed cadence aliases.
fn alias(name: &str) -> Option<Duration> {
    match name {
        "minutely" => Some(Duration::from_secs(60)),
        "hourly" => Some(Duration::from_secs(60 * 60)),
        "daily" => Some(Duration::from_secs(24 * 60 * 60)),
        "weekly" => Some(Duration::from_secs(7 * 24 * 60 * 60)),
        _ => None,
    }
}

/// Parse a blueprint's `timing` field: a fixed alias, or an explicit
/// duration string such as `15m` or `2h30m`.
pub fn parse_timing(timing: &str) -> Result<Duration, DomainError> {
    if let Some(d) = alias(timing) {
        return Ok(d);
    }
    parse_duration_string(timing)
        .ok_or_else(|| DomainError::InvalidTiming(timing.to_string()))
}

/// Parse a compound duration string made of `<number><unit>` components
/// (`h`, `m`, `s`), e.g. `"2h30m"`, `"15m"`, `"90s"`. No fractional
/// components, no sign; this is a bounded, explicit subset — not a
/// general-purpose duration grammar.
fn parse_duration_string(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let mut total_secs: u64 = 0;
    let mut digits = String::new();
    let mut saw_component = false;

    for ch in s.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }

        if digits.is_empty() {
            return None;
        }
        let value: u64 = digits.parse().ok()?;
        digits.clear();

        let secs = match ch {
            'h' => value.checked_mul(3600)?,
            'm' => value.checked_mul(60)?,
            's' => value,
            _ => return None,
        };
        total_secs = total_secs.checked_add(secs)?;
        saw_component = true;
    }

    if !digits.is_empty() || !saw_component {
        return None;
    }

    Some(Duration::from_secs(total_secs))
}

/// Normalize a blueprint's `starts_at` against cadence `timing`: the
/// current window's start is the greatest `starts_at + k*timing` (k >= 0)
/// that is <= `now`. If `starts_at` is already in the future, it is
/// returned unchanged (the schedule is `Waiting` until the window opens).
///
/// Idempotent: normalizing an already-normalized start-time returns the
/// same value, since k=0 is then the greatest valid offset.
pub fn normalize_start_time(
    starts_at: DateTime<Utc>,
    timing: Duration,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    if starts_at >= now || timing.is_zero() {
        return starts_at;
    }

    let elapsed = now.signed_duration_since(starts_at);
    let timing_secs = i64::try_from(timing.as_secs()).unwrap_or(i64::MAX);
    let elapsed_secs = elapsed.num_seconds();

    let k = elapsed_secs / timing_secs;
    starts_at + chrono::Duration::seconds(k * timing_secs)
}

/// The next recurrence boundary after `start_time`, given cadence `timing`.
pub fn next_boundary(start_time: DateTime<Utc>, timing: Duration) -> DateTime<Utc> {
    start_time + chrono::Duration::from_std(timing).unwrap_or(chrono::Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dt(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(parse_timing("minutely").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_timing("hourly").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_timing("daily").unwrap(), Duration::from_secs(86400));
        assert_eq!(parse_timing("weekly").unwrap(), Duration::from_secs(604800));
    }

    #[test]
    fn explicit_durations_parse() {
        assert_eq!(parse_timing("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_timing("2h30m").unwrap(), Duration::from_secs(9000));
        assert_eq!(parse_timing("90s").unwrap(), Duration::from_secs(90));
    }

    #[test]
    fn garbage_timing_is_rejected() {
        assert!(parse_timing("").is_err());
        assert!(parse_timing("banana").is_err());
        assert!(parse_timing("15").is_err());
    }

    #[test]
    fn normalization_future_start_is_unchanged() {
        let now = dt("2024-01-01T00:00:00Z");
        let starts_at = dt("2024-01-01T02:00:00Z");
        let normalized = normalize_start_time(starts_at, Duration::from_secs(3600), now);
        assert_eq!(normalized, starts_at);
    }

    #[test]
    fn normalization_finds_latest_boundary() {
        let starts_at = dt("2024-01-01T00:00:00Z");
        let now = dt("2024-01-01T03:20:00Z");
        let normalized = normalize_start_time(starts_at, Duration::from_secs(3600), now);
        assert_eq!(normalized, dt("2024-01-01T03:00:00Z"));
    }

    #[test]
    fn normalization_is_idempotent() {
        let starts_at = dt("2024-01-01T00:00:00Z");
        let now = dt("2024-03-15T07:43:00Z");
        let once = normalize_start_time(starts_at, Duration::from_secs(3600), now);
        let twice = normalize_start_time(once, Duration::from_secs(3600), now);
        assert_eq!(once, twice);
    }

    #[test]
    fn normalization_handles_far_past_start() {
        let starts_at = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let normalized = normalize_start_time(starts_at, Duration::from_secs(60), now);
        assert!(normalized <= now);
        assert!(now.signed_duration_since(normalized).num_seconds() < 60);
    }
}
