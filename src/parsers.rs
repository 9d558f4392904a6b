//! Normalization of free-text workout measurements
//!
//! Every parser is total: absent, empty or garbled input yields zero rather
//! than an error. Durations and paces are always returned in seconds.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

// Patterns are stored as Option so a failed compilation degrades to "no match"
static NUMBER_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[\d.]+").ok());

static INTEGER_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d+").ok());

// Matches: 45:30, 1:05:30
static CLOCK_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+):(\d+)(?::(\d+))?").ok());

// Matches: 45, 45min, " 45 minutes"
static LEADING_INTEGER_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)").ok());

// Matches: 8:30, 8:30/mi
static PACE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(\d+):(\d+)").ok());

/// Distance in miles from text such as "6.2", "6.2 mi" or "about 10"
pub fn parse_distance(text: Option<&str>) -> Decimal {
    text.and_then(|t| NUMBER_PATTERN.as_ref()?.find(t))
        .and_then(|m| leading_decimal(m.as_str()))
        .unwrap_or(Decimal::ZERO)
}

/// Duration in seconds.
///
/// "MM:SS" and "H:MM:SS" are read as clock time; a bare leading integer is
/// whole minutes.
pub fn parse_duration(text: Option<&str>) -> u32 {
    let Some(text) = text else {
        return 0;
    };

    if text.contains(':') {
        let Some(caps) = CLOCK_PATTERN.as_ref().and_then(|re| re.captures(text)) else {
            return 0;
        };
        let first = caps.get(1).and_then(|m| m.as_str().parse::<u64>().ok());
        let second = caps.get(2).and_then(|m| m.as_str().parse::<u64>().ok());
        let third = caps.get(3).map(|m| m.as_str().parse::<u64>().ok());

        let seconds = match (first, second, third) {
            (Some(hours), Some(minutes), Some(Some(seconds))) => hours
                .saturating_mul(3600)
                .saturating_add(minutes.saturating_mul(60))
                .saturating_add(seconds),
            (Some(minutes), Some(seconds), None) => minutes.saturating_mul(60).saturating_add(seconds),
            _ => 0,
        };
        return clamp_seconds(seconds);
    }

    LEADING_INTEGER_PATTERN
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .map(|minutes| clamp_seconds(minutes.saturating_mul(60)))
        .unwrap_or(0)
}

/// Pace in seconds per mile from "M:SS"
pub fn parse_pace(text: Option<&str>) -> u32 {
    text.and_then(|t| PACE_PATTERN.as_ref()?.captures(t))
        .and_then(|caps| {
            let minutes = caps.get(1)?.as_str().parse::<u64>().ok()?;
            let seconds = caps.get(2)?.as_str().parse::<u64>().ok()?;
            Some(clamp_seconds(minutes.saturating_mul(60).saturating_add(seconds)))
        })
        .unwrap_or(0)
}

/// Heart rate in bpm: the first integer in the text
pub fn parse_heart_rate(text: Option<&str>) -> u16 {
    text.and_then(|t| INTEGER_PATTERN.as_ref()?.find(t))
        .and_then(|m| m.as_str().parse::<u16>().ok())
        .unwrap_or(0)
}

/// Render seconds as "MM:SS", or "H:MM:SS" from one hour up
pub fn format_duration(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Render a pace in seconds per mile as "M:SS"
pub fn format_pace(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Leading valid decimal of a digits-and-dots token ("1.2.3" reads as 1.2)
fn leading_decimal(token: &str) -> Option<Decimal> {
    let mut parts = token.splitn(3, '.');
    let whole = parts.next().unwrap_or("");
    let fraction = parts.next().unwrap_or("");

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let text = if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    };

    Decimal::from_str(&text).ok()
}

fn clamp_seconds(seconds: u64) -> u32 {
    u32::try_from(seconds).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_distance() {
        assert_eq!(parse_distance(Some("3.1")), dec!(3.1));
        assert_eq!(parse_distance(Some("10.2 mi")), dec!(10.2));
        assert_eq!(parse_distance(Some("about 6 miles")), dec!(6));
        assert_eq!(parse_distance(Some("1.2.3")), dec!(1.2));
        assert_eq!(parse_distance(Some(".5")), dec!(0.5));
        assert_eq!(parse_distance(Some("5.")), dec!(5));
    }

    #[test]
    fn test_parse_distance_degrades_to_zero() {
        assert_eq!(parse_distance(None), Decimal::ZERO);
        assert_eq!(parse_distance(Some("")), Decimal::ZERO);
        assert_eq!(parse_distance(Some("far")), Decimal::ZERO);
        assert_eq!(parse_distance(Some("...")), Decimal::ZERO);
    }

    #[test]
    fn test_parse_duration_clock_formats() {
        assert_eq!(parse_duration(Some("45:30")), 2730);
        assert_eq!(parse_duration(Some("1:05:30")), 3930);
        assert_eq!(parse_duration(Some("0:59")), 59);
    }

    #[test]
    fn test_parse_duration_minutes() {
        assert_eq!(parse_duration(Some("45")), 2700);
        assert_eq!(parse_duration(Some(" 30 min")), 1800);
        assert_eq!(parse_duration(Some("an hour")), 0);
        assert_eq!(parse_duration(Some("ab:cd")), 0);
        assert_eq!(parse_duration(None), 0);
    }

    #[test]
    fn test_parse_pace() {
        assert_eq!(parse_pace(Some("8:30")), 510);
        assert_eq!(parse_pace(Some("9:05/mi")), 545);
        assert_eq!(parse_pace(Some("fast")), 0);
        assert_eq!(parse_pace(None), 0);
    }

    #[test]
    fn test_parse_heart_rate() {
        assert_eq!(parse_heart_rate(Some("152")), 152);
        assert_eq!(parse_heart_rate(Some("avg 148 bpm")), 148);
        assert_eq!(parse_heart_rate(Some("n/a")), 0);
        assert_eq!(parse_heart_rate(None), 0);
    }

    #[test]
    fn test_format_round_trips_through_parser() {
        assert_eq!(format_duration(2730), "45:30");
        assert_eq!(format_duration(3930), "1:05:30");
        assert_eq!(parse_duration(Some(&format_duration(7384))), 7384);
        assert_eq!(format_pace(510), "8:30");
    }
}
