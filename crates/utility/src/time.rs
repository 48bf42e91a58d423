//! Text formats used for race clocks and paces.
//!
//! Race times are written `H:MM:SS` (hours are not zero padded), paces are
//! written `M:SS` per mile.

use chrono::Duration;

/// Parses a race time in `H:MM:SS` format.
///
/// Minutes and seconds must be below 60. Surrounding whitespace is ignored.
pub fn parse_race_time(value: &str) -> Option<Duration> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours: i64 = parts[0].trim().parse().ok()?;
    let minutes: i64 = parts[1].trim().parse().ok()?;
    let seconds: i64 = parts[2].trim().parse().ok()?;
    if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return None;
    }

    Duration::try_hours(hours)?
        .checked_add(&Duration::try_minutes(minutes)?)?
        .checked_add(&Duration::try_seconds(seconds)?)
}

/// Lenient variant of [`parse_race_time`] for values that already passed an
/// input boundary: anything malformed counts as zero.
pub fn race_time_or_zero(value: &str) -> Duration {
    parse_race_time(value).unwrap_or_else(Duration::zero)
}

pub fn format_race_time(duration: &Duration) -> String {
    format_race_time_secs(seconds(duration))
}

pub fn format_race_time_secs(total_seconds: f64) -> String {
    let total_seconds = if total_seconds.is_finite() {
        total_seconds.max(0.0).floor() as i64
    } else {
        0
    };
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}

/// Parses a pace in `M:SS` format into seconds per mile.
pub fn parse_pace(value: &str) -> Option<f64> {
    let (minutes, seconds) = value.trim().split_once(':')?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    let seconds: u32 = seconds.trim().parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    minutes
        .checked_mul(60)
        .and_then(|total| total.checked_add(seconds))
        .map(f64::from)
}

pub fn format_pace(seconds_per_mile: f64) -> String {
    let total = if seconds_per_mile.is_finite() {
        seconds_per_mile.max(0.0)
    } else {
        0.0
    };
    let minutes = (total / 60.0).floor() as i64;
    let seconds = (total % 60.0).floor() as i64;
    format!("{}:{:02}", minutes, seconds)
}

/// Converts fractional seconds into a millisecond precise duration.
pub fn duration_from_secs(seconds: f64) -> Duration {
    if !seconds.is_finite() {
        return Duration::zero();
    }
    // saturates, chrono rejects i64::MIN milliseconds
    let millis = ((seconds * 1000.0).round() as i64).max(-i64::MAX);
    Duration::try_milliseconds(millis).unwrap_or_else(Duration::zero)
}

pub fn seconds(duration: &Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_race_times() {
        assert_eq!(parse_race_time("3:30:00"), Some(Duration::minutes(210)));
        assert_eq!(parse_race_time(" 0:35:07 "), Some(Duration::seconds(35 * 60 + 7)));
        assert_eq!(parse_race_time("12:00:01"), Some(Duration::seconds(43201)));
    }

    #[test]
    fn rejects_malformed_race_times() {
        for value in ["", "3:30", "a:bb:cc", "1:60:00", "1:00:75", "-1:00:00", "1:2:3:4"] {
            assert_eq!(parse_race_time(value), None, "{value:?}");
        }
        assert_eq!(race_time_or_zero("soon"), Duration::zero());
    }

    #[test]
    fn out_of_range_race_times_are_rejected() {
        assert_eq!(parse_race_time("3000000000000:00:00"), None);
        assert_eq!(parse_race_time("9223372036854775807:00:00"), None);
        assert_eq!(race_time_or_zero("3000000000000:00:00"), Duration::zero());
        assert_eq!(parse_race_time("100:00:00"), Some(Duration::hours(100)));
    }

    #[test]
    fn formats_race_times() {
        assert_eq!(format_race_time(&Duration::seconds(3 * 3600 + 5 * 60 + 9)), "3:05:09");
        assert_eq!(format_race_time_secs(-4.0), "0:00:00");
        assert_eq!(format_race_time_secs(599.9), "0:09:59");
    }

    #[test]
    fn paces() {
        assert_eq!(parse_pace("7:00"), Some(420.0));
        assert_eq!(parse_pace("8:10"), Some(490.0));
        assert_eq!(parse_pace("8"), None);
        assert_eq!(parse_pace("8:75"), None);
        assert_eq!(format_pace(455.5), "7:35");
        assert_eq!(format_pace(f64::NAN), "0:00");
    }

    #[test]
    fn out_of_range_paces_are_rejected() {
        assert_eq!(parse_pace("99999999:00"), None);
        assert_eq!(parse_pace("4294967295:59"), None);
        assert_eq!(parse_pace("71582788:00"), Some(71582788.0 * 60.0));
    }

    #[test]
    fn fractional_seconds() {
        assert_eq!(duration_from_secs(1.25), Duration::milliseconds(1250));
        assert_eq!(seconds(&Duration::milliseconds(1500)), 1.5);
        assert_eq!(duration_from_secs(f64::INFINITY), Duration::zero());
        assert_eq!(duration_from_secs(-1e300), Duration::milliseconds(-i64::MAX));
    }
}
