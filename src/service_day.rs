//! Service-day time arithmetic.
//!
//! Trip start times come in as `HH:MM:SS` wall-clock strings, but the
//! operating day of a transit network does not roll over at midnight: it
//! rolls over at a configured boundary (often around 04:30). A trip nominally
//! starting at `00:10:00` before that boundary belongs to the *previous*
//! service day and is keyed on that day's extended clock as `24:10:00`.

use anyhow::{Context, Result, bail};

const SECONDS_PER_DAY: u32 = 86_400;

/// Parses an `HH:MM:SS` string into seconds. The hour component may exceed
/// 24 and is preserved as-is, so `"36:34:56"` parses to 131696.
///
/// # Errors
///
/// Returns an error if the string does not split into exactly three numeric
/// fields.
pub fn parse_time(text: &str) -> Result<u32> {
    let fields: Vec<&str> = text.split(':').collect();
    if fields.len() != 3 {
        bail!("invalid time {text:?}, expected HH:MM:SS");
    }

    let hours: u32 = fields[0]
        .parse()
        .with_context(|| format!("invalid hours in time {text:?}"))?;
    let minutes: u32 = fields[1]
        .parse()
        .with_context(|| format!("invalid minutes in time {text:?}"))?;
    let seconds: u32 = fields[2]
        .parse()
        .with_context(|| format!("invalid seconds in time {text:?}"))?;

    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Formats seconds as `HH:MM:SS`, zero-padding each field. Values of 86400
/// and above render with an hour component of 24 or more.
pub fn format_time(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Re-expresses `time` on the clock of the service day it belongs to.
///
/// A time earlier than the service-day boundary occurred after midnight on
/// the previous service day, so it is shifted forward by 24 hours; a time at
/// or past the boundary is returned unchanged. The result matches the format
/// the lookup cache was populated with.
pub fn to_service_day_time(service_day_start: u32, time: &str) -> Result<String> {
    let seconds = parse_time(time)?;
    if seconds < service_day_start {
        Ok(format_time(seconds + SECONDS_PER_DAY))
    } else {
        Ok(time.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_midnight() {
        assert_eq!(parse_time("00:00:00").unwrap(), 0);
    }

    #[test]
    fn test_parse_time_afternoon() {
        assert_eq!(parse_time("12:34:56").unwrap(), 45296);
    }

    #[test]
    fn test_parse_time_past_midnight() {
        assert_eq!(parse_time("36:34:56").unwrap(), 131696);
    }

    #[test]
    fn test_parse_time_rejects_missing_fields() {
        assert!(parse_time("12:34").is_err());
        assert!(parse_time("12:34:56:78").is_err());
        assert!(parse_time("").is_err());
    }

    #[test]
    fn test_parse_time_rejects_non_numeric_fields() {
        assert!(parse_time("ab:cd:ef").is_err());
        assert!(parse_time("12:34:xx").is_err());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00:00");
        assert_eq!(format_time(45296), "12:34:56");
        assert_eq!(format_time(131696), "36:34:56");
    }

    #[test]
    fn test_parse_format_round_trip() {
        for time in ["00:00:00", "04:30:00", "12:34:56", "23:59:59", "36:34:56"] {
            assert_eq!(format_time(parse_time(time).unwrap()), time);
        }
    }

    #[test]
    fn test_service_day_no_shift_at_midnight_boundary() {
        assert_eq!(to_service_day_time(0, "12:34:56").unwrap(), "12:34:56");
    }

    #[test]
    fn test_service_day_no_shift_at_exact_boundary() {
        assert_eq!(to_service_day_time(45296, "12:34:56").unwrap(), "12:34:56");
        assert_eq!(to_service_day_time(16200, "04:30:00").unwrap(), "04:30:00");
    }

    #[test]
    fn test_service_day_shift_below_boundary() {
        assert_eq!(to_service_day_time(45297, "12:34:56").unwrap(), "36:34:56");
        assert_eq!(to_service_day_time(16200, "00:10:00").unwrap(), "24:10:00");
        assert_eq!(to_service_day_time(16200, "04:29:00").unwrap(), "28:29:00");
    }

    #[test]
    fn test_service_day_propagates_format_error() {
        assert!(to_service_day_time(16200, "not-a-time").is_err());
    }
}
