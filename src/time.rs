//! Time and Timezone Utilities Module
//!
//! Departure-time parsing, timezone resolution and duration formatting.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_english::{Dialect, parse_date_string};
use chrono_tz::Tz;
use iana_time_zone::get_timezone;
use std::sync::OnceLock;
use tzf_rs::DefaultFinder;

use crate::error::{Error, Result};

// tzf-rs DefaultFinder is pre-compiled and very fast
static TZF_FINDER: OnceLock<DefaultFinder> = OnceLock::new();

/// Wall-clock formats accepted for a departure, interpreted in the caller's zone
const LOCAL_FORMATS: [&str; 4] =
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

// ===================== TIME PARSING =====================

/// Parse a departure time.
///
/// Accepts, in order: `now`, `@` followed by Unix milliseconds
/// (`@1750530600000`), RFC 3339 (`2025-06-21T18:30:00Z`), a local wall-clock
/// time (`2025-06-21 18:30`) in `tz`, or an English phrase such as
/// `tomorrow 8:15` relative to `now`.
///
/// # Errors
/// `InvalidArgument` if nothing matches or the local time falls in a DST gap
pub fn parse_departure(s: &str, tz: Tz, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("now") {
        return Ok(now);
    }
    if let Some(ms) = s.strip_prefix('@') {
        let ms: f64 =
            ms.trim().parse().map_err(|_| Error::invalid(format!("invalid Unix milliseconds '{ms}'")))?;
        return instant_from_unix_millis(ms);
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    for fmt in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return resolve_local(tz, naive);
        }
    }
    parse_date_string(s, now.with_timezone(&tz), Dialect::Us)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::invalid(format!("unrecognised departure time '{s}': {e}")))
}

/// Resolve a wall-clock time in `tz` to a single instant.
///
/// Ambiguous times (DST fall back) take the earlier instant.
pub fn resolve_local(tz: Tz, naive: NaiveDateTime) -> Result<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => Ok(t.with_timezone(&Utc)),
        LocalResult::Ambiguous(t1, t2) => {
            log::warn!(
                "{} is ambiguous in {} (DST transition), using {} rather than {}",
                naive,
                tz,
                t1.format("%H:%M %Z"),
                t2.format("%H:%M %Z")
            );
            Ok(t1.with_timezone(&Utc))
        }
        LocalResult::None => {
            Err(Error::invalid(format!("{naive} does not exist in {tz} (DST gap/spring forward)")))
        }
    }
}

/// Instant from a Unix timestamp in milliseconds.
///
/// # Errors
/// `InvalidArgument` for NaN, infinities or values outside chrono's range
pub fn instant_from_unix_millis(ms: f64) -> Result<DateTime<Utc>> {
    if !ms.is_finite() {
        return Err(Error::invalid(format!("instant must be finite, got {ms}")));
    }
    DateTime::from_timestamp_millis(ms.round() as i64)
        .ok_or_else(|| Error::invalid(format!("instant out of range: {ms} ms")))
}

// ===================== TIMEZONE UTILITIES =====================

/// Get the system's configured timezone.
///
/// Falls back to UTC if the system timezone cannot be determined.
pub fn system_timezone() -> Tz {
    get_timezone().ok().and_then(|s| s.parse().ok()).unwrap_or(Tz::UTC)
}

/// Resolve timezone from geographic coordinates.
///
/// # Returns
/// The IANA zone containing the point, or UTC if resolution fails
pub fn resolve_timezone(lon: f64, lat: f64) -> Tz {
    let finder = TZF_FINDER.get_or_init(DefaultFinder::new);
    let tzid = finder.get_tz_name(lon, lat);
    tzid.parse::<Tz>().unwrap_or(Tz::UTC)
}

// ===================== FORMATTING =====================

/// Format a duration as "Xh Ym", rounded to the nearest minute.
///
/// Negative durations are formatted by magnitude.
pub fn format_hm(d: Duration) -> String {
    let minutes = ((d.num_seconds().abs() as f64) / 60.0).round() as i64;
    let (h, m) = (minutes / 60, minutes % 60);
    match (h, m) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use chrono_tz::America::New_York;
    use chrono_tz::Europe::London;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_departure_rfc3339() {
        let t = parse_departure("2025-06-21T18:30:00+02:00", New_York, now()).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 6, 21, 16, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_departure_local_formats() {
        // New York is UTC-4 in June
        let expected = Utc.with_ymd_and_hms(2025, 6, 21, 22, 30, 0).unwrap();
        assert_eq!(parse_departure("2025-06-21 18:30", New_York, now()).unwrap(), expected);
        assert_eq!(parse_departure("2025-06-21T18:30", New_York, now()).unwrap(), expected);
        assert_eq!(parse_departure("2025-06-21 18:30:00", New_York, now()).unwrap(), expected);
    }

    #[test]
    fn test_parse_departure_now() {
        assert_eq!(parse_departure("now", London, now()).unwrap(), now());
        assert_eq!(parse_departure(" NOW ", London, now()).unwrap(), now());
    }

    #[test]
    fn test_parse_departure_unix_millis() {
        let t = parse_departure("@1750530600000", London, now()).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 6, 21, 18, 30, 0).unwrap());
        assert!(matches!(parse_departure("@soon", London, now()), Err(Error::InvalidArgument(_))));
        assert!(parse_departure("@1e300", London, now()).is_err());
    }

    #[test]
    fn test_parse_departure_invalid() {
        let r = parse_departure("not a time", London, now());
        assert!(matches!(r, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_parse_departure_dst_gap_rejected() {
        // Clocks in London jump from 01:00 to 02:00 on 2025-03-30
        let r = parse_departure("2025-03-30 01:30", London, now());
        assert!(matches!(r, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_resolve_local_ambiguous_takes_earlier() {
        // 01:30 happens twice in London on 2025-10-26 (BST then GMT)
        let naive = NaiveDate::from_ymd_opt(2025, 10, 26).unwrap().and_hms_opt(1, 30, 0).unwrap();
        let t = resolve_local(London, naive).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 10, 26, 0, 30, 0).unwrap());
    }

    #[test]
    fn test_instant_from_unix_millis() {
        let t = instant_from_unix_millis(1_750_530_600_000.0).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 6, 21, 18, 30, 0).unwrap());
        assert!(instant_from_unix_millis(f64::NAN).is_err());
        assert!(instant_from_unix_millis(f64::INFINITY).is_err());
        assert!(instant_from_unix_millis(1e300).is_err());
    }

    #[test]
    fn test_format_hm() {
        assert_eq!(format_hm(Duration::minutes(450)), "7h 30m");
        assert_eq!(format_hm(Duration::hours(2)), "2h");
        assert_eq!(format_hm(Duration::minutes(45)), "45m");
        assert_eq!(format_hm(Duration::seconds(0)), "0m");
        // 6h 59m 40s rounds up to a whole hour rather than "6h 60m"
        assert_eq!(format_hm(Duration::seconds(6 * 3600 + 59 * 60 + 40)), "7h");
        assert_eq!(format_hm(Duration::minutes(-90)), "1h 30m");
    }

    #[test]
    fn test_resolve_timezone_new_york() {
        // Washington DC / New York region
        let tz = resolve_timezone(-77.0365, 38.8977);
        assert_eq!(tz, New_York);
    }

    #[test]
    fn test_resolve_timezone_sydney() {
        use chrono_tz::Australia::Sydney;
        // Canberra / Sydney region
        let tz = resolve_timezone(149.1165, -35.3108);
        assert_eq!(tz, Sydney);
    }

    #[test]
    fn test_resolve_timezone_open_ocean_is_some_zone() {
        // Mid-Atlantic falls back to an Etc/ zone or UTC, never panics
        let tz = resolve_timezone(-30.0, 0.0);
        assert!(!tz.name().is_empty());
    }
}
