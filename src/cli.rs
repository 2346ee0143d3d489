//! Command-Line Interface Module
//!
//! Handles argument parsing and validation for the sunside binary.

use clap::Parser;
use simplelog::LevelFilter;

use sunside::airports::{Airport, find_by_iata};
use sunside::geo::Coordinate;
use sunside::route::{DEFAULT_CRUISE_SPEED_KMH, DEFAULT_SEGMENTS, MIN_CRUISE_SPEED_KMH};
use sunside::seats::DEFAULT_ROWS;
use sunside::solar::DEFAULT_FORE_AFT_THRESHOLD_DEG;

// ===================== CLI =====================

#[derive(Parser, Debug)]
#[command(author, version, about = "Which window seat gets the sun on a flight")]
pub struct Args {
    /// Origin: IATA code (e.g. JFK) or "LAT,LON"
    #[arg(long, allow_hyphen_values = true, value_parser = parse_endpoint, env = "SUNSIDE_FROM")]
    pub from: Endpoint,
    /// Destination: IATA code (e.g. LHR) or "LAT,LON"
    #[arg(long, allow_hyphen_values = true, value_parser = parse_endpoint, env = "SUNSIDE_TO")]
    pub to: Endpoint,
    /// Departure time ("2025-06-21 18:30", RFC 3339, "@<unix ms>", "tomorrow 8am" or "now")
    #[arg(long, default_value = "now", env = "SUNSIDE_DEPARTURE")]
    pub departure: String,
    /// Time zone for local times ("origin", "utc", "system", or IANA time zone name)
    #[arg(long, default_value = "origin", env = "SUNSIDE_TIMEZONE")]
    pub timezone: String,

    /// Number of great-circle segments in the route arc
    #[arg(long, default_value_t = DEFAULT_SEGMENTS, value_parser = parse_segments, env = "SUNSIDE_SEGMENTS")]
    pub segments: usize,
    /// Sun within this many degrees of the nose counts as neither side
    #[arg(long, default_value_t = DEFAULT_FORE_AFT_THRESHOLD_DEG, value_parser = parse_threshold, env = "SUNSIDE_THRESHOLD")]
    pub threshold: f64,
    /// Cruise ground speed in km/h used for the flight time estimate
    #[arg(long, default_value_t = DEFAULT_CRUISE_SPEED_KMH, value_parser = parse_cruise_speed, env = "SUNSIDE_CRUISE_SPEED")]
    pub cruise_speed: f64,
    /// Re-evaluate the scenic side at N intervals along the route (0 disables)
    #[arg(long, default_value_t = 8, env = "SUNSIDE_TIMELINE")]
    pub timeline: usize,
    /// Rows in the seat map
    #[arg(long, default_value_t = DEFAULT_ROWS, value_parser = parse_rows, env = "SUNSIDE_ROWS")]
    pub rows: u32,

    /// Print every point of the route arc
    #[arg(long)]
    pub show_arc: bool,
    /// Output the route plan as JSON
    #[arg(long, env = "SUNSIDE_JSON")]
    pub json: bool,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Log level (off, error, warn, info, debug, trace); overrides -v
    #[arg(long, value_parser = parse_log_level, env = "SUNSIDE_LOG")]
    pub log_level: Option<LevelFilter>,
}

/// A route endpoint as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    Airport(&'static Airport),
    Point(Coordinate),
}

impl Endpoint {
    pub fn coordinate(&self) -> Coordinate {
        match self {
            Endpoint::Airport(a) => a.coordinate(),
            Endpoint::Point(c) => *c,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Endpoint::Airport(a) => a.label(),
            Endpoint::Point(c) => format!("{:.4}, {:.4}", c.lat(), c.lon()),
        }
    }
}

// ===================== CLI VALUE PARSERS =====================

fn parse_endpoint(s: &str) -> Result<Endpoint, String> {
    if let Some(airport) = find_by_iata(s) {
        return Ok(Endpoint::Airport(airport));
    }
    let Some((lat, lon)) = s.split_once(',') else {
        return Err(format!("Unknown airport code '{}' (expected IATA code or LAT,LON)", s.trim()));
    };
    let lat: f64 = lat.trim().parse().map_err(|_| format!("Invalid latitude: {}", lat.trim()))?;
    let lon: f64 = lon.trim().parse().map_err(|_| format!("Invalid longitude: {}", lon.trim()))?;
    Coordinate::new(lat, lon).map(Endpoint::Point).map_err(|e| e.to_string())
}

fn parse_segments(s: &str) -> Result<usize, String> {
    let v: usize = s.parse().map_err(|_| format!("Invalid integer: {}", s))?;
    if !(1..=100_000).contains(&v) {
        return Err(format!("Segments must be between 1 and 100000, got {}", v));
    }
    Ok(v)
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(0.0..180.0).contains(&v) {
        return Err(format!("Threshold must be between 0 and 180 degrees, got {}", v));
    }
    Ok(v)
}

fn parse_cruise_speed(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !v.is_finite() || !(MIN_CRUISE_SPEED_KMH..=5000.0).contains(&v) {
        return Err(format!("Cruise speed must be between {} and 5000 km/h, got {}", MIN_CRUISE_SPEED_KMH, v));
    }
    Ok(v)
}

fn parse_log_level(s: &str) -> Result<LevelFilter, String> {
    s.trim().parse().map_err(|_| format!("Invalid log level: {}", s))
}

fn parse_rows(s: &str) -> Result<u32, String> {
    let v: u32 = s.parse().map_err(|_| format!("Invalid integer: {}", s))?;
    if !(1..=100).contains(&v) {
        return Err(format!("Rows must be between 1 and 100, got {}", v));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint_airport_and_point() {
        assert!(matches!(parse_endpoint("lhr"), Ok(Endpoint::Airport(a)) if a.iata == "LHR"));
        let p = parse_endpoint("-33.9, 151.2").unwrap();
        assert_eq!(p, Endpoint::Point(Coordinate::new(-33.9, 151.2).unwrap()));
        assert_eq!(p.label(), "-33.9000, 151.2000");
    }

    #[test]
    fn test_parse_endpoint_errors() {
        assert!(parse_endpoint("XYZ").is_err());
        assert!(parse_endpoint("95,0").is_err());
        assert!(parse_endpoint("abc,0").is_err());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["sunside", "--from", "JFK", "--to", "LHR"]).unwrap();
        assert_eq!(args.segments, DEFAULT_SEGMENTS);
        assert_eq!(args.threshold, DEFAULT_FORE_AFT_THRESHOLD_DEG);
        assert_eq!(args.timezone, "origin");
        assert!(!args.json);
    }

    #[test]
    fn test_log_level_option() {
        let args =
            Args::try_parse_from(["sunside", "--from", "JFK", "--to", "LHR", "--log-level", "Debug"])
                .unwrap();
        assert_eq!(args.log_level, Some(LevelFilter::Debug));
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_args_range_checks() {
        let bad = ["sunside", "--from", "JFK", "--to", "LHR", "--threshold", "200"];
        assert!(Args::try_parse_from(bad).is_err());
        let bad = ["sunside", "--from", "JFK", "--to", "LHR", "--segments", "0"];
        assert!(Args::try_parse_from(bad).is_err());
        let bad = ["sunside", "--from", "JFK", "--to", "LHR", "--cruise-speed", "-5"];
        assert!(Args::try_parse_from(bad).is_err());
        let bad = ["sunside", "--from", "JFK", "--to", "LHR", "--cruise-speed", "0.000001"];
        assert!(Args::try_parse_from(bad).is_err());
    }
}
