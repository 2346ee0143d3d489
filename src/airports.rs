//! Built-in Airport Table
//!
//! A short curated list of major airports so routes can be named by IATA code.

use chrono_tz::Tz;
use serde::Serialize;

use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Airport {
    pub iata: &'static str,
    pub city: &'static str,
    pub country: &'static str,
    pub lat: f64,
    pub lon: f64,
    /// IANA timezone name
    pub tz: &'static str,
}

impl Airport {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::from_trusted(self.lat, self.lon)
    }

    pub fn timezone(&self) -> Tz {
        self.tz.parse().unwrap_or(Tz::UTC)
    }

    /// "New York (JFK)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.city, self.iata)
    }
}

#[rustfmt::skip]
pub const AIRPORTS: &[Airport] = &[
    Airport { iata: "JFK", city: "New York",      country: "USA",          lat: 40.6413,  lon: -73.7781,  tz: "America/New_York" },
    Airport { iata: "LAX", city: "Los Angeles",   country: "USA",          lat: 33.9416,  lon: -118.4085, tz: "America/Los_Angeles" },
    Airport { iata: "SFO", city: "San Francisco", country: "USA",          lat: 37.6213,  lon: -122.3790, tz: "America/Los_Angeles" },
    Airport { iata: "ORD", city: "Chicago",       country: "USA",          lat: 41.9742,  lon: -87.9073,  tz: "America/Chicago" },
    Airport { iata: "LHR", city: "London",        country: "UK",           lat: 51.4700,  lon: -0.4543,   tz: "Europe/London" },
    Airport { iata: "CDG", city: "Paris",         country: "France",       lat: 49.0097,  lon: 2.5479,    tz: "Europe/Paris" },
    Airport { iata: "HND", city: "Tokyo",         country: "Japan",        lat: 35.5494,  lon: 139.7798,  tz: "Asia/Tokyo" },
    Airport { iata: "SYD", city: "Sydney",        country: "Australia",    lat: -33.9399, lon: 151.1753,  tz: "Australia/Sydney" },
    Airport { iata: "DXB", city: "Dubai",         country: "UAE",          lat: 25.2532,  lon: 55.3657,   tz: "Asia/Dubai" },
    Airport { iata: "SIN", city: "Singapore",     country: "Singapore",    lat: 1.3644,   lon: 103.9915,  tz: "Asia/Singapore" },
    Airport { iata: "DEL", city: "Delhi",         country: "India",        lat: 28.5562,  lon: 77.1000,   tz: "Asia/Kolkata" },
    Airport { iata: "GRU", city: "São Paulo",     country: "Brazil",       lat: -23.4356, lon: -46.4731,  tz: "America/Sao_Paulo" },
    Airport { iata: "JNB", city: "Johannesburg",  country: "South Africa", lat: -26.1392, lon: 28.2460,   tz: "Africa/Johannesburg" },
    Airport { iata: "YYZ", city: "Toronto",       country: "Canada",       lat: 43.6777,  lon: -79.6248,  tz: "America/Toronto" },
    Airport { iata: "KEF", city: "Reykjavík",     country: "Iceland",      lat: 63.9850,  lon: -22.6056,  tz: "Atlantic/Reykjavik" },
];

/// Case-insensitive lookup by IATA code.
pub fn find_by_iata(code: &str) -> Option<&'static Airport> {
    let code = code.trim();
    AIRPORTS.iter().find(|a| a.iata.eq_ignore_ascii_case(code))
}
