//! Solar Position Calculation Module
//!
//! Where the sun stands for a location and instant, when it rises and sets, and
//! which side of a moving aircraft it falls on.
//!
//! The ephemeris itself sits behind the [`Ephemeris`] trait. Its raw output uses
//! the classic low-precision convention (radians, azimuth measured from South,
//! increasing westward); [`azimuth_south_to_north`] is the only place that
//! convention is converted.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use solar_positioning::{
    Horizon, spa,
    time::DeltaT,
    types::{RefractionCorrection, SunriseResult},
};

use crate::error::{Error, Result};
use crate::geo::Coordinate;

// ===================== CONSTANTS =====================

/// Sun within this many degrees of the heading counts as neither side
pub const DEFAULT_FORE_AFT_THRESHOLD_DEG: f64 = 15.0;

// ===================== TYPES =====================

/// Sun position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarPosition {
    /// Azimuth clockwise from North, [0, 360)
    pub azimuth: f64,
    /// Altitude above (+) or below (-) the horizon
    pub altitude: f64,
}

impl SolarPosition {
    pub fn is_above_horizon(&self) -> bool {
        self.altitude > 0.0
    }
}

/// Ephemeris output in its native convention: radians, azimuth measured from
/// South and increasing toward the West.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSolarPosition {
    pub azimuth: f64,
    pub altitude: f64,
}

/// Shape of a day at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    Regular,
    /// Sun stays up (midnight sun)
    PolarDay,
    /// Sun stays down
    PolarNight,
}

/// Sunrise, sunset and transit for one UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub solar_noon: DateTime<Utc>,
    pub kind: DayKind,
}

impl SunTimes {
    /// Length of daylight, or None if either event is missing.
    pub fn daylight(&self) -> Option<Duration> {
        Some(self.sunset? - self.sunrise?)
    }
}

/// Aircraft side the sun falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenicSide {
    Left,
    Right,
    /// Sun roughly on the nose
    None,
}

impl fmt::Display for ScenicSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScenicSide::Left => "left",
            ScenicSide::Right => "right",
            ScenicSide::None => "none",
        })
    }
}

// ===================== EPHEMERIS =====================

/// A solar ephemeris: position of the sun and the day's rise/set solver.
pub trait Ephemeris {
    /// Raw sun position at `instant` as seen from `location`.
    fn raw_position(&self, instant: DateTime<Utc>, location: Coordinate) -> Result<RawSolarPosition>;

    /// Sunrise, sunset and transit for the UTC calendar `day`.
    fn sun_times(&self, day: NaiveDate, location: Coordinate) -> Result<SunTimes>;
}

/// Ephemeris backed by the NREL SPA implementation in `solar_positioning`.
///
/// Observer sits at `elevation_m` with standard atmospheric refraction unless
/// configured otherwise.
#[derive(Clone, Copy)]
pub struct SpaEphemeris {
    /// Observer elevation in meters
    pub elevation_m: f64,
    /// Atmospheric refraction correction
    pub refraction: Option<RefractionCorrection>,
}

impl Default for SpaEphemeris {
    fn default() -> Self {
        Self { elevation_m: 0.0, refraction: Some(RefractionCorrection::standard()) }
    }
}

impl SpaEphemeris {
    fn delta_t(year: i32, month: u32) -> Result<f64> {
        DeltaT::estimate_from_date(year, month).map_err(|e| Error::Ephemeris(e.to_string()))
    }
}

impl Ephemeris for SpaEphemeris {
    fn raw_position(&self, instant: DateTime<Utc>, location: Coordinate) -> Result<RawSolarPosition> {
        let delta_t = Self::delta_t(instant.year(), instant.month())?;
        let pos = spa::solar_position(
            instant,
            location.lat(),
            location.lon(),
            self.elevation_m,
            delta_t,
            self.refraction,
        )
        .map_err(|e| Error::Ephemeris(e.to_string()))?;

        // SPA reports azimuth clockwise from North; re-express it from South, westward
        let from_south = pos.azimuth() - 180.0;
        Ok(RawSolarPosition {
            azimuth: from_south.to_radians(),
            altitude: pos.elevation_angle().to_radians(),
        })
    }

    fn sun_times(&self, day: NaiveDate, location: Coordinate) -> Result<SunTimes> {
        let delta_t = Self::delta_t(day.year(), day.month())?;
        let midnight = day
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| Error::invalid(format!("no midnight on {day}")))?
            .and_utc();

        let res = spa::sunrise_sunset_for_horizon(
            midnight,
            location.lat(),
            location.lon(),
            delta_t,
            Horizon::SunriseSunset,
        )
        .map_err(|e| Error::Ephemeris(e.to_string()))?;

        Ok(match res {
            SunriseResult::RegularDay { sunrise, transit, sunset } => SunTimes {
                sunrise: Some(sunrise),
                sunset: Some(sunset),
                solar_noon: transit,
                kind: DayKind::Regular,
            },
            SunriseResult::AllDay { transit } => {
                log::debug!("polar day at {:?} on {}", location, day);
                SunTimes { sunrise: None, sunset: None, solar_noon: transit, kind: DayKind::PolarDay }
            }
            SunriseResult::AllNight { transit } => {
                log::debug!("polar night at {:?} on {}", location, day);
                SunTimes {
                    sunrise: None,
                    sunset: None,
                    solar_noon: transit,
                    kind: DayKind::PolarNight,
                }
            }
        })
    }
}

// ===================== CONVERSIONS =====================

/// Convert a raw azimuth (radians, from South, increasing westward) to the
/// North-referenced degrees every other part of the crate uses.
///
/// `(90 - raw_deg + 360) mod 360`: raw 0 gives 90, raw 90° gives 0.
pub fn azimuth_south_to_north(raw_azimuth_rad: f64) -> f64 {
    normalize_degrees(90.0 - raw_azimuth_rad.to_degrees() + 360.0)
}

/// Wrap an angle into [0, 360).
fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    // rem_euclid of a tiny negative rounds to exactly 360.0
    if d >= 360.0 { 0.0 } else { d }
}

// ===================== SUN POSITION & TIMES =====================

/// Sun position at `location` and `instant` using the default SPA ephemeris.
pub fn sun_position(location: Coordinate, instant: DateTime<Utc>) -> Result<SolarPosition> {
    sun_position_with(&SpaEphemeris::default(), location, instant)
}

/// Sun position from any [`Ephemeris`].
///
/// # Errors
/// `Ephemeris` if the backend fails or returns non-finite angles
pub fn sun_position_with<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    location: Coordinate,
    instant: DateTime<Utc>,
) -> Result<SolarPosition> {
    let raw = ephemeris.raw_position(instant, location)?;
    if !raw.azimuth.is_finite() || !raw.altitude.is_finite() {
        return Err(Error::Ephemeris(format!("non-finite sun position at {instant}")));
    }
    Ok(SolarPosition { azimuth: azimuth_south_to_north(raw.azimuth), altitude: raw.altitude.to_degrees() })
}

/// Sunrise and sunset on the UTC calendar day containing `instant`.
pub fn sun_times(location: Coordinate, instant: DateTime<Utc>) -> Result<SunTimes> {
    sun_times_with(&SpaEphemeris::default(), location, instant)
}

pub fn sun_times_with<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    location: Coordinate,
    instant: DateTime<Utc>,
) -> Result<SunTimes> {
    ephemeris.sun_times(instant.date_naive(), location)
}

// ===================== SCENIC SIDE =====================

/// Signed angle from the heading to the sun, in [-180, 180).
/// Positive means the sun is to the right.
pub fn relative_sun_angle(heading_deg: f64, sun_azimuth_deg: f64) -> f64 {
    (sun_azimuth_deg - heading_deg + 540.0).rem_euclid(360.0) - 180.0
}

/// Decision rule mapping heading and sun azimuth to a window side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideRule {
    /// Sun within this angle of the heading gives [`ScenicSide::None`]
    pub fore_aft_threshold_deg: f64,
}

impl Default for SideRule {
    fn default() -> Self {
        Self { fore_aft_threshold_deg: DEFAULT_FORE_AFT_THRESHOLD_DEG }
    }
}

impl SideRule {
    /// # Errors
    /// `InvalidArgument` unless the threshold is finite and within [0, 180)
    pub fn new(fore_aft_threshold_deg: f64) -> Result<Self> {
        if !fore_aft_threshold_deg.is_finite() || !(0.0..180.0).contains(&fore_aft_threshold_deg) {
            return Err(Error::invalid(format!(
                "fore/aft threshold must be within [0, 180) degrees, got {fore_aft_threshold_deg}"
            )));
        }
        Ok(Self { fore_aft_threshold_deg })
    }

    /// Side of the aircraft the sun is on. Non-finite input yields `None`.
    pub fn classify(&self, heading_deg: f64, sun_azimuth_deg: f64) -> ScenicSide {
        let diff = relative_sun_angle(heading_deg, sun_azimuth_deg);
        if !diff.is_finite() || diff.abs() < self.fore_aft_threshold_deg {
            ScenicSide::None
        } else if diff > 0.0 {
            ScenicSide::Right
        } else {
            ScenicSide::Left
        }
    }
}

/// [`SideRule::classify`] with the default 15° fore/aft threshold.
pub fn scenic_side(heading_deg: f64, sun_azimuth_deg: f64) -> ScenicSide {
    SideRule::default().classify(heading_deg, sun_azimuth_deg)
}

// ===================== TESTS =====================
