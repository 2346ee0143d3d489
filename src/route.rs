//! Route Planning Module
//!
//! Combines the geometry and solar calculations into one plan for a flight:
//! distance, heading, sampled arc, sun at departure and the scenic side.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::geo::{self, AmbiguousGeometry, Coordinate, GreatCircle};
use crate::solar::{
    self, Ephemeris, ScenicSide, SideRule, SolarPosition, SpaEphemeris, SunTimes,
};

// ===================== CONSTANTS =====================

/// Arc resolution used for drawing a route
pub const DEFAULT_SEGMENTS: usize = 128;

/// Assumed cruise ground speed for duration estimates (km/h)
pub const DEFAULT_CRUISE_SPEED_KMH: f64 = 880.0;

/// Slowest cruise speed accepted (km/h); keeps arrival times representable
pub const MIN_CRUISE_SPEED_KMH: f64 = 50.0;

// ===================== TYPES =====================

/// Tunables for [`plan_route`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteParams {
    /// Arc segments; the arc has one more point than this
    pub segments: usize,
    pub cruise_speed_kmh: f64,
    pub side_rule: SideRule,
}

impl Default for RouteParams {
    fn default() -> Self {
        Self {
            segments: DEFAULT_SEGMENTS,
            cruise_speed_kmh: DEFAULT_CRUISE_SPEED_KMH,
            side_rule: SideRule::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub departure: DateTime<Utc>,
    /// Departure plus the cruise-speed estimate
    pub arrival: DateTime<Utc>,
    pub distance_km: f64,
    pub initial_bearing_deg: f64,
    /// Set for coincident or antipodal endpoints
    pub ambiguity: Option<AmbiguousGeometry>,
    /// Sun at the origin at departure
    pub sun: SolarPosition,
    pub scenic_side: ScenicSide,
    pub sun_times: SunTimes,
    pub arc: Vec<Coordinate>,
    #[serde(skip)]
    pub side_rule: SideRule,
}

impl RoutePlan {
    pub fn estimated_duration(&self) -> Duration {
        self.arrival - self.departure
    }
}

/// Scenic side re-evaluated at one point along the route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteSample {
    /// 0 at the origin, 1 at the destination
    pub fraction: f64,
    pub position: Coordinate,
    /// Estimated time the aircraft passes `position`
    pub instant: DateTime<Utc>,
    pub heading_deg: f64,
    pub sun: SolarPosition,
    pub side: ScenicSide,
}

// ===================== PLANNING =====================

/// Flight time at a constant ground speed.
///
/// # Errors
/// `InvalidArgument` for a speed below [`MIN_CRUISE_SPEED_KMH`] or non-finite, or a
/// negative distance
pub fn estimate_duration(distance_km: f64, cruise_speed_kmh: f64) -> Result<Duration> {
    if !cruise_speed_kmh.is_finite() || cruise_speed_kmh < MIN_CRUISE_SPEED_KMH {
        return Err(Error::invalid(format!(
            "cruise speed must be at least {MIN_CRUISE_SPEED_KMH} km/h, got {cruise_speed_kmh}"
        )));
    }
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(Error::invalid(format!("distance must be non-negative, got {distance_km}")));
    }
    let ms = (distance_km / cruise_speed_kmh * 3_600_000.0).round();
    if !ms.is_finite() || ms >= i64::MAX as f64 {
        return Err(Error::invalid(format!("flight time of {ms} ms is out of range")));
    }
    Duration::try_milliseconds(ms as i64)
        .ok_or_else(|| Error::invalid(format!("flight time of {ms} ms is out of range")))
}

/// Plan a route with the default SPA ephemeris.
pub fn plan_route(
    origin: Coordinate,
    destination: Coordinate,
    departure: DateTime<Utc>,
    params: &RouteParams,
) -> Result<RoutePlan> {
    plan_route_with(&SpaEphemeris::default(), origin, destination, departure, params)
}

/// Plan a route against any [`Ephemeris`].
///
/// Coincident endpoints have no heading, so their scenic side is always `None`.
pub fn plan_route_with<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    origin: Coordinate,
    destination: Coordinate,
    departure: DateTime<Utc>,
    params: &RouteParams,
) -> Result<RoutePlan> {
    let arc = geo::sample_great_circle(origin, destination, params.segments)?;
    let distance_km = geo::distance_km(origin, destination);
    let duration = estimate_duration(distance_km, params.cruise_speed_kmh)?;
    let arrival = departure
        .checked_add_signed(duration)
        .ok_or_else(|| Error::invalid(format!("arrival after {departure} is out of range")))?;
    let initial_bearing_deg = geo::initial_bearing(origin, destination);
    let ambiguity = geo::ambiguity(origin, destination);

    let sun = solar::sun_position_with(ephemeris, origin, departure)?;
    let sun_times = solar::sun_times_with(ephemeris, origin, departure)?;
    let scenic_side = side_for(ambiguity, &params.side_rule, initial_bearing_deg, sun);

    log::debug!(
        "route {:?} -> {:?}: {:.1} km, bearing {:.1}°, sun az {:.1}° alt {:.1}°, side {}",
        origin,
        destination,
        distance_km,
        initial_bearing_deg,
        sun.azimuth,
        sun.altitude,
        scenic_side
    );

    Ok(RoutePlan {
        origin,
        destination,
        departure,
        arrival,
        distance_km,
        initial_bearing_deg,
        ambiguity,
        sun,
        scenic_side,
        sun_times,
        arc,
        side_rule: params.side_rule,
    })
}

fn side_for(
    ambiguity: Option<AmbiguousGeometry>,
    rule: &SideRule,
    heading_deg: f64,
    sun: SolarPosition,
) -> ScenicSide {
    if ambiguity == Some(AmbiguousGeometry::Coincident) {
        return ScenicSide::None;
    }
    rule.classify(heading_deg, sun.azimuth)
}

// ===================== TIMELINE =====================

/// Scenic side at `samples + 1` evenly spaced points of the route.
pub fn side_timeline(plan: &RoutePlan, samples: usize) -> Result<Vec<RouteSample>> {
    side_timeline_with(&SpaEphemeris::default(), plan, samples)
}

/// Like [`side_timeline`] with an explicit ephemeris.
///
/// Each point uses the local heading toward the destination and the sun at the
/// estimated passage time. The last point uses the final course of the arc.
///
/// # Errors
/// `InvalidArgument` when `samples` is zero
pub fn side_timeline_with<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    plan: &RoutePlan,
    samples: usize,
) -> Result<Vec<RouteSample>> {
    if samples == 0 {
        return Err(Error::invalid("timeline needs at least 1 sample interval"));
    }

    let circle = GreatCircle::new(plan.origin, plan.destination);
    let duration_ms = plan.estimated_duration().num_milliseconds() as f64;
    let final_course = (geo::initial_bearing(plan.destination, plan.origin) + 180.0) % 360.0;

    (0..=samples)
        .map(|i| {
            let fraction = i as f64 / samples as f64;
            let position = match i {
                0 => plan.origin,
                i if i == samples => plan.destination,
                _ => circle.point_at(fraction),
            };
            let heading_deg =
                if i == samples { final_course } else { geo::initial_bearing(position, plan.destination) };
            let offset = Duration::milliseconds((duration_ms * fraction).round() as i64);
            let instant = plan
                .departure
                .checked_add_signed(offset)
                .ok_or_else(|| Error::invalid(format!("passage time at {fraction} is out of range")))?;
            let sun = solar::sun_position_with(ephemeris, position, instant)?;
            let side = side_for(plan.ambiguity, &plan.side_rule, heading_deg, sun);
            Ok(RouteSample { fraction, position, instant, heading_deg, sun, side })
        })
        .collect()
}

/// Side the sun is on for most of the daylight samples, `None` on a tie or when
/// the whole flight is dark.
pub fn dominant_side(timeline: &[RouteSample]) -> ScenicSide {
    let lit = timeline.iter().filter(|s| s.sun.is_above_horizon());
    let (left, right) = lit.fold((0usize, 0usize), |(l, r), s| match s.side {
        ScenicSide::Left => (l + 1, r),
        ScenicSide::Right => (l, r + 1),
        ScenicSide::None => (l, r),
    });
    match left.cmp(&right) {
        std::cmp::Ordering::Greater => ScenicSide::Left,
        std::cmp::Ordering::Less => ScenicSide::Right,
        std::cmp::Ordering::Equal => ScenicSide::None,
    }
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solar::{DayKind, RawSolarPosition};
    use chrono::{NaiveDate, TimeZone};

    /// Ephemeris whose converted azimuth is always `azimuth_deg` and altitude 30°.
    struct FixedSun {
        azimuth_deg: f64,
    }

    impl Ephemeris for FixedSun {
        fn raw_position(&self, _: DateTime<Utc>, _: Coordinate) -> Result<RawSolarPosition> {
            // Inverse of the South-referenced conversion
            Ok(RawSolarPosition {
                azimuth: (90.0 - self.azimuth_deg).to_radians(),
                altitude: 30f64.to_radians(),
            })
        }

        fn sun_times(&self, day: NaiveDate, _: Coordinate) -> Result<SunTimes> {
            let noon = Utc.from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap());
            Ok(SunTimes { sunrise: None, sunset: None, solar_noon: noon, kind: DayKind::PolarDay })
        }
    }

    fn jfk() -> Coordinate {
        Coordinate::new(40.6413, -73.7781).unwrap()
    }

    fn lhr() -> Coordinate {
        Coordinate::new(51.4700, -0.4543).unwrap()
    }

    fn departure() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 21, 22, 30, 0).unwrap()
    }

    #[test]
    fn test_estimate_duration() {
        assert_eq!(estimate_duration(880.0, 880.0).unwrap(), Duration::hours(1));
        assert_eq!(estimate_duration(0.0, 880.0).unwrap(), Duration::zero());
        assert!(estimate_duration(100.0, 0.0).is_err());
        assert!(estimate_duration(100.0, 1e-6).is_err());
        assert!(estimate_duration(100.0, MIN_CRUISE_SPEED_KMH - 1.0).is_err());
        assert!(estimate_duration(f64::MAX, MIN_CRUISE_SPEED_KMH).is_err());
        assert!(estimate_duration(100.0, f64::NAN).is_err());
        assert!(estimate_duration(-1.0, 880.0).is_err());
    }

    #[test]
    fn test_plan_route_fields() {
        let eph = FixedSun { azimuth_deg: 150.0 };
        let plan = plan_route_with(&eph, jfk(), lhr(), departure(), &RouteParams::default()).unwrap();

        assert_eq!(plan.arc.len(), DEFAULT_SEGMENTS + 1);
        assert!((plan.initial_bearing_deg - 51.0).abs() < 1.0);
        assert!((plan.sun.azimuth - 150.0).abs() < 1e-9);
        // Sun ~99° right of a ~51° heading
        assert_eq!(plan.scenic_side, ScenicSide::Right);
        assert!(plan.ambiguity.is_none());

        let hours = plan.estimated_duration().num_seconds() as f64 / 3600.0;
        assert!((hours - plan.distance_km / DEFAULT_CRUISE_SPEED_KMH).abs() < 1e-3);
    }

    #[test]
    fn test_plan_route_left_side() {
        let eph = FixedSun { azimuth_deg: 320.0 };
        let plan = plan_route_with(&eph, jfk(), lhr(), departure(), &RouteParams::default()).unwrap();
        assert_eq!(plan.scenic_side, ScenicSide::Left);
    }

    #[test]
    fn test_plan_route_custom_threshold() {
        let eph = FixedSun { azimuth_deg: 80.0 };
        let narrow = plan_route_with(&eph, jfk(), lhr(), departure(), &RouteParams::default()).unwrap();
        assert_eq!(narrow.scenic_side, ScenicSide::Right);

        let params = RouteParams { side_rule: SideRule::new(40.0).unwrap(), ..RouteParams::default() };
        let wide = plan_route_with(&eph, jfk(), lhr(), departure(), &params).unwrap();
        assert_eq!(wide.scenic_side, ScenicSide::None);
    }

    #[test]
    fn test_plan_route_coincident_has_no_side() {
        let eph = FixedSun { azimuth_deg: 90.0 };
        let plan = plan_route_with(&eph, lhr(), lhr(), departure(), &RouteParams::default()).unwrap();
        assert_eq!(plan.ambiguity, Some(AmbiguousGeometry::Coincident));
        assert_eq!(plan.scenic_side, ScenicSide::None);
        assert_eq!(plan.distance_km, 0.0);
        assert_eq!(plan.arrival, plan.departure);
    }

    #[test]
    fn test_plan_route_rejects_bad_params() {
        let eph = FixedSun { azimuth_deg: 90.0 };
        let zero = RouteParams { segments: 0, ..RouteParams::default() };
        assert!(matches!(
            plan_route_with(&eph, jfk(), lhr(), departure(), &zero),
            Err(Error::InvalidArgument(_))
        ));
        let stalled = RouteParams { cruise_speed_kmh: 0.0, ..RouteParams::default() };
        assert!(plan_route_with(&eph, jfk(), lhr(), departure(), &stalled).is_err());
        let crawling = RouteParams { cruise_speed_kmh: 1e-6, ..RouteParams::default() };
        assert!(matches!(
            plan_route_with(&eph, jfk(), lhr(), departure(), &crawling),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_plan_route_arrival_out_of_range() {
        let eph = FixedSun { azimuth_deg: 90.0 };
        let late = DateTime::<Utc>::MAX_UTC - Duration::minutes(1);
        let r = plan_route_with(&eph, jfk(), lhr(), late, &RouteParams::default());
        assert!(matches!(r, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_plan_route_idempotent_with_spa() {
        let params = RouteParams::default();
        let a = plan_route(jfk(), lhr(), departure(), &params).unwrap();
        let b = plan_route(jfk(), lhr(), departure(), &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_side_timeline_shape() {
        let eph = FixedSun { azimuth_deg: 150.0 };
        let plan = plan_route_with(&eph, jfk(), lhr(), departure(), &RouteParams::default()).unwrap();
        let timeline = side_timeline_with(&eph, &plan, 8).unwrap();

        assert_eq!(timeline.len(), 9);
        assert_eq!(timeline[0].position, jfk());
        assert_eq!(timeline[8].position, lhr());
        assert_eq!(timeline[0].instant, plan.departure);
        assert_eq!(timeline[8].instant, plan.arrival);
        assert!((timeline[0].heading_deg - plan.initial_bearing_deg).abs() < 1e-9);
        // Eastbound great circle turns toward the south-east as it nears London
        assert!(timeline[8].heading_deg > timeline[0].heading_deg);
        assert!(timeline.windows(2).all(|w| w[0].instant <= w[1].instant));
    }

    #[test]
    fn test_side_timeline_rejects_zero_samples() {
        let eph = FixedSun { azimuth_deg: 150.0 };
        let plan = plan_route_with(&eph, jfk(), lhr(), departure(), &RouteParams::default()).unwrap();
        assert!(side_timeline_with(&eph, &plan, 0).is_err());
    }

    #[test]
    fn test_dominant_side() {
        let eph = FixedSun { azimuth_deg: 150.0 };
        let plan = plan_route_with(&eph, jfk(), lhr(), departure(), &RouteParams::default()).unwrap();
        let timeline = side_timeline_with(&eph, &plan, 4).unwrap();
        assert_eq!(dominant_side(&timeline), ScenicSide::Right);
        assert_eq!(dominant_side(&[]), ScenicSide::None);
    }

    #[test]
    fn test_plan_serializes() {
        let eph = FixedSun { azimuth_deg: 150.0 };
        let params = RouteParams { segments: 2, ..RouteParams::default() };
        let plan = plan_route_with(&eph, jfk(), lhr(), departure(), &params).unwrap();
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["scenic_side"], "right");
        assert_eq!(json["arc"].as_array().unwrap().len(), 3);
        assert!(json.get("side_rule").is_none());
    }
}
