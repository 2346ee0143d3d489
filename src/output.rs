//! Output Formatting Module
//!
//! Provides formatting functions for terminal and JSON output of a route plan.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use sunside::route::{RoutePlan, RouteSample};
use sunside::seats::{self, SeatMap};
use sunside::solar::{DayKind, ScenicSide, SolarPosition};
use sunside::time::format_hm;

/// Golden seats listed before the terminal report abbreviates
const MAX_LISTED_SEATS: usize = 8;

/// Everything the binary reports about one route.
#[derive(Serialize)]
pub struct Report<'a> {
    pub from: String,
    pub to: String,
    #[serde(flatten)]
    pub plan: &'a RoutePlan,
    pub timeline: &'a [RouteSample],
    pub dominant_side: ScenicSide,
    pub golden_seats: Vec<String>,
    pub recommendation: &'static str,
    #[serde(skip)]
    pub tz: Tz,
}

impl<'a> Report<'a> {
    pub fn new(
        from: String,
        to: String,
        plan: &'a RoutePlan,
        timeline: &'a [RouteSample],
        seat_map: &SeatMap,
        tz: Tz,
    ) -> Self {
        let dominant_side =
            if timeline.is_empty() { plan.scenic_side } else { sunside::route::dominant_side(timeline) };
        Self {
            from,
            to,
            plan,
            timeline,
            dominant_side,
            golden_seats: seat_map.golden_seat_ids(plan.scenic_side),
            recommendation: seats::recommendation(plan.scenic_side),
            tz,
        }
    }
}

// ===================== JSON OUTPUT =====================

pub fn print_json(report: &Report) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

// ===================== TERMINAL OUTPUT =====================

fn local(t: DateTime<Utc>, tz: Tz) -> String {
    t.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z").to_string()
}

fn describe_sun(pos: &SolarPosition) -> String {
    let state = if pos.is_above_horizon() { "above horizon" } else { "below horizon" };
    format!("az {:6.2}° alt {:6.2}° ({})", pos.azimuth, pos.altitude, state)
}

/// Print the route report for a terminal.
///
/// # Arguments
/// * `report` - Route plan with seats and optional timeline
/// * `show_arc` - Also list every sampled arc point
pub fn print_route(report: &Report, show_arc: bool) {
    let plan = report.plan;
    let tz = report.tz;

    println!("Route       : {} -> {}", report.from, report.to);
    println!("Distance    : {:.0} km", plan.distance_km);
    println!("Heading     : {:7.2}° (initial)", plan.initial_bearing_deg);
    if let Some(amb) = plan.ambiguity {
        println!("  Note      : endpoints are {:?}, heading is a convention", amb);
    }
    println!("Departure   : {}", local(plan.departure, tz));
    println!(
        "Arrival     : {} (est. {})",
        local(plan.arrival, tz),
        format_hm(plan.estimated_duration())
    );

    println!();
    println!("=== Sun at Departure ===");
    println!("Position    : {}", describe_sun(&plan.sun));
    let times = &plan.sun_times;
    match times.kind {
        DayKind::Regular => {
            if let Some(sr) = times.sunrise {
                println!("Sunrise     : {}", local(sr, tz));
            }
            println!("Solar noon  : {}", local(times.solar_noon, tz));
            if let Some(ss) = times.sunset {
                println!("Sunset      : {}", local(ss, tz));
            }
            if let Some(len) = times.daylight() {
                println!("Daylight    : {}", format_hm(len));
            }
        }
        DayKind::PolarDay => println!("Polar Day (Midnight Sun)."),
        DayKind::PolarNight => println!("Polar Night."),
    }

    println!();
    println!("=== Seating ===");
    println!("Scenic side : {}", plan.scenic_side);
    if !report.timeline.is_empty() {
        println!("En route    : {} (most daylight samples)", report.dominant_side);
    }
    let listed: Vec<&str> =
        report.golden_seats.iter().take(MAX_LISTED_SEATS).map(String::as_str).collect();
    let more = report.golden_seats.len().saturating_sub(MAX_LISTED_SEATS);
    if more > 0 {
        println!("Golden seats: {} (+{} more)", listed.join(" "), more);
    } else {
        println!("Golden seats: {}", listed.join(" "));
    }
    println!("Advice      : {}", report.recommendation);

    if !report.timeline.is_empty() {
        print_timeline(report.timeline, tz);
    }
    if show_arc {
        print_arc(plan);
    }
}

fn print_timeline(timeline: &[RouteSample], tz: Tz) {
    println!();
    println!("=== Along the Route ===");
    for s in timeline {
        println!(
            "{:4.0}%  {}  {:8.3}, {:9.3}  hdg {:6.1}°  sun {:6.1}°/{:5.1}°  {}",
            s.fraction * 100.0,
            s.instant.with_timezone(&tz).format("%H:%M"),
            s.position.lat(),
            s.position.lon(),
            s.heading_deg,
            s.sun.azimuth,
            s.sun.altitude,
            s.side
        );
    }
}

fn print_arc(plan: &RoutePlan) {
    println!();
    println!("=== Great-Circle Arc ({} points) ===", plan.arc.len());
    for (i, p) in plan.arc.iter().enumerate() {
        println!("{:4}  {:9.4}, {:10.4}", i, p.lat(), p.lon());
    }
}
