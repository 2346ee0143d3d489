use chrono::Utc;
use chrono_tz::Tz;
use clap::Parser;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

use sunside::route::{self, RouteParams};
use sunside::seats::SeatMap;
use sunside::solar::SideRule;
use sunside::time::{parse_departure, resolve_timezone, system_timezone};

mod cli;
mod output;

use cli::{Args, Endpoint};
use output::Report;

// ===================== MAIN =====================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose, args.log_level)?;
    log::debug!("Parsed arguments: {args:?}");

    let tz = select_timezone(&args.timezone, &args.from)?;
    let departure = parse_departure(&args.departure, tz, Utc::now())?;
    log::debug!("departure resolved to {} ({})", departure, tz);

    let params = RouteParams {
        segments: args.segments,
        cruise_speed_kmh: args.cruise_speed,
        side_rule: SideRule::new(args.threshold)?,
    };
    let plan = route::plan_route(args.from.coordinate(), args.to.coordinate(), departure, &params)?;

    let timeline = if args.timeline > 0 { route::side_timeline(&plan, args.timeline)? } else { Vec::new() };
    let seat_map = SeatMap::narrow_body(args.rows);
    let report = Report::new(args.from.label(), args.to.label(), &plan, &timeline, &seat_map, tz);

    if args.json {
        output::print_json(&report)?;
    } else {
        output::print_route(&report, args.show_arc);
    }
    Ok(())
}

fn init_logging(verbose: u8, explicit: Option<LevelFilter>) -> Result<(), Box<dyn std::error::Error>> {
    let level = explicit.unwrap_or(match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    });
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    // Stderr only so --json output stays parseable
    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)?;
    Ok(())
}

/// Time zone for displaying local times.
///
/// "origin" uses the origin airport's zone, or a coordinate lookup for a bare point.
fn select_timezone(name: &str, origin: &Endpoint) -> Result<Tz, String> {
    match name {
        "origin" => Ok(match origin {
            Endpoint::Airport(a) => a.timezone(),
            Endpoint::Point(c) => resolve_timezone(c.lon(), c.lat()),
        }),
        "utc" | "UTC" => Ok(Tz::UTC),
        "system" => Ok(system_timezone()),
        other => other.parse().map_err(|_| format!("Unknown time zone: {other}")),
    }
}
