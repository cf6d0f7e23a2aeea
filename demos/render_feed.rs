/// Example: Render a station from the upstream feed JSON to SVG
///
/// Usage:
///   cargo run --example render_feed -- <feed.json> [level_cm]
///
/// The feed file holds one station object or an array of them, using the
/// feed's field names (codigo, ubicacion, umbral_amarillo, ...). Each station
/// is validated, derived and written to <codigo>.svg. Shows:
///   - threshold band heights
///   - the alert zone of the level
///   - the option document size for the browser renderer

use chrono::Local;
use level_profile::config::parse_json;
use level_profile::{chart, profile, render};
use std::env;
use std::fs;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <feed.json> [level_cm]", args[0]);
        std::process::exit(1);
    }

    let filename = &args[1];
    let level: Option<f64> = args.get(2).and_then(|s| s.parse().ok());

    let text = fs::read_to_string(filename).expect("Failed to read feed file");
    let registry = match parse_json(&text) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    println!("✓ Parsed {} stations from {}\n", registry.station.len(), filename);

    for station in &registry.station {
        let derived = profile::transform(station, level);
        let s = &derived.segments;

        println!("{} - {}", derived.code, derived.location);
        println!("   Level:   {} cm ({:?})", derived.level, derived.zone());
        println!(
            "   Bands:   safe {} / yellow {} / orange {} / red {} cm",
            s.safe, s.yellow_band, s.orange_band, s.red_band
        );

        let title = chart::title_for(&derived, &registry.chart, &Local::now());
        let option = chart::build_option(&derived, &title);
        println!("   Option:  {} bytes", option.to_string().len());

        let out = format!("{}.svg", derived.code);
        match render::write_svg(&out, &derived, &registry.chart, &title) {
            Ok(()) => println!("   ✓ Wrote {}\n", out),
            Err(e) => eprintln!("   ✗ {}\n", e),
        }
    }
}
