//! River Level Profile - command line renderer
//!
//! Loads the station registry and produces the current level chart for one
//! station, either as an ECharts option document, a standalone HTML page or
//! an SVG image.
//!
//! Usage:
//!   level_profile list
//!   level_profile option H0001 --level 250 --pretty
//!   level_profile html H0001 -o chart.html
//!   level_profile svg H0001 --level 310 -o chart.svg
//!
//! Environment:
//!   LEVEL_PROFILE_STATIONS - registry path (default: stations.toml)
//!   RUST_LOG               - log filter (default: info)

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use level_profile::config::{self, StationRegistry};
use level_profile::model::LevelProfile;
use level_profile::{chart, profile, render};

#[derive(Debug, Parser)]
#[command(name = "level_profile", version, about = "River cross-section and current level chart")]
struct Cli {
    /// Station registry (.toml, or .json in the feed format)
    #[arg(long, global = true)]
    stations: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List stations in the registry
    List,
    /// Print the ECharts option document
    Option {
        #[command(flatten)]
        target: Target,
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Write a standalone HTML page
    Html {
        #[command(flatten)]
        target: Target,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render the chart to SVG
    Svg {
        #[command(flatten)]
        target: Target,
        /// Output file (default: <CODE>.svg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct Target {
    /// Station code
    code: String,
    /// Current level in cm (default: half the station offset)
    #[arg(long)]
    level: Option<f64>,
}

fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let path = cli.stations.unwrap_or_else(config::default_stations_path);
    let registry = config::load_registry(&path)
        .with_context(|| format!("loading station registry {}", path.display()))?;
    log::info!("📊 {} stations loaded from {}", registry.station.len(), path.display());

    match cli.command {
        Command::List => {
            for station in &registry.station {
                println!(
                    "{}\t{}\t{} samples\toffset {} cm",
                    station.code,
                    station.location,
                    station.x.len(),
                    station.offset
                );
            }
        }
        Command::Option { target, pretty } => {
            let (derived, title) = derive(&registry, &target)?;
            let option = chart::build_option(&derived, &title);
            let text = if pretty {
                serde_json::to_string_pretty(&option)?
            } else {
                option.to_string()
            };
            println!("{}", text);
        }
        Command::Html { target, output } => {
            let (derived, title) = derive(&registry, &target)?;
            let option = chart::build_option(&derived, &title);
            let html = chart::render_html(&option, &title, &registry.chart);
            match output {
                Some(out) => {
                    fs::write(&out, html).with_context(|| format!("writing {}", out.display()))?;
                    log::info!("✓ wrote {}", out.display());
                }
                None => print!("{}", html),
            }
        }
        Command::Svg { target, output } => {
            let (derived, title) = derive(&registry, &target)?;
            let out = output.unwrap_or_else(|| PathBuf::from(format!("{}.svg", derived.code)));
            render::write_svg(&out, &derived, &registry.chart, &title)
                .with_context(|| format!("rendering {}", out.display()))?;
            log::info!("✓ wrote {}", out.display());
        }
    }
    Ok(())
}

/// Looks up the station, derives its profile and builds the timestamped title.
fn derive(registry: &StationRegistry, target: &Target) -> Result<(LevelProfile, String)> {
    let station = registry.find(&target.code)?;
    let derived = profile::transform(station, target.level);

    if target.level.is_none() {
        log::warn!(
            "{}: no current level given, using {} cm (half the offset)",
            station.code,
            derived.level
        );
    }
    log::info!("{}: level {} cm is in zone {:?}", station.code, derived.level, derived.zone());

    let title = chart::title_for(&derived, &registry.chart, &Local::now());
    Ok((derived, title))
}
