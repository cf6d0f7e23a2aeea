/// Station registry loader - parses stations.toml
///
/// Separates station geometry and thresholds from code, so a new gauge or
/// a revised threshold is a config edit rather than a rebuild. The same
/// loader also reads the JSON shape of the upstream station feed.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{ProfileError, StationProfile};
use crate::profile;

/// Environment variable overriding the registry location.
pub const STATIONS_ENV: &str = "LEVEL_PROFILE_STATIONS";

/// Registry file used when nothing else is configured.
pub const DEFAULT_STATIONS_FILE: &str = "stations.toml";

/// Rendering settings shared by the option, HTML and SVG outputs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Script URL for the ECharts bundle in generated HTML pages.
    pub echarts_url: String,
    /// chrono format string for the timestamp in the chart title.
    pub timestamp_format: String,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 960,
            height: 500,
            echarts_url: "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js".to_string(),
            timestamp_format: "%d/%m/%Y %H:%M".to_string(),
        }
    }
}

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationRegistry {
    #[serde(default)]
    pub chart: ChartSettings,
    #[serde(default)]
    pub station: Vec<StationProfile>,
}

/// The feed delivers either one station object or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeedPayload {
    Many(Vec<StationProfile>),
    One(StationProfile),
}

impl StationRegistry {
    /// Looks up a station by code.
    pub fn find(&self, code: &str) -> Result<&StationProfile, ProfileError> {
        self.station
            .iter()
            .find(|s| s.code == code)
            .ok_or_else(|| ProfileError::StationNotFound(code.to_string()))
    }

    /// Station codes in file order.
    pub fn codes(&self) -> Vec<&str> {
        self.station.iter().map(|s| s.code.as_str()).collect()
    }

    /// Validates every station and rejects duplicate codes.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let mut seen = std::collections::HashSet::new();
        for station in &self.station {
            if !seen.insert(station.code.as_str()) {
                return Err(ProfileError::Config(format!(
                    "duplicate station code '{}'",
                    station.code
                )));
            }
            profile::validate(station).map_err(|e| {
                ProfileError::Config(format!("station '{}': {}", station.code, e))
            })?;
        }
        Ok(())
    }
}

/// Parses and validates a TOML registry.
pub fn parse_toml(contents: &str) -> Result<StationRegistry, ProfileError> {
    let registry: StationRegistry =
        toml::from_str(contents).map_err(|e| ProfileError::Config(e.to_string()))?;
    registry.validate()?;
    Ok(registry)
}

/// Parses and validates feed JSON (one station or an array), using default
/// chart settings.
pub fn parse_json(contents: &str) -> Result<StationRegistry, ProfileError> {
    let payload: FeedPayload =
        serde_json::from_str(contents).map_err(|e| ProfileError::Config(e.to_string()))?;
    let station = match payload {
        FeedPayload::Many(stations) => stations,
        FeedPayload::One(station) => vec![station],
    };
    let registry = StationRegistry {
        chart: ChartSettings::default(),
        station,
    };
    registry.validate()?;
    Ok(registry)
}

/// Loads a registry file. `.json` files are read as feed payloads,
/// anything else as TOML.
pub fn load_registry<P: AsRef<Path>>(path: P) -> Result<StationRegistry, ProfileError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        ProfileError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let registry = if is_json {
        parse_json(&contents)?
    } else {
        parse_toml(&contents)?
    };

    log::debug!(
        "loaded {} stations from {}",
        registry.station.len(),
        path.display()
    );
    Ok(registry)
}

/// Registry path from `LEVEL_PROFILE_STATIONS`, falling back to
/// `stations.toml` in the working directory.
pub fn default_stations_path() -> PathBuf {
    env::var(STATIONS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATIONS_FILE))
}
