/// StationProfile, PlottedPoint, ThresholdSegments, AlertZone, ProfileError
///
/// Core data types for the river level profile chart.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond small accessors, and no I/O.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Bed elevations arrive in meters; the level axis is in centimeters.
pub const CM_PER_METER: f64 = 100.0;

/// Number of tick intervals on the level axis.
pub const LEVEL_AXIS_DIVISIONS: f64 = 5.0;

// ---------------------------------------------------------------------------
// Station types
// ---------------------------------------------------------------------------

/// Cross-section geometry and alert thresholds for a single gauge station.
///
/// `x` and `y` are parallel samples: horizontal distance across the channel
/// and bed elevation, both in meters. Thresholds and `offset` are in
/// centimeters on the level axis.
///
/// Field aliases accept the upstream feed's names (`codigo`, `ubicacion`,
/// `umbral_amarillo`, ...) so the same type reads both `stations.toml`
/// and raw feed JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationProfile {
    #[serde(alias = "codigo")]
    pub code: String,
    #[serde(alias = "ubicacion")]
    pub location: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(alias = "umbral_amarillo")]
    pub yellow: f64,
    #[serde(alias = "umbral_naranja")]
    pub orange: f64,
    #[serde(alias = "umbral_rojo")]
    pub red: f64,
    /// Maximum displayable level (top of the level axis), cm.
    pub offset: f64,
}

// ---------------------------------------------------------------------------
// Derived types
// ---------------------------------------------------------------------------

/// One row of the plotted dataset.
///
/// `level` is the same for every point so the renderer can fill the area
/// between the axis and the current level across the whole section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlottedPoint {
    /// Distance across the channel, m.
    pub x: f64,
    /// Bed elevation, cm.
    pub y: f64,
    /// Current water level, cm.
    pub level: f64,
}

/// Heights of the four stacked threshold bands, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSegments {
    pub safe: f64,
    pub yellow_band: f64,
    pub orange_band: f64,
    pub red_band: f64,
}

impl ThresholdSegments {
    /// Sum of all bands. Equals the station offset.
    pub fn total(&self) -> f64 {
        self.safe + self.yellow_band + self.orange_band + self.red_band
    }

    /// Bands paired with their zone, in stacking order.
    pub fn bands(&self) -> [(AlertZone, f64); 4] {
        [
            (AlertZone::Safe, self.safe),
            (AlertZone::Yellow, self.yellow_band),
            (AlertZone::Orange, self.orange_band),
            (AlertZone::Red, self.red_band),
        ]
    }
}

/// Alert zone of the stacked threshold bar, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertZone {
    Safe,
    Yellow,
    Orange,
    Red,
}

impl AlertZone {
    /// Legend and series name shown on the chart.
    pub fn legend_name(self) -> &'static str {
        match self {
            AlertZone::Safe => "Nivel seguro",
            AlertZone::Yellow => "Alerta Amarilla",
            AlertZone::Orange => "Alerta Naranja",
            AlertZone::Red => "Alerta Roja",
        }
    }

    /// CSS color name used for the band.
    pub fn color(self) -> &'static str {
        match self {
            AlertZone::Safe => "green",
            AlertZone::Yellow => "yellow",
            AlertZone::Orange => "orange",
            AlertZone::Red => "red",
        }
    }
}

/// Which chart axis a value belongs to, for label formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisDimension {
    /// Horizontal distance, m.
    X,
    /// Level / elevation, cm.
    Y,
}

/// Everything the chart needs, derived from one station and one level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelProfile {
    pub code: String,
    pub location: String,
    /// Effective current level, cm.
    pub level: f64,
    pub points: Vec<PlottedPoint>,
    /// Tick spacing on the level axis.
    pub y_interval: f64,
    /// Top of the level axis (the station offset).
    pub y_max: f64,
    /// Right edge of the distance axis (last `x` sample).
    pub x_max: f64,
    pub segments: ThresholdSegments,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised around the transform: input validation, registry lookup,
/// configuration loading and rendering.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("profile has no samples")]
    EmptyProfile,
    #[error("sample length mismatch: {x} x values, {y} y values")]
    LengthMismatch { x: usize, y: usize },
    #[error("non-finite {axis} sample at index {index}")]
    NonFinite { axis: char, index: usize },
    #[error("invalid thresholds: {0}")]
    ThresholdOrder(String),
    #[error("station not found: {0}")]
    StationNotFound(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("render error: {0}")]
    Render(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
