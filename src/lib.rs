//! level_profile: river cross-section and current level chart.
//!
//! # Module structure
//!
//! ```text
//! level_profile
//! ├── model    — shared data types (StationProfile, PlottedPoint, ThresholdSegments, ProfileError, …)
//! ├── profile  — level profile derivation, input validation, alert zone classification
//! ├── config   — station registry loader (stations.toml or feed JSON) and chart settings
//! ├── chart    — ECharts option document and standalone HTML page
//! └── render   — native SVG rendering with plotters
//! ```

// Public modules
pub mod chart;
pub mod config;
pub mod model;
pub mod profile;
pub mod render;
