/// Level profile derivation.
///
/// Turns a station's cross-section samples and a current water level into
/// the plotted dataset, axis bounds and threshold band heights that the
/// chart builders consume.
///
/// `transform` never fails: malformed samples propagate as NaN, the same
/// way a renderer would show them. Call `validate` first when the input
/// comes from outside the process.

use crate::model::{
    AlertZone, AxisDimension, LevelProfile, PlottedPoint, ProfileError, StationProfile,
    ThresholdSegments, CM_PER_METER, LEVEL_AXIS_DIVISIONS,
};

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Level used when the caller has no current reading: half the offset, rounded.
pub fn default_level(offset: f64) -> f64 {
    (offset * 0.5).round()
}

/// Successive differences of the thresholds, bottom band first.
pub fn threshold_segments(station: &StationProfile) -> ThresholdSegments {
    ThresholdSegments {
        safe: station.offset - station.yellow,
        yellow_band: station.yellow - station.orange,
        orange_band: station.orange - station.red,
        red_band: station.red,
    }
}

/// Derives the full chart dataset for one station and an optional level (cm).
///
/// One point is produced per `x` sample. Bed elevations are converted from
/// meters to centimeters; a missing `y` sample becomes NaN.
pub fn transform(station: &StationProfile, current_level: Option<f64>) -> LevelProfile {
    let level = current_level.unwrap_or_else(|| default_level(station.offset));

    let points = station
        .x
        .iter()
        .enumerate()
        .map(|(i, &x)| PlottedPoint {
            x,
            y: station.y.get(i).map_or(f64::NAN, |y| y * CM_PER_METER),
            level,
        })
        .collect();

    LevelProfile {
        code: station.code.clone(),
        location: station.location.clone(),
        level,
        points,
        y_interval: station.offset / LEVEL_AXIS_DIVISIONS,
        y_max: station.offset,
        x_max: station.x.last().copied().unwrap_or(f64::NAN),
        segments: threshold_segments(station),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Checks the invariants `transform` assumes but does not enforce.
///
/// # Errors
/// - `ProfileError::EmptyProfile` — no `x` samples.
/// - `ProfileError::LengthMismatch` — `x` and `y` differ in length.
/// - `ProfileError::NonFinite` — a sample is NaN or infinite.
/// - `ProfileError::ThresholdOrder` — thresholds are not
///   `0 <= red <= orange <= yellow <= offset`, or `offset` is not positive.
pub fn validate(station: &StationProfile) -> Result<(), ProfileError> {
    if station.x.is_empty() {
        return Err(ProfileError::EmptyProfile);
    }
    if station.x.len() != station.y.len() {
        return Err(ProfileError::LengthMismatch {
            x: station.x.len(),
            y: station.y.len(),
        });
    }
    for (axis, samples) in [('x', &station.x), ('y', &station.y)] {
        if let Some(index) = samples.iter().position(|v| !v.is_finite()) {
            return Err(ProfileError::NonFinite { axis, index });
        }
    }

    let s = station;
    if !(s.offset.is_finite() && s.offset > 0.0) {
        return Err(ProfileError::ThresholdOrder(format!(
            "{}: offset must be positive, got {}",
            s.code, s.offset
        )));
    }
    let ordered = 0.0 <= s.red && s.red <= s.orange && s.orange <= s.yellow && s.yellow <= s.offset;
    if !ordered {
        return Err(ProfileError::ThresholdOrder(format!(
            "{}: expected 0 <= red ({}) <= orange ({}) <= yellow ({}) <= offset ({})",
            s.code, s.red, s.orange, s.yellow, s.offset
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Zone classification
// ---------------------------------------------------------------------------

/// Finds the band of the stacked threshold bar that `level` falls in.
///
/// The bar stacks safe, yellow, orange, red from the bottom, so the band
/// edges on the level axis are `offset - yellow`, `offset - orange` and
/// `offset - red`. A level sitting exactly on an edge belongs to the band
/// above it.
pub fn classify_level(level: f64, station: &StationProfile) -> AlertZone {
    let offset = station.offset;
    if level >= offset - station.red {
        AlertZone::Red
    } else if level >= offset - station.orange {
        AlertZone::Orange
    } else if level >= offset - station.yellow {
        AlertZone::Yellow
    } else {
        AlertZone::Safe
    }
}

impl LevelProfile {
    /// Zone of the profile's own level, computed from its segments.
    pub fn zone(&self) -> AlertZone {
        let s = &self.segments;
        let yellow_edge = s.safe;
        let orange_edge = yellow_edge + s.yellow_band;
        let red_edge = orange_edge + s.orange_band;

        if self.level >= red_edge {
            AlertZone::Red
        } else if self.level >= orange_edge {
            AlertZone::Orange
        } else if self.level >= yellow_edge {
            AlertZone::Yellow
        } else {
            AlertZone::Safe
        }
    }
}

// ---------------------------------------------------------------------------
// Label formatting
// ---------------------------------------------------------------------------

/// Axis pointer label: whole centimeters on the level axis, whole meters on
/// the distance axis. Halves round up, not to even. Non-finite values are
/// printed unchanged.
pub fn format_axis_value(axis: AxisDimension, value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let unit = match axis {
        AxisDimension::Y => "cm",
        AxisDimension::X => "m",
    };
    // `+ 0.0` folds -0 into 0
    format!("{:.0} {}", value.round() + 0.0, unit)
}

/// Level-axis tick label, rounded to the nearest centimeter.
pub fn format_level_tick(value: f64) -> String {
    format!("{}", value.round())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_station() -> StationProfile {
        StationProfile {
            code: "H0001".to_string(),
            location: "Puente Norte".to_string(),
            x: vec![0.0, 1.0, 2.0],
            y: vec![0.0, 0.5, 0.0],
            yellow: 400.0,
            orange: 300.0,
            red: 200.0,
            offset: 500.0,
        }
    }

    #[test]
    fn test_reference_scenario() {
        let profile = transform(&sample_station(), Some(250.0));

        assert_eq!(
            profile.points,
            vec![
                PlottedPoint { x: 0.0, y: 0.0, level: 250.0 },
                PlottedPoint { x: 1.0, y: 50.0, level: 250.0 },
                PlottedPoint { x: 2.0, y: 0.0, level: 250.0 },
            ]
        );
        assert_eq!(
            profile.segments,
            ThresholdSegments {
                safe: 100.0,
                yellow_band: 100.0,
                orange_band: 100.0,
                red_band: 200.0,
            }
        );
        assert_eq!(profile.y_interval, 100.0);
        assert_eq!(profile.y_max, 500.0);
        assert_eq!(profile.x_max, 2.0);
    }

    #[test]
    fn test_point_count_matches_samples() {
        let mut station = sample_station();
        station.x = (0..25).map(|i| i as f64 * 0.4).collect();
        station.y = (0..25).map(|i| (i as f64 - 12.0).abs() * 0.1).collect();

        let profile = transform(&station, None);
        assert_eq!(profile.points.len(), station.x.len());
        assert_eq!(profile.points.len(), station.y.len());
    }

    #[test]
    fn test_segments_sum_to_offset() {
        let cases = [
            (500.0, 400.0, 300.0, 200.0),
            (350.0, 350.0, 120.0, 0.0),
            (1000.0, 10.0, 5.0, 5.0),
            (0.5, 0.3, 0.2, 0.1),
        ];
        for (offset, yellow, orange, red) in cases {
            let mut station = sample_station();
            station.offset = offset;
            station.yellow = yellow;
            station.orange = orange;
            station.red = red;
            let total = threshold_segments(&station).total();
            assert!(
                (total - offset).abs() < 1e-9,
                "segments should sum to {}, got {}",
                offset,
                total
            );
        }
    }

    #[test]
    fn test_missing_level_defaults_to_half_offset() {
        let profile = transform(&sample_station(), None);
        assert_eq!(profile.level, 250.0);
        assert!(profile.points.iter().all(|p| p.level == 250.0));

        let mut station = sample_station();
        station.offset = 333.0;
        assert_eq!(transform(&station, None).level, 167.0);
    }

    #[test]
    fn test_explicit_zero_level_is_kept() {
        let profile = transform(&sample_station(), Some(0.0));
        assert_eq!(profile.level, 0.0);
    }

    #[test]
    fn test_x_max_is_last_sample_not_largest() {
        let mut station = sample_station();
        station.x = vec![0.0, 7.5, 3.0];
        assert_eq!(transform(&station, None).x_max, 3.0);
    }

    #[test]
    fn test_single_sample_profile() {
        let mut station = sample_station();
        station.x = vec![0.0];
        station.y = vec![0.3];
        assert!(validate(&station).is_ok());

        let profile = transform(&station, None);
        assert_eq!(profile.points.len(), 1);
        assert_eq!(profile.x_max, 0.0);
        assert!((profile.points[0].y - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_samples_propagate_nan() {
        let mut station = sample_station();
        station.x.clear();
        station.y.clear();

        let profile = transform(&station, None);
        assert!(profile.points.is_empty());
        assert!(profile.x_max.is_nan());
    }

    #[test]
    fn test_short_y_propagates_nan() {
        let mut station = sample_station();
        station.y.truncate(2);

        let profile = transform(&station, None);
        assert_eq!(profile.points.len(), 3);
        assert!(profile.points[2].y.is_nan());
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(validate(&sample_station()).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_samples() {
        let mut station = sample_station();
        station.x.clear();
        station.y.clear();
        assert!(matches!(validate(&station), Err(ProfileError::EmptyProfile)));

        let mut station = sample_station();
        station.y.pop();
        assert!(matches!(
            validate(&station),
            Err(ProfileError::LengthMismatch { x: 3, y: 2 })
        ));

        let mut station = sample_station();
        station.y[1] = f64::NAN;
        assert!(matches!(
            validate(&station),
            Err(ProfileError::NonFinite { axis: 'y', index: 1 })
        ));
    }

    #[test]
    fn test_validate_rejects_unordered_thresholds() {
        let mut station = sample_station();
        station.orange = 450.0;
        assert!(matches!(validate(&station), Err(ProfileError::ThresholdOrder(_))));

        let mut station = sample_station();
        station.yellow = 600.0;
        assert!(matches!(validate(&station), Err(ProfileError::ThresholdOrder(_))));

        let mut station = sample_station();
        station.red = -1.0;
        assert!(matches!(validate(&station), Err(ProfileError::ThresholdOrder(_))));

        let mut station = sample_station();
        station.offset = 0.0;
        station.yellow = 0.0;
        station.orange = 0.0;
        station.red = 0.0;
        assert!(matches!(validate(&station), Err(ProfileError::ThresholdOrder(_))));
    }

    #[test]
    fn test_classify_level_band_edges() {
        // offset 500: yellow edge 100, orange edge 200, red edge 300
        let station = sample_station();
        assert_eq!(classify_level(0.0, &station), AlertZone::Safe);
        assert_eq!(classify_level(99.9, &station), AlertZone::Safe);
        assert_eq!(classify_level(100.0, &station), AlertZone::Yellow);
        assert_eq!(classify_level(250.0, &station), AlertZone::Orange);
        assert_eq!(classify_level(300.0, &station), AlertZone::Red);
        assert_eq!(classify_level(900.0, &station), AlertZone::Red);
    }

    #[test]
    fn test_profile_zone_matches_classification() {
        let station = sample_station();
        for level in [0.0, 50.0, 100.0, 150.0, 200.0, 299.0, 300.0, 500.0] {
            let profile = transform(&station, Some(level));
            assert_eq!(profile.zone(), classify_level(level, &station), "level {}", level);
        }
    }

    #[test]
    fn test_axis_value_formatting() {
        assert_eq!(format_axis_value(AxisDimension::Y, 249.6), "250 cm");
        assert_eq!(format_axis_value(AxisDimension::X, 3.2), "3 m");
        assert_eq!(format_axis_value(AxisDimension::X, f64::NAN), "NaN");
        assert_eq!(format_level_tick(99.99999), "100");
    }

    #[test]
    fn test_axis_value_halves_round_up() {
        assert_eq!(format_axis_value(AxisDimension::Y, 2.5), "3 cm");
        assert_eq!(format_axis_value(AxisDimension::Y, 0.5), "1 cm");
        assert_eq!(format_axis_value(AxisDimension::X, 3.5), "4 m");
        assert_eq!(format_axis_value(AxisDimension::X, -0.2), "0 m");
    }

    #[test]
    fn test_level_tick_rounds_fractional_interval() {
        let mut station = sample_station();
        station.offset = 333.0;
        let profile = transform(&station, None);
        assert!((profile.y_interval - 66.6).abs() < 1e-9);
        assert_eq!(format_level_tick(profile.y_interval), "67");
        assert_eq!(format_level_tick(2.0 * profile.y_interval), "133");
    }
}
