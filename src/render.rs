/// Native SVG rendering of the level profile chart.
///
/// Draws the same picture the ECharts option describes, using plotters'
/// SVG backend: current level area and dashed level line, the channel
/// section, split lines, axis labels, the stacked threshold bar in a narrow
/// right-hand panel and a legend strip along the bottom.
///
/// All text is positioned explicitly and written as SVG `<text>` elements,
/// so rendering never needs font metrics.

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};
use std::fs;
use std::path::Path;

use crate::chart::{self, X_AXIS_NAME, Y_AXIS_NAME};
use crate::config::ChartSettings;
use crate::model::{AlertZone, AxisDimension, LevelProfile, ProfileError, LEVEL_AXIS_DIVISIONS};
use crate::profile::{format_axis_value, format_level_tick};

// ---------------------------------------------------------------------------
// Palette and layout
// ---------------------------------------------------------------------------

const LEVEL_RGB: RGBColor = RGBColor(0x00, 0x5E, 0xB8);
const SECTION_RGB: RGBColor = RGBColor(0xE9, 0xC3, 0x9E);
const AXIS_RGB: RGBColor = RGBColor(0x6A, 0x79, 0x85);
const SPLIT_RGB: RGBColor = RGBColor(0xE0, 0xE6, 0xF1);

/// Grid boxes as fractions of the canvas: (left, right, top, bottom) margins.
const MAIN_GRID: (f64, f64, f64, f64) = (0.10, 0.12, 0.10, 0.25);
const THRESHOLD_GRID: (f64, f64, f64, f64) = (0.867, 0.05, 0.10, 0.25);

/// Dashes drawn along the level line.
const LEVEL_DASHES: usize = 48;

fn zone_rgb(zone: AlertZone) -> RGBColor {
    match zone {
        AlertZone::Safe => RGBColor(0x00, 0x80, 0x00),
        AlertZone::Yellow => RGBColor(0xFF, 0xFF, 0x00),
        AlertZone::Orange => RGBColor(0xFF, 0xA5, 0x00),
        AlertZone::Red => RGBColor(0xFF, 0x00, 0x00),
    }
}

fn font(size: f64) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
}

fn bold(size: f64) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Bold)
}

/// Rough label width, used only to lay out the legend row.
fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    (text.chars().count() as f64 * font_px as f64 * 0.6).ceil() as u32
}

fn render_err<E: std::fmt::Display>(e: E) -> ProfileError {
    ProfileError::Render(e.to_string())
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Renders the chart to an SVG document.
///
/// # Errors
/// `ProfileError::Render` when the profile has no finite, non-empty axis
/// ranges (for example an empty or NaN-laden profile), or when plotters
/// fails to draw.
pub fn render_svg(
    profile: &LevelProfile,
    settings: &ChartSettings,
    title: &str,
) -> Result<String, ProfileError> {
    let (x_min, x_max) = x_range(profile)?;
    let y_max = profile.y_max;
    if !(y_max.is_finite() && y_max > 0.0) {
        return Err(ProfileError::Render(format!(
            "level axis needs a positive maximum, got {}",
            y_max
        )));
    }

    let (w, h) = (settings.width, settings.height);
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (w, h)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        root.draw(&Text::new(
            title.to_string(),
            (12, 12),
            bold(18.0).color(&BLACK).pos(Pos::new(HPos::Left, VPos::Top)),
        ))
        .map_err(render_err)?;

        draw_main_grid(&root, profile, (x_min, x_max), (w, h))?;
        draw_threshold_bar(&root, profile, (w, h))?;
        draw_legend(&root, (w, h))?;

        root.present().map_err(render_err)?;
    }

    log::debug!("rendered {} ({} bytes of svg)", profile.code, svg.len());
    Ok(svg)
}

/// Renders the chart and writes it to `path`.
pub fn write_svg<P: AsRef<Path>>(
    path: P,
    profile: &LevelProfile,
    settings: &ChartSettings,
    title: &str,
) -> Result<(), ProfileError> {
    let svg = render_svg(profile, settings, title)?;
    fs::write(path, svg)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

/// Distance axis range: from the smaller of 0 and the leftmost sample, to `x_max`.
///
/// When that range is empty (a single sample, or samples listed right to
/// left so the last one sits at the minimum) it falls back to the span of
/// the samples, and a zero-width span is widened by a meter on each side.
fn x_range(profile: &LevelProfile) -> Result<(f64, f64), ProfileError> {
    if profile.points.is_empty() {
        return Err(ProfileError::Render("profile has no samples".to_string()));
    }
    if profile
        .points
        .iter()
        .any(|p| !(p.x.is_finite() && p.y.is_finite() && p.level.is_finite()))
    {
        return Err(ProfileError::Render("profile contains non-finite samples".to_string()));
    }

    let x_min = profile.points.iter().map(|p| p.x).fold(0.0, f64::min);
    let mut x_max = profile.x_max;
    if !x_max.is_finite() {
        return Err(ProfileError::Render(format!("distance axis maximum is {}", x_max)));
    }
    if x_max <= x_min {
        x_max = profile.points.iter().map(|p| p.x).fold(x_max, f64::max);
    }
    if x_max <= x_min {
        return Ok((x_min - 1.0, x_max + 1.0));
    }
    Ok((x_min, x_max))
}

fn grid_margins(grid: (f64, f64, f64, f64), (w, h): (u32, u32)) -> (u32, u32, u32, u32) {
    let px = |frac: f64, total: u32| (frac * total as f64).round() as u32;
    (px(grid.0, w), px(grid.1, w), px(grid.2, h), px(grid.3, h))
}

fn draw_main_grid(
    root: &DrawingArea<SVGBackend, Shift>,
    profile: &LevelProfile,
    (x_min, x_max): (f64, f64),
    size: (u32, u32),
) -> Result<(), ProfileError> {
    let (left, right, top, bottom) = grid_margins(MAIN_GRID, size);
    let y_max = profile.y_max;

    let mut chart = ChartBuilder::on(root)
        .margin_left(left)
        .margin_right(right)
        .margin_top(top)
        .margin_bottom(bottom)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)
        .map_err(render_err)?;

    let y_ticks: Vec<f64> = (0..=LEVEL_AXIS_DIVISIONS as usize)
        .map(|i| i as f64 * profile.y_interval)
        .filter(|v| *v <= y_max + 1e-9)
        .collect();
    let x_step = (x_max - x_min) / LEVEL_AXIS_DIVISIONS;
    let x_ticks: Vec<f64> = (0..=LEVEL_AXIS_DIVISIONS as usize)
        .map(|i| x_min + i as f64 * x_step)
        .collect();

    // split lines
    chart
        .draw_series(y_ticks.iter().map(|&y| {
            PathElement::new(vec![(x_min, y), (x_max, y)], SPLIT_RGB.stroke_width(1))
        }))
        .map_err(render_err)?;
    chart
        .draw_series(x_ticks.iter().map(|&x| {
            PathElement::new(vec![(x, 0.0), (x, y_max)], SPLIT_RGB.stroke_width(1))
        }))
        .map_err(render_err)?;

    // current level, then the section on top of it, then the dashed line
    chart
        .draw_series(
            AreaSeries::new(
                profile.points.iter().map(|p| (p.x, p.level.min(y_max))),
                0.0,
                LEVEL_RGB.filled(),
            )
            .border_style(LEVEL_RGB),
        )
        .map_err(render_err)?;
    chart
        .draw_series(
            AreaSeries::new(
                profile.points.iter().map(|p| (p.x, p.y.clamp(0.0, y_max))),
                0.0,
                SECTION_RGB.filled(),
            )
            .border_style(SECTION_RGB),
        )
        .map_err(render_err)?;

    let level = profile.level.clamp(0.0, y_max);
    let dash = (x_max - x_min) / (LEVEL_DASHES * 2) as f64;
    chart
        .draw_series((0..LEVEL_DASHES).map(|i| {
            let start = x_min + (2 * i) as f64 * dash;
            PathElement::new(vec![(start, level), (start + dash, level)], LEVEL_RGB.stroke_width(1))
        }))
        .map_err(render_err)?;

    // axis lines
    chart
        .draw_series([
            PathElement::new(vec![(x_min, 0.0), (x_min, y_max)], AXIS_RGB.stroke_width(1)),
            PathElement::new(vec![(x_min, 0.0), (x_max, 0.0)], AXIS_RGB.stroke_width(1)),
        ])
        .map_err(render_err)?;

    // tick labels
    let tick_style = font(12.0).color(&AXIS_RGB);
    for &y in &y_ticks {
        let (px, py) = chart.backend_coord(&(x_min, y));
        root.draw(&Text::new(
            format_level_tick(y),
            (px - 8, py),
            tick_style.pos(Pos::new(HPos::Right, VPos::Center)),
        ))
        .map_err(render_err)?;
    }
    for &x in &x_ticks {
        let (px, py) = chart.backend_coord(&(x, 0.0));
        root.draw(&Text::new(
            format_distance_tick(x),
            (px, py + 6),
            tick_style.pos(Pos::new(HPos::Center, VPos::Top)),
        ))
        .map_err(render_err)?;
    }

    // axis names
    let (left_px, bottom_px) = chart.backend_coord(&(x_min, 0.0));
    let (right_px, top_px) = chart.backend_coord(&(x_max, y_max));
    root.draw(&Text::new(
        X_AXIS_NAME.to_string(),
        ((left_px + right_px) / 2, bottom_px + 28),
        font(13.0).color(&BLACK).pos(Pos::new(HPos::Center, VPos::Top)),
    ))
    .map_err(render_err)?;
    root.draw(&Text::new(
        Y_AXIS_NAME.to_string(),
        (left_px - 48, (top_px + bottom_px) / 2),
        font(13.0)
            .color(&BLACK)
            .transform(FontTransform::Rotate270)
            .pos(Pos::new(HPos::Center, VPos::Center)),
    ))
    .map_err(render_err)?;

    // level label at the right end of the line
    let (lx, ly) = chart.backend_coord(&(x_max, level));
    root.draw(&Text::new(
        chart::level_label(profile.level),
        (lx - 4, ly - 4),
        bold(16.0).color(&LEVEL_RGB).pos(Pos::new(HPos::Right, VPos::Bottom)),
    ))
    .map_err(render_err)?;

    Ok(())
}

fn draw_threshold_bar(
    root: &DrawingArea<SVGBackend, Shift>,
    profile: &LevelProfile,
    size: (u32, u32),
) -> Result<(), ProfileError> {
    let (left, right, top, bottom) = grid_margins(THRESHOLD_GRID, size);
    let mut chart = ChartBuilder::on(root)
        .margin_left(left)
        .margin_right(right)
        .margin_top(top)
        .margin_bottom(bottom)
        .build_cartesian_2d(0.0..1.0, 0.0..profile.y_max)
        .map_err(render_err)?;

    let mut base = 0.0;
    let mut bars = Vec::with_capacity(4);
    for (zone, height) in profile.segments.bands() {
        let upper = base + height.max(0.0);
        bars.push(Rectangle::new([(0.2, base), (0.8, upper)], zone_rgb(zone).filled()));
        base = upper;
    }
    chart.draw_series(bars).map_err(render_err)?;
    Ok(())
}

fn draw_legend(root: &DrawingArea<SVGBackend, Shift>, (w, h): (u32, u32)) -> Result<(), ProfileError> {
    const SWATCH_W: i32 = 24;
    const SWATCH_H: i32 = 12;
    const GAP: i32 = 6;
    const ITEM_GAP: i32 = 18;
    const FONT_PX: u32 = 12;

    let items: Vec<(&str, RGBColor)> = std::iter::once((chart::SERIES_LEVEL, LEVEL_RGB))
        .chain(
            [AlertZone::Safe, AlertZone::Yellow, AlertZone::Orange, AlertZone::Red]
                .into_iter()
                .map(|zone| (zone.legend_name(), zone_rgb(zone))),
        )
        .collect();

    let item_width = |name: &str| SWATCH_W + GAP + estimate_text_width_px(name, FONT_PX) as i32;
    let total: i32 = items.iter().map(|(name, _)| item_width(name)).sum::<i32>()
        + ITEM_GAP * (items.len() as i32 - 1);

    let y = h as i32 - 24;
    let mut x = ((w as i32 - total) / 2).max(4);
    let label_style = font(FONT_PX as f64).color(&BLACK).pos(Pos::new(HPos::Left, VPos::Center));

    for (name, color) in items {
        root.draw(&Rectangle::new(
            [(x, y - SWATCH_H / 2), (x + SWATCH_W, y + SWATCH_H / 2)],
            color.filled(),
        ))
        .map_err(render_err)?;
        root.draw(&Text::new(name.to_string(), (x + SWATCH_W + GAP, y), label_style.clone()))
            .map_err(render_err)?;
        x += item_width(name) + ITEM_GAP;
    }
    Ok(())
}

/// Distance tick label: whole meters when the step allows it, one decimal
/// otherwise.
fn format_distance_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format_axis_value(AxisDimension::X, value)
            .trim_end_matches(" m")
            .to_string()
    } else {
        format!("{:.1}", value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StationProfile;
    use crate::profile::transform;

    fn sample_profile() -> LevelProfile {
        let station = StationProfile {
            code: "H0001".to_string(),
            location: "Puente Norte".to_string(),
            x: vec![0.0, 1.0, 2.0, 3.0, 4.0],
            y: vec![3.0, 1.5, 0.2, 1.4, 3.2],
            yellow: 400.0,
            orange: 300.0,
            red: 200.0,
            offset: 500.0,
        };
        transform(&station, Some(250.0))
    }

    #[test]
    fn test_svg_contains_title_and_labels() {
        let svg = render_svg(&sample_profile(), &ChartSettings::default(), "H0001 - Puente Norte").unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("H0001 - Puente Norte"));
        assert!(svg.contains("250 cm"));
        assert!(svg.contains("Alerta Roja"));
        assert!(svg.contains("Nivel (cm)"));
    }

    #[test]
    fn test_svg_uses_requested_size() {
        let settings = ChartSettings {
            width: 640,
            height: 360,
            ..ChartSettings::default()
        };
        let svg = render_svg(&sample_profile(), &settings, "t").unwrap();
        assert!(svg.contains("width=\"640\""));
        assert!(svg.contains("height=\"360\""));
    }

    #[test]
    fn test_empty_profile_is_render_error() {
        let mut profile = sample_profile();
        profile.points.clear();
        profile.x_max = f64::NAN;
        assert!(matches!(
            render_svg(&profile, &ChartSettings::default(), "t"),
            Err(ProfileError::Render(_))
        ));
    }

    fn profile_from(x: Vec<f64>, y: Vec<f64>) -> LevelProfile {
        let station = StationProfile {
            code: "H0099".to_string(),
            location: "Estribo".to_string(),
            x,
            y,
            yellow: 400.0,
            orange: 300.0,
            red: 200.0,
            offset: 500.0,
        };
        crate::profile::validate(&station).expect("station should be valid");
        transform(&station, None)
    }

    #[test]
    fn test_single_sample_profile_renders() {
        let profile = profile_from(vec![0.0], vec![0.3]);
        assert_eq!(x_range(&profile).unwrap(), (-1.0, 1.0));

        let svg = render_svg(&profile, &ChartSettings::default(), "H0099").unwrap();
        assert!(svg.contains("250 cm"));
    }

    #[test]
    fn test_right_to_left_profile_renders() {
        let profile = profile_from(vec![4.0, 2.0, 0.0], vec![1.0, 0.2, 1.1]);
        assert_eq!(profile.x_max, 0.0);
        assert_eq!(x_range(&profile).unwrap(), (0.0, 4.0));
        assert!(render_svg(&profile, &ChartSettings::default(), "H0099").is_ok());
    }

    #[test]
    fn test_nan_sample_is_render_error() {
        let mut profile = sample_profile();
        profile.points[2].y = f64::NAN;
        assert!(matches!(
            render_svg(&profile, &ChartSettings::default(), "t"),
            Err(ProfileError::Render(_))
        ));
    }

    #[test]
    fn test_distance_tick_format() {
        assert_eq!(format_distance_tick(4.0), "4");
        assert_eq!(format_distance_tick(0.8), "0.8");
    }

    #[test]
    fn test_legend_width_estimate_grows_with_text() {
        assert!(estimate_text_width_px("Alerta Amarilla", 12) > estimate_text_width_px("Roja", 12));
    }
}
