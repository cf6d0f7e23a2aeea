/// ECharts option builder for the level profile chart.
///
/// Produces the declarative `option` document an ECharts instance renders:
/// a main grid with the section and current level, and a narrow second
/// grid holding the stacked threshold bar.
///
/// Layout:
/// ```text
/// grid 0 (10%..88%)                     grid 1 (86.7%..95%)
/// ├── xAxis 0  value, distance (m)      ├── xAxis 1  category ["Umbrales"]
/// ├── yAxis 0  value, level (cm)        ├── yAxis 1  value, level (cm), hidden
/// ├── series   "Nivel actual"  (area)   └── series   4 stacked bars
/// ├── series   level line + markLine
/// └── series   "Sección"       (area)
/// ```

use chrono::{DateTime, TimeZone};
use serde_json::{json, Value};

use crate::config::ChartSettings;
use crate::model::{AlertZone, LevelProfile};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const LEVEL_COLOR: &str = "#005EB8";
pub const SECTION_COLOR: &str = "#e9c39e";
pub const AXIS_COLOR: &str = "#6a7985";

pub const SERIES_LEVEL: &str = "Nivel actual";
pub const SERIES_LEVEL_LINE: &str = "Linea de nivel actual";
pub const SERIES_SECTION: &str = "Sección";
pub const THRESHOLD_STACK: &str = "thresholds";

pub const X_AXIS_NAME: &str = "Ancho de la corriente (m)";
pub const Y_AXIS_NAME: &str = "Nivel (cm)";
pub const THRESHOLD_CATEGORY: &str = "Umbrales";
pub const SAVE_IMAGE_TITLE: &str = "Guardar como .png";

/// Legend entries, in display order.
pub fn legend_names() -> [&'static str; 5] {
    [
        SERIES_LEVEL,
        AlertZone::Safe.legend_name(),
        AlertZone::Yellow.legend_name(),
        AlertZone::Orange.legend_name(),
        AlertZone::Red.legend_name(),
    ]
}

// ---------------------------------------------------------------------------
// Title
// ---------------------------------------------------------------------------

/// Chart title: `"{code} - {location} - {timestamp}"`.
pub fn title_for<Tz>(profile: &LevelProfile, settings: &ChartSettings, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{} - {} - {}",
        profile.code,
        profile.location,
        at.format(&settings.timestamp_format)
    )
}

/// Label drawn on the current level line.
pub fn level_label(level: f64) -> String {
    format!("{} cm", level)
}

// ---------------------------------------------------------------------------
// Option document
// ---------------------------------------------------------------------------

/// Builds the full ECharts option for a derived profile.
pub fn build_option(profile: &LevelProfile, title: &str) -> Value {
    json!({
        "title": { "text": title },
        "legend": {
            "data": legend_names(),
            "orient": "horizontal",
            "top": "bottom",
        },
        "tooltip": tooltip(),
        "grid": [
            { "left": "10%", "right": "12%", "top": "10%", "bottom": "25%", "containLabel": false },
            { "left": "86.7%", "right": "5%", "top": "10%", "bottom": "25%", "containLabel": false },
        ],
        "toolbox": {
            "feature": { "saveAsImage": { "title": SAVE_IMAGE_TITLE } },
        },
        "xAxis": x_axes(profile),
        "yAxis": y_axes(profile),
        "dataset": {
            "source": profile.points,
            "dimensions": ["x", "y", "level"],
        },
        "series": series(profile),
    })
}

fn tooltip() -> Value {
    json!({
        "trigger": "axis",
        "axisPointer": {
            "type": "cross",
            "label": { "backgroundColor": AXIS_COLOR },
        },
    })
}

/// Per-axis pointer label, matching `profile::format_axis_value`.
fn pointer_label(unit: &str) -> Value {
    json!({ "label": { "formatter": format!("{{value}} {}", unit), "precision": 0 } })
}

fn x_axes(profile: &LevelProfile) -> Value {
    json!([
        {
            "gridIndex": 0,
            "type": "value",
            "name": X_AXIS_NAME,
            "boundaryGap": false,
            "nameLocation": "middle",
            "nameGap": 25,
            "splitLine": { "show": true },
            "axisLabel": { "formatter": "{value}" },
            "axisPointer": pointer_label("m"),
            "max": finite_or_null(profile.x_max),
        },
        {
            "gridIndex": 1,
            "type": "category",
            "data": [THRESHOLD_CATEGORY],
            "splitLine": { "show": false },
            "axisTick": { "show": false },
            "axisLabel": { "show": false },
        },
    ])
}

fn y_axes(profile: &LevelProfile) -> Value {
    json!([
        {
            "gridIndex": 0,
            "type": "value",
            "name": Y_AXIS_NAME,
            "min": 0,
            "max": profile.y_max,
            "interval": profile.y_interval,
            "nameLocation": "middle",
            "nameGap": 35,
            "position": "left",
            "axisLine": { "lineStyle": { "color": AXIS_COLOR } },
            "axisLabel": { "formatter": "{value}" },
            "axisPointer": pointer_label("cm"),
        },
        {
            "gridIndex": 1,
            "type": "value",
            "min": 0,
            "max": profile.y_max,
            "interval": profile.y_interval,
            "axisLine": { "show": false },
            "axisTick": { "show": false },
            "axisLabel": { "show": false },
            "splitLine": { "show": false },
        },
    ])
}

fn series(profile: &LevelProfile) -> Value {
    let mut series = vec![
        json!({
            "name": SERIES_LEVEL,
            "type": "line",
            "smooth": false,
            "yAxisIndex": 0,
            "z": 1,
            "emphasis": { "disabled": true },
            "encode": { "x": "x", "y": "level" },
            "showSymbol": false,
            "showAllSymbol": false,
            "lineStyle": { "color": "transparent" },
            "areaStyle": { "color": LEVEL_COLOR },
        }),
        json!({
            "name": SERIES_LEVEL_LINE,
            "type": "line",
            "smooth": false,
            "yAxisIndex": 0,
            "z": 3,
            "emphasis": { "disabled": true },
            "encode": { "x": "x", "y": "level" },
            "showSymbol": false,
            "showAllSymbol": false,
            "lineStyle": { "color": LEVEL_COLOR, "type": "dashed", "width": 1 },
            "areaStyle": { "color": "transparent" },
            "tooltip": { "show": false },
            "markLine": {
                "silent": true,
                "symbol": "none",
                "label": {
                    "show": true,
                    "position": "insideEndTop",
                    "formatter": level_label(profile.level),
                    "color": LEVEL_COLOR,
                    "fontWeight": "bold",
                    "fontSize": 16,
                    "backgroundColor": "rgba(255, 255, 255, 0.8)",
                    "padding": [2, 4],
                    "borderRadius": 2,
                },
                "data": [
                    { "yAxis": profile.level, "lineStyle": { "color": "transparent" } },
                ],
            },
        }),
        json!({
            "name": SERIES_SECTION,
            "type": "line",
            "smooth": false,
            "yAxisIndex": 0,
            "z": 2,
            "emphasis": { "disabled": true },
            "encode": { "x": "x", "y": "y" },
            "showSymbol": false,
            "showAllSymbol": false,
            "lineStyle": { "color": SECTION_COLOR },
            "areaStyle": { "color": SECTION_COLOR, "opacity": 1 },
            "tooltip": { "show": false },
        }),
    ];

    series.extend(profile.segments.bands().iter().map(|(zone, height)| {
        json!({
            "name": zone.legend_name(),
            "type": "bar",
            "stack": THRESHOLD_STACK,
            "xAxisIndex": 1,
            "yAxisIndex": 1,
            "data": [height],
            "itemStyle": { "color": zone.color() },
            "tooltip": { "show": false },
        })
    }));

    Value::Array(series)
}

/// serde_json writes NaN as null; make that explicit for the axis bound.
fn finite_or_null(v: f64) -> Value {
    if v.is_finite() { json!(v) } else { Value::Null }
}

// ---------------------------------------------------------------------------
// HTML page
// ---------------------------------------------------------------------------

/// Wraps an option in a standalone page that loads ECharts and renders it.
pub fn render_html(option: &Value, title: &str, settings: &ChartSettings) -> String {
    // `</` inside a JSON string would close the script element early
    let option_js = option.to_string().replace("</", "<\\/");
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{url}"></script>
</head>
<body>
<div id="chart" style="width: {width}px; height: {height}px;"></div>
<script>
var option = {option};
{formatter}
var chart = echarts.init(document.getElementById("chart"));
chart.setOption(option);
</script>
</body>
</html>
"#,
        title = escape_html(title),
        url = escape_html(&settings.echarts_url),
        width = settings.width,
        height = settings.height,
        option = option_js,
        formatter = LEVEL_TICK_FORMATTER_JS,
    )
}

/// Level-axis tick labels are rounded to whole centimeters. ECharts only
/// accepts that as a function, which JSON cannot carry, so the page installs
/// it before `setOption`.
pub const LEVEL_TICK_FORMATTER_JS: &str =
    "option.yAxis[0].axisLabel.formatter = function (value) { return String(Math.round(value)); };";

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
