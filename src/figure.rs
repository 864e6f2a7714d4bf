// Frame Builder - Plotly figure specifications
// Map: choropleth (deviation) + scattergeo (disbursed) per year, animated by year
// Line: total disbursed per year

use crate::aggregate::{records_for_year, Aggregates, ColorRange};
use crate::dataset::Record;
use serde::Serialize;
use serde_json::{json, Value};

/// Marker diameter given to the single largest disbursement
pub const MARKER_SIZE_SCALE: f64 = 30.0;

/// Per-frame display time during playback (ms)
pub const FRAME_DURATION_MS: u32 = 500;

/// Tween between frames (ms)
pub const TRANSITION_DURATION_MS: u32 = 300;

const LOCATION_MODE: &str = "country names";
const COLORSCALE: &str = "RdYlBu";
const COLORBAR_TITLE: &str = "<br>Deviation from Mean<br>(+ve = Above Mean, -ve = Below Mean)";
const COLORBAR_LABELS: [&str; 3] = ["Below Mean", "At Mean", "Above Mean"];
const MARKER_LAYER_NAME: &str = "Disbursed Amount";
const TRANSPARENT: &str = "rgba(0,0,0,0)";
const FONT_FAMILY: &str = "Arial";

// ============================================================================
// STYLE
// ============================================================================

/// Cosmetic choices for the animated map
#[derive(Debug, Clone, PartialEq)]
pub struct MapStyle {
    pub marker_color: String,
    pub marker_outline_color: String,
    pub show_slider_labels: bool,
}

impl Default for MapStyle {
    fn default() -> Self {
        MapStyle {
            marker_color: "purple".to_string(),
            marker_outline_color: "darkorange".to_string(),
            show_slider_labels: false,
        }
    }
}

// ============================================================================
// TRACES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Trace {
    #[serde(rename = "choropleth")]
    Choropleth(ChoroplethTrace),
    #[serde(rename = "scattergeo")]
    ScatterGeo(ScatterGeoTrace),
    #[serde(rename = "scatter")]
    Scatter(ScatterTrace),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethTrace {
    pub locations: Vec<String>,
    pub locationmode: String,
    /// Missing deviations serialize as null and leave the region unshaded
    pub z: Vec<Option<f64>>,
    pub colorscale: String,
    pub zmin: f64,
    pub zmax: f64,
    pub colorbar: ColorBar,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBar {
    pub title: ColorBarTitle,
    pub tickvals: Vec<f64>,
    pub ticktext: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBarTitle {
    pub text: String,
    pub side: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterGeoTrace {
    pub locations: Vec<String>,
    pub locationmode: String,
    pub text: Vec<String>,
    pub marker: GeoMarker,
    pub name: String,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoMarker {
    pub size: Vec<Option<f64>>,
    pub color: String,
    pub line: MarkerLine,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLine {
    pub width: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    pub x: Vec<i32>,
    pub y: Vec<f64>,
    pub mode: String,
    pub line: ColorOnly,
    pub marker: ColorOnly,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorOnly {
    pub color: String,
}

// ============================================================================
// ANIMATION CONTROLS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOptions {
    pub duration: u32,
    pub redraw: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub duration: u32,
}

/// Second argument of a Plotly `animate` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationOptions {
    pub mode: String,
    pub frame: FrameOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fromcurrent: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderStep {
    pub method: String,
    pub args: (Value, AnimationOptions),
    pub label: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slider {
    pub active: usize,
    pub steps: Vec<SliderStep>,
    pub transition: Transition,
    pub len: f64,
    pub x: f64,
    pub y: f64,
    pub tickcolor: String,
    pub font: ColorOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Button {
    pub label: String,
    pub method: String,
    pub args: (Value, AnimationOptions),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateMenu {
    #[serde(rename = "type")]
    pub menu_type: String,
    pub showactive: bool,
    pub buttons: Vec<Button>,
}

// ============================================================================
// FIGURE
// ============================================================================

/// One animation step, named by its year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub name: String,
    pub data: Vec<Trace>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<Frame>,
}

impl Figure {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// ============================================================================
// BUILDERS
// ============================================================================

/// Python-style `%.2e`: two decimals, signed exponent of at least two digits
pub fn format_scientific(value: f64) -> String {
    let formatted = format!("{:.2e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => formatted,
    }
}

/// Size relative to the dataset-wide maximum; zero maximum gives zero
pub fn marker_size(amount: f64, max_disbursed: f64) -> f64 {
    if max_disbursed > 0.0 {
        amount / max_disbursed * MARKER_SIZE_SCALE
    } else {
        0.0
    }
}

pub fn hover_text(record: &Record) -> String {
    let amount = match record.disbursed_amount {
        Some(amount) => format_scientific(amount),
        None => "nan".to_string(),
    };
    format!("{}: ${}", record.country, amount)
}

pub fn choropleth_layer(year_records: &[&Record], range: ColorRange) -> ChoroplethTrace {
    ChoroplethTrace {
        locations: year_records.iter().map(|r| r.country.clone()).collect(),
        locationmode: LOCATION_MODE.to_string(),
        z: year_records.iter().map(|r| r.deviation_from_avg).collect(),
        colorscale: COLORSCALE.to_string(),
        zmin: range.min,
        zmax: range.max,
        colorbar: ColorBar {
            title: ColorBarTitle {
                text: COLORBAR_TITLE.to_string(),
                side: "right".to_string(),
            },
            tickvals: range.ticks().to_vec(),
            ticktext: COLORBAR_LABELS.iter().map(|s| s.to_string()).collect(),
        },
        visible: None,
    }
}

pub fn marker_layer(year_records: &[&Record], max_disbursed: f64, style: &MapStyle) -> ScatterGeoTrace {
    ScatterGeoTrace {
        locations: year_records.iter().map(|r| r.country.clone()).collect(),
        locationmode: LOCATION_MODE.to_string(),
        text: year_records.iter().map(|r| hover_text(r)).collect(),
        marker: GeoMarker {
            size: year_records
                .iter()
                .map(|r| r.disbursed_amount.map(|amount| marker_size(amount, max_disbursed)))
                .collect(),
            color: style.marker_color.clone(),
            line: MarkerLine {
                width: 1.0,
                color: style.marker_outline_color.clone(),
            },
        },
        name: MARKER_LAYER_NAME.to_string(),
        mode: "markers".to_string(),
        visible: None,
    }
}

/// The two overlaid layers for one year; `visible` is left unset
pub fn year_layers(records: &[Record], year: i32, agg: &Aggregates, style: &MapStyle) -> (ChoroplethTrace, ScatterGeoTrace) {
    let year_records = records_for_year(records, year);
    (
        choropleth_layer(&year_records, agg.color_range),
        marker_layer(&year_records, agg.max_disbursed, style),
    )
}

pub fn build_frames(records: &[Record], agg: &Aggregates, style: &MapStyle) -> Vec<Frame> {
    agg.years
        .iter()
        .map(|&year| {
            let (choropleth, markers) = year_layers(records, year, agg, style);
            Frame {
                name: year.to_string(),
                data: vec![Trace::Choropleth(choropleth), Trace::ScatterGeo(markers)],
            }
        })
        .collect()
}

fn frame_animation() -> AnimationOptions {
    AnimationOptions {
        mode: "immediate".to_string(),
        frame: FrameOptions {
            duration: FRAME_DURATION_MS,
            redraw: true,
        },
        transition: Some(Transition {
            duration: TRANSITION_DURATION_MS,
        }),
        fromcurrent: None,
    }
}

pub fn slider_steps(years: &[i32]) -> Vec<SliderStep> {
    years
        .iter()
        .map(|year| SliderStep {
            method: "animate".to_string(),
            args: (json!([year.to_string()]), frame_animation()),
            label: year.to_string(),
            visible: true,
        })
        .collect()
}

pub fn year_slider(years: &[i32], style: &MapStyle) -> Slider {
    let label_color = if style.show_slider_labels { "white" } else { TRANSPARENT };

    Slider {
        active: 0,
        steps: slider_steps(years),
        transition: Transition {
            duration: TRANSITION_DURATION_MS,
        },
        len: 0.9,
        x: 0.1,
        y: 0.0,
        tickcolor: TRANSPARENT.to_string(),
        font: ColorOnly {
            color: label_color.to_string(),
        },
    }
}

pub fn play_pause_menu() -> UpdateMenu {
    let play = Button {
        label: "Play".to_string(),
        method: "animate".to_string(),
        args: (
            Value::Null,
            AnimationOptions {
                mode: "immediate".to_string(),
                frame: FrameOptions {
                    duration: FRAME_DURATION_MS,
                    redraw: true,
                },
                transition: None,
                fromcurrent: Some(true),
            },
        ),
    };

    let pause = Button {
        label: "Pause".to_string(),
        method: "animate".to_string(),
        args: (
            json!([null]),
            AnimationOptions {
                mode: "immediate".to_string(),
                frame: FrameOptions {
                    duration: 0,
                    redraw: false,
                },
                transition: None,
                fromcurrent: None,
            },
        ),
    };

    UpdateMenu {
        menu_type: "buttons".to_string(),
        showactive: false,
        buttons: vec![play, pause],
    }
}

fn map_layout(slider: &Slider, menu: &UpdateMenu) -> Value {
    json!({
        "title": {
            "text": "",
            "x": 0.5,
            "y": 0.95,
            "font": { "size": 24, "color": "white", "family": FONT_FAMILY },
            "xanchor": "center"
        },
        "geo": {
            "showframe": false,
            "showcoastlines": true,
            "coastlinecolor": "Black",
            "projection": { "type": "natural earth" },
            "landcolor": "rgb(55, 55, 55)",
            "oceancolor": "rgb(35, 35, 35)",
            "bgcolor": "rgb(255, 228, 225)"
        },
        "sliders": [slider],
        "updatemenus": [menu],
        "margin": { "l": 0, "r": 0, "t": 50, "b": 0 },
        "legend": {
            "title": {
                "text": "Legend",
                "font": { "size": 16, "color": "white", "family": FONT_FAMILY }
            },
            "font": { "color": "white", "family": FONT_FAMILY }
        }
    })
}

/// Animated map. Initial data carries every year's pair of layers in year
/// order with only the first year visible; frames replay them by name.
pub fn map_figure(records: &[Record], agg: &Aggregates, style: &MapStyle) -> Figure {
    let first_year = agg.first_year();

    let mut data = Vec::with_capacity(agg.years.len() * 2);
    for &year in &agg.years {
        let visible = Some(Some(year) == first_year);
        let (mut choropleth, mut markers) = year_layers(records, year, agg, style);
        choropleth.visible = visible;
        markers.visible = visible;
        data.push(Trace::Choropleth(choropleth));
        data.push(Trace::ScatterGeo(markers));
    }

    let slider = year_slider(&agg.years, style);
    let menu = play_pause_menu();

    Figure {
        data,
        layout: map_layout(&slider, &menu),
        frames: build_frames(records, agg, style),
    }
}

/// Static total-per-year line chart
pub fn line_figure(agg: &Aggregates) -> Figure {
    let trace = ScatterTrace {
        x: agg.yearly_totals.iter().map(|t| t.year).collect(),
        y: agg.yearly_totals.iter().map(|t| t.disbursed).collect(),
        mode: "lines+markers".to_string(),
        line: ColorOnly {
            color: "orange".to_string(),
        },
        marker: ColorOnly {
            color: "darkorange".to_string(),
        },
        name: "Total Disbursement".to_string(),
    };

    let layout = json!({
        "title": { "text": "Total Disbursement Amount per Year" },
        "xaxis": { "title": { "text": "Year" } },
        "yaxis": { "title": { "text": "US$" } },
        "plot_bgcolor": "rgb(10, 10, 55)",
        "paper_bgcolor": "rgb(10, 10, 55)",
        "font": { "color": "white", "family": FONT_FAMILY },
        "margin": { "l": 40, "r": 40, "t": 50, "b": 50 }
    });

    Figure {
        data: vec![Trace::Scatter(trace)],
        layout,
        frames: Vec::new(),
    }
}
