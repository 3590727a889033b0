use serde::Deserialize;

use crate::color::Color;

/// Top-level drawing style (YAML or programmatic). Defaults follow ROOT's
/// plain style with the title and legend placement of the resolution plots.
///
/// Lengths are in points; with `output.dpi = 72` one point is one pixel, so
/// a 700 x 500 figure matches ROOT's default canvas.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub figure: FigureConfig,
    pub font: FontConfig,
    pub pad: PadConfig,
    pub axes: AxesConfig,
    pub grid: GridConfig,
    pub legend: LegendConfig,
    pub title: TitleConfig,
    pub marker: MarkerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self { width: 700.0, height: 500.0 }
    }
}

/// Text sizes as fractions of the pad height, the way ROOT sizes text.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub family: String,
    pub title_size: f64,
    pub label_size: f64,
    pub x_title_size: f64,
    pub y_title_size: f64,
    pub legend_size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Helvetica, Arial, sans-serif".into(),
            title_size: 0.045,
            label_size: 0.038,
            x_title_size: 0.04,
            y_title_size: 0.038,
            legend_size: 0.035,
        }
    }
}

impl FontConfig {
    /// Point size of a fractional text size on a canvas of height `h`.
    pub fn points(&self, fraction: f64, h: f64) -> f64 {
        fraction * h
    }
}

/// Pad margins of the histogram overlays, as canvas fractions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PadConfig {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self { left: 0.10, right: 0.04, top: 0.10, bottom: 0.10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub tick_direction: String,
    pub show_top_ticks: bool,
    pub show_right_ticks: bool,
    /// Tick length as a fraction of the pad.
    pub tick_length: f64,
    pub target_ticks: usize,
    /// Title offsets relative to ROOT's default placement.
    pub x_title_offset: f64,
    pub y_title_offset: f64,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            tick_direction: "in".into(),
            show_top_ticks: false,
            show_right_ticks: false,
            tick_length: 0.03,
            target_ticks: 8,
            x_title_offset: 1.02,
            y_title_offset: 1.18,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Grid on the histogram overlays; score graphs always draw one.
    pub show: bool,
    pub color: Color,
    pub width: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { show: false, color: Color::rgb(0, 0, 0), width: 0.6 }
    }
}

/// Legend boxes in NDC: `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LegendConfig {
    pub left: [f64; 4],
    pub right: [f64; 4],
    /// Fraction of the box width taken by the line sample.
    pub margin: f64,
    pub frame: bool,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self { left: [0.12, 0.66, 0.49, 0.885], right: [0.58, 0.66, 0.95, 0.885], margin: 0.15, frame: true }
    }
}

/// Title box centre in NDC.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    pub x: f64,
    pub y: f64,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self { x: 0.53, y: 0.965 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Marker radius in points.
    pub size: f64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self { size: 4.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: String,
    pub dpi: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: "png".into(), dpi: 72 }
    }
}

/// Resolve a StyleConfig from an optional YAML string; absent fields keep
/// their defaults.
pub fn resolve_config(user_yaml: Option<&str>) -> crate::Result<StyleConfig> {
    match user_yaml {
        None => Ok(StyleConfig::default()),
        Some(yaml) => {
            let config: StyleConfig =
                serde_yaml_ng::from_str(yaml).map_err(|e| crate::RenderError::Config(e.to_string()))?;
            if config.output.dpi == 0 {
                return Err(crate::RenderError::Config("output.dpi must be positive".into()));
            }
            Ok(config)
        }
    }
}
