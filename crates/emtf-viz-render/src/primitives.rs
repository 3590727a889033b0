use crate::color::Color;

/// Fill + stroke style for rectangles and polygons.
#[derive(Debug, Clone)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self { fill: None, stroke: None, stroke_width: 1.0, opacity: 1.0 }
    }
}

impl Style {
    pub fn filled(color: Color) -> Self {
        Self { fill: Some(color), ..Default::default() }
    }

    pub fn stroked(color: Color, width: f64) -> Self {
        Self { stroke: Some(color), stroke_width: width, ..Default::default() }
    }
}

/// Line style.
#[derive(Debug, Clone)]
pub struct LineStyle {
    pub color: Color,
    pub width: f64,
    pub dash: Option<String>,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self { color: Color::BLACK, width: 1.0, dash: None }
    }
}

impl LineStyle {
    pub fn solid(color: Color, width: f64) -> Self {
        Self { color, width, dash: None }
    }

    /// ROOT's grid line (style 3).
    pub fn dotted(color: Color, width: f64) -> Self {
        Self { color, width, dash: Some("1 3".into()) }
    }
}

/// Text style. Sizes are in points.
#[derive(Debug, Clone)]
pub struct TextStyle {
    pub size: f64,
    pub color: Color,
    pub anchor: TextAnchor,
    pub baseline: TextBaseline,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self { size: 10.0, color: Color::BLACK, anchor: TextAnchor::Start, baseline: TextBaseline::Alphabetic }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(&self) -> &str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Alphabetic,
    Central,
    Hanging,
}

impl TextBaseline {
    pub fn as_str(&self) -> &str {
        match self {
            TextBaseline::Alphabetic => "auto",
            TextBaseline::Central => "central",
            TextBaseline::Hanging => "hanging",
        }
    }
}

/// Marker style for data points.
#[derive(Debug, Clone)]
pub struct MarkerStyle {
    pub shape: MarkerShape,
    pub size: f64,
    pub color: Color,
    pub fill: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Square,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self { shape: MarkerShape::Circle, size: 3.0, color: Color::BLACK, fill: true }
    }
}

impl MarkerStyle {
    /// ROOT marker style number: 20/24 filled/open circle, 21/25 filled/open
    /// square. Anything else draws as a filled circle.
    pub fn from_root(style: i32, color: Color, size: f64) -> Self {
        let (shape, fill) = match style {
            21 => (MarkerShape::Square, true),
            24 => (MarkerShape::Circle, false),
            25 => (MarkerShape::Square, false),
            _ => (MarkerShape::Circle, true),
        };
        Self { shape, size, color, fill }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_marker_styles() {
        let m = MarkerStyle::from_root(21, Color::BLACK, 3.0);
        assert_eq!((m.shape, m.fill), (MarkerShape::Square, true));
        let m = MarkerStyle::from_root(24, Color::BLACK, 3.0);
        assert_eq!((m.shape, m.fill), (MarkerShape::Circle, false));
        assert_eq!(MarkerStyle::from_root(7, Color::BLACK, 3.0).shape, MarkerShape::Circle);
    }
}
