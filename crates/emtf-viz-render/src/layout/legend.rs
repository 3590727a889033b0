use crate::canvas::Canvas;
use crate::color::Color;
use crate::layout::margins::ndc;
use crate::primitives::*;
use crate::text::measure_text;

pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    pub kind: LegendKind,
}

pub enum LegendKind {
    /// Line sample of the given width.
    Line(f64),
    /// ROOT marker style number.
    Marker(i32),
}

/// Legend box in canvas NDC, `[x1, y1, x2, y2]` like a ROOT `TLegend`.
pub struct LegendBox {
    pub ndc: [f64; 4],
    /// Fraction of the box width taken by the sample.
    pub margin: f64,
    pub text_size: f64,
    pub frame: bool,
}

/// Draw a legend: rows split the box height evenly and labels shrink until
/// the widest one fits.
pub fn draw_legend(canvas: &mut Canvas, legend: &LegendBox, entries: &[LegendEntry]) {
    if entries.is_empty() {
        return;
    }
    let [x1, y1, x2, y2] = legend.ndc;
    let (left, top) = ndc(canvas.width, canvas.height, x1, y2);
    let (right, bottom) = ndc(canvas.width, canvas.height, x2, y1);
    let (w, h) = (right - left, bottom - top);

    if legend.frame {
        let style = Style { fill: Some(Color::WHITE), stroke: Some(Color::BLACK), stroke_width: 1.0, opacity: 1.0 };
        canvas.rect(left, top, w, h, &style);
    }

    let row_h = h / entries.len() as f64;
    let sample_w = legend.margin * w;
    let text_x = left + sample_w + 0.1 * sample_w;
    let text_room = right - text_x - 4.0;

    let widest = entries.iter().map(|e| measure_text(&e.label, legend.text_size).width).fold(0.0_f64, f64::max);
    let mut size = legend.text_size.min(0.8 * row_h);
    if widest > 0.0 && widest * size / legend.text_size > text_room {
        size = text_room / widest * legend.text_size;
    }
    let text_style = TextStyle { size, baseline: TextBaseline::Central, ..Default::default() };

    for (i, entry) in entries.iter().enumerate() {
        let cy = top + (i as f64 + 0.5) * row_h;
        let sx = left + 0.15 * sample_w;
        let ex = left + 0.85 * sample_w;
        match entry.kind {
            LegendKind::Line(width) => canvas.line(sx, cy, ex, cy, &LineStyle::solid(entry.color, width)),
            LegendKind::Marker(style) => {
                canvas.marker(0.5 * (sx + ex), cy, &MarkerStyle::from_root(style, entry.color, 0.3 * row_h.min(14.0)))
            }
        }
        canvas.text(text_x, cy, &entry.label, &text_style);
    }
}
