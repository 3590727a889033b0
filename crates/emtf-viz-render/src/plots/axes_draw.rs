use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::StyleConfig;
use crate::layout::axes::Axis;
use crate::layout::margins::{PlotArea, ndc};
use crate::primitives::*;
use crate::text::measure_text;

/// Draw the pad frame with ticks, tick labels, axis titles and an optional
/// dotted grid. Axis titles are right-aligned at the axis end, as ROOT does.
pub fn draw_axes(canvas: &mut Canvas, area: &PlotArea, x_axis: &Axis, y_axis: &Axis, config: &StyleConfig, grid: bool) {
    let frame_color = Color::BLACK;
    let frame_style = LineStyle::solid(frame_color, 1.0);
    let tick_style_line = LineStyle::solid(frame_color, 1.0);
    let grid_style = LineStyle::dotted(config.grid.color, config.grid.width);

    let inward = config.axes.tick_direction == "in";
    let h = canvas.height;
    let x_tl = config.axes.tick_length * area.height;
    let y_tl = config.axes.tick_length * area.width;
    let label_size = config.font.points(config.font.label_size, h);

    if grid {
        for &val in &x_axis.tick_positions {
            let px = x_axis.data_to_pixel(val, area.left, area.right());
            canvas.line(px, area.top, px, area.bottom(), &grid_style);
        }
        for &val in &y_axis.tick_positions {
            let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
            canvas.line(area.left, py, area.right(), py, &grid_style);
        }
    }

    // Frame rectangle
    canvas.line(area.left, area.top, area.right(), area.top, &frame_style);
    canvas.line(area.left, area.bottom(), area.right(), area.bottom(), &frame_style);
    canvas.line(area.left, area.top, area.left, area.bottom(), &frame_style);
    canvas.line(area.right(), area.top, area.right(), area.bottom(), &frame_style);

    let dir = if inward { -1.0 } else { 1.0 };

    // --- X axis ---
    let x_label_style = TextStyle {
        size: label_size,
        color: frame_color,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Hanging,
    };
    for (i, &val) in x_axis.tick_positions.iter().enumerate() {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        canvas.line(px, area.bottom(), px, area.bottom() + dir * x_tl, &tick_style_line);
        if config.axes.show_top_ticks {
            canvas.line(px, area.top, px, area.top - dir * x_tl, &tick_style_line);
        }
        if let Some(label) = x_axis.tick_labels.get(i) {
            let label_y = area.bottom() + 0.01 * h + if inward { 0.0 } else { x_tl };
            canvas.text(px, label_y, label, &x_label_style);
        }
    }
    for &val in &x_axis.minor_ticks {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        canvas.line(px, area.bottom(), px, area.bottom() + dir * 0.5 * x_tl, &tick_style_line);
    }

    // --- Y axis ---
    let y_label_style = TextStyle {
        size: label_size,
        color: frame_color,
        anchor: TextAnchor::End,
        baseline: TextBaseline::Central,
    };
    let label_gap = 0.01 * canvas.width + if inward { 0.0 } else { y_tl };
    for (i, &val) in y_axis.tick_positions.iter().enumerate() {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        canvas.line(area.left, py, area.left - dir * y_tl, py, &tick_style_line);
        if config.axes.show_right_ticks {
            canvas.line(area.right(), py, area.right() + dir * y_tl, py, &tick_style_line);
        }
        if let Some(label) = y_axis.tick_labels.get(i) {
            canvas.text(area.left - label_gap, py, label, &y_label_style);
        }
    }
    for &val in &y_axis.minor_ticks {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        canvas.line(area.left, py, area.left - dir * 0.5 * y_tl, py, &tick_style_line);
    }

    // --- Axis titles ---
    if !x_axis.label.is_empty() {
        let size = config.font.points(config.font.x_title_size, h);
        let style = TextStyle { size, color: frame_color, anchor: TextAnchor::End, baseline: TextBaseline::Hanging };
        let y = area.bottom() + 0.01 * h + config.axes.x_title_offset * (label_size + 0.4 * size);
        canvas.text(area.right(), y, &x_axis.label, &style);
    }

    if !y_axis.label.is_empty() {
        let size = config.font.points(config.font.y_title_size, h);
        let widest = y_axis.tick_labels.iter().map(|l| measure_text(l, label_size).width).fold(0.0_f64, f64::max);
        let x = (area.left - label_gap - config.axes.y_title_offset * (widest + 0.5 * size)).max(0.6 * size);
        let style = TextStyle { size, color: frame_color, anchor: TextAnchor::End, baseline: TextBaseline::Central };
        canvas.text_rotated(x, area.top, &y_axis.label, &style, -90.0);
    }
}

/// Draw the canvas title centred at the NDC point `(x, y)`.
pub fn draw_title(canvas: &mut Canvas, title: &str, x: f64, y: f64, config: &StyleConfig) {
    if title.is_empty() {
        return;
    }
    let (px, py) = ndc(canvas.width, canvas.height, x, y);
    let style = TextStyle {
        size: config.font.points(config.font.title_size, canvas.height),
        color: Color::BLACK,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Central,
    };
    canvas.text(px, py, title, &style);
}
