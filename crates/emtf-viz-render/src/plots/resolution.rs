use emtf_viz::{HistSeries, LegendSide, ResolutionArtifact};

use crate::canvas::Canvas;
use crate::color::root_color;
use crate::config::StyleConfig;
use crate::layout::axes::Axis;
use crate::layout::legend::{LegendBox, LegendEntry, LegendKind, draw_legend};
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::{draw_axes, draw_title};
use crate::primitives::LineStyle;

/// Step outline of a histogram in data coordinates, starting and ending on
/// the x axis.
fn step_points(series: &HistSeries) -> Vec<(f64, f64)> {
    let n = series.values.len().min(series.bin_edges.len().saturating_sub(1));
    if n == 0 {
        return Vec::new();
    }
    let mut pts = Vec::with_capacity(2 * n + 2);
    pts.push((series.bin_edges[0], 0.0));
    for i in 0..n {
        pts.push((series.bin_edges[i], series.values[i]));
        pts.push((series.bin_edges[i + 1], series.values[i]));
    }
    pts.push((series.bin_edges[n], 0.0));
    pts
}

/// Overlay of step histograms restricted to the artifact's window, with a
/// legend in the emptier corner.
pub fn render(art: &ResolutionArtifact, config: &StyleConfig) -> crate::Result<String> {
    if art.window.x_max <= art.window.x_min {
        return Err(crate::RenderError::Layout(format!(
            "{}: empty x window [{}, {}]",
            art.name, art.window.x_min, art.window.x_max
        )));
    }
    let (w, h) = (config.figure.width, config.figure.height);
    let mut canvas = Canvas::new(w, h).with_font_family(config.font.family.clone());
    let pad = &config.pad;
    let area = PlotArea::from_pad(w, h, pad.left, pad.right, pad.top, pad.bottom);

    let y_max = if art.y_max > 0.0 { art.y_max } else { 1.0 };
    let x_axis = Axis::fixed_with_ticks(art.window.x_min, art.window.x_max, config.axes.target_ticks)
        .with_label(art.x_title.as_str());
    let y_axis = Axis::fixed_with_ticks(0.0, y_max, config.axes.target_ticks).with_label(art.y_title.as_str());

    let colors = art.series.iter().map(|s| root_color(&s.color)).collect::<crate::Result<Vec<_>>>()?;

    canvas.push_clip(area.left, area.top, area.width, area.height);
    for (series, color) in art.series.iter().zip(&colors) {
        let pts: Vec<(f64, f64)> = step_points(series)
            .into_iter()
            .map(|(x, y)| {
                (x_axis.data_to_pixel(x, area.left, area.right()), y_axis.data_to_pixel(y, area.bottom(), area.top))
            })
            .collect();
        canvas.polyline(&pts, &LineStyle::solid(*color, series.line_width));
    }
    canvas.pop_clip();

    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config, config.grid.show);
    draw_title(&mut canvas, &art.title, config.title.x, config.title.y, config);

    let entries: Vec<LegendEntry> = art
        .series
        .iter()
        .zip(&colors)
        .map(|(s, c)| LegendEntry { label: s.label.clone(), color: *c, kind: LegendKind::Line(s.line_width) })
        .collect();
    let legend = LegendBox {
        ndc: match art.legend {
            LegendSide::Left => config.legend.left,
            LegendSide::Right => config.legend.right,
        },
        margin: config.legend.margin,
        text_size: config.font.points(config.font.legend_size, h),
        frame: config.legend.frame,
    };
    draw_legend(&mut canvas, &legend, &entries);

    Ok(canvas.finish_svg())
}
