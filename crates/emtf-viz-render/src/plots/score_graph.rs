use emtf_viz::ScoreGraphArtifact;

use crate::canvas::Canvas;
use crate::color::root_color;
use crate::config::StyleConfig;
use crate::layout::axes::Axis;
use crate::layout::legend::{LegendBox, LegendEntry, LegendKind, draw_legend};
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::{draw_axes, draw_title};
use crate::primitives::{LineStyle, MarkerStyle, TextAnchor, TextBaseline, TextStyle};

/// Train and test score ratios as markers with error bars over the model
/// variants, labelled diagonally under the x axis on a dotted grid.
pub fn render(art: &ScoreGraphArtifact, config: &StyleConfig) -> crate::Result<String> {
    if art.x_range.span() <= 0.0 || art.y_range.span() <= 0.0 {
        return Err(crate::RenderError::Layout(format!("{}: degenerate axis range", art.name)));
    }
    let (w, h) = (art.width as f64, art.height as f64);
    let mut canvas = Canvas::new(w, h).with_font_family(config.font.family.clone());
    let m = &art.margins;
    let area = PlotArea::from_pad(w, h, m.left, m.right, config.pad.top, m.bottom);

    let mut x_axis = Axis::fixed(art.x_range.min, art.x_range.max);
    x_axis.tick_positions = art.labels.iter().map(|l| l.x).collect();
    let y_axis = Axis::fixed_with_ticks(art.y_range.min, art.y_range.max, config.axes.target_ticks);

    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config, true);

    let label_style = TextStyle {
        size: config.font.points(config.font.label_size, h),
        anchor: TextAnchor::End,
        baseline: TextBaseline::Central,
        ..Default::default()
    };
    for label in &art.labels {
        let px = x_axis.data_to_pixel(label.x, area.left, area.right());
        canvas.text_rotated(px, area.bottom() + 0.015 * h, &label.text, &label_style, -45.0);
    }
    if !art.x_title.is_empty() {
        let style = TextStyle {
            size: config.font.points(config.font.x_title_size, h),
            anchor: TextAnchor::End,
            baseline: TextBaseline::Alphabetic,
            ..Default::default()
        };
        canvas.text(area.right(), h - 0.02 * h, &art.x_title, &style);
    }

    let mut entries = Vec::with_capacity(art.series.len());
    canvas.push_clip(area.left, area.top, area.width, area.height);
    for series in &art.series {
        let color = root_color(&series.color)?;
        let marker = MarkerStyle::from_root(series.marker, color, config.marker.size);
        let bar = LineStyle::solid(color, 1.0);
        for (i, (&x, &y)) in series.x.iter().zip(&series.y).enumerate() {
            let px = x_axis.data_to_pixel(x, area.left, area.right());
            let py = y_axis.data_to_pixel(y, area.bottom(), area.top);
            let ey = series.ey.get(i).copied().unwrap_or(0.0);
            if ey > 0.0 {
                let lo = y_axis.data_to_pixel(y - ey, area.bottom(), area.top);
                let hi = y_axis.data_to_pixel(y + ey, area.bottom(), area.top);
                canvas.error_bar(px, lo, hi, 0.0, &bar);
            }
            canvas.marker(px, py, &marker);
        }
        entries.push(LegendEntry { label: series.label.clone(), color, kind: LegendKind::Marker(series.marker) });
    }
    canvas.pop_clip();

    let title_x = 0.5 * (1.0 + m.left - m.right);
    draw_title(&mut canvas, &art.title, title_x, config.title.y, config);

    let legend = LegendBox {
        ndc: [1.0 - m.right + 0.02, 0.74, 0.98, 0.9],
        margin: 0.3,
        text_size: config.font.points(config.font.legend_size, h),
        frame: config.legend.frame,
    };
    draw_legend(&mut canvas, &legend, &entries);

    Ok(canvas.finish_svg())
}

#[cfg(test)]
mod tests {
    use emtf_viz::{AxisLabel, GraphSeries, PadMargins, Range};

    use super::*;

    fn artifact() -> ScoreGraphArtifact {
        let series = |label: &str, color: &str, marker, y: Vec<f64>| GraphSeries {
            label: label.into(),
            key: format!("h_ratio_{label}_pt_8_15"),
            color: color.into(),
            marker,
            x: vec![0.0, 1.0],
            y,
            ey: vec![0.02, 0.0],
        };
        ScoreGraphArtifact {
            name: "ratio_graph_pt_8_15".into(),
            title: "Resolution score ratio".into(),
            x_title: "MVA  [8 < p_{T} < 15 GeV]".into(),
            width: 800,
            height: 600,
            margins: PadMargins { left: 0.11, right: 0.30, bottom: 0.28 },
            x_range: Range { min: -0.5, max: 1.5 },
            y_range: Range { min: 0.76, max: 0.88 },
            labels: vec![AxisLabel { x: 0.0, text: "FR1".into() }, AxisLabel { x: 1.0, text: "FR1, bend 1".into() }],
            series: vec![series("train", "kBlack", 20, vec![0.82, 0.79]), series("test", "kRed", 21, vec![0.85, 0.81])],
        }
    }

    #[test]
    fn markers_labels_and_grid() {
        let svg = render(&artifact(), &StyleConfig::default()).unwrap();
        // two train circles plus the legend sample
        assert_eq!(svg.matches("<circle").count(), 3);
        assert!(svg.contains("rotate(-45.0"));
        assert!(svg.contains(">FR1, bend 1</text>"));
        assert!(svg.contains("stroke-dasharray=\"1 3\""));
        assert!(svg.contains(r#"width="800" height="600""#));
        assert!(svg.contains(">train</text>"));
    }

    #[test]
    fn title_is_centred_on_the_pad() {
        let svg = render(&artifact(), &StyleConfig::default()).unwrap();
        // 0.5 * (1 + 0.11 - 0.30) * 800
        assert!(svg.contains(r#"<text x="324.00""#));
    }

    #[test]
    fn flat_range_is_rejected() {
        let mut art = artifact();
        art.y_range = Range { min: 1.0, max: 1.0 };
        assert!(matches!(render(&art, &StyleConfig::default()), Err(crate::RenderError::Layout(_))));
    }
}
