//! Score-ratio graphs: train and test points per model variant.
//!
//! Canvas size and pad margins grow with the number of points so that the
//! diagonal bin labels keep their spacing.

use emtf_core::{Catalog, Error, PtBin, RatioGraphKey, Result, Split};
use emtf_root::Graph;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::source::ObjectSource;

/// ROOT marker style of the train points (filled circle).
pub const TRAIN_MARKER: i32 = 20;
/// ROOT marker style of the test points (filled square).
pub const TEST_MARKER: i32 = 21;

/// A closed numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Pad margins as fractions of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PadMargins {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Canvas geometry for an x span of `span` units.
pub fn geometry(span: f64) -> (u32, u32, PadMargins) {
    let excess = span - 1.2;
    // integer truncation, as for a C cast
    let width = 800 + 32 * excess.trunc() as i64;
    let margins = PadMargins { left: 0.11 - 0.0018 * excess, right: 0.30 - 0.006 * excess, bottom: 0.28 };
    (width.max(1) as u32, 600, margins)
}

/// One point set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSeries {
    pub label: String,
    pub key: String,
    /// ROOT color name.
    pub color: String,
    /// ROOT marker style.
    pub marker: i32,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub ey: Vec<f64>,
}

impl GraphSeries {
    fn new(split: Split, key: String, color: &str, marker: i32, g: &Graph) -> Self {
        Self {
            label: split.to_string(),
            key,
            color: color.to_string(),
            marker,
            x: g.x.clone(),
            y: g.y.clone(),
            ey: (0..g.n_points()).map(|i| g.ey_at(i)).collect(),
        }
    }
}

/// A text label placed under the x axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisLabel {
    pub x: f64,
    pub text: String,
}

/// Train/test score ratios of every model variant in one pT bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreGraphArtifact {
    pub name: String,
    pub title: String,
    pub x_title: String,
    /// Canvas size in pixels.
    pub width: u32,
    pub height: u32,
    pub margins: PadMargins,
    pub x_range: Range,
    pub y_range: Range,
    /// Bin labels, drawn diagonally.
    pub labels: Vec<AxisLabel>,
    pub series: Vec<GraphSeries>,
}

fn points_range(g: &Graph, key: &str) -> Result<((f64, f64), (f64, f64))> {
    match (g.x_range(), g.y_range()) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(Error::Validation(format!("graph '{key}' has no points"))),
    }
}

/// `[lo, hi]` widened by 10% of its span on each side. A flat range is
/// widened by 10% of its value, or by 0.5 around zero.
fn padded_range(lo: f64, hi: f64) -> Range {
    let span = hi - lo;
    let pad = if span > 0.0 {
        0.1 * span
    } else if hi != 0.0 {
        0.1 * hi.abs()
    } else {
        0.5
    };
    Range { min: lo - pad, max: hi + pad }
}

/// Score-ratio graph for `pt` (or the graph over all pT ranges with `None`).
pub fn score_graph(catalog: &Catalog, src: &impl ObjectSource, pt: Option<&PtBin>) -> Result<ScoreGraphArtifact> {
    let pt_id = pt.map(|p| p.id.as_str());
    let train_key = RatioGraphKey::new(Split::Train, pt_id).to_string();
    let test_key = RatioGraphKey::new(Split::Test, pt_id).to_string();
    let train = src.graph(&train_key)?;
    let test = src.graph(&test_key)?;

    let ((tr_xlo, tr_xhi), (tr_ylo, tr_yhi)) = points_range(&train, &train_key)?;
    let ((te_xlo, te_xhi), (te_ylo, te_yhi)) = points_range(&test, &test_key)?;

    // one unit per point
    let x_range = Range { min: tr_xlo.min(te_xlo) - 0.5, max: tr_xhi.max(te_xhi) + 0.5 };
    let y_lo = (tr_ylo - train.max_ey()).min(te_ylo - test.max_ey());
    let y_hi = (tr_yhi + train.max_ey()).max(te_yhi + test.max_ey());
    let y_range = padded_range(y_lo, y_hi);

    let (width, height, margins) = geometry(x_range.span());

    let labels = match &train.histogram {
        Some(h) => {
            let raw: Vec<String> = (1..=h.n_bins()).map(|b| h.label(b).unwrap_or_default().to_string()).collect();
            catalog
                .relabel(&raw)
                .into_iter()
                .enumerate()
                .filter(|(_, text)| !text.is_empty())
                .map(|(i, text)| AxisLabel { x: h.bin_center(i + 1), text })
                .collect()
        }
        None => Vec::new(),
    };

    let x_title = if pt.is_some() { "MVA" } else { "MVA  [p_{T} range]" };
    let name = match pt_id {
        Some(id) => format!("ratio_graph_pt_{id}"),
        None => "ratio_graph".to_string(),
    };
    let art = ScoreGraphArtifact {
        name,
        title: train.title.clone(),
        x_title: x_title.to_string(),
        width,
        height,
        margins,
        x_range,
        y_range,
        labels,
        series: vec![
            GraphSeries::new(Split::Train, train_key, "kBlack", TRAIN_MARKER, &train),
            GraphSeries::new(Split::Test, test_key, "kRed", TEST_MARKER, &test),
        ],
    };
    debug!(name = %art.name, width, points = train.n_points(), "score graph");
    Ok(art)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryObjects;
    use emtf_root::{BinLabel, Histogram};

    fn graph(name: &str, y: Vec<f64>, ey: Vec<f64>) -> Graph {
        let n = y.len();
        let mut frame = Histogram::uniform(name, -0.5, n as f64 - 0.5, vec![0.0; n]);
        frame.bin_labels = vec![
            BinLabel { bin: 1, text: "f_0x001f11ff_0x4_invPt_BDTG_AWB".into() },
            BinLabel { bin: 2, text: "f_0x001f31ff_0x4_invPt_BDTG_AWB".into() },
        ];
        Graph {
            name: name.into(),
            title: "Resolution score ratio".into(),
            x: (0..n).map(|i| i as f64).collect(),
            y,
            ex: None,
            ey: Some(ey),
            histogram: Some(frame),
        }
    }

    fn objects() -> MemoryObjects {
        MemoryObjects::new("mem")
            .with_graph(graph("h_ratio_train_pt_4_8", vec![0.9, 0.8, 0.85], vec![0.01, 0.02, 0.01]))
            .with_graph(graph("h_ratio_test_pt_4_8", vec![0.95, 0.7, 0.9], vec![0.05, 0.02, 0.01]))
    }

    #[test]
    fn ranges_and_geometry() {
        let c = Catalog::default();
        let art = score_graph(&c, &objects(), Some(&c.pt_bins[2])).unwrap();
        assert_eq!(art.name, "ratio_graph_pt_4_8");
        assert_eq!(art.x_title, "MVA");
        assert_eq!(art.x_range, Range { min: -0.5, max: 2.5 });
        // span 3.0 -> 800 + 32 * trunc(1.8)
        assert_eq!((art.width, art.height), (832, 600));
        assert!((art.margins.left - (0.11 - 0.0018 * 1.8)).abs() < 1e-12);
        assert!((art.margins.right - (0.30 - 0.006 * 1.8)).abs() < 1e-12);
        // lo = min(0.8 - 0.02, 0.7 - 0.05), hi = max(0.9 + 0.02, 0.95 + 0.05)
        let (lo, hi) = (0.65, 1.0);
        assert!((art.y_range.min - (lo - 0.1 * (hi - lo))).abs() < 1e-12);
        assert!((art.y_range.max - (hi + 0.1 * (hi - lo))).abs() < 1e-12);
        assert_eq!(art.series[0].marker, TRAIN_MARKER);
        assert_eq!(art.series[1].color, "kRed");
    }

    #[test]
    fn flat_graphs_still_get_a_y_range() {
        let flat = |name: &str, y: f64| Graph { ey: None, ..graph(name, vec![y], vec![]) };
        let src = MemoryObjects::new("mem")
            .with_graph(flat("h_ratio_train", 1.0))
            .with_graph(flat("h_ratio_test", 1.0));
        let art = score_graph(&Catalog::default(), &src, None).unwrap();
        assert!((art.y_range.min - 0.9).abs() < 1e-12);
        assert!((art.y_range.max - 1.1).abs() < 1e-12);

        let src = MemoryObjects::new("mem")
            .with_graph(flat("h_ratio_train", 0.0))
            .with_graph(flat("h_ratio_test", 0.0));
        let art = score_graph(&Catalog::default(), &src, None).unwrap();
        assert_eq!(art.y_range, Range { min: -0.5, max: 0.5 });
    }

    #[test]
    fn labels_use_factory_names() {
        let c = Catalog::default();
        let art = score_graph(&c, &objects(), Some(&c.pt_bins[2])).unwrap();
        assert_eq!(art.labels.len(), 2);
        assert_eq!(art.labels[0].text, c.factories[1].label);
        assert_eq!(art.labels[1].x, 1.0);
    }

    #[test]
    fn single_point_keeps_default_width() {
        let (w, h, m) = geometry(1.0);
        assert_eq!((w, h), (800, 600));
        assert_eq!(m.bottom, 0.28);
    }

    #[test]
    fn all_pt_graph_uses_range_title() {
        let src = MemoryObjects::new("mem")
            .with_graph(graph("h_ratio_train", vec![1.0], vec![0.1]))
            .with_graph(graph("h_ratio_test", vec![1.1], vec![0.1]));
        let art = score_graph(&Catalog::default(), &src, None).unwrap();
        assert_eq!(art.name, "ratio_graph");
        assert_eq!(art.x_title, "MVA  [p_{T} range]");
    }
}
