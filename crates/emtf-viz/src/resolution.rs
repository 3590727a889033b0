//! Resolution overlays: every catalog series in one (weight, pT, eta) bin.

use emtf_core::resolution::divide;
use emtf_core::{Catalog, EtaBin, PtBin, ResolutionKey, Result, Series, Split, WeightScheme, Window, percentile_window};
use emtf_root::Histogram;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::source::ObjectSource;

/// Upper limit of the ratio plot's y axis.
pub const RATIO_Y_CAP: f64 = 10.0;

/// Which corner the legend goes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendSide {
    Left,
    Right,
}

impl LegendSide {
    /// Left when the window reaches further below zero than above it.
    pub fn for_window(w: &Window) -> Self {
        if w.x_min.abs() > w.x_max.abs() { LegendSide::Left } else { LegendSide::Right }
    }
}

/// One drawn histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistSeries {
    pub label: String,
    /// Object key the histogram was read from.
    pub key: String,
    /// ROOT color name.
    pub color: String,
    pub line_width: f64,
    pub bin_edges: Vec<f64>,
    pub values: Vec<f64>,
}

impl HistSeries {
    fn new(catalog: &Catalog, s: &Series<'_>, key: String, line_width: f64, h: &Histogram) -> Self {
        Self {
            label: catalog.series_label(s),
            key,
            color: catalog.color(s.index).to_string(),
            line_width,
            bin_edges: h.bin_edges.clone(),
            values: h.bin_content.clone(),
        }
    }

    /// Largest bin value.
    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

/// A step-histogram overlay (plain resolution or ratio to the reference).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionArtifact {
    /// Image file stem.
    pub name: String,
    /// Titles in ROOT LaTeX.
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    /// Displayed x range.
    pub window: Window,
    pub y_max: f64,
    pub legend: LegendSide,
    pub series: Vec<HistSeries>,
}

impl ResolutionArtifact {
    /// Legend labels in drawing order.
    pub fn labels(&self) -> Vec<String> {
        self.series.iter().map(|s| s.label.clone()).collect()
    }
}

/// The (weight, pT, eta) bin a plot is drawn for.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    pub weight: &'a WeightScheme,
    pub pt: &'a PtBin,
    pub eta: &'a EtaBin,
    pub split: Split,
}

impl Cell<'_> {
    fn stem(&self, prefix: &str) -> String {
        format!("{prefix}_pt_{}_eta_{}{}", self.pt.id, self.eta.id, self.weight.id)
    }

    fn key(&self, s: &Series<'_>) -> ResolutionKey {
        let (pt, eta, w) = (&self.pt.id, &self.eta.id, &self.weight.id);
        if s.is_reference {
            ResolutionKey::reference(&s.mva.id, self.split, pt, eta, w)
        } else {
            ResolutionKey::trained(&s.factory.id, &s.mva.id, self.split, pt, eta, w)
        }
    }

    fn widen(&self, h: &Histogram, w: Window) -> Result<Window> {
        percentile_window(h, self.weight.pct, self.weight.pct, w)
    }
}

/// Resolution histograms of every series, reference first, with the window
/// widened over all of them and the legend side fixed by the reference alone.
pub fn resolution_overlay(catalog: &Catalog, src: &impl ObjectSource, cell: Cell<'_>) -> Result<ResolutionArtifact> {
    let mut window = Window::SEED;
    let mut legend = LegendSide::Right;
    let mut x_title = String::new();
    let mut series = Vec::new();
    for s in catalog.series() {
        let key = cell.key(&s).to_string();
        let h = src.histogram(&key)?;
        window = cell.widen(&h, window)?;
        let width = if s.is_reference {
            legend = LegendSide::for_window(&window);
            x_title = h.x_title.clone();
            3.0
        } else {
            2.0
        };
        series.push(HistSeries::new(catalog, &s, key, width, &h));
    }
    let y_max = 1.1 * series.iter().map(HistSeries::max_value).fold(0.0, f64::max);
    let art = ResolutionArtifact {
        name: cell.stem("res"),
        title: format!("p_{{T}} resolution, {}, {}", cell.pt.label, cell.eta.label),
        x_title,
        y_title: format!("Events{}", cell.weight.label),
        window,
        y_max,
        legend,
        series,
    };
    debug!(name = %art.name, x_min = window.x_min, x_max = window.x_max, "resolution overlay");
    Ok(art)
}

/// Every non-reference series divided bin by bin by the reference. The
/// reference itself is not drawn; colors continue from index 1.
pub fn resolution_ratio(catalog: &Catalog, src: &impl ObjectSource, cell: Cell<'_>) -> Result<ResolutionArtifact> {
    let mut window = Window::SEED;
    let mut legend = LegendSide::Right;
    let mut x_title = String::new();
    let mut reference: Option<Histogram> = None;
    let mut series = Vec::new();
    for s in catalog.series() {
        let key = cell.key(&s).to_string();
        let h = src.histogram(&key)?;
        window = cell.widen(&h, window)?;
        if s.is_reference {
            legend = LegendSide::for_window(&window);
            x_title = h.x_title.clone();
            reference = Some(h);
            continue;
        }
        let Some(den) = reference.as_ref() else {
            continue;
        };
        let ratio = divide(&h, den)?;
        series.push(HistSeries::new(catalog, &s, key, 2.0, &ratio));
    }
    let max_ratio = series.iter().map(HistSeries::max_value).fold(0.0, f64::max);
    let reference_label = catalog.reference()?.1.label.clone();
    let art = ResolutionArtifact {
        name: cell.stem("res_rat"),
        title: format!(
            "p_{{T}} resolution ratio to {reference_label}, {}, {}",
            cell.pt.label, cell.eta.label
        ),
        x_title,
        y_title: format!("Ratio to {reference_label}{}", cell.weight.label),
        window,
        y_max: RATIO_Y_CAP.min(1.1 * max_ratio),
        legend,
        series,
    };
    debug!(name = %art.name, series = art.series.len(), "resolution ratio");
    Ok(art)
}
