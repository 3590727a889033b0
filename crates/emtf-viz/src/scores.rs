//! Resolution-score table: every series scored in every kinematic bin and
//! compared with the reference series.

use std::fmt;

use emtf_core::resolution::median_ratio;
use emtf_core::{Catalog, Error, ResolutionKey, Result, Score, Split};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::source::ObjectSource;

/// Score of one series in one (pT, eta) bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCell {
    pub pt: String,
    pub eta: String,
    pub score: Score,
    /// Ratio to the reference score in the same bin; absent for the
    /// reference itself.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ratio: Option<Score>,
}

/// All cells of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub label: String,
    pub is_reference: bool,
    /// `2^median` of the inclusive-bin histogram, the score's pivot.
    pub median_ratio: f64,
    pub cells: Vec<ScoreCell>,
}

/// Scores of every catalog series for one split and weight scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreTable {
    pub split: Split,
    pub weight: String,
    /// Display labels of the pT bins, in row order.
    pub pt_labels: Vec<String>,
    /// Display labels of the eta bins, in column order.
    pub eta_labels: Vec<String>,
    pub rows: Vec<ScoreRow>,
}

/// Id of the inclusive bin: the one named `all`, else the first.
fn inclusive<'a>(ids: impl Iterator<Item = &'a str> + Clone) -> Result<&'a str> {
    ids.clone()
        .find(|id| *id == "all")
        .or_else(|| ids.clone().next())
        .ok_or_else(|| Error::Validation("catalog has no kinematic bins to score".into()))
}

impl ScoreTable {
    /// Score every series of `catalog` with the first weight scheme.
    ///
    /// Each series is scored against its own median ratio, taken from its
    /// inclusive (`all`/`all`) histogram.
    pub fn build(catalog: &Catalog, src: &impl ObjectSource, split: Split) -> Result<Self> {
        let weight = catalog.weights.first().map(|w| w.id.clone()).unwrap_or_default();
        let pt_all = inclusive(catalog.pt_bins.iter().map(|b| b.id.as_str()))?;
        let eta_all = inclusive(catalog.eta_bins.iter().map(|b| b.id.as_str()))?;

        let mut rows: Vec<ScoreRow> = Vec::new();
        for s in catalog.series() {
            let key = |pt: &str, eta: &str| {
                let k = if s.is_reference {
                    ResolutionKey::reference(&s.mva.id, split, pt, eta, &weight)
                } else {
                    ResolutionKey::trained(&s.factory.id, &s.mva.id, split, pt, eta, &weight)
                };
                k.to_string()
            };
            let med = median_ratio(&src.histogram(&key(pt_all, eta_all))?)?;
            let mut cells = Vec::new();
            for pt in &catalog.pt_bins {
                for eta in &catalog.eta_bins {
                    let score = Score::of(&src.histogram(&key(&pt.id, &eta.id))?, med)?;
                    cells.push(ScoreCell { pt: pt.id.clone(), eta: eta.id.clone(), score, ratio: None });
                }
            }
            if let Some(reference) = rows.first() {
                for (cell, ref_cell) in cells.iter_mut().zip(&reference.cells) {
                    cell.ratio = Some(cell.score.ratio_to(&ref_cell.score)?);
                }
            }
            debug!(series = %catalog.series_label(&s), median_ratio = med, "scored series");
            rows.push(ScoreRow {
                label: catalog.series_label(&s),
                is_reference: s.is_reference,
                median_ratio: med,
                cells,
            });
        }
        info!(series = rows.len(), bins = catalog.pt_bins.len() * catalog.eta_bins.len(), "score table built");
        Ok(Self {
            split,
            weight,
            pt_labels: catalog.pt_bins.iter().map(|b| b.label.clone()).collect(),
            eta_labels: catalog.eta_bins.iter().map(|b| b.label.clone()).collect(),
            rows,
        })
    }

    /// Pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One block per series: the reference shows its score, every other
/// series its ratio to the reference, both as "value +/- error".
impl fmt::Display for ScoreTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stars = "*".repeat(45);
        let width = self.pt_labels.iter().map(|l| l.len()).max().unwrap_or(0);
        let n_eta = self.eta_labels.len().max(1);
        for row in &self.rows {
            let what = if row.is_reference { "resolution score" } else { "score ratio" };
            writeln!(f, "\n{stars}\n{} ({}) {what}\n{stars}", row.label, self.split)?;
            write!(f, "{:width$}", "")?;
            for eta in &self.eta_labels {
                write!(f, "  {eta:>18}")?;
            }
            writeln!(f)?;
            for (i, pt) in self.pt_labels.iter().enumerate() {
                write!(f, "{pt:<width$}")?;
                for cell in row.cells.iter().skip(i * n_eta).take(n_eta) {
                    let v = cell.ratio.unwrap_or(cell.score);
                    write!(f, "  {:>18}", format!("{:.2} +/- {:.2}", v.value, v.error))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
