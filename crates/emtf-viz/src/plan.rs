//! Walk a catalog and assemble every plot it implies.

use std::fmt;
use std::str::FromStr;

use emtf_core::{Catalog, Error, Result, Split, Window};
use serde::Serialize;
use tracing::info;

use crate::resolution::{Cell, ResolutionArtifact, resolution_overlay, resolution_ratio};
use crate::score_graph::{ScoreGraphArtifact, score_graph};
use crate::source::ObjectSource;

/// The three plot families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotKind {
    Resolution,
    ResolutionRatio,
    ScoreGraph,
}

impl PlotKind {
    pub const ALL: [PlotKind; 3] = [PlotKind::Resolution, PlotKind::ResolutionRatio, PlotKind::ScoreGraph];

    /// Kind string understood by the renderer.
    pub fn as_str(self) -> &'static str {
        match self {
            PlotKind::Resolution => "resolution",
            PlotKind::ResolutionRatio => "resolution_ratio",
            PlotKind::ScoreGraph => "score_graph",
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlotKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PlotKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::Config(format!("unknown plot kind '{s}'")))
    }
}

/// An assembled plot, ready for serialization and rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Resolution(ResolutionArtifact),
    ResolutionRatio(ResolutionArtifact),
    ScoreGraph(ScoreGraphArtifact),
}

impl Artifact {
    pub fn kind(&self) -> PlotKind {
        match self {
            Artifact::Resolution(_) => PlotKind::Resolution,
            Artifact::ResolutionRatio(_) => PlotKind::ResolutionRatio,
            Artifact::ScoreGraph(_) => PlotKind::ScoreGraph,
        }
    }

    /// Image file stem.
    pub fn name(&self) -> &str {
        match self {
            Artifact::Resolution(a) | Artifact::ResolutionRatio(a) => &a.name,
            Artifact::ScoreGraph(a) => &a.name,
        }
    }

    /// Display window of histogram overlays.
    pub fn window(&self) -> Option<Window> {
        match self {
            Artifact::Resolution(a) | Artifact::ResolutionRatio(a) => Some(a.window),
            Artifact::ScoreGraph(_) => None,
        }
    }

    /// Legend or series labels.
    pub fn series_labels(&self) -> Vec<String> {
        match self {
            Artifact::Resolution(a) | Artifact::ResolutionRatio(a) => a.labels(),
            Artifact::ScoreGraph(a) => a.series.iter().map(|s| s.label.clone()).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(match self {
            Artifact::Resolution(a) | Artifact::ResolutionRatio(a) => serde_json::to_string(a)?,
            Artifact::ScoreGraph(a) => serde_json::to_string(a)?,
        })
    }
}

impl Serialize for Artifact {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Artifact::Resolution(a) | Artifact::ResolutionRatio(a) => a.serialize(s),
            Artifact::ScoreGraph(a) => a.serialize(s),
        }
    }
}

/// Every artifact of `kinds` for `catalog`: overlays per (weight, pT, eta)
/// with the ratio following its overlay, then one score graph per pT bin
/// (a single inclusive graph when the catalog has no pT bins).
pub fn build_artifacts(
    catalog: &Catalog,
    src: &impl ObjectSource,
    kinds: &[PlotKind],
    split: Split,
) -> Result<Vec<Artifact>> {
    catalog.validate()?;
    let mut out = Vec::new();
    let want = |k: PlotKind| kinds.contains(&k);

    if want(PlotKind::Resolution) || want(PlotKind::ResolutionRatio) {
        for (weight, pt, eta) in catalog.combinations() {
            let cell = Cell { weight, pt, eta, split };
            if want(PlotKind::Resolution) {
                out.push(Artifact::Resolution(resolution_overlay(catalog, src, cell)?));
            }
            if want(PlotKind::ResolutionRatio) {
                out.push(Artifact::ResolutionRatio(resolution_ratio(catalog, src, cell)?));
            }
        }
    }

    if want(PlotKind::ScoreGraph) {
        if catalog.pt_bins.is_empty() {
            out.push(Artifact::ScoreGraph(score_graph(catalog, src, None)?));
        }
        for pt in &catalog.pt_bins {
            out.push(Artifact::ScoreGraph(score_graph(catalog, src, Some(pt))?));
        }
    }

    info!(artifacts = out.len(), source = %src.source_name(), "plots assembled");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_and_print() {
        for k in PlotKind::ALL {
            assert_eq!(k.to_string().parse::<PlotKind>().unwrap(), k);
        }
        assert!(matches!("pie".parse::<PlotKind>(), Err(Error::Config(_))));
    }
}
