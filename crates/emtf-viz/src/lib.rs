//! # emtf-viz
//!
//! Plot artifacts for EMTF pT-resolution studies.
//!
//! Histograms and graphs are read from an [`ObjectSource`] under keys built
//! from the [`emtf_core::Catalog`], then reduced to numbers-first structures
//! (bin edges, values, windows, labels, styles) that serialize to JSON and
//! are drawn by `emtf-viz-render`.

#![warn(clippy::all)]

/// Catalog walk producing every artifact.
pub mod plan;

/// Resolution overlays and ratios to the reference.
pub mod resolution;

/// Train/test score-ratio graphs.
pub mod score_graph;

/// Resolution-score tables.
pub mod scores;

/// Run manifest.
pub mod manifest;

/// Object sources.
pub mod source;

pub use manifest::{ManifestEntry, PlotManifest};
pub use plan::{Artifact, PlotKind, build_artifacts};
pub use resolution::{Cell, HistSeries, LegendSide, ResolutionArtifact, resolution_overlay, resolution_ratio};
pub use score_graph::{AxisLabel, GraphSeries, PadMargins, Range, ScoreGraphArtifact, score_graph};
pub use scores::{ScoreCell, ScoreRow, ScoreTable};
pub use source::{MemoryObjects, ObjectSource};
