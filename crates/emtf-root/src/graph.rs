//! TGraph / TGraphErrors point sets.

use crate::histogram::Histogram;

/// A graph of `(x, y)` points with optional symmetric errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    /// Graph name.
    pub name: String,
    /// Graph title.
    pub title: String,
    /// X coordinates.
    pub x: Vec<f64>,
    /// Y coordinates.
    pub y: Vec<f64>,
    /// X errors (`TGraphErrors` only).
    pub ex: Option<Vec<f64>>,
    /// Y errors (`TGraphErrors` only).
    pub ey: Option<Vec<f64>>,
    /// The graph's frame histogram, which carries axis titles and bin labels.
    pub histogram: Option<Histogram>,
}

impl Graph {
    /// Number of points.
    pub fn n_points(&self) -> usize {
        self.x.len()
    }

    /// Y error of point `i` (0 when absent).
    pub fn ey_at(&self, i: usize) -> f64 {
        self.ey.as_ref().and_then(|e| e.get(i)).copied().unwrap_or(0.0)
    }

    /// X error of point `i` (0 when absent).
    pub fn ex_at(&self, i: usize) -> f64 {
        self.ex.as_ref().and_then(|e| e.get(i)).copied().unwrap_or(0.0)
    }

    /// `(min, max)` of the x coordinates, or `None` for an empty graph.
    pub fn x_range(&self) -> Option<(f64, f64)> {
        min_max(self.x.iter().copied())
    }

    /// `(min, max)` of the y coordinates, or `None` for an empty graph.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        min_max(self.y.iter().copied())
    }

    /// Largest y error (0 when the graph carries none).
    pub fn max_ey(&self) -> f64 {
        self.ey.as_deref().unwrap_or_default().iter().copied().fold(0.0, f64::max)
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
