//! Display window from a histogram's cumulative distribution.

use emtf_root::Histogram;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An x-axis display range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub x_min: f64,
    pub x_max: f64,
}

impl Window {
    /// Seed that any real window widens.
    pub const SEED: Window = Window { x_min: 999.0, x_max: -999.0 };

    pub fn new(x_min: f64, x_max: f64) -> Self {
        Self { x_min, x_max }
    }

    /// Whether the window was never widened.
    pub fn is_seed(&self) -> bool {
        self.x_min > self.x_max
    }

    pub fn contains(&self, other: &Window) -> bool {
        self.x_min <= other.x_min && self.x_max >= other.x_max
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::SEED
    }
}

/// Widen `seed` to cover the central mass of `hist`, trimming `pct_low`
/// percent from the low tail and `pct_hi` percent from the high tail.
///
/// Bins are scanned in order with the cumulative fraction of the regular-bin
/// total (flows excluded). The lower bound comes from the first bin whose
/// cumulative fraction exceeds `pct_low / 100`; the upper bound is the upper
/// edge of the first bin whose fraction exceeds `1 - pct_hi / 100`, or of the
/// last bin if none does. Bounds only ever widen the seed.
pub fn percentile_window(hist: &Histogram, pct_low: f64, pct_hi: f64, seed: Window) -> Result<Window> {
    let total = hist.integral();
    if total == 0.0 || !total.is_finite() {
        return Err(Error::EmptyDistribution(format!("'{}' has total {total}", hist.name)));
    }
    let n = hist.n_bins();
    let mut w = seed;
    let mut cumulative = 0.0;
    for bin in 1..=n {
        cumulative += hist.content(bin);
        let frac = cumulative / total;
        if frac > pct_low / 100.0 {
            w.x_min = w.x_min.min(hist.low_edge(bin));
        }
        if frac > 1.0 - pct_hi / 100.0 {
            w.x_max = w.x_max.max(hist.low_edge(bin + 1));
            break;
        }
        if bin == n {
            w.x_max = w.x_max.max(hist.low_edge(bin) + hist.bin_width(bin));
        }
    }
    Ok(w)
}
