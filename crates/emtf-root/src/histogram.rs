//! Public histogram type returned by `RootFile::get_histogram`.

/// An alphanumeric axis label attached to one bin.
#[derive(Debug, Clone, PartialEq)]
pub struct BinLabel {
    /// 1-based bin number.
    pub bin: usize,
    /// Label text as stored (may contain ROOT LaTeX such as `p_{T}`).
    pub text: String,
}

/// A 1D histogram extracted from a ROOT file.
///
/// Bins are addressed ROOT-style: `0` is underflow, `1..=n_bins()` are the
/// regular bins and `n_bins() + 1` is overflow.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Histogram name.
    pub name: String,
    /// Histogram title.
    pub title: String,
    /// X-axis title.
    pub x_title: String,
    /// Bin edges (length = n_bins + 1).
    pub bin_edges: Vec<f64>,
    /// Regular bin contents (length = n_bins).
    pub bin_content: Vec<f64>,
    /// Underflow content.
    pub underflow: f64,
    /// Overflow content.
    pub overflow: f64,
    /// Sum of weights squared per regular bin, if stored.
    pub sumw2: Option<Vec<f64>>,
    /// Sum of weights squared of the underflow and overflow bins, stored
    /// alongside `sumw2`.
    pub flow_sumw2: Option<[f64; 2]>,
    /// Stored number of entries (`fEntries`).
    pub entries: f64,
    /// Alphanumeric x-axis labels.
    pub bin_labels: Vec<BinLabel>,
}

impl Histogram {
    /// Build a histogram from explicit edges and regular-bin contents.
    pub fn from_edges(name: impl Into<String>, bin_edges: Vec<f64>, bin_content: Vec<f64>) -> Self {
        let entries = bin_content.iter().sum();
        Self {
            name: name.into(),
            title: String::new(),
            x_title: String::new(),
            bin_edges,
            bin_content,
            underflow: 0.0,
            overflow: 0.0,
            sumw2: None,
            flow_sumw2: None,
            entries,
            bin_labels: Vec::new(),
        }
    }

    /// Build a uniformly binned histogram over `[lo, hi)`.
    pub fn uniform(name: impl Into<String>, lo: f64, hi: f64, bin_content: Vec<f64>) -> Self {
        let n = bin_content.len().max(1);
        let width = (hi - lo) / n as f64;
        let edges = (0..=n).map(|i| lo + i as f64 * width).collect();
        Self::from_edges(name, edges, bin_content)
    }

    /// Number of regular bins.
    pub fn n_bins(&self) -> usize {
        self.bin_content.len()
    }

    /// Lower edge of bin `bin`; `low_edge(n_bins() + 1)` is the upper edge of the last bin.
    /// Bins past either end take the nearest edge; an edgeless histogram gives 0.
    pub fn low_edge(&self, bin: usize) -> f64 {
        self.bin_edges.get(bin.saturating_sub(1)).or(self.bin_edges.last()).copied().unwrap_or(0.0)
    }

    /// Width of bin `bin`.
    pub fn bin_width(&self, bin: usize) -> f64 {
        self.low_edge(bin + 1) - self.low_edge(bin)
    }

    /// Center of bin `bin`.
    pub fn bin_center(&self, bin: usize) -> f64 {
        0.5 * (self.low_edge(bin) + self.low_edge(bin + 1))
    }

    /// Content of bin `bin`, including under/overflow.
    pub fn content(&self, bin: usize) -> f64 {
        match bin {
            0 => self.underflow,
            b if b <= self.n_bins() => self.bin_content[b - 1],
            b if b == self.n_bins() + 1 => self.overflow,
            _ => 0.0,
        }
    }

    /// Statistical error of bin `bin` (flows included): `sqrt(sumw2)` when
    /// stored, else `sqrt(|content|)`.
    pub fn error(&self, bin: usize) -> f64 {
        let n = self.n_bins();
        let w2 = match (&self.sumw2, self.flow_sumw2) {
            (_, Some([under, _])) if bin == 0 => Some(under),
            (_, Some([_, over])) if bin == n + 1 => Some(over),
            (Some(w2), _) if (1..=n).contains(&bin) && w2.len() == n => Some(w2[bin - 1]),
            _ => None,
        };
        match w2 {
            Some(w2) => w2.max(0.0).sqrt(),
            None => self.content(bin).abs().sqrt(),
        }
    }

    /// Sum of regular bin contents.
    pub fn integral(&self) -> f64 {
        self.bin_content.iter().sum()
    }

    /// Largest regular bin content (0 for an empty histogram).
    pub fn max_content(&self) -> f64 {
        self.bin_content.iter().copied().fold(0.0, f64::max)
    }

    /// Lower edge of the first bin.
    pub fn x_min(&self) -> f64 {
        self.bin_edges.first().copied().unwrap_or(0.0)
    }

    /// Upper edge of the last bin.
    pub fn x_max(&self) -> f64 {
        self.bin_edges.last().copied().unwrap_or(0.0)
    }

    /// Label attached to bin `bin`, if any.
    pub fn label(&self, bin: usize) -> Option<&str> {
        self.bin_labels.iter().find(|l| l.bin == bin).map(|l| l.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_edges_and_flows() {
        let mut h = Histogram::uniform("h", 0.0, 10.0, vec![1.0; 10]);
        h.underflow = 2.0;
        h.overflow = 3.0;
        assert_eq!(h.n_bins(), 10);
        assert_eq!(h.low_edge(1), 0.0);
        assert_eq!(h.low_edge(11), 10.0);
        assert_eq!(h.bin_center(3), 2.5);
        assert_eq!(h.content(0), 2.0);
        assert_eq!(h.content(11), 3.0);
        assert_eq!(h.integral(), 10.0);
    }

    #[test]
    fn errors_prefer_sumw2() {
        let mut h = Histogram::uniform("h", 0.0, 2.0, vec![4.0, 9.0]);
        assert_eq!(h.error(2), 3.0);
        h.underflow = 4.0;
        assert_eq!(h.error(0), 2.0);
        h.sumw2 = Some(vec![16.0, 25.0]);
        h.flow_sumw2 = Some([0.25, 0.0]);
        assert_eq!(h.error(1), 4.0);
        assert_eq!(h.error(0), 0.5);
        assert_eq!(h.error(3), 0.0);
        assert_eq!(h.error(7), 0.0);
    }

    #[test]
    fn edgeless_histogram_has_zero_edges() {
        let h = Histogram::from_edges("h", Vec::new(), Vec::new());
        assert_eq!(h.low_edge(0), 0.0);
        assert_eq!(h.low_edge(1), 0.0);
        assert_eq!(h.bin_width(1), 0.0);
        assert_eq!(h.low_edge(5), 0.0);
    }
}
