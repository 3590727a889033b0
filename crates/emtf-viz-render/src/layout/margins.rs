/// Rectangular plot area within the canvas.
#[derive(Debug, Clone, Copy)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Frame of a pad with ROOT-style margins, given as fractions of the
    /// canvas size.
    pub fn from_pad(canvas_w: f64, canvas_h: f64, left: f64, right: f64, top: f64, bottom: f64) -> Self {
        let left_px = left * canvas_w;
        let top_px = top * canvas_h;
        Self {
            left: left_px,
            top: top_px,
            width: ((1.0 - left - right) * canvas_w).max(50.0),
            height: ((1.0 - top - bottom) * canvas_h).max(50.0),
        }
    }

    /// Manual margins.
    pub fn manual(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}

/// Map canvas NDC (origin bottom-left, as ROOT places legends and titles)
/// to SVG coordinates.
pub fn ndc(canvas_w: f64, canvas_h: f64, x: f64, y: f64) -> (f64, f64) {
    (x * canvas_w, (1.0 - y) * canvas_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_fractions() {
        let a = PlotArea::from_pad(700.0, 500.0, 0.10, 0.04, 0.10, 0.10);
        assert!((a.left - 70.0).abs() < 1e-9);
        assert!((a.right() - 672.0).abs() < 1e-9);
        assert!((a.top - 50.0).abs() < 1e-9);
        assert!((a.bottom() - 450.0).abs() < 1e-9);
    }

    #[test]
    fn ndc_flips_y() {
        assert_eq!(ndc(700.0, 500.0, 0.5, 1.0), (350.0, 0.0));
        assert_eq!(ndc(700.0, 500.0, 0.0, 0.0), (0.0, 500.0));
    }
}
