//! Statistics of `log2(pT_trg / pT_true)` resolution histograms.
//!
//! A bin centred at `x` holds events whose pT ratio is `r = 2^x`. The
//! resolution score weights every event by how far its ratio lies from the
//! median ratio `m` (`max(r/m, m/r)`), so a perfect assignment scores 1.

use emtf_root::Histogram;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn checked_total(hist: &Histogram) -> Result<f64> {
    let total = hist.integral();
    if total == 0.0 || !total.is_finite() {
        return Err(Error::EmptyDistribution(format!("'{}' has total {total}", hist.name)));
    }
    Ok(total)
}

/// Median of the histogram, interpolated linearly inside the bin where the
/// cumulative sum (underflow included) first exceeds half the regular total.
pub fn median(hist: &Histogram) -> Result<f64> {
    let half = 0.5 * checked_total(hist)?;
    let mut below = hist.underflow;
    for bin in 1..=hist.n_bins() {
        let upto = below + hist.content(bin);
        if upto > half {
            let low = half - below;
            let high = upto - half;
            return Ok(hist.low_edge(bin) + low / (low + high) * hist.bin_width(bin));
        }
        below = upto;
    }
    Err(Error::Computation(format!("'{}': cumulative sum never reaches half the total", hist.name)))
}

/// `max(r/m, m/r)` for bin `bin`.
fn weight(hist: &Histogram, bin: usize, med_ratio: f64) -> f64 {
    let ratio = hist.bin_center(bin).exp2();
    if ratio > med_ratio { ratio / med_ratio } else { med_ratio / ratio }
}

/// Mean of `max(r/m, m/r)` over the histogram.
pub fn res_score(hist: &Histogram, med_ratio: f64) -> Result<f64> {
    let total = checked_total(hist)?;
    let score: f64 =
        (1..=hist.n_bins()).map(|b| weight(hist, b, med_ratio) * hist.content(b)).sum();
    Ok(score / total)
}

/// Uncertainty of [`res_score`].
///
/// Each non-empty bin's error is scaled by the bin's score weight, keeping
/// its relative error; the underflow bin contributes its own error unweighted.
pub fn res_score_err(hist: &Histogram, med_ratio: f64) -> Result<f64> {
    let total = checked_total(hist)?;
    let mut sum_sq = hist.error(0).powi(2);
    for bin in 1..=hist.n_bins() {
        let err = hist.error(bin);
        let scaled = if hist.content(bin) == 0.0 { err } else { err * weight(hist, bin, med_ratio) };
        sum_sq += scaled * scaled;
    }
    Ok(sum_sq.sqrt() / total)
}

/// A resolution score with its uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub value: f64,
    pub error: f64,
}

impl Score {
    /// Score and error of `hist` against the median ratio `med_ratio`.
    pub fn of(hist: &Histogram, med_ratio: f64) -> Result<Self> {
        Ok(Self { value: res_score(hist, med_ratio)?, error: res_score_err(hist, med_ratio)? })
    }

    /// `self / reference` with uncorrelated relative errors added in quadrature.
    pub fn ratio_to(&self, reference: &Score) -> Result<Score> {
        if reference.value == 0.0 || self.value == 0.0 {
            return Err(Error::Computation("score ratio with a zero score".into()));
        }
        let value = self.value / reference.value;
        let rel = (self.error / self.value).hypot(reference.error / reference.value);
        Ok(Score { value, error: value * rel })
    }
}

/// Median pT ratio `2^median` of a resolution histogram.
pub fn median_ratio(hist: &Histogram) -> Result<f64> {
    Ok(median(hist)?.exp2())
}

/// Bin-by-bin ratio `num / den`; bins where `den` is zero become zero.
pub fn divide(num: &Histogram, den: &Histogram) -> Result<Histogram> {
    if num.n_bins() != den.n_bins() {
        return Err(Error::Validation(format!(
            "cannot divide '{}' ({} bins) by '{}' ({} bins)",
            num.name,
            num.n_bins(),
            den.name,
            den.n_bins()
        )));
    }
    let ratio = |a: f64, b: f64| if b == 0.0 { 0.0 } else { a / b };
    let mut out = num.clone();
    out.bin_content = num.bin_content.iter().zip(&den.bin_content).map(|(&a, &b)| ratio(a, b)).collect();
    out.underflow = ratio(num.underflow, den.underflow);
    out.overflow = ratio(num.overflow, den.overflow);
    out.sumw2 = None;
    out.flow_sumw2 = None;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_interpolates_inside_bin() {
        let h = Histogram::uniform("h", 0.0, 4.0, vec![1.0, 2.0, 4.0, 1.0]);
        // half = 4; cumulative 1, 3, 7 -> bin 3, a quarter of the way in
        assert!((median(&h).unwrap() - 2.25).abs() < 1e-12);
    }

    #[test]
    fn median_counts_underflow() {
        let mut h = Histogram::uniform("h", 0.0, 4.0, vec![1.0, 2.0, 4.0, 1.0]);
        h.underflow = 2.0;
        // cumulative 3, 5 -> bin 2, half way in
        assert!((median(&h).unwrap() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn perfect_resolution_scores_one() {
        // all events in the bin centred on log2(r) = 0
        let h = Histogram::uniform("h", -0.5, 0.5, vec![10.0]);
        assert_eq!(res_score(&h, 1.0).unwrap(), 1.0);
        assert!((res_score_err(&h, 1.0).unwrap() - 10f64.sqrt() / 10.0).abs() < 1e-12);
    }

    #[test]
    fn weighted_underflow_uses_its_sumw2() {
        let mut h = Histogram::uniform("h", -0.5, 0.5, vec![10.0]);
        h.underflow = 4.0;
        // unweighted: the underflow adds |content| to the squared error
        assert!((res_score_err(&h, 1.0).unwrap() - 14f64.sqrt() / 10.0).abs() < 1e-12);
        h.sumw2 = Some(vec![10.0]);
        h.flow_sumw2 = Some([1.0, 0.0]);
        assert!((res_score_err(&h, 1.0).unwrap() - 11f64.sqrt() / 10.0).abs() < 1e-12);
    }

    #[test]
    fn score_is_symmetric_in_log_space() {
        let h = Histogram::uniform("h", -1.5, 1.5, vec![1.0, 0.0, 1.0]);
        // centres at -1 and +1: both weigh 2
        assert!((res_score(&h, 1.0).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn ratio_propagates_relative_errors() {
        let s = Score { value: 2.0, error: 0.06 };
        let r = Score { value: 4.0, error: 0.16 };
        let q = s.ratio_to(&r).unwrap();
        assert_eq!(q.value, 0.5);
        assert!((q.error - 0.5 * 0.05).abs() < 1e-12);
    }

    #[test]
    fn divide_zeroes_empty_reference_bins() {
        let a = Histogram::uniform("a", 0.0, 3.0, vec![2.0, 3.0, 4.0]);
        let b = Histogram::uniform("b", 0.0, 3.0, vec![1.0, 0.0, 8.0]);
        assert_eq!(divide(&a, &b).unwrap().bin_content, vec![2.0, 0.0, 0.5]);
        let c = Histogram::uniform("c", 0.0, 3.0, vec![1.0; 2]);
        assert!(divide(&a, &c).is_err());
    }

    #[test]
    fn empty_histograms_are_rejected() {
        let h = Histogram::uniform("h", 0.0, 1.0, vec![0.0]);
        assert!(matches!(median(&h), Err(Error::EmptyDistribution(_))));
        assert!(matches!(res_score(&h, 1.0), Err(Error::EmptyDistribution(_))));
    }
}
