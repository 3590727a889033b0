//! TH1D / TH1F deserialization.
//!
//! ```text
//! TH1D | TH1F            versioned
//!   TH1                  versioned (v8)
//!     TNamed, TAttLine, TAttFill, TAttMarker
//!     fNcells
//!     fXaxis, fYaxis, fZaxis        TAxis (title, binning, fLabels)
//!     fBarOffset, fBarWidth, fEntries, fTsumw, fTsumw2, fTsumwx, fTsumwx2
//!     fMaximum, fMinimum, fNormFactor
//!     fContour, fSumw2              TArrayD
//!     fOption, fFunctions, fBufferSize, fBuffer, fBinStatErrOpt, fStatOverflows
//!   TArrayD | TArrayF    bin contents incl. under/overflow
//! ```

use super::{ClassRefs, ObjectPtr, read_counted_version, skip_versioned};
use crate::error::{Result, RootError};
use crate::histogram::{BinLabel, Histogram};
use crate::rbuffer::RBuffer;

/// Binning, title and labels of one TAxis.
struct AxisInfo {
    title: String,
    n_bins: usize,
    x_min: f64,
    x_max: f64,
    edges: Vec<f64>,
    labels: Vec<BinLabel>,
}

impl AxisInfo {
    fn bin_edges(&self) -> Vec<f64> {
        if self.edges.len() == self.n_bins + 1 {
            return self.edges.clone();
        }
        let width = (self.x_max - self.x_min) / self.n_bins.max(1) as f64;
        (0..=self.n_bins).map(|i| self.x_min + i as f64 * width).collect()
    }
}

struct Th1Base {
    name: String,
    title: String,
    n_cells: usize,
    x_axis: AxisInfo,
    entries: f64,
    sumw2: Vec<f64>,
}

/// Read a TH1D or TH1F whose versioned header starts at the cursor.
pub(super) fn read_th1(r: &mut RBuffer, refs: &mut ClassRefs, class: &str) -> Result<Histogram> {
    let double = match class {
        "TH1D" => true,
        "TH1F" => false,
        other => return Err(RootError::UnsupportedClass(other.to_string())),
    };
    let (_version, end) = read_counted_version(r, class)?;
    let base = read_th1_base(r, refs)?;

    let n = r.read_u32()? as usize;
    if n != base.n_cells {
        return Err(RootError::Deserialization(format!(
            "{class} '{}': {n} stored cells, fNcells = {}",
            base.name, base.n_cells
        )));
    }
    let cells = if double {
        r.read_array_f64(n)?
    } else {
        r.read_array_f32(n)?.into_iter().map(f64::from).collect()
    };
    r.set_pos(end);

    build_histogram(base, &cells)
}

fn read_th1_base(r: &mut RBuffer, refs: &mut ClassRefs) -> Result<Th1Base> {
    let (version, end) = read_counted_version(r, "TH1")?;
    let (name, title) = r.read_tnamed()?;
    skip_versioned(r, "TAttLine")?;
    skip_versioned(r, "TAttFill")?;
    skip_versioned(r, "TAttMarker")?;

    let n_cells = r.read_i32()?;
    let x_axis = read_taxis(r, refs)?;
    skip_versioned(r, "TAxis")?;
    skip_versioned(r, "TAxis")?;

    let _bar_offset = r.read_i16()?;
    let _bar_width = r.read_i16()?;
    let entries = r.read_f64()?;
    // fTsumw, fTsumw2, fTsumwx, fTsumwx2
    r.skip(4 * 8)?;
    if version >= 2 {
        r.skip(2 * 8)?;
    }
    if version >= 3 {
        let _norm = r.read_f64()?;
    }
    let _contour = r.read_tarray_f64()?;
    let sumw2 = r.read_tarray_f64()?;
    let _option = r.read_string()?;
    skip_versioned(r, "TList fFunctions")?;
    if version >= 4 {
        let buffer_size = r.read_i32()?.max(0) as usize;
        let _buffer = r.read_counted_f64(buffer_size)?;
    }
    if version >= 7 {
        let _bin_stat_err_opt = r.read_i32()?;
    }
    if version >= 8 {
        let _stat_overflows = r.read_i32()?;
    }
    r.set_pos(end);

    if n_cells < 0 {
        return Err(RootError::Deserialization(format!("'{name}' has fNcells = {n_cells}")));
    }
    Ok(Th1Base { name, title, n_cells: n_cells as usize, x_axis, entries, sumw2 })
}

fn read_taxis(r: &mut RBuffer, refs: &mut ClassRefs) -> Result<AxisInfo> {
    let (_version, end) = read_counted_version(r, "TAxis")?;
    let (_name, title) = r.read_tnamed()?;
    skip_versioned(r, "TAttAxis")?;

    let n_bins = r.read_i32()?.max(0) as usize;
    let x_min = r.read_f64()?;
    let x_max = r.read_f64()?;
    let edges = r.read_tarray_f64()?;
    let _first = r.read_i32()?;
    let _last = r.read_i32()?;
    let _bits2 = r.read_u16()?;
    let _time_display = r.read_u8()?;
    let _time_format = r.read_string()?;

    let labels = match refs.read_object_ptr(r)? {
        ObjectPtr::Inline { class, end } => {
            let labels = match class.as_str() {
                "THashList" | "TList" => read_label_list(r, refs)?,
                other => {
                    log::debug!("ignoring axis labels of class {other}");
                    Vec::new()
                }
            };
            r.set_pos(end);
            labels
        }
        ObjectPtr::Null | ObjectPtr::Reference => Vec::new(),
    };
    // fModLabs
    refs.skip_object_ptr(r)?;
    r.set_pos(end);

    Ok(AxisInfo { title, n_bins, x_min, x_max, edges, labels })
}

/// Read a TList of TObjString bin labels; the bin number is the TObject unique id.
fn read_label_list(r: &mut RBuffer, refs: &mut ClassRefs) -> Result<Vec<BinLabel>> {
    let (_version, end) = read_counted_version(r, "TList")?;
    r.read_tobject()?;
    let _name = r.read_string()?;
    let n = r.read_i32()?.max(0) as usize;

    let mut labels = Vec::with_capacity(n);
    for _ in 0..n {
        if let ObjectPtr::Inline { class, end: obj_end } = refs.read_object_ptr(r)? {
            if class == "TObjString" {
                let (_v, _) = r.read_version()?;
                let (bin, _bits) = r.read_tobject()?;
                let text = r.read_string()?;
                labels.push(BinLabel { bin: bin as usize, text });
            }
            r.set_pos(obj_end);
        }
        // per-entry draw option
        let option_len = r.read_u8()? as usize;
        r.skip(option_len)?;
    }
    r.set_pos(end);
    labels.sort_by_key(|l| l.bin);
    Ok(labels)
}

fn build_histogram(base: Th1Base, cells: &[f64]) -> Result<Histogram> {
    let n_bins = base.x_axis.n_bins;
    if cells.len() != n_bins + 2 {
        return Err(RootError::Deserialization(format!(
            "'{}': {} cells for {} bins",
            base.name,
            cells.len(),
            n_bins
        )));
    }
    let bin_edges = base.x_axis.bin_edges();
    let stored = base.sumw2.len() == n_bins + 2;
    let sumw2 = stored.then(|| base.sumw2[1..=n_bins].to_vec());
    let flow_sumw2 = stored.then(|| [base.sumw2[0], base.sumw2[n_bins + 1]]);

    Ok(Histogram {
        bin_edges,
        name: base.name,
        title: base.title,
        x_title: base.x_axis.title,
        bin_content: cells[1..=n_bins].to_vec(),
        underflow: cells[0],
        overflow: cells[n_bins + 1],
        sumw2,
        flow_sumw2,
        entries: base.entries,
        bin_labels: base.x_axis.labels,
    })
}
