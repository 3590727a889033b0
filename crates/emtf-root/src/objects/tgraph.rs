//! TGraph and TGraphErrors deserialization.

use super::{ClassRefs, ObjectPtr, read_counted_version, skip_versioned, th1};
use crate::error::Result;
use crate::graph::Graph;
use crate::rbuffer::RBuffer;

pub(super) fn read_tgraph(r: &mut RBuffer, refs: &mut ClassRefs) -> Result<Graph> {
    let (_version, end) = read_counted_version(r, "TGraph")?;
    let (name, title) = r.read_tnamed()?;
    skip_versioned(r, "TAttLine")?;
    skip_versioned(r, "TAttFill")?;
    skip_versioned(r, "TAttMarker")?;

    let n = r.read_i32()?.max(0) as usize;
    let x = r.read_counted_f64(n)?;
    let y = r.read_counted_f64(n)?;
    // fFunctions
    refs.skip_object_ptr(r)?;

    let histogram = match refs.read_object_ptr(r)? {
        ObjectPtr::Inline { class, end } if class.starts_with("TH1") => {
            let h = match th1::read_th1(r, refs, &class) {
                Ok(h) => Some(h),
                Err(e) => {
                    log::debug!("graph '{name}': unreadable frame histogram: {e}");
                    None
                }
            };
            r.set_pos(end);
            h
        }
        ObjectPtr::Inline { end, .. } => {
            r.set_pos(end);
            None
        }
        _ => None,
    };
    let _minimum = r.read_f64()?;
    let _maximum = r.read_f64()?;
    r.set_pos(end);

    Ok(Graph { name, title, x, y, ex: None, ey: None, histogram })
}

pub(super) fn read_tgraph_errors(r: &mut RBuffer, refs: &mut ClassRefs) -> Result<Graph> {
    let (_version, end) = read_counted_version(r, "TGraphErrors")?;
    let mut graph = read_tgraph(r, refs)?;
    let n = graph.n_points();
    graph.ex = Some(r.read_counted_f64(n)?);
    graph.ey = Some(r.read_counted_f64(n)?);
    r.set_pos(end);
    Ok(graph)
}
