//! TTree, TBranch and TLeaf deserialization.

use super::{ClassRefs, ObjectPtr, read_counted_version, skip_versioned};
use crate::error::{Result, RootError};
use crate::rbuffer::RBuffer;
use crate::tree::{BranchInfo, LeafInfo, LeafType, Tree, parse_leaf_dims};

/// Read a TTree from the cursor.
pub(super) fn read_ttree(r: &mut RBuffer, refs: &mut ClassRefs) -> Result<Tree> {
    let (version, end) = read_counted_version(r, "TTree")?;
    if version < 19 {
        return Err(RootError::Deserialization(format!("TTree version {version} not supported")));
    }
    let (name, title) = r.read_tnamed()?;
    skip_versioned(r, "TAttLine")?;
    skip_versioned(r, "TAttFill")?;
    skip_versioned(r, "TAttMarker")?;

    let entries = r.read_i64()?.max(0) as u64;
    // fTotBytes, fZipBytes, fSavedBytes, fFlushedBytes
    r.skip(4 * 8)?;
    let _weight = r.read_f64()?;
    // fTimerInterval, fScanField, fUpdate, fDefaultEntryOffsetLen
    r.skip(4 * 4)?;
    let n_cluster_range = r.read_i32()?.max(0) as usize;
    // fMaxEntries, fMaxEntryLoop, fMaxVirtualSize, fAutoSave, fAutoFlush, fEstimate
    r.skip(6 * 8)?;
    // fClusterRangeEnd, fClusterSize
    for _ in 0..2 {
        if r.read_u8()? != 0 {
            r.skip(n_cluster_range * 8)?;
        }
    }
    if version >= 20 {
        skip_versioned(r, "TIOFeatures")?;
    }

    let mut branches = Vec::new();
    let (count, arr_end) = read_objarray_header(r)?;
    for _ in 0..count {
        if let ObjectPtr::Inline { class, end: obj_end } = refs.read_object_ptr(r)? {
            if class == "TBranch" {
                branches.push(read_tbranch(r, refs)?);
            } else {
                log::debug!("tree '{name}': skipping branch of class {class}");
            }
            r.set_pos(obj_end);
        }
    }
    r.set_pos(arr_end);
    r.set_pos(end);

    Ok(Tree { name, title, entries, branches })
}

/// Read a TObjArray header; returns `(element count, end position)`.
fn read_objarray_header(r: &mut RBuffer) -> Result<(usize, usize)> {
    let (_version, end) = read_counted_version(r, "TObjArray")?;
    r.read_tobject()?;
    let _name = r.read_string()?;
    let count = r.read_i32()?.max(0) as usize;
    let _low_bound = r.read_i32()?;
    Ok((count, end))
}

fn read_tbranch(r: &mut RBuffer, refs: &mut ClassRefs) -> Result<BranchInfo> {
    let (version, end) = read_counted_version(r, "TBranch")?;
    let (name, title) = r.read_tnamed()?;
    skip_versioned(r, "TAttFill")?;

    let _compress = r.read_i32()?;
    let _basket_size = r.read_i32()?;
    let entry_offset_len = r.read_i32()?;
    let write_basket = r.read_i32()?.max(0) as usize;
    let _entry_number = r.read_i64()?;
    if version >= 13 {
        skip_versioned(r, "TIOFeatures")?;
    }
    let _offset = r.read_i32()?;
    let max_baskets = r.read_i32()?.max(0) as usize;
    let _split_level = r.read_i32()?;
    let entries = r.read_i64()?.max(0) as u64;
    let _first_entry = r.read_i64()?;
    let _tot_bytes = r.read_i64()?;
    let _zip_bytes = r.read_i64()?;

    skip_versioned(r, "TObjArray fBranches")?;
    let leaves = read_leaves(r, refs)?;
    skip_versioned(r, "TObjArray fBaskets")?;

    let mut basket_bytes = Vec::with_capacity(write_basket);
    let mut basket_entry = Vec::with_capacity(write_basket + 1);
    let mut basket_seek = Vec::with_capacity(write_basket);
    if r.read_u8()? != 0 {
        for i in 0..max_baskets {
            let v = r.read_i32()?;
            if i < write_basket {
                basket_bytes.push(v.max(0) as u32);
            }
        }
    }
    if r.read_u8()? != 0 {
        for i in 0..max_baskets {
            let v = r.read_i64()?;
            if i <= write_basket {
                basket_entry.push(v.max(0) as u64);
            }
        }
    }
    if r.read_u8()? != 0 {
        for i in 0..max_baskets {
            let v = r.read_i64()?;
            if i < write_basket {
                basket_seek.push(v.max(0) as u64);
            }
        }
    }
    r.set_pos(end);

    if basket_seek.len() < write_basket {
        return Err(RootError::Deserialization(format!(
            "branch '{name}': {write_basket} baskets written but {} seeks stored",
            basket_seek.len()
        )));
    }

    Ok(BranchInfo {
        name,
        title,
        leaves,
        entries,
        entry_offset_len,
        basket_bytes,
        basket_entry,
        basket_seek,
        n_baskets: write_basket,
    })
}

fn read_leaves(r: &mut RBuffer, refs: &mut ClassRefs) -> Result<Vec<LeafInfo>> {
    let (count, arr_end) = read_objarray_header(r)?;
    let mut leaves = Vec::with_capacity(count);
    for _ in 0..count {
        if let ObjectPtr::Inline { class, end } = refs.read_object_ptr(r)? {
            match read_tleaf(r, refs, &class)? {
                Some(leaf) => leaves.push(leaf),
                None => log::debug!("skipping leaf of class {class}"),
            }
            r.set_pos(end);
        }
    }
    r.set_pos(arr_end);
    Ok(leaves)
}

/// Read a concrete TLeafX: its own version header, then the TLeaf base.
/// The typed fMinimum/fMaximum that follow are left to the caller's seek.
fn read_tleaf(r: &mut RBuffer, refs: &mut ClassRefs, class: &str) -> Result<Option<LeafInfo>> {
    let (_version, _end) = read_counted_version(r, class)?;
    let (_leaf_version, leaf_end) = read_counted_version(r, "TLeaf")?;
    let (name, title) = r.read_tnamed()?;
    let f_len = r.read_i32()?;
    let _len_type = r.read_i32()?;
    let _offset = r.read_i32()?;
    let _is_range = r.read_u8()?;
    let unsigned = r.read_u8()? != 0;
    // fLeafCount
    refs.skip_object_ptr(r)?;
    r.set_pos(leaf_end);

    let Some(leaf_type) = LeafType::from_class(class, unsigned) else {
        return Ok(None);
    };
    let (parsed_len, count_leaf) = parse_leaf_dims(&title);
    let len = if f_len > 0 { f_len as usize } else { parsed_len };
    Ok(Some(LeafInfo { name, title, leaf_type, len, count_leaf }))
}
