//! ROOT object deserialization: shared streamer plumbing and class dispatch.

mod tgraph;
mod th1;
mod ttree;

use std::collections::HashMap;

use crate::error::{Result, RootError};
use crate::graph::Graph;
use crate::histogram::Histogram;
use crate::rbuffer::RBuffer;
use crate::tree::Tree;

pub(crate) const K_BYTE_COUNT_MASK: u32 = 0x4000_0000;
pub(crate) const K_NEW_CLASS_TAG: u32 = 0xFFFF_FFFF;
pub(crate) const K_CLASS_MASK: u32 = 0x8000_0000;
/// Offset ROOT adds to every registered position in the reference map.
pub(crate) const K_MAP_OFFSET: usize = 2;

/// Class names registered while streaming one key payload.
///
/// Positions are measured from the start of the key record, so `origin`
/// is the key header length.
pub(crate) struct ClassRefs {
    origin: usize,
    classes: HashMap<usize, String>,
}

/// Result of reading an object pointer (`ReadObjectAny`).
pub(crate) enum ObjectPtr {
    /// Null pointer.
    Null,
    /// Back-reference to an object already streamed in this buffer.
    Reference,
    /// An inline object of the named class, ending at `end`.
    Inline { class: String, end: usize },
}

impl ClassRefs {
    pub(crate) fn new(key_len: usize) -> Self {
        Self { origin: key_len, classes: HashMap::new() }
    }

    /// Read an object pointer header, leaving the cursor at the object's body.
    pub(crate) fn read_object_ptr(&mut self, r: &mut RBuffer) -> Result<ObjectPtr> {
        let start = r.pos();
        let first = r.read_u32()?;
        if first & K_BYTE_COUNT_MASK == 0 || first == K_NEW_CLASS_TAG {
            if first == 0 || first & K_CLASS_MASK == 0 {
                return Ok(if first == 0 { ObjectPtr::Null } else { ObjectPtr::Reference });
            }
            return Err(RootError::Deserialization(format!(
                "object at {start} has no byte count (tag {first:#010x})"
            )));
        }
        let end = start + 4 + (first & !K_BYTE_COUNT_MASK) as usize;

        let tag_pos = r.pos();
        let tag = r.read_u32()?;
        let class = if tag == K_NEW_CLASS_TAG {
            let name = r.read_cstring()?;
            self.classes.insert(tag_pos + self.origin + K_MAP_OFFSET, name.clone());
            name
        } else if tag & K_CLASS_MASK != 0 {
            let at = (tag & !K_CLASS_MASK) as usize;
            self.classes.get(&at).cloned().ok_or_else(|| {
                RootError::Deserialization(format!("unknown class reference {at} at {tag_pos}"))
            })?
        } else {
            return Err(RootError::Deserialization(format!(
                "unexpected class tag {tag:#010x} at {tag_pos}"
            )));
        };
        Ok(ObjectPtr::Inline { class, end })
    }

    /// Read an object pointer and skip whatever it points at.
    pub(crate) fn skip_object_ptr(&mut self, r: &mut RBuffer) -> Result<()> {
        if let ObjectPtr::Inline { end, .. } = self.read_object_ptr(r)? {
            r.set_pos(end);
        }
        Ok(())
    }
}

/// Read a versioned header and require a byte count; returns `(version, end)`.
pub(crate) fn read_counted_version(r: &mut RBuffer, what: &str) -> Result<(u16, usize)> {
    match r.read_version()? {
        (v, Some(end)) => Ok((v, end)),
        (_, None) => Err(RootError::Deserialization(format!("{what} without byte count"))),
    }
}

/// Skip a versioned member (TAttLine, TAttAxis, ...) through its byte count.
pub(crate) fn skip_versioned(r: &mut RBuffer, what: &str) -> Result<()> {
    let (_, end) = read_counted_version(r, what)?;
    r.set_pos(end);
    Ok(())
}

/// Read a histogram from a key payload.
pub fn read_histogram(payload: &[u8], class_name: &str, key_len: usize) -> Result<Histogram> {
    let mut r = RBuffer::new(payload);
    let mut refs = ClassRefs::new(key_len);
    th1::read_th1(&mut r, &mut refs, class_name)
}

/// Read a graph from a key payload.
pub fn read_graph(payload: &[u8], class_name: &str, key_len: usize) -> Result<Graph> {
    let mut r = RBuffer::new(payload);
    let mut refs = ClassRefs::new(key_len);
    match class_name {
        "TGraph" => tgraph::read_tgraph(&mut r, &mut refs),
        "TGraphErrors" => tgraph::read_tgraph_errors(&mut r, &mut refs),
        other => Err(RootError::UnsupportedClass(other.to_string())),
    }
}

/// Read a tree from a key payload.
pub fn read_tree(payload: &[u8], key_len: usize) -> Result<Tree> {
    let mut r = RBuffer::new(payload);
    let mut refs = ClassRefs::new(key_len);
    ttree::read_ttree(&mut r, &mut refs)
}
