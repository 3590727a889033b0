//! TDirectory records and key lists.

use crate::error::{Result, RootError};
use crate::key::Key;
use crate::rbuffer::RBuffer;

/// Directory versions above this value use 64-bit seek pointers.
const LARGE_DIR_VERSION: u16 = 1000;

/// The seek fields of a TDirectory streamer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirHeader {
    /// Size of the key-list record.
    pub nbytes_keys: u32,
    /// Absolute position of the key-list record (0 for an empty directory).
    pub seek_keys: u64,
}

impl DirHeader {
    /// Parse a TDirectory streamer at the cursor.
    pub fn read(r: &mut RBuffer) -> Result<Self> {
        let version = r.read_u16()?;
        let _datime_c = r.read_u32()?;
        let _datime_m = r.read_u32()?;
        let nbytes_keys = r.read_u32()?;
        let _nbytes_name = r.read_u32()?;
        let seek_keys = if version > LARGE_DIR_VERSION {
            let _seek_dir = r.read_u64()?;
            let _seek_parent = r.read_u64()?;
            r.read_u64()?
        } else {
            let _seek_dir = r.read_u32()?;
            let _seek_parent = r.read_u32()?;
            u64::from(r.read_u32()?)
        };
        Ok(Self { nbytes_keys, seek_keys })
    }
}

/// The keys of one directory, in storage order.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    keys: Vec<Key>,
}

impl Directory {
    /// Read the key list a directory header points at.
    ///
    /// The record is a TKey header for the list itself, a u32 key count and
    /// then one TKey header per stored object.
    pub fn read(file_data: &[u8], header: DirHeader, is_large: bool) -> Result<Self> {
        if header.seek_keys == 0 {
            return Ok(Self::default());
        }
        let pos = usize::try_from(header.seek_keys).map_err(|_| {
            RootError::Deserialization(format!("key list seek {} out of range", header.seek_keys))
        })?;
        let mut r = RBuffer::new(file_data);
        if pos >= file_data.len() {
            return Err(RootError::BufferUnderflow { offset: pos, need: 1, have: 0 });
        }
        r.set_pos(pos);
        let _list_key = Key::read(&mut r, is_large)?;
        let n = r.read_u32()? as usize;
        let keys = (0..n).map(|_| Key::read(&mut r, is_large)).collect::<Result<Vec<_>>>()?;
        log::debug!("directory at {pos}: {n} keys");
        Ok(Self { keys })
    }

    /// All keys (every cycle).
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Highest cycle of the key named `name`.
    pub fn find_key(&self, name: &str) -> Option<&Key> {
        self.keys.iter().filter(|k| k.name == name).max_by_key(|k| k.cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_directory_header() {
        let mut b = 5u16.to_be_bytes().to_vec();
        for v in [0u32, 0, 120, 40, 100, 0, 4096] {
            b.extend_from_slice(&v.to_be_bytes());
        }
        let h = DirHeader::read(&mut RBuffer::new(&b)).unwrap();
        assert_eq!(h, DirHeader { nbytes_keys: 120, seek_keys: 4096 });
    }

    #[test]
    fn empty_directory_has_no_keys() {
        let d = Directory::read(&[], DirHeader { nbytes_keys: 0, seek_keys: 0 }, false).unwrap();
        assert!(d.keys().is_empty());
        assert!(d.find_key("tree").is_none());
    }
}
