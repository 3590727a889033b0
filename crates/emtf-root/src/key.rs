//! TKey records: the headers ROOT uses to locate every stored object.

use crate::error::Result;
use crate::rbuffer::RBuffer;

/// Key versions above this value use 64-bit seek pointers.
const LARGE_KEY_VERSION: u16 = 1000;

/// A parsed TKey record.
#[derive(Debug, Clone)]
pub struct Key {
    /// Bytes on disk for key header plus (possibly compressed) object.
    pub n_bytes: u32,
    /// Key class version.
    pub version: u16,
    /// Uncompressed object length.
    pub obj_len: u32,
    /// Length of the key header itself.
    pub key_len: u16,
    /// Cycle number within the owning directory.
    pub cycle: u16,
    /// Absolute file position of this key.
    pub seek_key: u64,
    /// Class name of the stored object.
    pub class_name: String,
    /// Object name.
    pub name: String,
    /// Object title.
    pub title: String,
}

impl Key {
    /// Read a TKey from the buffer at the current position.
    pub fn read(r: &mut RBuffer, is_large: bool) -> Result<Self> {
        let n_bytes = r.read_u32()?;
        let version = r.read_u16()?;
        let obj_len = r.read_u32()?;
        let _datime = r.read_u32()?;
        let key_len = r.read_u16()?;
        let cycle = r.read_u16()?;

        let seek_key = if version > LARGE_KEY_VERSION || is_large {
            let seek_key = r.read_u64()?;
            let _seek_pdir = r.read_u64()?;
            seek_key
        } else {
            let seek_key = r.read_u32()? as u64;
            let _seek_pdir = r.read_u32()?;
            seek_key
        };

        let class_name = r.read_string()?;
        let name = r.read_string()?;
        let title = r.read_string()?;

        Ok(Key { n_bytes, version, obj_len, key_len, cycle, seek_key, class_name, name, title })
    }

    /// Whether the object bytes following the header are compressed.
    pub fn is_compressed(&self) -> bool {
        self.obj_len as usize != (self.n_bytes as usize).saturating_sub(self.key_len as usize)
    }

    /// Whether this key points at a sub-directory.
    pub fn is_directory(&self) -> bool {
        matches!(self.class_name.as_str(), "TDirectoryFile" | "TDirectory")
    }
}

/// The TBasket extension that follows the plain TKey fields of a basket key.
///
/// All of these bytes are counted in `key_len`.
#[derive(Debug, Clone)]
pub struct BasketKey {
    /// The underlying TKey.
    pub key: Key,
    /// Buffer size the basket was allocated with.
    pub buffer_size: i32,
    /// Maximum entry size seen in this basket.
    pub nev_buf_size: i32,
    /// Number of entries stored in this basket.
    pub nev_buf: i32,
    /// Offset (including `key_len`) where entry data ends.
    pub last: i32,
}

impl BasketKey {
    /// Read a basket key (TKey header plus TBasket fields).
    pub fn read(r: &mut RBuffer, is_large: bool) -> Result<Self> {
        let key = Key::read(r, is_large)?;
        let _basket_version = r.read_u16()?;
        let buffer_size = r.read_i32()?;
        let nev_buf_size = r.read_i32()?;
        let nev_buf = r.read_i32()?;
        let last = r.read_i32()?;
        let _flag = r.read_u8()?;
        Ok(Self { key, buffer_size, nev_buf_size, nev_buf, last })
    }
}

/// Public info about a key (for listings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    /// Object name.
    pub name: String,
    /// Object class name (e.g. "TH1D", "TGraphErrors", "TDirectoryFile").
    pub class_name: String,
    /// Object title.
    pub title: String,
    /// Cycle number.
    pub cycle: u16,
}

impl From<&Key> for KeyInfo {
    fn from(key: &Key) -> Self {
        Self {
            name: key.name.clone(),
            class_name: key.class_name.clone(),
            title: key.title.clone(),
            cycle: key.cycle,
        }
    }
}
