//! Backing storage for an opened ROOT file.

use std::ops::Deref;

/// File bytes, either memory-mapped from disk or owned in memory.
pub enum DataSource {
    /// Bytes handed over by the caller (fixtures, network buffers).
    Owned(Vec<u8>),
    /// Read-only mapping of a file on disk.
    Mmap(memmap2::Mmap),
}

impl DataSource {
    /// Map `file` read-only.
    pub fn map(file: &std::fs::File) -> std::io::Result<Self> {
        // SAFETY: the mapping is read-only; event files are not modified while analysed.
        let mmap = unsafe { memmap2::Mmap::map(file)? };
        Ok(Self::Mmap(mmap))
    }
}

impl Deref for DataSource {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        match self {
            DataSource::Owned(v) => v,
            DataSource::Mmap(m) => m,
        }
    }
}
