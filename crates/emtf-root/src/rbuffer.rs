//! Big-endian cursor over streamed ROOT bytes.

use crate::error::{Result, RootError};

/// Read cursor over a key payload or the raw file.
///
/// Positions are absolute within the wrapped slice; byte-count ends returned
/// by [`RBuffer::read_version`] can be passed straight to [`RBuffer::set_pos`].
pub struct RBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

macro_rules! be_reader {
    ($($name:ident -> $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Big-endian `", stringify!($ty), "`.")]
            #[inline]
            pub fn $name(&mut self) -> Result<$ty> {
                let b = self.read_bytes(std::mem::size_of::<$ty>())?;
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(b);
                Ok(<$ty>::from_be_bytes(raw))
            }
        )*
    };
}

impl<'a> RBuffer<'a> {
    /// Cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current position.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Length of the wrapped slice.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the wrapped slice is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Jump to an absolute position. Reads past the end fail later.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Advance by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Borrow the next `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|&e| e <= self.data.len()).ok_or(
            RootError::BufferUnderflow { offset: self.pos, need: n, have: self.remaining() },
        )?;
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    be_reader! {
        read_u8 -> u8,
        read_u16 -> u16,
        read_i16 -> i16,
        read_u32 -> u32,
        read_i32 -> i32,
        read_u64 -> u64,
        read_i64 -> i64,
        read_f32 -> f32,
        read_f64 -> f64,
    }

    /// A TString: one length byte, or 255 followed by a u32 length.
    pub fn read_string(&mut self) -> Result<String> {
        let len = match self.read_u8()? {
            255 => self.read_u32()? as usize,
            n => n as usize,
        };
        Ok(String::from_utf8_lossy(self.read_bytes(len)?).into_owned())
    }

    /// Class names inside object pointers are NUL-terminated.
    pub fn read_cstring(&mut self) -> Result<String> {
        let rest = self.data.get(self.pos..).unwrap_or_default();
        let n = rest.iter().position(|&b| b == 0).ok_or(RootError::BufferUnderflow {
            offset: self.pos,
            need: rest.len() + 1,
            have: rest.len(),
        })?;
        let s = String::from_utf8_lossy(&rest[..n]).into_owned();
        self.pos += n + 1;
        Ok(s)
    }

    /// Streamer version header.
    ///
    /// When bit 30 of the leading u32 is set the low bits are a byte count
    /// covering everything after that u32, and the object's end position is
    /// returned alongside the version. Otherwise only a bare u16 version is
    /// present.
    pub fn read_version(&mut self) -> Result<(u16, Option<usize>)> {
        let start = self.pos;
        let head = self.read_u32()?;
        if head & 0x4000_0000 == 0 {
            self.pos = start + 2;
            return Ok(((head >> 16) as u16, None));
        }
        let version = self.read_u16()?;
        Ok((version, Some(start + 4 + (head & !0x4000_0000) as usize)))
    }

    /// TObject: version, fUniqueID, fBits (plus pidf when referenced).
    pub fn read_tobject(&mut self) -> Result<(u32, u32)> {
        self.skip(2)?;
        let unique_id = self.read_u32()?;
        let bits = self.read_u32()? | 0x0100_0000;
        if bits & 0x0800_0000 != 0 {
            self.skip(2)?;
        }
        Ok((unique_id, bits))
    }

    /// Versioned TNamed; returns `(name, title)`.
    pub fn read_tnamed(&mut self) -> Result<(String, String)> {
        self.read_version()?;
        self.read_tobject()?;
        Ok((self.read_string()?, self.read_string()?))
    }

    /// TArrayD: u32 length then the values.
    pub fn read_tarray_f64(&mut self) -> Result<Vec<f64>> {
        let n = self.read_u32()? as usize;
        self.read_array_f64(n)
    }

    /// A `[fN]`-sized pointer member: presence byte, then `n` values if set.
    pub fn read_counted_f64(&mut self, n: usize) -> Result<Vec<f64>> {
        match self.read_u8()? {
            0 => Ok(Vec::new()),
            _ => self.read_array_f64(n),
        }
    }

    /// `n` consecutive f64 values.
    pub fn read_array_f64(&mut self, n: usize) -> Result<Vec<f64>> {
        (0..n).map(|_| self.read_f64()).collect()
    }

    /// `n` consecutive f32 values.
    pub fn read_array_f32(&mut self, n: usize) -> Result<Vec<f32>> {
        (0..n).map(|_| self.read_f32()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_big_endian() {
        let mut data = vec![0x01, 0x02, 0x03, 0x04];
        data.extend_from_slice(&std::f64::consts::E.to_be_bytes());
        data.extend_from_slice(&(-7i16).to_be_bytes());
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_u32().unwrap(), 0x0102_0304);
        assert_eq!(r.read_f64().unwrap(), std::f64::consts::E);
        assert_eq!(r.read_i16().unwrap(), -7);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn short_and_long_strings() {
        let mut data = vec![2, b'p', b't'];
        data.push(255);
        data.extend_from_slice(&300u32.to_be_bytes());
        data.extend(std::iter::repeat(b'x').take(300));
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_string().unwrap(), "pt");
        assert_eq!(r.read_string().unwrap().len(), 300);
    }

    #[test]
    fn version_with_and_without_byte_count() {
        let mut data = (0x4000_0000u32 | 12).to_be_bytes().to_vec();
        data.extend_from_slice(&8u16.to_be_bytes());
        data.extend_from_slice(&[0u8; 10]);
        data.extend_from_slice(&5u16.to_be_bytes());
        data.extend_from_slice(&[0u8; 2]);
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_version().unwrap(), (8, Some(16)));
        r.set_pos(16);
        assert_eq!(r.read_version().unwrap(), (5, None));
        assert_eq!(r.pos(), 18);
    }

    #[test]
    fn cstring_stops_at_nul() {
        let mut r = RBuffer::new(b"TH1D\0tail");
        assert_eq!(r.read_cstring().unwrap(), "TH1D");
        assert_eq!(r.pos(), 5);
        assert!(RBuffer::new(b"TH1D").read_cstring().is_err());
    }

    #[test]
    fn counted_array_presence_byte() {
        let mut data = vec![1u8];
        data.extend_from_slice(&0.25f64.to_be_bytes());
        data.push(0);
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_counted_f64(1).unwrap(), vec![0.25]);
        assert!(r.read_counted_f64(1).unwrap().is_empty());
    }

    #[test]
    fn underflow_reports_position() {
        let mut r = RBuffer::new(&[0u8; 3]);
        r.skip(2).unwrap();
        assert!(matches!(
            r.read_u32(),
            Err(RootError::BufferUnderflow { offset: 2, need: 4, have: 1 })
        ));
    }
}
