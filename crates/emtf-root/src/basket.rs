//! TBasket reading: one key per basket, entry data plus an optional offset table.

use crate::decompress::decompress;
use crate::error::{Result, RootError};
use crate::key::BasketKey;
use crate::rbuffer::RBuffer;

/// A decoded basket.
#[derive(Debug, Clone)]
pub struct Basket {
    /// Entry data (big-endian), without the trailing offset table.
    pub data: Vec<u8>,
    /// Number of entries in the basket.
    pub n_entries: usize,
    /// Start of each entry within `data`, plus a final end marker
    /// (`n_entries + 1` values). `None` for fixed-size entries.
    pub entry_offsets: Option<Vec<usize>>,
}

impl Basket {
    /// Bytes of entry `i` (offset-table baskets only).
    pub fn entry(&self, i: usize) -> Option<&[u8]> {
        let offsets = self.entry_offsets.as_ref()?;
        let (start, end) = (*offsets.get(i)?, *offsets.get(i + 1)?);
        self.data.get(start..end)
    }
}

/// Read and decode the basket whose key starts at `seek`.
pub fn read_basket(file_data: &[u8], seek: u64, is_large: bool, has_offsets: bool) -> Result<Basket> {
    let pos = usize::try_from(seek)
        .map_err(|_| RootError::Deserialization(format!("basket seek {seek} out of range")))?;
    let mut r = RBuffer::new(file_data);
    if pos >= file_data.len() {
        return Err(RootError::BufferUnderflow { offset: pos, need: 1, have: 0 });
    }
    r.set_pos(pos);
    let bk = BasketKey::read(&mut r, is_large)?;
    let key = &bk.key;

    let key_len = key.key_len as usize;
    let record_end = pos + key.n_bytes as usize;
    if record_end > file_data.len() || key.n_bytes as usize <= key_len {
        return Err(RootError::BufferUnderflow {
            offset: pos,
            need: key.n_bytes as usize,
            have: file_data.len().saturating_sub(pos),
        });
    }
    let body = &file_data[pos + key_len..record_end];
    let payload =
        if key.is_compressed() { decompress(body, key.obj_len as usize)? } else { body.to_vec() };

    let data_len = (bk.last.max(0) as usize).saturating_sub(key_len);
    if data_len > payload.len() {
        return Err(RootError::Deserialization(format!(
            "basket at {pos}: fLast {} beyond payload of {} bytes",
            bk.last,
            payload.len()
        )));
    }
    let n_entries = bk.nev_buf.max(0) as usize;

    let entry_offsets = if has_offsets {
        Some(read_entry_offsets(&payload[data_len..], key_len, data_len, n_entries)?)
    } else {
        None
    };

    let mut data = payload;
    data.truncate(data_len);
    log::debug!("basket at {pos}: {n_entries} entries, {data_len} data bytes");
    Ok(Basket { data, n_entries, entry_offsets })
}

/// Parse the offset table stored after the entry data:
/// `i32 count` followed by `count` key-relative i32 offsets.
fn read_entry_offsets(
    table: &[u8],
    key_len: usize,
    data_len: usize,
    n_entries: usize,
) -> Result<Vec<usize>> {
    let mut r = RBuffer::new(table);
    let count = r.read_i32()?.max(0) as usize;
    if count < n_entries {
        return Err(RootError::Deserialization(format!(
            "offset table lists {count} entries, basket holds {n_entries}"
        )));
    }
    let mut offsets = Vec::with_capacity(n_entries + 1);
    for _ in 0..n_entries {
        let raw = r.read_i32()?.max(0) as usize;
        let off = raw.checked_sub(key_len).filter(|&o| o <= data_len).ok_or_else(|| {
            RootError::Deserialization(format!("entry offset {raw} outside basket data"))
        })?;
        if offsets.last().is_some_and(|&prev| off < prev) {
            return Err(RootError::Deserialization("entry offsets not monotonic".into()));
        }
        offsets.push(off);
    }
    offsets.push(data_len);
    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_rebased_on_key_length() {
        let key_len = 70;
        let mut table = 3i32.to_be_bytes().to_vec();
        for raw in [70, 74, 74] {
            table.extend_from_slice(&(raw as i32).to_be_bytes());
        }
        let offsets = read_entry_offsets(&table, key_len, 12, 3).unwrap();
        assert_eq!(offsets, vec![0, 4, 4, 12]);

        let basket = Basket { data: (0u8..12).collect(), n_entries: 3, entry_offsets: Some(offsets) };
        assert_eq!(basket.entry(0), Some(&[0u8, 1, 2, 3][..]));
        assert_eq!(basket.entry(1), Some(&[][..]));
        assert_eq!(basket.entry(2).map(<[u8]>::len), Some(8));
        assert_eq!(basket.entry(3), None);
    }

    #[test]
    fn decreasing_offsets_are_rejected() {
        let mut table = 2i32.to_be_bytes().to_vec();
        table.extend_from_slice(&78i32.to_be_bytes());
        table.extend_from_slice(&70i32.to_be_bytes());
        assert!(read_entry_offsets(&table, 70, 12, 2).is_err());
    }
}
