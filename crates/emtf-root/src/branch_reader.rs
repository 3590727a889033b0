//! Entry data extraction from TTree branches.
//!
//! Three shapes are supported:
//! - scalar / fixed-array single-leaf branches (`as_f64`),
//! - counter-sized single-leaf branches (`as_jagged_f64`),
//! - leaf-list branches with a fixed record per entry (`as_records`).

use rayon::prelude::*;

use crate::basket::{Basket, read_basket};
use crate::error::{Result, RootError};
use crate::tree::{BranchInfo, LeafInfo, LeafType};

/// A jagged (variable-length) column: flat values + per-entry offsets.
///
/// `offsets` has length `n_entries + 1`; entry `i` is `flat[offsets[i]..offsets[i+1]]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JaggedCol {
    /// All values of all entries.
    pub flat: Vec<f64>,
    /// Entry boundaries.
    pub offsets: Vec<usize>,
}

impl JaggedCol {
    /// Values of entry `row` (empty when out of range).
    pub fn row(&self, row: usize) -> &[f64] {
        match (self.offsets.get(row), self.offsets.get(row + 1)) {
            (Some(&a), Some(&b)) => &self.flat[a..b],
            _ => &[],
        }
    }

    /// Number of entries.
    pub fn n_entries(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }
}

/// Position of one leaf inside a fixed record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    /// Leaf name.
    pub name: String,
    /// Element type.
    pub leaf_type: LeafType,
    /// Elements per record.
    pub len: usize,
    /// Byte offset inside the record.
    pub offset: usize,
}

/// Decoded leaf-list branch: one fixed-size big-endian record per entry.
#[derive(Debug, Clone)]
pub struct RecordColumn {
    branch: String,
    fields: Vec<RecordField>,
    record_len: usize,
    data: Vec<u8>,
}

impl RecordColumn {
    fn new(branch: &str, leaves: &[LeafInfo], data: Vec<u8>) -> Self {
        let mut offset = 0;
        let fields = leaves
            .iter()
            .map(|l| {
                let f = RecordField {
                    name: l.name.clone(),
                    leaf_type: l.leaf_type,
                    len: l.len,
                    offset,
                };
                offset += l.record_bytes();
                f
            })
            .collect();
        Self { branch: branch.to_string(), fields, record_len: offset, data }
    }

    /// Number of records.
    pub fn n_entries(&self) -> usize {
        if self.record_len == 0 { 0 } else { self.data.len() / self.record_len }
    }

    /// Field layout in declaration order.
    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    /// Look up a field by leaf name.
    pub fn field(&self, name: &str) -> Result<&RecordField> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| RootError::BranchNotFound(format!("{}.{name}", self.branch)))
    }

    /// All elements of `field` in record `entry`.
    pub fn values(&self, entry: usize, field: &str) -> Result<Vec<f64>> {
        let f = self.field(field)?;
        if entry >= self.n_entries() {
            return Err(RootError::Deserialization(format!(
                "{}: entry {entry} of {}",
                self.branch,
                self.n_entries()
            )));
        }
        let size = f.leaf_type.byte_size();
        let start = entry * self.record_len + f.offset;
        Ok(self.data[start..start + f.len * size]
            .chunks_exact(size)
            .map(|b| f.leaf_type.decode_f64(b))
            .collect())
    }

    /// First element of `field` in record `entry`.
    pub fn scalar(&self, entry: usize, field: &str) -> Result<f64> {
        self.values(entry, field)?
            .first()
            .copied()
            .ok_or_else(|| RootError::TypeMismatch(format!("{}.{field} has no elements", self.branch)))
    }
}

/// Reader for one branch of a tree.
pub struct BranchReader<'a> {
    file_data: &'a [u8],
    branch: &'a BranchInfo,
    is_large: bool,
}

impl<'a> BranchReader<'a> {
    /// Create a reader over the file bytes for `branch`.
    pub fn new(file_data: &'a [u8], branch: &'a BranchInfo, is_large: bool) -> Self {
        Self { file_data, branch, is_large }
    }

    /// Branch metadata.
    pub fn branch(&self) -> &BranchInfo {
        self.branch
    }

    /// Every value of a single-leaf, fixed-size branch, flattened in entry order.
    pub fn as_f64(&self) -> Result<Vec<f64>> {
        let leaf = self.single_leaf()?;
        if self.branch.is_jagged() {
            return Err(RootError::TypeMismatch(format!(
                "branch '{}' is variable-length; use as_jagged_f64",
                self.branch.name
            )));
        }
        let size = leaf.leaf_type.byte_size();
        let mut out = Vec::new();
        for basket in self.read_baskets()? {
            let want = basket
                .n_entries
                .checked_mul(leaf.len * size)
                .ok_or_else(|| self.short_basket(usize::MAX, basket.data.len()))?;
            let data = basket.data.get(..want).ok_or_else(|| self.short_basket(want, basket.data.len()))?;
            out.extend(data.chunks_exact(size).map(|b| leaf.leaf_type.decode_f64(b)));
        }
        Ok(out)
    }

    /// Values of a counter-sized single-leaf branch, grouped per entry.
    pub fn as_jagged_f64(&self) -> Result<JaggedCol> {
        self.single_leaf()?;
        self.jagged_from(self.read_baskets()?)
    }

    /// Fixed-layout records of a leaf-list branch.
    pub fn as_records(&self) -> Result<RecordColumn> {
        self.record_len()?;
        self.records_from(self.read_baskets()?)
    }

    pub(crate) fn jagged_from(&self, baskets: Vec<Basket>) -> Result<JaggedCol> {
        let leaf = self.single_leaf()?;
        let size = leaf.leaf_type.byte_size();
        let mut col = JaggedCol { flat: Vec::new(), offsets: vec![0] };
        for basket in baskets {
            if basket.entry_offsets.is_none() {
                return Err(RootError::TypeMismatch(format!(
                    "branch '{}' has no entry offsets",
                    self.branch.name
                )));
            }
            for i in 0..basket.n_entries {
                let bytes = basket.entry(i).ok_or_else(|| {
                    RootError::Deserialization(format!(
                        "branch '{}': entry {i} outside the offset table of a {}-entry basket",
                        self.branch.name, basket.n_entries
                    ))
                })?;
                col.flat.extend(bytes.chunks_exact(size).map(|b| leaf.leaf_type.decode_f64(b)));
                col.offsets.push(col.flat.len());
            }
        }
        Ok(col)
    }

    pub(crate) fn records_from(&self, baskets: Vec<Basket>) -> Result<RecordColumn> {
        let record_len = self.record_len()?;
        let mut data = Vec::new();
        for basket in baskets {
            let want = basket.n_entries.checked_mul(record_len).ok_or_else(|| {
                RootError::Deserialization(format!(
                    "branch '{}': {} entries of {record_len} bytes",
                    self.branch.name, basket.n_entries
                ))
            })?;
            let chunk = basket.data.get(..want).ok_or_else(|| self.short_basket(want, basket.data.len()))?;
            data.extend_from_slice(chunk);
        }
        Ok(RecordColumn::new(&self.branch.name, &self.branch.leaves, data))
    }

    /// Decode basket `k` alone.
    pub(crate) fn read_basket_at(&self, k: usize) -> Result<Basket> {
        let seek = self.branch.basket_seek.get(k).copied().ok_or_else(|| {
            RootError::Deserialization(format!("branch '{}' has no basket {k}", self.branch.name))
        })?;
        read_basket(self.file_data, seek, self.is_large, self.branch.entry_offset_len > 0)
    }

    /// Record size of a fixed-layout branch.
    pub(crate) fn record_len(&self) -> Result<usize> {
        if self.branch.is_jagged() {
            return Err(RootError::TypeMismatch(format!(
                "branch '{}' has variable-size entries",
                self.branch.name
            )));
        }
        match self.branch.record_len() {
            0 => Err(RootError::TypeMismatch(format!("branch '{}' has no leaves", self.branch.name))),
            n => Ok(n),
        }
    }

    pub(crate) fn single_leaf(&self) -> Result<&'a LeafInfo> {
        match self.branch.leaves.as_slice() {
            [leaf] => Ok(leaf),
            leaves => Err(RootError::TypeMismatch(format!(
                "branch '{}' has {} leaves; use as_records",
                self.branch.name,
                leaves.len()
            ))),
        }
    }

    fn short_basket(&self, want: usize, have: usize) -> RootError {
        RootError::Deserialization(format!(
            "branch '{}': basket holds {have} bytes, entries need {want}",
            self.branch.name
        ))
    }

    /// Decode all baskets in parallel, returned in basket order.
    fn read_baskets(&self) -> Result<Vec<Basket>> {
        let has_offsets = self.branch.entry_offset_len > 0;
        let n = self.branch.n_baskets.min(self.branch.basket_seek.len());
        self.branch.basket_seek[..n]
            .par_iter()
            .map(|&seek| read_basket(self.file_data, seek, self.is_large, has_offsets))
            .collect()
    }
}
