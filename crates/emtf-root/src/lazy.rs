//! Branches decoded one basket at a time, on first access.
//!
//! A dump that looks at the first few events of a large ntuple only touches
//! the baskets holding those events; the rest of the file is never
//! decompressed.

use std::sync::OnceLock;

use crate::basket::Basket;
use crate::branch_reader::{BranchReader, JaggedCol, RecordColumn};
use crate::error::{Result, RootError};
use crate::file::RootFile;
use crate::tree::BranchInfo;

/// A branch shape that can be decoded from a single basket.
pub trait BasketDecode: Sized {
    /// Reject a branch of another shape before any basket is read.
    fn check(reader: &BranchReader<'_>) -> Result<()>;

    /// Decode the entries of one basket.
    fn decode(reader: &BranchReader<'_>, basket: Basket) -> Result<Self>;

    /// Entries held by the decoded basket.
    fn n_entries(&self) -> usize;
}

impl BasketDecode for RecordColumn {
    fn check(reader: &BranchReader<'_>) -> Result<()> {
        reader.record_len().map(|_| ())
    }

    fn decode(reader: &BranchReader<'_>, basket: Basket) -> Result<Self> {
        reader.records_from(vec![basket])
    }

    fn n_entries(&self) -> usize {
        RecordColumn::n_entries(self)
    }
}

impl BasketDecode for JaggedCol {
    fn check(reader: &BranchReader<'_>) -> Result<()> {
        reader.single_leaf().map(|_| ())
    }

    fn decode(reader: &BranchReader<'_>, basket: Basket) -> Result<Self> {
        reader.jagged_from(vec![basket])
    }

    fn n_entries(&self) -> usize {
        JaggedCol::n_entries(self)
    }
}

/// One branch whose baskets are decoded on demand and then kept.
#[derive(Debug)]
pub struct LazyBranch<T> {
    branch: BranchInfo,
    baskets: Vec<OnceLock<T>>,
}

impl<T: BasketDecode> LazyBranch<T> {
    pub(crate) fn new(reader: &BranchReader<'_>) -> Result<Self> {
        T::check(reader)?;
        let branch = reader.branch().clone();
        let n = branch.n_baskets.min(branch.basket_seek.len());
        let baskets = std::iter::repeat_with(OnceLock::new).take(n).collect();
        Ok(Self { branch, baskets })
    }

    /// Branch name.
    pub fn name(&self) -> &str {
        &self.branch.name
    }

    /// Entries declared by the branch.
    pub fn n_entries(&self) -> u64 {
        self.branch.entries
    }

    /// Baskets decoded so far.
    pub fn n_decoded(&self) -> usize {
        self.baskets.iter().filter(|b| b.get().is_some()).count()
    }

    /// The decoded basket holding `entry` and the entry's row inside it.
    ///
    /// `file` must be the file the branch was read from.
    pub fn get(&self, file: &RootFile, entry: u64) -> Result<(&T, usize)> {
        let (k, row) = self
            .branch
            .locate(entry)
            .filter(|&(k, _)| k < self.baskets.len())
            .ok_or_else(|| {
                RootError::Deserialization(format!(
                    "branch '{}': no basket holds entry {entry} of {}",
                    self.branch.name, self.branch.entries
                ))
            })?;
        let slot = &self.baskets[k];
        let decoded = match slot.get() {
            Some(d) => d,
            None => {
                let reader = file.reader_for(&self.branch);
                let d = T::decode(&reader, reader.read_basket_at(k)?)?;
                log::debug!("branch '{}': decoded basket {k} ({} entries)", self.branch.name, d.n_entries());
                slot.get_or_init(|| d)
            }
        };
        if row >= decoded.n_entries() {
            return Err(RootError::Deserialization(format!(
                "branch '{}': basket {k} holds {} entries, entry {entry} needs row {row}",
                self.branch.name,
                decoded.n_entries()
            )));
        }
        Ok((decoded, row))
    }
}
