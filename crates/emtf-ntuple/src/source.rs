//! Event sources: a single ntuple file, a chain of files, or memory.

use std::path::Path;

use emtf_core::{Error, Result};
use emtf_root::{LazyBranch, RecordColumn, RootFile};
use tracing::{debug, info};

use crate::records::Event;

/// Random access to the events of one logical dataset.
pub trait EventSource {
    /// Event type produced by this source.
    type Event;

    /// Number of events.
    fn n_events(&self) -> u64;

    /// Event at global `index`.
    fn event(&self, index: u64) -> Result<Self::Event>;
}

/// The `muon`, `hit` and `track` branches of one ntuple tree. Baskets are
/// decoded when an event first needs them.
#[derive(Debug)]
pub struct TreeSource {
    file: RootFile,
    entries: u64,
    muon: LazyBranch<RecordColumn>,
    hit: LazyBranch<RecordColumn>,
    track: LazyBranch<RecordColumn>,
}

impl TreeSource {
    /// Open `path` and read the tree at `tree_path` (e.g. `ntuple/tree`).
    pub fn open(path: impl AsRef<Path>, tree_path: &str) -> Result<Self> {
        Self::from_file(RootFile::open(path.as_ref())?, tree_path)
    }

    /// Read the tree at `tree_path` from an already opened file.
    pub fn from_file(file: RootFile, tree_path: &str) -> Result<Self> {
        let tree = file.get_tree(tree_path)?;
        let muon = file.lazy_branch::<RecordColumn>(&tree, "muon")?;
        let hit = file.lazy_branch::<RecordColumn>(&tree, "hit")?;
        let track = file.lazy_branch::<RecordColumn>(&tree, "track")?;
        for branch in [&muon, &hit, &track] {
            if branch.n_entries() < tree.entries {
                return Err(Error::Validation(format!(
                    "{}: branch '{}' holds {} of {} entries",
                    file.path().display(),
                    branch.name(),
                    branch.n_entries(),
                    tree.entries
                )));
            }
        }
        debug!(path = %file.path().display(), entries = tree.entries, "ntuple tree opened");
        Ok(Self { file, entries: tree.entries, muon, hit, track })
    }

    /// File this tree was read from.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Baskets decoded so far, over all three branches.
    pub fn baskets_decoded(&self) -> usize {
        self.muon.n_decoded() + self.hit.n_decoded() + self.track.n_decoded()
    }
}

impl EventSource for TreeSource {
    type Event = Event;

    fn n_events(&self) -> u64 {
        self.entries
    }

    fn event(&self, index: u64) -> Result<Event> {
        if index >= self.entries {
            return Err(Error::Validation(format!(
                "event {index} out of range ({} entries)",
                self.entries
            )));
        }
        Event::from_records(
            index,
            self.muon.get(&self.file, index)?,
            self.hit.get(&self.file, index)?,
            self.track.get(&self.file, index)?,
        )
    }
}

/// Several same-schema files read as one source with a global event index.
#[derive(Debug)]
pub struct ChainSource {
    parts: Vec<TreeSource>,
    /// First global index of each part.
    starts: Vec<u64>,
    total: u64,
}

impl ChainSource {
    /// Open every file in order. With `verbose`, per-file entry counts are
    /// logged at info level.
    pub fn open<P: AsRef<Path>>(paths: &[P], tree_path: &str, verbose: bool) -> Result<Self> {
        let parts = paths
            .iter()
            .map(|p| TreeSource::open(p, tree_path))
            .collect::<Result<Vec<_>>>()?;
        let chain = Self::from_parts(parts)?;
        for part in &chain.parts {
            if verbose {
                info!(file = %part.path().display(), entries = part.n_events(), "added file to chain");
            } else {
                debug!(file = %part.path().display(), entries = part.n_events(), "added file to chain");
            }
        }
        Ok(chain)
    }

    /// Chain already loaded trees.
    pub fn from_parts(parts: Vec<TreeSource>) -> Result<Self> {
        if parts.is_empty() {
            return Err(Error::Validation("chain has no input files".into()));
        }
        let mut starts = Vec::with_capacity(parts.len());
        let mut total = 0;
        for p in &parts {
            starts.push(total);
            total += p.n_events();
        }
        Ok(Self { parts, starts, total })
    }

    /// The chained trees in order.
    pub fn parts(&self) -> &[TreeSource] {
        &self.parts
    }
}

impl EventSource for ChainSource {
    type Event = Event;

    fn n_events(&self) -> u64 {
        self.total
    }

    fn event(&self, index: u64) -> Result<Event> {
        if index >= self.total {
            return Err(Error::Validation(format!("event {index} out of range ({} entries)", self.total)));
        }
        // last part starting at or before `index`; empty parts are skipped over
        let part = self.starts.partition_point(|&s| s <= index) - 1;
        let local = index - self.starts[part];
        Ok(self.parts[part].event(local)?.reindexed(index))
    }
}

/// Events held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource<E> {
    events: Vec<E>,
}

impl<E> MemorySource<E> {
    pub fn new(events: Vec<E>) -> Self {
        Self { events }
    }
}

impl<E: Clone> EventSource for MemorySource<E> {
    type Event = E;

    fn n_events(&self) -> u64 {
        self.events.len() as u64
    }

    fn event(&self, index: u64) -> Result<E> {
        self.events
            .get(index as usize)
            .cloned()
            .ok_or_else(|| Error::Validation(format!("event {index} out of range ({} events)", self.events.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_is_bounds_checked() {
        let src = MemorySource::new(vec![1u8, 2, 3]);
        assert_eq!(src.n_events(), 3);
        assert_eq!(src.event(2).unwrap(), 3);
        assert!(src.event(3).is_err());
    }

    #[test]
    fn empty_chain_is_rejected() {
        assert!(matches!(ChainSource::from_parts(Vec::new()), Err(Error::Validation(_))));
    }
}
