//! Flat-layout ntuples: reco muons and L1 tracks stored as counter-sized
//! branches (`numRecoMuons` + `recoPt[numRecoMuons]`, ...).

use std::path::Path;

use emtf_core::{Error, Result};
use emtf_root::{JaggedCol, LazyBranch, RecordColumn, RootFile, Tree};
use tracing::debug;

use crate::source::EventSource;

/// Offline reconstructed muon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoMuon {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
}

/// Level-1 track (unpacked, emulated or legacy).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct L1Track {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub mode: i32,
}

/// One event of the flat layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecoEvent {
    pub index: u64,
    pub reco: Vec<RecoMuon>,
    /// Tracks unpacked from the EMTF readout.
    pub unpacked: Vec<L1Track>,
    /// Tracks from the re-emulated EMTF.
    pub emulated: Vec<L1Track>,
    /// Legacy CSCTF tracks; their eta is unsigned.
    pub legacy: Vec<L1Track>,
}

/// A counter branch with its parallel per-object branches.
#[derive(Debug)]
struct Group {
    counter: String,
    counts: LazyBranch<RecordColumn>,
    pt: LazyBranch<JaggedCol>,
    eta: LazyBranch<JaggedCol>,
    phi: LazyBranch<JaggedCol>,
    mode: Option<LazyBranch<JaggedCol>>,
}

/// One entry of a group: its counter and the parallel rows.
struct Rows<'a> {
    n: usize,
    pt: &'a [f64],
    eta: &'a [f64],
    phi: &'a [f64],
    mode: &'a [f64],
}

impl Group {
    fn open(file: &RootFile, tree: &Tree, counter: &str, prefix: &str, with_mode: bool) -> Result<Self> {
        let jagged = |suffix: &str| -> Result<LazyBranch<JaggedCol>> {
            Ok(file.lazy_branch(tree, &format!("{prefix}{suffix}"))?)
        };
        Ok(Self {
            counter: counter.to_string(),
            counts: file.lazy_branch(tree, counter)?,
            pt: jagged("Pt")?,
            eta: jagged("Eta")?,
            phi: jagged("Phi")?,
            mode: if with_mode { Some(jagged("Mode")?) } else { None },
        })
    }

    /// Counter value of `entry` with the parallel rows, each checked to hold
    /// at least that many values.
    fn rows<'a>(&'a self, file: &RootFile, entry: u64) -> Result<Rows<'a>> {
        let (counts, row) = self.counts.get(file, entry)?;
        let raw = counts.scalar(row, &self.counter)?;
        if !raw.is_finite() || raw < 0.0 {
            return Err(Error::Validation(format!("invalid {} = {raw} in entry {entry}", self.counter)));
        }
        let n = raw as usize;
        let row_of = |branch: &'a LazyBranch<JaggedCol>| -> Result<&'a [f64]> {
            let (col, row) = branch.get(file, entry)?;
            let values = col.row(row);
            if values.len() < n {
                return Err(Error::CapacityExceeded { kind: self.counter.clone(), count: n, capacity: values.len() });
            }
            Ok(values)
        };
        Ok(Rows {
            n,
            pt: row_of(&self.pt)?,
            eta: row_of(&self.eta)?,
            phi: row_of(&self.phi)?,
            mode: self.mode.as_ref().map(row_of).transpose()?.unwrap_or_default(),
        })
    }

    fn muons(&self, file: &RootFile, entry: u64) -> Result<Vec<RecoMuon>> {
        let r = self.rows(file, entry)?;
        Ok((0..r.n).map(|i| RecoMuon { pt: r.pt[i], eta: r.eta[i], phi: r.phi[i] }).collect())
    }

    fn tracks(&self, file: &RootFile, entry: u64) -> Result<Vec<L1Track>> {
        let r = self.rows(file, entry)?;
        Ok((0..r.n)
            .map(|i| L1Track {
                pt: r.pt[i],
                eta: r.eta[i],
                phi: r.phi[i],
                mode: r.mode.get(i).copied().unwrap_or(-1.0) as i32,
            })
            .collect())
    }
}

/// Flat-layout tree with all four collections, decoded basket by basket.
#[derive(Debug)]
pub struct RecoSource {
    file: RootFile,
    entries: u64,
    reco: Group,
    unpacked: Group,
    emulated: Group,
    legacy: Group,
}

impl RecoSource {
    /// Open `path` and read the tree at `tree_path`.
    pub fn open(path: impl AsRef<Path>, tree_path: &str) -> Result<Self> {
        Self::from_file(RootFile::open(path.as_ref())?, tree_path)
    }

    /// Read the tree at `tree_path` from an already opened file.
    pub fn from_file(file: RootFile, tree_path: &str) -> Result<Self> {
        let tree = file.get_tree(tree_path)?;
        let reco = Group::open(&file, &tree, "numRecoMuons", "reco", false)?;
        let unpacked = Group::open(&file, &tree, "numUnpTrks", "unp_trk", true)?;
        let emulated = Group::open(&file, &tree, "numTrks", "trk", true)?;
        let legacy = Group::open(&file, &tree, "numLegTrks", "leg_trk", true)?;
        debug!(path = %file.path().display(), entries = tree.entries, "reco tree opened");
        Ok(Self { file, entries: tree.entries, reco, unpacked, emulated, legacy })
    }
}

impl EventSource for RecoSource {
    type Event = RecoEvent;

    fn n_events(&self) -> u64 {
        self.entries
    }

    fn event(&self, index: u64) -> Result<RecoEvent> {
        let file = &self.file;
        Ok(RecoEvent {
            index,
            reco: self.reco.muons(file, index)?,
            unpacked: self.unpacked.tracks(file, index)?,
            emulated: self.emulated.tracks(file, index)?,
            legacy: self.legacy.tracks(file, index)?,
        })
    }
}
