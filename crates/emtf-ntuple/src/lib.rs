//! # emtf-ntuple
//!
//! Event records of the EMTF ntuple (`ntuple/tree`) and the text dumpers
//! that walk them.
//!
//! Two layouts are supported:
//! - the struct layout: leaf-list branches `muon`, `hit` and `track` with
//!   fixed-capacity arrays ([`Event`]);
//! - the flat layout: counter-sized branches for reco muons and unpacked,
//!   emulated and legacy tracks ([`RecoEvent`]).
//!
//! ```no_run
//! use emtf_ntuple::{Dumper, TreeSource};
//!
//! let source = TreeSource::open("EMTF_MC_NTuple.root", "ntuple/tree").unwrap();
//! let mut out = std::io::stdout().lock();
//! Dumper::new().last_event(5).dump(&source, &mut out).unwrap();
//! ```

pub mod dump;
pub mod reco;
pub mod records;
pub mod source;

pub use dump::{DumpSummary, Dumper};
pub use reco::{L1Track, RecoEvent, RecoMuon, RecoSource};
pub use records::{
    Event, GenMuon, HITS_PER_TRACK, Hit, MAX_HITS, MAX_MUONS, MAX_TRACKS, Track, TrackHit,
};
pub use source::{ChainSource, EventSource, MemorySource, TreeSource};
