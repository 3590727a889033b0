//! # emtf-root
//!
//! Native ROOT file reader for EMTF pT-assignment studies.
//!
//! Reads TH1D/TH1F histograms, TGraph/TGraphErrors score graphs and TTree
//! event branches from `.root` files without requiring a ROOT installation.
//! Supports zlib, LZ4, ZSTD, and XZ compression.
//!
//! ## Example
//!
//! ```no_run
//! use emtf_root::RootFile;
//!
//! let f = RootFile::open("PtResolution.root").unwrap();
//! for key in f.list_keys().unwrap() {
//!     println!("{} ({})", key.name, key.class_name);
//! }
//! let h = f.get_histogram("h_res_EMTF_pt_test_pt_all_eta_all").unwrap();
//! println!("bins: {}, integral: {}", h.n_bins(), h.integral());
//!
//! // Event records bound to a leaf-list branch
//! let tree = f.get_tree("ntuple/tree").unwrap();
//! let muons = f.branch_reader(&tree, "muon").unwrap().as_records().unwrap();
//! println!("{} entries", muons.n_entries());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod basket;
pub mod branch_reader;
pub mod datasource;
pub mod decompress;
pub mod directory;
pub mod error;
pub mod file;
#[cfg(feature = "test-fixtures")]
pub mod fixture;
pub mod graph;
pub mod histogram;
pub mod key;
pub mod lazy;
pub mod objects;
pub mod rbuffer;
pub mod tree;

pub use branch_reader::{BranchReader, JaggedCol, RecordColumn, RecordField};
pub use error::{Result, RootError};
pub use file::RootFile;
pub use graph::Graph;
pub use histogram::{BinLabel, Histogram};
pub use key::KeyInfo;
pub use lazy::{BasketDecode, LazyBranch};
pub use tree::{BranchInfo, LeafInfo, LeafType, Tree};
