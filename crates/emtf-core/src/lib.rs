//! # emtf-core
//!
//! Shared vocabulary of the EMTF pT-assignment tools: the error type, plot
//! catalogs, typed object keys, the percentile display window and resolution
//! statistics, plus the YAML analysis configuration.

pub mod catalog;
pub mod config;
pub mod error;
pub mod key;
pub mod percentile;
pub mod resolution;

pub use catalog::{Catalog, EtaBin, Factory, Mva, PtBin, Series, WeightScheme};
pub use config::{AnalysisConfig, DumpConfig, PlotConfig, resolve_config};
pub use error::{Error, Result};
pub use key::{RatioGraphKey, ResolutionKey, SeriesId, Split};
pub use percentile::{Window, percentile_window};
pub use resolution::Score;
