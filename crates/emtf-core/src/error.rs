//! Error types for the EMTF analysis tools.

use thiserror::Error;

/// Analysis error type.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the ROOT reader
    #[error("ROOT error: {0}")]
    Root(#[from] emtf_root::RootError),

    /// Malformed analysis configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Catalog or input validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A plot object expected under a constructed key is absent
    #[error("missing object '{key}' in {source_name}")]
    MissingObject {
        /// Key that was looked up.
        key: String,
        /// File or source the lookup went to.
        source_name: String,
    },

    /// A distribution with zero (or non-finite) total cannot be windowed or scored
    #[error("empty distribution: {0}")]
    EmptyDistribution(String),

    /// An event declares more objects than its record can hold
    #[error("{kind}: event declares {count} entries, capacity is {capacity}")]
    CapacityExceeded {
        /// Record kind (`muon`, `hit`, `track`, ...).
        kind: String,
        /// Declared count.
        count: usize,
        /// Fixed capacity.
        capacity: usize,
    },

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
