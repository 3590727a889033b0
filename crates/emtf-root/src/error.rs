//! Error types for ROOT file reading.

use thiserror::Error;

/// ROOT reader error type.
#[derive(Error, Debug)]
pub enum RootError {
    /// I/O error while opening or mapping a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the `root` magic.
    #[error("not a ROOT file (bad magic)")]
    BadMagic,

    /// A read ran past the end of a buffer.
    #[error("buffer underflow at offset {offset}: need {need} bytes, have {have}")]
    BufferUnderflow {
        /// Offset of the failed read.
        offset: usize,
        /// Bytes requested.
        need: usize,
        /// Bytes available.
        have: usize,
    },

    /// A compressed block could not be inflated.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// A streamed object did not match the expected layout.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The object class is not supported by this reader.
    #[error("unsupported class: {0}")]
    UnsupportedClass(String),

    /// No key with the given name (or path) exists.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// The named TTree is missing or is not a TTree.
    #[error("tree not found: {0}")]
    TreeNotFound(String),

    /// The named branch does not exist in the tree.
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// The data is of a different shape or type than requested.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, RootError>;
