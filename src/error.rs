//! Rich diagnostic error types for the holokg engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. A decode that finds no confident match
//! is *not* an error: it is reported as `None` / [`Answer::Unknown`].
//!
//! [`Answer::Unknown`]: crate::graph::Answer::Unknown

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the holokg engine.
#[derive(Debug, Error, Diagnostic)]
pub enum HoloError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Vsa(#[from] VsaError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Convenience alias used throughout the crate.
pub type HoloResult<T> = std::result::Result<T, HoloError>;

// ---------------------------------------------------------------------------
// VSA errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum VsaError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    #[diagnostic(
        code(holokg::vsa::dim_mismatch),
        help(
            "All hypervectors in an operation must share the same dimension. \
             Check that they were created by the same VsaOps / HoloGraph, \
             or re-encode the mismatched vector."
        )
    )]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("malformed hypervector: {message}")]
    #[diagnostic(
        code(holokg::vsa::malformed),
        help(
            "The packed word array does not describe a valid vector of the \
             requested dimension (wrong word count or bits set past the last component)."
        )
    )]
    MalformedVector { message: String },

    #[error("invalid dimension: {dim}")]
    #[diagnostic(
        code(holokg::vsa::invalid_dimension),
        help("Hypervector dimension must be greater than zero.")
    )]
    InvalidDimension { dim: usize },
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(holokg::store::io),
        help(
            "A filesystem operation failed. Check that the data directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("redb transaction error: {message}")]
    #[diagnostic(
        code(holokg::store::redb),
        help(
            "The embedded database encountered a transaction error. \
             Try again with a fresh data directory if the problem persists."
        )
    )]
    Redb { message: String },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(holokg::store::serde),
        help(
            "Failed to serialize or deserialize a stored record. \
             The on-disk format may come from an incompatible version."
        )
    )]
    Serialization { message: String },

    #[error("corrupted state: {message}")]
    #[diagnostic(
        code(holokg::store::corrupted),
        help(
            "The persisted registry or fact ledger is inconsistent with the expected \
             dimension or with itself. Refusing to load it rather than answer from \
             damaged vectors. Restore from a backup or re-learn the facts."
        )
    )]
    CorruptedState { message: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(holokg::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(holokg::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(holokg::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(holokg::config::invalid),
        help("Dimension must be > 0 and ask_threshold must lie in [0.0, 1.0].")
    )]
    Invalid { message: String },
}
