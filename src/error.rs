//! Error types for the recompressor.
//!
//! Only conditions that make the whole archive unusable are errors. Problems
//! confined to a single entry or to the tail of the central directory are
//! logged and recovered from inside the pass.

use thiserror::Error;

/// Errors that abort a recompression pass before the buffer is modified.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from a codec or a reader.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No usable end of central directory record; the input is not a ZIP.
    #[error("not a ZIP archive: {0}")]
    NotAZip(&'static str),

    /// A ZIP, but one this engine refuses to rewrite.
    #[error("unsupported archive: {0}")]
    UnsupportedArchive(&'static str),

    /// A fixed-size record was too short or carried the wrong signature.
    #[error("malformed {0}")]
    Malformed(&'static str),
}

impl Error {
    /// Whether the caller should hand the buffer to pass-through handling.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Error::NotAZip(_) | Error::UnsupportedArchive(_))
    }
}

/// Result type for recompression operations.
pub type Result<T> = std::result::Result<T, Error>;
