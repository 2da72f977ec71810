//! # rezip
//!
//! A lossless in-place ZIP recompressor.
//!
//! This library rewrites ZIP archives (and ZIP-based formats such as JAR, APK,
//! EPUB or OOXML) held in memory into a smaller layout. Deflate entries are
//! recompressed with zopfli, stored when that is smaller, or kept as they are
//! when nothing is gained. Every payload is offered to a [`Shrink`]
//! implementation first, so archives nested inside archives shrink too.
//!
//! ## Features
//!
//! - In-place rewriting, no second copy of the archive
//! - Zopfli recompression with automatic fallback to store or to the original stream
//! - Recursive shrinking of nested archives with a depth limit
//! - Self-extracting archives with relative offsets
//! - Data descriptors, local extra fields and comments removed
//!
//! ## Example
//!
//! ```no_run
//! use rezip::{Options, shrink_zip};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut data = std::fs::read("archive.zip")?;
//!     let report = shrink_zip(&mut data, Options::default())?;
//!     println!("{} entries, {} bytes", report.entries, report.size);
//!     std::fs::write("archive.zip", &data)?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod codec;
pub mod error;
pub mod options;
pub mod shrink;
pub mod zip;

pub use cli::Cli;
pub use error::{Error, Result};
pub use options::{Depth, Options};
pub use shrink::{Dispatcher, Shrink};
pub use zip::{Report, recompress_zip, shrink_zip};
