//! In-place ZIP recompression.
//!
//! This module rewrites a ZIP archive held in memory into an equal or smaller
//! layout inside the same buffer.
//!
//! ## Architecture
//!
//! A pass runs through four stages:
//!
//! - [`locator`]: finds the End of Central Directory record and the prefix to keep
//! - [`directory`]: reads the central directory and detects a base offset
//! - [`compactor`]: moves every local header and payload forward, calling
//!   [`recompress`] for each payload
//! - [`rebuild`]: writes a new central directory and EOCD after the last payload
//!
//! ## Buffer convention
//!
//! The archive is read from `buf[gap..]` and the result is written from
//! `buf[0]`. A parent pass that has already shrunk earlier entries hands its
//! nested content over this way, so the child's output lands directly where
//! the parent wants it.
//!
//! ## Limitations
//!
//! - No ZIP64 support
//! - Encrypted entries are moved, never decrypted
//! - No multi-disk archive support
//! - The archive comment is dropped

pub mod compactor;
pub mod directory;
pub mod locator;
pub mod rebuild;
pub mod recompress;
mod structures;

pub use structures::*;

use crate::Result;
use crate::options::{Depth, Options};
use crate::shrink::{Dispatcher, Shrink};

/// Summary of one recompression pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    /// Size of the rewritten archive at the start of the buffer.
    pub size: usize,
    /// Entries present in the rewritten central directory.
    pub entries: usize,
    /// Entries removed because their local header could not be used.
    pub dropped: usize,
    /// Whether a payload running past the end of the archive stopped the pass early.
    pub truncated: bool,
    /// Entries kept despite a local file name length that differs from the directory's.
    ///
    /// The relocated local header keeps its own name; the directory record
    /// takes as many bytes as its own length from the same position.
    pub name_mismatches: usize,
    /// Whether the whole central directory was parsed.
    pub complete_directory: bool,
    /// Deflate entries replaced by a smaller deflate stream.
    pub recompressed: usize,
    /// Deflate entries switched to stored.
    pub stored: usize,
}

/// Recompress the archive at `buf[gap..]`, writing the result from `buf[0]`.
///
/// # Errors
///
/// Fails with [`Error::NotAZip`](crate::Error::NotAZip) or
/// [`Error::UnsupportedArchive`](crate::Error::UnsupportedArchive) before
/// touching the buffer; the caller should then keep the content as it is.
pub fn recompress_zip<S: Shrink + ?Sized>(
    buf: &mut [u8],
    gap: usize,
    depth: Depth,
    options: Options,
    shrinker: &mut S,
) -> Result<Report> {
    let data = &buf[gap..];
    let layout = locator::locate(data)?;
    let directory = directory::parse_directory(data, &layout);
    let complete_directory = directory.complete;
    let base = directory.base_offset;

    let compaction = compactor::compact(buf, gap, &layout, directory, depth, &options, shrinker);
    let cd_entries = &compaction.entries;
    let (size, entries) = rebuild::rebuild(buf, compaction.write, base, cd_entries, layout.eocd);

    log::debug!(
        "Archive rewritten: {} -> {} bytes, {} entries",
        buf.len() - gap,
        size,
        entries
    );

    Ok(Report {
        size,
        entries,
        dropped: compaction.dropped + compaction.entries.len() - entries,
        truncated: compaction.truncated,
        name_mismatches: compaction.name_mismatches,
        complete_directory,
        recompressed: compaction.recompressed,
        stored: compaction.stored,
    })
}

/// Recompress a whole archive owned by `data` and truncate it to the new size.
pub fn shrink_zip(data: &mut Vec<u8>, options: Options) -> Result<Report> {
    let mut dispatcher = Dispatcher::new(options);
    let report = recompress_zip(data, 0, options.root_depth(), options, &mut dispatcher)?;
    data.truncate(report.size);
    Ok(report)
}
