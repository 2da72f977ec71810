//! Forward relocation of local headers and payloads.
//!
//! Entries are visited by ascending local header offset. Each one is written at
//! the write cursor, which never passes the read position of the entry being
//! moved: headers lose their extra field and payloads never grow, so the pass
//! can run inside the source buffer.

use crate::options::{Depth, Options};
use crate::shrink::Shrink;

use super::directory::Directory;
use super::locator::Layout;
use super::recompress::{Outcome, Payload, recompress_entry};
use super::structures::{
    CentralDirectoryHeader, FLAG_DATA_DESCRIPTOR, LocalFileHeader, has_signature,
};

/// Result of the forward pass.
#[derive(Debug, Default)]
pub struct Compaction {
    /// Directory headers of the relocated entries, offsets already updated.
    pub entries: Vec<CentralDirectoryHeader>,
    /// End of the last relocated payload.
    pub write: usize,
    /// Entries skipped for a missing or misplaced local header.
    pub dropped: usize,
    /// Whether a payload running past the archive stopped the pass.
    pub truncated: bool,
    /// Entries whose local and central file name lengths disagree.
    pub name_mismatches: usize,
    pub recompressed: usize,
    pub stored: usize,
}

/// Relocate every entry of `directory`.
///
/// The archive is read from `buf[gap..]` and written from `buf[0]`.
pub fn compact<S: Shrink + ?Sized>(
    buf: &mut [u8],
    gap: usize,
    layout: &Layout,
    directory: Directory,
    depth: Depth,
    options: &Options,
    shrinker: &mut S,
) -> Compaction {
    let base = directory.base_offset;
    // Local data has to end before the EOCD.
    let end = gap + layout.eocd_pos;

    let mut compaction = Compaction {
        entries: Vec::with_capacity(directory.entries.len()),
        ..Default::default()
    };

    buf.copy_within(gap..gap + layout.zip_offset, 0);
    let mut write = layout.zip_offset;
    // Everything before this source position has been consumed.
    let mut read = gap + layout.zip_offset;

    for mut entry in directory.entries {
        let src = gap + base + entry.local_header_offset as usize;
        if src < read
            || src + LocalFileHeader::SIZE > end
            || !has_signature(&buf[src..], LocalFileHeader::SIGNATURE)
        {
            log::warn!(
                "Invalid local header offset: {:#x}, entry dropped",
                entry.local_header_offset
            );
            compaction.dropped += 1;
            continue;
        }

        let mut header = match LocalFileHeader::from_bytes(&buf[src..end]) {
            Ok(header) => header,
            Err(e) => {
                log::warn!("Entry at {:#x} dropped: {}", entry.local_header_offset, e);
                compaction.dropped += 1;
                continue;
            }
        };

        if header.file_name_length != entry.file_name_length {
            log::warn!(
                "Filename length mismatch between local file header and central directory"
            );
            compaction.name_mismatches += 1;
        }

        let header_size = header.header_size();
        if src + header_size > end {
            log::warn!("Reached end of archive in local header");
            compaction.truncated = true;
            break;
        }

        let original_flags = header.flags;
        let original_size = header.compressed_size;
        if header.flags & FLAG_DATA_DESCRIPTOR != 0 {
            // The central directory carries the real values.
            header.flags &= !FLAG_DATA_DESCRIPTOR;
            entry.flags &= !FLAG_DATA_DESCRIPTOR;
            header.crc32 = entry.crc32;
            header.compressed_size = entry.compressed_size;
            header.uncompressed_size = entry.uncompressed_size;
        }

        let payload_src = src + header_size + header.extra_field_length as usize;
        let payload_len = header.compressed_size as usize;
        if payload_src + payload_len > end {
            log::warn!("Compressed size too large");
            compaction.truncated = true;
            break;
        }

        debug_assert!(write <= src);
        buf.copy_within(
            src + LocalFileHeader::SIZE..src + header_size,
            write + LocalFileHeader::SIZE,
        );
        header.extra_field_length = 0;

        let name_bytes = &buf[write + LocalFileHeader::SIZE..write + header_size];
        let name = String::from_utf8_lossy(name_bytes).into_owned();
        // Empty directory placeholders are not worth a line.
        let placeholder = original_size == 0
            && header.compression_method == 0
            && original_flags & FLAG_DATA_DESCRIPTOR == 0;
        if !placeholder && depth.within_limit() {
            shrinker.report_name(&name, depth);
        }

        let payload = Payload {
            src: payload_src,
            dst: write + header_size,
        };
        let outcome =
            recompress_entry(buf, payload, &mut header, &name, depth, options, shrinker);
        match outcome {
            Outcome::Recompressed => compaction.recompressed += 1,
            Outcome::Stored => compaction.stored += 1,
            _ => {}
        }

        buf[write..write + LocalFileHeader::SIZE].copy_from_slice(&header.to_bytes());

        if outcome.rewrites_header() {
            entry.compression_method = header.compression_method;
            entry.crc32 = header.crc32;
            entry.compressed_size = header.compressed_size;
            entry.uncompressed_size = header.uncompressed_size;
        }
        entry.local_header_offset = (write - base) as u32;

        read = payload_src + payload_len;
        write += header_size + header.compressed_size as usize;
        debug_assert!(write <= read);

        compaction.entries.push(entry);
    }

    compaction.write = write;
    compaction
}
