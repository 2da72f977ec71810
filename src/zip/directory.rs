//! Central directory parsing.

use super::locator::Layout;
use super::structures::{CentralDirectoryHeader, has_signature};

/// Parsed central directory, in processing order.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    /// Headers sorted by local header offset.
    pub entries: Vec<CentralDirectoryHeader>,
    /// Added to every offset stored in the archive.
    pub base_offset: usize,
    /// False when parsing stopped early or did not end exactly at the stated directory end.
    pub complete: bool,
}

/// Read the central directory described by `layout` out of `data`.
///
/// Parsing never fails as a whole: a bad record ends the directory and the
/// records read so far are kept.
///
/// Some archives, typically self-extractors built by prepending a stub, store
/// offsets relative to the first local header instead of the start of the
/// file. When the first record is not where the EOCD says but is found
/// `zip_offset` bytes further, that distance becomes the base offset.
pub fn parse_directory(data: &[u8], layout: &Layout) -> Directory {
    let total = layout.eocd.total_entries as usize;
    let mut entries = Vec::with_capacity(total);
    let mut base_offset = 0;
    let mut read = layout.cd_offset;
    let mut cd_end = layout.cd_end;

    for i in 0..total {
        if read + CentralDirectoryHeader::SIZE > cd_end {
            log::warn!(
                "Central directory header {} passed end, all remaining headers ignored",
                i
            );
            break;
        }

        if !has_signature(&data[read..], CentralDirectoryHeader::SIGNATURE) {
            let shifted = read + layout.zip_offset;
            if i == 0
                && cd_end + layout.zip_offset <= data.len()
                && has_signature(&data[shifted..], CentralDirectoryHeader::SIGNATURE)
            {
                base_offset = layout.zip_offset;
                read = shifted;
                cd_end += base_offset;
                log::debug!("Offsets are relative to {:#x}", base_offset);
            } else {
                log::warn!(
                    "Central directory header magic mismatch at offset {:#x}",
                    read
                );
                break;
            }
        }

        match CentralDirectoryHeader::from_bytes(&data[read..cd_end]) {
            Ok(header) => {
                read += header.record_size();
                entries.push(header);
            }
            Err(e) => {
                log::warn!("Central directory header {}: {}", i, e);
                break;
            }
        }
    }

    let complete = read == cd_end && entries.len() == total;
    if read != cd_end {
        log::warn!("Central directory size mismatch");
    }

    // Stable: records sharing an offset keep their directory order.
    entries.sort_by_key(|header| header.local_header_offset);

    log::debug!(
        "Parsed {} of {} central directory headers",
        entries.len(),
        total
    );

    Directory {
        entries,
        base_offset,
        complete,
    }
}
