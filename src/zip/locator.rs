//! Locating the End of Central Directory record.
//!
//! ZIP files are read from the end: the EOCD names the position and size of
//! the central directory, and everything before the first local file header
//! (a self-extractor stub, for instance) is kept verbatim.

use crate::error::{Error, Result};

use super::structures::{EndOfCentralDirectory, LocalFileHeader};

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: usize = 65535;

/// Where the parts of an archive live, relative to the start of its data.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub eocd: EndOfCentralDirectory,
    /// Offset of the EOCD signature.
    pub eocd_pos: usize,
    /// Central directory start as stated by the EOCD.
    pub cd_offset: usize,
    /// Central directory end as stated by the EOCD.
    pub cd_end: usize,
    /// Offset of the first local file header; the prefix before it is preserved.
    pub zip_offset: usize,
}

/// Find and validate the EOCD of the archive held in `data`.
///
/// # Errors
///
/// [`Error::NotAZip`] when no complete EOCD exists in the last 64 KiB, and
/// [`Error::UnsupportedArchive`] for split or spanned archives and for a
/// central directory reaching past the EOCD.
pub fn locate(data: &[u8]) -> Result<Layout> {
    let eocd_pos = find_eocd(data).ok_or(Error::NotAZip("end of central directory not found"))?;
    if eocd_pos + EndOfCentralDirectory::SIZE > data.len() {
        return Err(Error::NotAZip("end of central directory truncated"));
    }
    let eocd = EndOfCentralDirectory::from_bytes(&data[eocd_pos..])?;

    if eocd.is_multi_disk() {
        return Err(Error::UnsupportedArchive(
            "split and spanned archives are not supported",
        ));
    }

    let cd_offset = eocd.cd_offset as usize;
    let cd_end = cd_offset + eocd.cd_size as usize;
    if cd_end > eocd_pos {
        return Err(Error::UnsupportedArchive("central directory too large"));
    }

    // With no local header at all (an empty archive) the prefix runs up to the directory.
    let zip_offset =
        find_signature(&data[..cd_offset], LocalFileHeader::SIGNATURE).unwrap_or(cd_offset);

    log::debug!(
        "EOCD at {:#x}: {} records, directory {:#x}..{:#x}, first local header at {:#x}",
        eocd_pos,
        eocd.total_entries,
        cd_offset,
        cd_end,
        zip_offset
    );

    Ok(Layout {
        eocd,
        eocd_pos,
        cd_offset,
        cd_end,
        zip_offset,
    })
}

/// Last EOCD signature within the comment-sized window at the end of `data`.
fn find_eocd(data: &[u8]) -> Option<usize> {
    let signature = EndOfCentralDirectory::SIGNATURE;
    let search_start = data.len().saturating_sub(MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE);

    // Search backwards for EOCD signature (PK\x05\x06)
    (search_start..=data.len().saturating_sub(signature.len()))
        .rev()
        .find(|&i| data[i..].starts_with(signature))
}

/// First occurrence of `signature` in `data`.
fn find_signature(data: &[u8], signature: &[u8]) -> Option<usize> {
    data.windows(signature.len()).position(|window| window == signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eocd(records: u16, cd_size: u32, cd_offset: u32) -> EndOfCentralDirectory {
        EndOfCentralDirectory {
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: records,
            total_entries: records,
            cd_size,
            cd_offset,
            comment_len: 0,
        }
    }

    #[test]
    fn test_empty_archive() {
        let data = eocd(0, 0, 0).to_bytes();
        let layout = locate(&data).unwrap();
        assert_eq!(layout.eocd_pos, 0);
        assert_eq!(layout.zip_offset, 0);
        assert_eq!(layout.cd_end, 0);
    }

    #[test]
    fn test_eocd_behind_comment() {
        let mut data = b"PK\x03\x04 stands in for entries".to_vec();
        let cd_offset = data.len() as u32;
        let mut record = eocd(0, 0, cd_offset);
        record.comment_len = 7;
        data.extend_from_slice(&record.to_bytes());
        data.extend_from_slice(b"comment");

        let layout = locate(&data).unwrap();
        assert_eq!(layout.eocd_pos, cd_offset as usize);
        assert_eq!(layout.zip_offset, 0);
    }

    #[test]
    fn test_prefix_before_first_local_header() {
        let mut data = b"#!/bin/sh stub\n".to_vec();
        let stub = data.len();
        data.extend_from_slice(b"PK\x03\x04");
        let cd_offset = data.len() as u32;
        data.extend_from_slice(&eocd(0, 0, cd_offset).to_bytes());

        assert_eq!(locate(&data).unwrap().zip_offset, stub);
    }

    #[test]
    fn test_missing_eocd() {
        assert!(matches!(locate(b"just some bytes"), Err(Error::NotAZip(_))));
        assert!(matches!(locate(b""), Err(Error::NotAZip(_))));
    }

    #[test]
    fn test_truncated_eocd() {
        let data = eocd(0, 0, 0).to_bytes();
        assert!(matches!(locate(&data[..15]), Err(Error::NotAZip(_))));
    }

    #[test]
    fn test_spanned_archive_rejected() {
        let mut record = eocd(1, 0, 0);
        record.disk_number = 2;
        assert!(matches!(
            locate(&record.to_bytes()),
            Err(Error::UnsupportedArchive(_))
        ));
    }

    #[test]
    fn test_directory_past_eocd_rejected() {
        let data = eocd(1, 46, 0).to_bytes();
        assert!(matches!(locate(&data), Err(Error::UnsupportedArchive(_))));
    }

    #[test]
    fn test_eocd_outside_search_window() {
        let mut data = eocd(0, 0, 0).to_bytes().to_vec();
        data.resize(EndOfCentralDirectory::SIZE + MAX_COMMENT_SIZE + 1, 0);
        assert!(matches!(locate(&data), Err(Error::NotAZip(_))));
    }
}
