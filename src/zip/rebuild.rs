//! Central directory and EOCD regeneration.

use super::structures::{
    CentralDirectoryHeader, EndOfCentralDirectory, FLAG_DATA_DESCRIPTOR, LocalFileHeader,
};

/// Write a fresh central directory and EOCD at `write`.
///
/// File names are copied from the relocated local headers: the old directory
/// may already be overwritten. Returns the size of the archive and the number
/// of directory records written.
pub fn rebuild(
    buf: &mut [u8],
    mut write: usize,
    base: usize,
    entries: &[CentralDirectoryHeader],
    mut eocd: EndOfCentralDirectory,
) -> (usize, usize) {
    let cd_start = write;
    let mut written = 0usize;

    for entry in entries {
        let name_len = entry.file_name_length as usize;
        let name_src = base + entry.local_header_offset as usize + LocalFileHeader::SIZE;
        let record_end = write + CentralDirectoryHeader::SIZE + name_len;
        if record_end + EndOfCentralDirectory::SIZE > buf.len() || name_src + name_len > buf.len() {
            log::warn!(
                "No room for central directory record at {:#x}, entry dropped",
                entry.local_header_offset
            );
            continue;
        }

        let mut record = *entry;
        record.flags &= !FLAG_DATA_DESCRIPTOR;
        record.extra_field_length = 0;
        record.file_comment_length = 0;

        buf[write..write + CentralDirectoryHeader::SIZE].copy_from_slice(&record.to_bytes());
        let name_dst = write + CentralDirectoryHeader::SIZE;
        buf.copy_within(name_src..name_src + name_len, name_dst);
        write = record_end;
        written += 1;
    }

    eocd.disk_entries = written as u16;
    eocd.total_entries = written as u16;
    eocd.cd_offset = (cd_start - base) as u32;
    eocd.cd_size = (write - cd_start) as u32;
    eocd.comment_len = 0;

    buf[write..write + EndOfCentralDirectory::SIZE].copy_from_slice(&eocd.to_bytes());
    (write + EndOfCentralDirectory::SIZE, written)
}
