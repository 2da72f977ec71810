use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::{Error, Result};

/// General purpose flag: entry is encrypted.
pub const FLAG_ENCRYPTED: u16 = 1 << 0;

/// General purpose flag: crc32 and sizes follow the payload in a data descriptor.
pub const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// Checks that `data` starts with `signature`.
pub fn has_signature(data: &[u8], signature: &[u8]) -> bool {
    data.get(..signature.len()) == Some(signature)
}

/// End of Central Directory (EOCD) - 22 bytes minimum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || !has_signature(data, Self::SIGNATURE) {
            return Err(Error::Malformed("end of central directory"));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>()?,
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(Self::SIGNATURE);
        LittleEndian::write_u16(&mut out[4..6], self.disk_number);
        LittleEndian::write_u16(&mut out[6..8], self.disk_with_cd);
        LittleEndian::write_u16(&mut out[8..10], self.disk_entries);
        LittleEndian::write_u16(&mut out[10..12], self.total_entries);
        LittleEndian::write_u32(&mut out[12..16], self.cd_size);
        LittleEndian::write_u32(&mut out[16..20], self.cd_offset);
        LittleEndian::write_u16(&mut out[20..22], self.comment_len);
        out
    }

    /// Split and spanned archives keep parts of the directory on other disks.
    pub fn is_multi_disk(&self) -> bool {
        self.disk_number != 0 || self.disk_with_cd != 0 || self.disk_entries != self.total_entries
    }
}

/// Central Directory File Header (CDFH) - 46 bytes, followed by
/// file name, extra field and comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CentralDirectoryHeader {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: u16,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
    pub file_comment_length: u16,
    pub disk_number_start: u16,
    pub internal_attrs: u16,
    pub external_attrs: u32,
    pub local_header_offset: u32,
}

impl CentralDirectoryHeader {
    pub const SIGNATURE: &'static [u8] = b"PK\x01\x02";
    pub const SIZE: usize = 46;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || !has_signature(data, Self::SIGNATURE) {
            return Err(Error::Malformed("central directory file header"));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            version_made_by: cursor.read_u16::<LittleEndian>()?,
            version_needed: cursor.read_u16::<LittleEndian>()?,
            flags: cursor.read_u16::<LittleEndian>()?,
            compression_method: cursor.read_u16::<LittleEndian>()?,
            last_mod_time: cursor.read_u16::<LittleEndian>()?,
            last_mod_date: cursor.read_u16::<LittleEndian>()?,
            crc32: cursor.read_u32::<LittleEndian>()?,
            compressed_size: cursor.read_u32::<LittleEndian>()?,
            uncompressed_size: cursor.read_u32::<LittleEndian>()?,
            file_name_length: cursor.read_u16::<LittleEndian>()?,
            extra_field_length: cursor.read_u16::<LittleEndian>()?,
            file_comment_length: cursor.read_u16::<LittleEndian>()?,
            disk_number_start: cursor.read_u16::<LittleEndian>()?,
            internal_attrs: cursor.read_u16::<LittleEndian>()?,
            external_attrs: cursor.read_u32::<LittleEndian>()?,
            local_header_offset: cursor.read_u32::<LittleEndian>()?,
        })
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(Self::SIGNATURE);
        LittleEndian::write_u16(&mut out[4..6], self.version_made_by);
        LittleEndian::write_u16(&mut out[6..8], self.version_needed);
        LittleEndian::write_u16(&mut out[8..10], self.flags);
        LittleEndian::write_u16(&mut out[10..12], self.compression_method);
        LittleEndian::write_u16(&mut out[12..14], self.last_mod_time);
        LittleEndian::write_u16(&mut out[14..16], self.last_mod_date);
        LittleEndian::write_u32(&mut out[16..20], self.crc32);
        LittleEndian::write_u32(&mut out[20..24], self.compressed_size);
        LittleEndian::write_u32(&mut out[24..28], self.uncompressed_size);
        LittleEndian::write_u16(&mut out[28..30], self.file_name_length);
        LittleEndian::write_u16(&mut out[30..32], self.extra_field_length);
        LittleEndian::write_u16(&mut out[32..34], self.file_comment_length);
        LittleEndian::write_u16(&mut out[34..36], self.disk_number_start);
        LittleEndian::write_u16(&mut out[36..38], self.internal_attrs);
        LittleEndian::write_u32(&mut out[38..42], self.external_attrs);
        LittleEndian::write_u32(&mut out[42..46], self.local_header_offset);
        out
    }

    /// Size of the record including its variable-length tail.
    pub fn record_size(&self) -> usize {
        Self::SIZE
            + self.file_name_length as usize
            + self.extra_field_length as usize
            + self.file_comment_length as usize
    }
}

/// Local File Header (LFH) - 30 bytes, followed by file name and extra field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalFileHeader {
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: u16,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
}

impl LocalFileHeader {
    pub const SIGNATURE: &'static [u8] = b"PK\x03\x04";
    pub const SIZE: usize = 30;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || !has_signature(data, Self::SIGNATURE) {
            return Err(Error::Malformed("local file header"));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            version_needed: cursor.read_u16::<LittleEndian>()?,
            flags: cursor.read_u16::<LittleEndian>()?,
            compression_method: cursor.read_u16::<LittleEndian>()?,
            last_mod_time: cursor.read_u16::<LittleEndian>()?,
            last_mod_date: cursor.read_u16::<LittleEndian>()?,
            crc32: cursor.read_u32::<LittleEndian>()?,
            compressed_size: cursor.read_u32::<LittleEndian>()?,
            uncompressed_size: cursor.read_u32::<LittleEndian>()?,
            file_name_length: cursor.read_u16::<LittleEndian>()?,
            extra_field_length: cursor.read_u16::<LittleEndian>()?,
        })
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(Self::SIGNATURE);
        LittleEndian::write_u16(&mut out[4..6], self.version_needed);
        LittleEndian::write_u16(&mut out[6..8], self.flags);
        LittleEndian::write_u16(&mut out[8..10], self.compression_method);
        LittleEndian::write_u16(&mut out[10..12], self.last_mod_time);
        LittleEndian::write_u16(&mut out[12..14], self.last_mod_date);
        LittleEndian::write_u32(&mut out[14..18], self.crc32);
        LittleEndian::write_u32(&mut out[18..22], self.compressed_size);
        LittleEndian::write_u32(&mut out[22..26], self.uncompressed_size);
        LittleEndian::write_u16(&mut out[26..28], self.file_name_length);
        LittleEndian::write_u16(&mut out[28..30], self.extra_field_length);
        out
    }

    /// Header plus file name, i.e. everything kept after the extra field is stripped.
    pub fn header_size(&self) -> usize {
        Self::SIZE + self.file_name_length as usize
    }

    pub fn method(&self) -> CompressionMethod {
        CompressionMethod::from_u16(self.compression_method)
    }
}
