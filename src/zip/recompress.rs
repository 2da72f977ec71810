//! Per-entry recompression.
//!
//! A deflate entry is inflated, handed to the shrinker, deflated again with
//! zopfli and written in whichever form is smallest: stored, recompressed, or
//! the original stream. Stored entries are shrunk in place.

use crate::codec;
use crate::options::{Depth, Options};
use crate::shrink::Shrink;

use super::structures::{CompressionMethod, FLAG_ENCRYPTED, LocalFileHeader};

/// Source and destination of an entry's payload inside the working buffer.
///
/// `dst <= src`; the payload length is the header's compressed size.
#[derive(Debug, Clone, Copy)]
pub struct Payload {
    pub src: usize,
    pub dst: usize,
}

/// How an entry's payload ended up in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Moved unchanged: unsupported method, encrypted, fast mode, or nothing to do.
    Copied,
    /// Stored payload rewritten by the shrinker.
    Shrunk,
    /// Empty deflate stream turned into an empty stored entry.
    Emptied,
    /// Deflate entry written uncompressed because that is smallest.
    Stored,
    /// Deflate entry replaced by a smaller deflate stream.
    Recompressed,
    /// Recompression did not beat the original stream, which was moved unchanged.
    Kept,
    /// Inflating failed or did not match the recorded size and crc32.
    Corrupt,
}

impl Outcome {
    /// Whether crc32, sizes or method in the header changed.
    pub fn rewrites_header(self) -> bool {
        matches!(
            self,
            Outcome::Shrunk | Outcome::Emptied | Outcome::Stored | Outcome::Recompressed
        )
    }
}

/// Produce the payload of one entry at `payload.dst`.
///
/// `header` holds the trusted crc32 and sizes on entry and is updated to
/// describe what was written; `header.compressed_size` afterwards is the
/// number of bytes at `payload.dst`.
pub fn recompress_entry<S: Shrink + ?Sized>(
    buf: &mut [u8],
    payload: Payload,
    header: &mut LocalFileHeader,
    name: &str,
    depth: Depth,
    options: &Options,
    shrinker: &mut S,
) -> Outcome {
    debug_assert!(payload.dst <= payload.src);
    let encrypted = header.flags & FLAG_ENCRYPTED != 0;

    match header.method() {
        CompressionMethod::Stored if !encrypted && !options.fast && depth.within_limit() => {
            shrink_stored(buf, payload, header, name, depth, shrinker)
        }
        CompressionMethod::Deflate if !encrypted && !options.fast => {
            recompress_deflate(buf, payload, header, name, depth, options, shrinker)
        }
        _ => {
            copy_original(buf, payload, header);
            Outcome::Copied
        }
    }
}

fn copy_original(buf: &mut [u8], payload: Payload, header: &LocalFileHeader) {
    let len = header.compressed_size as usize;
    buf.copy_within(payload.src..payload.src + len, payload.dst);
}

fn shrink_stored<S: Shrink + ?Sized>(
    buf: &mut [u8],
    payload: Payload,
    header: &mut LocalFileHeader,
    name: &str,
    depth: Depth,
    shrinker: &mut S,
) -> Outcome {
    let len = header.compressed_size as usize;
    if len == 0 {
        return Outcome::Copied;
    }

    let window = &mut buf[payload.dst..payload.src + len];
    let new_size = shrinker.shrink(window, payload.src - payload.dst, name, depth);
    debug_assert!(new_size <= len);
    let new_size = new_size.min(len);

    header.crc32 = codec::crc32(&buf[payload.dst..payload.dst + new_size]);
    header.compressed_size = new_size as u32;
    header.uncompressed_size = new_size as u32;
    Outcome::Shrunk
}

fn recompress_deflate<S: Shrink + ?Sized>(
    buf: &mut [u8],
    payload: Payload,
    header: &mut LocalFileHeader,
    name: &str,
    depth: Depth,
    options: &Options,
    shrinker: &mut S,
) -> Outcome {
    // Switch from deflate to store for empty files.
    if header.uncompressed_size == 0 {
        header.compression_method = CompressionMethod::Stored.as_u16();
        header.compressed_size = 0;
        return Outcome::Emptied;
    }

    let original_size = header.compressed_size as usize;
    let expected_size = header.uncompressed_size as usize;
    let original = &buf[payload.src..payload.src + original_size];

    let mut data = match codec::inflate(original, expected_size) {
        Ok(data) if data.len() == expected_size && codec::crc32(&data) == header.crc32 => data,
        Ok(_) => {
            log::warn!("{}: size or CRC32 mismatch, copying as is", name);
            copy_original(buf, payload, header);
            return Outcome::Corrupt;
        }
        Err(e) => {
            log::warn!("{}: decompression failed ({}), copying as is", name, e);
            copy_original(buf, payload, header);
            return Outcome::Corrupt;
        }
    };

    let new_uncompressed = if depth.within_limit() {
        shrinker.shrink(&mut data, 0, name, depth).min(expected_size)
    } else {
        expected_size
    };
    let data = &data[..new_uncompressed];

    let recompressed = match codec::deflate(options, data) {
        Ok(recompressed) => recompressed,
        Err(e) => {
            log::warn!("{}: recompression failed ({}), copying as is", name, e);
            copy_original(buf, payload, header);
            return Outcome::Kept;
        }
    };

    let outcome = if new_uncompressed <= recompressed.len() && new_uncompressed <= original_size {
        buf[payload.dst..payload.dst + new_uncompressed].copy_from_slice(data);
        header.compression_method = CompressionMethod::Stored.as_u16();
        header.compressed_size = new_uncompressed as u32;
        Outcome::Stored
    } else if recompressed.len() < original_size {
        buf[payload.dst..payload.dst + recompressed.len()].copy_from_slice(&recompressed);
        header.compressed_size = recompressed.len() as u32;
        Outcome::Recompressed
    } else {
        copy_original(buf, payload, header);
        return Outcome::Kept;
    };

    header.crc32 = codec::crc32(data);
    header.uncompressed_size = new_uncompressed as u32;

    log::debug!(
        "{}: {} -> {} bytes ({:?})",
        name,
        original_size,
        header.compressed_size,
        outcome
    );
    outcome
}
