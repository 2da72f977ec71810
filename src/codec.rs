//! Deflate codecs and checksums used by the recompression engine.

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;

use crate::Result;
use crate::options::Options;

/// Inflate a raw deflate stream.
///
/// At most `expected_size + 1` bytes are produced, which is enough for the
/// caller to notice a length mismatch without trusting a header that may lie
/// about the real size.
pub fn inflate(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let limit = expected_size as u64 + 1;
    let mut output = Vec::with_capacity(expected_size);
    DeflateDecoder::new(data).take(limit).read_to_end(&mut output)?;
    Ok(output)
}

/// Deflate `data` with zopfli.
pub fn deflate(options: &Options, data: &[u8]) -> Result<Vec<u8>> {
    let zopfli_options = zopfli::Options {
        iteration_count: options.iterations,
        ..Default::default()
    };

    let output = Vec::with_capacity(data.len() / 2);
    let mut encoder = zopfli::DeflateEncoder::new(zopfli_options, Default::default(), output);
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// CRC-32 as stored in ZIP headers.
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}
