//! Recursive shrinking of entry payloads.
//!
//! The ZIP engine does not know what the files inside an archive are. It hands
//! every payload to a [`Shrink`] implementation, which may recognise the content
//! (for example another ZIP) and make it smaller.

use crate::options::{Depth, Options};
use crate::zip::{self, LocalFileHeader};

/// Reducer for a buffer of unknown type.
pub trait Shrink {
    /// Shrink the content at `buf[gap..]` and write the result at `buf[0..n]`.
    ///
    /// Returns `n`, which must not exceed `buf.len() - gap`. The bytes in
    /// `buf[..gap]` hold nothing of value and may be overwritten.
    fn shrink(&mut self, buf: &mut [u8], gap: usize, name: &str, depth: Depth) -> usize;

    /// Progress output for an entry about to be processed.
    fn report_name(&mut self, name: &str, depth: Depth) {
        let indent = depth.current.saturating_sub(1) as usize * 2;
        log::info!("{:indent$}{}", "", name, indent = indent);
    }
}

/// Move `buf[gap..]` to the front unchanged.
pub fn pass_through(buf: &mut [u8], gap: usize) -> usize {
    let size = buf.len() - gap;
    if gap > 0 {
        buf.copy_within(gap.., 0);
    }
    size
}

/// Default reducer: recurses into nested ZIP archives, passes everything else through.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    options: Options,
    nested_archives: usize,
}

impl Dispatcher {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            nested_archives: 0,
        }
    }

    /// Number of nested archives rewritten so far.
    pub fn nested_archives(&self) -> usize {
        self.nested_archives
    }
}

impl Shrink for Dispatcher {
    fn shrink(&mut self, buf: &mut [u8], gap: usize, name: &str, depth: Depth) -> usize {
        if !depth.within_limit() || !zip::has_signature(&buf[gap..], LocalFileHeader::SIGNATURE) {
            return pass_through(buf, gap);
        }

        let options = self.options;
        match zip::recompress_zip(buf, gap, depth.nested(), options, self) {
            Ok(report) => {
                self.nested_archives += 1;
                report.size
            }
            Err(e) => {
                log::debug!("{}: {}, keeping as is", name, e);
                pass_through(buf, gap)
            }
        }
    }
}
