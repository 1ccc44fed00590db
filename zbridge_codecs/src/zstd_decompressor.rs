use log::debug;
use zstd::zstd_safe::{DCtx, InBuffer, OutBuffer};

use zbridge_core::{InWindow, OutWindow, StreamDecompressor};

use crate::zstd_compressor::status_word;

/// Zstandard decompression session.
///
/// Wraps one `ZSTD_DCtx`. Takes its settings from each frame header, so there
/// is nothing to configure. Consecutive frames are decoded back to back.
pub struct ZstdDecompressor {
    ctx: DCtx<'static>,
}

impl StreamDecompressor for ZstdDecompressor {
    fn create() -> Option<Self> {
        let ctx = DCtx::try_create()?;
        debug!("allocated zstd decompression context");
        Some(Self { ctx })
    }

    fn decompress_stream(&mut self, output: &mut OutWindow<'_>, input: &mut InWindow<'_>) -> usize {
        let mut in_buf = InBuffer::around(input.unread());
        let mut out_buf = OutBuffer::around(output.unfilled());
        let result = self.ctx.decompress_stream(&mut out_buf, &mut in_buf);
        let consumed = in_buf.pos();
        let produced = out_buf.pos();
        input.pos += consumed;
        output.pos += produced;
        status_word(result)
    }
}
