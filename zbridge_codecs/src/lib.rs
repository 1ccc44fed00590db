mod zstd_compressor;
mod zstd_decompressor;

pub use zstd_compressor::ZstdCompressor;
pub use zstd_decompressor::ZstdDecompressor;

use std::io::{BufRead, Write};

use zbridge_core::{
    BridgeError, CompressOptions, CompressWriter, DecompressReader, Direction, Engine,
    StreamCompressor, StreamDecompressor,
};

/// Handle-based engine wired to Zstandard sessions.
pub type ZstdEngine = Engine<ZstdCompressor, ZstdDecompressor>;

/// A compressor configured with `options`. The caller owns and drops it.
pub fn zstd_compressor(options: &CompressOptions) -> Result<ZstdCompressor, BridgeError> {
    let mut compressor =
        ZstdCompressor::create().ok_or(BridgeError::AllocationFailure(Direction::Compress))?;
    options.apply(&mut compressor)?;
    Ok(compressor)
}

/// A fresh decompressor. The caller owns and drops it.
pub fn zstd_decompressor() -> Result<ZstdDecompressor, BridgeError> {
    ZstdDecompressor::create().ok_or(BridgeError::AllocationFailure(Direction::Decompress))
}

/// Compress everything written to the returned writer into `inner`.
///
/// Call [`CompressWriter::finish`] to close the frame.
pub fn encoder<W: Write>(
    inner: W,
    options: &CompressOptions,
) -> Result<CompressWriter<W, ZstdCompressor>, BridgeError> {
    Ok(CompressWriter::new(inner, zstd_compressor(options)?))
}

/// Decompress everything read from `inner`.
pub fn decoder<R: BufRead>(inner: R) -> Result<DecompressReader<R, ZstdDecompressor>, BridgeError> {
    Ok(DecompressReader::new(inner, zstd_decompressor()?))
}
