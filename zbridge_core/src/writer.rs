use std::io::{self, Write};

use log::{debug, trace};

use crate::bridge;
use crate::codec::StreamCompressor;
use crate::cursor::{InputCursor, OutputCursor};
use crate::status::EndMode;

/// Size of the staging area compressed bytes pass through on their way to the
/// inner writer (`ZSTD_CStreamOutSize`).
pub const DEFAULT_OUTPUT_CHUNK: usize = 128 * 1024 + 3 + 4 + 1;

/// Streaming compressor over any [`Write`].
///
/// # Write contract
/// - [`write`](Write::write) feeds the caller's slice straight to the codec with
///   [`EndMode::Continue`] until all of it is consumed. The codec may hold data
///   back, so nothing is guaranteed to reach the inner writer yet.
/// - [`flush`](Write::flush) drives [`EndMode::Flush`] until nothing is pending,
///   then flushes the inner writer. Everything written so far is decodable.
/// - [`finish`](CompressWriter::finish) drives [`EndMode::End`] until nothing is
///   pending, which closes the frame, and hands back the inner writer.
///
/// Every step's output is emitted to the inner writer before the step's status
/// is checked, so bytes the codec produced are never lost to an error.
///
/// Dropping a writer without calling `finish` leaves a truncated frame.
pub struct CompressWriter<W: Write, C: StreamCompressor> {
    inner: W,
    codec: C,
    /// Compressed output staging area; always full length.
    staging: Vec<u8>,
    /// Raw bytes consumed by the codec since creation.
    total_in: u64,
    /// Compressed bytes emitted to `inner` since creation.
    total_out: u64,
}

impl<W: Write, C: StreamCompressor> CompressWriter<W, C> {
    /// Wrap `inner` with an already configured session.
    pub fn new(inner: W, codec: C) -> Self {
        Self::with_output_chunk(inner, codec, DEFAULT_OUTPUT_CHUNK)
    }

    /// Like [`new`](Self::new) with a custom staging size (at least 1 byte).
    pub fn with_output_chunk(inner: W, codec: C, output_chunk: usize) -> Self {
        Self {
            inner,
            codec,
            staging: vec![0u8; output_chunk.max(1)],
            total_in: 0,
            total_out: 0,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Raw bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Compressed bytes handed to the inner writer so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Close the frame and return the inner writer, flushed.
    pub fn finish(mut self) -> io::Result<W> {
        self.drain(EndMode::End)?;
        self.inner.flush()?;
        debug!(
            "finished frame: {} raw bytes -> {} compressed bytes",
            self.total_in, self.total_out
        );
        Ok(self.inner)
    }

    /// Repeat `mode` with no new input until the codec reports nothing pending.
    fn drain(&mut self, mode: EndMode) -> io::Result<()> {
        let mut input = InputCursor::new(&[], 0, 0);
        loop {
            if self.step(&mut input, mode)? == 0 {
                return Ok(());
            }
        }
    }

    /// One bridge step. Emits whatever was produced, advances `input`, and
    /// returns the codec's hint.
    fn step(&mut self, input: &mut InputCursor<'_>, mode: EndMode) -> io::Result<usize> {
        let capacity = self.staging.len();
        let mut output = OutputCursor::new(&mut self.staging[..], 0, capacity);
        let processed = bridge::compress(&mut self.codec, &mut output, input, mode);
        let consumed = processed.progress.input_bytes_processed;
        let produced = processed.progress.output_bytes_processed;

        input.advance(consumed);
        self.total_in += consumed as u64;
        if produced > 0 {
            self.inner.write_all(&self.staging[..produced])?;
            self.total_out += produced as u64;
        }
        trace!("{mode:?}: consumed {consumed}, emitted {produced}");

        Ok(processed.status.into_result()?)
    }
}

impl<W: Write, C: StreamCompressor> Write for CompressWriter<W, C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut input = InputCursor::full(buf);
        while !input.is_empty() {
            self.step(&mut input, EndMode::Continue)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.drain(EndMode::Flush)?;
        self.inner.flush()
    }
}
