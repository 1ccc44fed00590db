use std::io::{self, BufRead, Read};

use log::trace;

use crate::bridge;
use crate::codec::StreamDecompressor;
use crate::cursor::{InputCursor, OutputCursor};

/// Streaming decompressor over any [`BufRead`].
///
/// # Read sequence
/// 1. Borrow whatever compressed bytes the inner reader has buffered.
/// 2. Decompress from them directly into the caller's buffer.
/// 3. Consume exactly the bytes the codec took from the inner reader.
/// 4. Repeat until at least one byte was produced.
///
/// The codec's most recent status is kept: zero means the frame is complete,
/// anything else means more input is expected. Running out of input while a
/// frame is open is reported as [`io::ErrorKind::UnexpectedEof`]. Frames that
/// follow one another are decoded as one stream.
pub struct DecompressReader<R: BufRead, D: StreamDecompressor> {
    inner: R,
    codec: D,
    /// Hint returned by the last step; 0 before the first frame starts.
    pending: usize,
    total_in: u64,
    total_out: u64,
}

impl<R: BufRead, D: StreamDecompressor> DecompressReader<R, D> {
    pub fn new(inner: R, codec: D) -> Self {
        Self {
            inner,
            codec,
            pending: 0,
            total_in: 0,
            total_out: 0,
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// True when no frame is partially decoded.
    pub fn at_frame_boundary(&self) -> bool {
        self.pending == 0
    }

    /// Compressed bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Decompressed bytes returned so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }
}

impl<R: BufRead, D: StreamDecompressor> Read for DecompressReader<R, D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            let chunk = self.inner.fill_buf()?;
            let exhausted = chunk.is_empty();
            if exhausted && self.pending == 0 {
                return Ok(0);
            }

            // With the input exhausted mid-frame, one more step may still drain
            // output the codec is holding.
            let input = InputCursor::full(chunk);
            let mut output = OutputCursor::full(&mut *buf);
            let processed = bridge::decompress(&mut self.codec, &mut output, &input);
            let consumed = processed.progress.input_bytes_processed;
            let produced = processed.progress.output_bytes_processed;

            self.inner.consume(consumed);
            self.total_in += consumed as u64;
            self.total_out += produced as u64;
            self.pending = processed.status.into_result()?;
            trace!("consumed {consumed}, produced {produced}, pending {}", self.pending);

            if produced > 0 {
                return Ok(produced);
            }
            if exhausted {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "EOF before end of stream",
                ));
            }
            if consumed == 0 {
                return Err(io::Error::other("decompressor made no progress"));
            }
        }
    }
}
