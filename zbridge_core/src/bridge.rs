//! The streaming bridge: one bounded unit of codec work per call.
//!
//! # Step contract
//! 1. Resolve both cursors into windows for the duration of the call.
//! 2. Windows are `{region[..end], pos = start}`; the codec advances `pos`.
//! 3. If either cursor does not resolve, the codec is not called and the step
//!    reports [`Status::BufferAccessFailure`] with zero progress.
//! 4. Otherwise the codec runs once and its raw status is returned untouched.
//! 5. `consumed = in.pos - in.start`, `produced = out.pos - out.start`, both
//!    recorded after the codec returns, on the error path too.
//!
//! Input is only ever borrowed shared, so releasing it discards nothing. Output
//! is written in place, so it is committed the moment the borrow ends. Both
//! borrows end before the step returns.
//!
//! Cursors themselves are never modified; callers advance `start` by the
//! reported counts and call again.

use log::{trace, warn};

use crate::codec::{StreamCompressor, StreamDecompressor};
use crate::cursor::{InWindow, InputCursor, OutWindow, OutputCursor};
use crate::status::{EndMode, Status};

/// Bytes moved by the most recent step only, never cumulative.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub input_bytes_processed: usize,
    pub output_bytes_processed: usize,
}

/// Status and progress of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Processed {
    pub status: Status,
    pub progress: Progress,
}

impl Processed {
    /// The raw status word, for integer-only callers.
    pub fn code(&self) -> usize {
        self.status.code()
    }

    fn access_failure() -> Self {
        Processed {
            status: Status::BufferAccessFailure,
            progress: Progress::default(),
        }
    }
}

/// Run one compression step over two cursors.
pub fn compress<C: StreamCompressor + ?Sized>(
    codec: &mut C,
    output: &mut OutputCursor<'_>,
    input: &InputCursor<'_>,
    mode: EndMode,
) -> Processed {
    step(output, input, |out, inp| codec.compress_stream(out, inp, mode))
}

/// Run one decompression step over two cursors.
pub fn decompress<D: StreamDecompressor + ?Sized>(
    codec: &mut D,
    output: &mut OutputCursor<'_>,
    input: &InputCursor<'_>,
) -> Processed {
    step(output, input, |out, inp| codec.decompress_stream(out, inp))
}

/// Compression step with explicit `(region, start, end)` bounds instead of
/// cursor objects.
#[allow(clippy::too_many_arguments)]
pub fn compress_bounds<C: StreamCompressor + ?Sized>(
    codec: &mut C,
    output: &mut [u8],
    output_start: usize,
    output_end: usize,
    input: &[u8],
    input_start: usize,
    input_end: usize,
    mode: EndMode,
) -> Processed {
    let mut output = OutputCursor::new(output, output_start, output_end);
    let input = InputCursor::new(input, input_start, input_end);
    compress(codec, &mut output, &input, mode)
}

/// Decompression step with explicit `(region, start, end)` bounds.
pub fn decompress_bounds<D: StreamDecompressor + ?Sized>(
    codec: &mut D,
    output: &mut [u8],
    output_start: usize,
    output_end: usize,
    input: &[u8],
    input_start: usize,
    input_end: usize,
) -> Processed {
    let mut output = OutputCursor::new(output, output_start, output_end);
    let input = InputCursor::new(input, input_start, input_end);
    decompress(codec, &mut output, &input)
}

fn step<F>(output: &mut OutputCursor<'_>, input: &InputCursor<'_>, run: F) -> Processed
where
    F: FnOnce(&mut OutWindow<'_>, &mut InWindow<'_>) -> usize,
{
    let input_start = input.start;
    let output_start = output.start;

    if !(input.is_valid() && output.is_valid()) {
        warn!(
            "buffer access failure: input [{}, {}) of {} bytes, output [{}, {}) of {} bytes",
            input.start,
            input.end,
            input.capacity(),
            output.start,
            output.end,
            output.capacity(),
        );
        return Processed::access_failure();
    }
    let (Some(mut in_window), Some(mut out_window)) = (input.acquire(), output.acquire()) else {
        return Processed::access_failure();
    };

    let code = run(&mut out_window, &mut in_window);

    debug_assert!(in_window.pos >= input_start && in_window.pos <= in_window.src.len());
    debug_assert!(out_window.pos >= output_start && out_window.pos <= out_window.dst.len());
    let progress = Progress {
        input_bytes_processed: in_window.pos.saturating_sub(input_start),
        output_bytes_processed: out_window.pos.saturating_sub(output_start),
    };
    let status = Status::from_code(code);

    trace!(
        "step: consumed {} of {}, produced {} of {}, status {:?}",
        progress.input_bytes_processed,
        in_window.src.len() - input_start,
        progress.output_bytes_processed,
        out_window.dst.len() - output_start,
        status
    );

    Processed { status, progress }
}
