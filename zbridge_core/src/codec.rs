use std::fmt;

use crate::cursor::{InWindow, OutWindow};
use crate::status::EndMode;

/// Which way a session moves bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Compress,
    Decompress,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Compress => f.write_str("compression"),
            Direction::Decompress => f.write_str("decompression"),
        }
    }
}

/// One open compression context.
///
/// Implementations wrap a native codec context and hold all of its
/// algorithmic state (window, match tables, frame state). The bridge only ever
/// hands them windows over caller memory; it never looks inside.
///
/// - Every method returns the codec's raw status word, unmodified; classify it
///   with [`Status::from_code`](crate::Status::from_code).
/// - `compress_stream` must advance `input.pos` and `output.pos` by exactly what
///   it consumed and produced, and never move either backwards.
/// - A context is not reentrant. `&mut self` is the only synchronization.
pub trait StreamCompressor: Send {
    /// Allocate a fresh context, or `None` if the codec is out of memory.
    fn create() -> Option<Self>
    where
        Self: Sized;

    /// Forward a raw `(param, value)` pair. Validation belongs to the codec.
    fn set_parameter(&mut self, param: i32, value: i32) -> usize;

    /// Run one compression step.
    fn compress_stream(
        &mut self,
        output: &mut OutWindow<'_>,
        input: &mut InWindow<'_>,
        mode: EndMode,
    ) -> usize;
}

/// One open decompression context.
///
/// Decompression takes no parameters and no end mode: the frame header says
/// everything. A zero status means the current frame is fully decoded and
/// flushed; a positive one is the number of input bytes the codec expects next.
pub trait StreamDecompressor: Send {
    fn create() -> Option<Self>
    where
        Self: Sized;

    /// Run one decompression step, advancing as far as the windows allow.
    fn decompress_stream(&mut self, output: &mut OutWindow<'_>, input: &mut InWindow<'_>)
        -> usize;
}
