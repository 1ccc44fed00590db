use log::{debug, warn};

use crate::bridge::{self, Processed, Progress};
use crate::codec::{Direction, StreamCompressor, StreamDecompressor};
use crate::cursor::{InputCursor, OutputCursor};
use crate::error::BridgeError;
use crate::session::{SessionHandle, SessionTable};
use crate::status::{EndMode, Status};

/// Handle to an open compression session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompressorHandle(SessionHandle);

/// Handle to an open decompression session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecompressorHandle(SessionHandle);

/// Handle-based call surface over two session tables.
///
/// This is the shape a foreign caller sees: sessions are named by small
/// copyable handles, every step returns the raw status plus the progress
/// record, and the progress record is also kept on the session until the next
/// step. Closed or foreign handles are rejected with
/// [`BridgeError::StaleHandle`] instead of reaching freed state.
///
/// `&mut self` on every step means one session can never be driven by two
/// calls at once.
pub struct Engine<C, D> {
    compressors: SessionTable<C>,
    decompressors: SessionTable<D>,
}

impl<C, D> Default for Engine<C, D> {
    fn default() -> Self {
        Self {
            compressors: SessionTable::new(),
            decompressors: SessionTable::new(),
        }
    }
}

impl<C: StreamCompressor, D: StreamDecompressor> Engine<C, D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a compression session. `None` when the codec is out of memory.
    pub fn create_compressor(&mut self) -> Option<CompressorHandle> {
        let Some(session) = C::create() else {
            warn!("{} context allocation failed", Direction::Compress);
            return None;
        };
        let handle = self.compressors.insert(session);
        debug!("opened compressor {handle}");
        Some(CompressorHandle(handle))
    }

    /// Allocate a decompression session. `None` when the codec is out of memory.
    pub fn create_decompressor(&mut self) -> Option<DecompressorHandle> {
        let Some(session) = D::create() else {
            warn!("{} context allocation failed", Direction::Decompress);
            return None;
        };
        let handle = self.decompressors.insert(session);
        debug!("opened decompressor {handle}");
        Some(DecompressorHandle(handle))
    }

    /// Forward a raw parameter to the session; the status is the codec's.
    pub fn set_parameter(
        &mut self,
        handle: CompressorHandle,
        param: i32,
        value: i32,
    ) -> Result<Status, BridgeError> {
        let entry = self.compressors.get_mut(handle.0).ok_or_else(|| stale(handle.0))?;
        let status = Status::from_code(entry.session.set_parameter(param, value));
        if status.is_error() {
            debug!("compressor {} rejected parameter {param}={value}: {status:?}", handle.0);
        }
        Ok(status)
    }

    /// One compression step over cursor objects.
    pub fn compress(
        &mut self,
        handle: CompressorHandle,
        output: &mut OutputCursor<'_>,
        input: &InputCursor<'_>,
        mode: EndMode,
    ) -> Result<Processed, BridgeError> {
        let entry = self.compressors.get_mut(handle.0).ok_or_else(|| stale(handle.0))?;
        let processed = bridge::compress(&mut entry.session, output, input, mode);
        entry.progress = processed.progress;
        Ok(processed)
    }

    /// One compression step over explicit `(region, start, end)` bounds.
    #[allow(clippy::too_many_arguments)]
    pub fn compress_bounds(
        &mut self,
        handle: CompressorHandle,
        output: &mut [u8],
        output_start: usize,
        output_end: usize,
        input: &[u8],
        input_start: usize,
        input_end: usize,
        mode: EndMode,
    ) -> Result<Processed, BridgeError> {
        let mut output = OutputCursor::new(output, output_start, output_end);
        let input = InputCursor::new(input, input_start, input_end);
        self.compress(handle, &mut output, &input, mode)
    }

    /// One decompression step over cursor objects.
    pub fn decompress(
        &mut self,
        handle: DecompressorHandle,
        output: &mut OutputCursor<'_>,
        input: &InputCursor<'_>,
    ) -> Result<Processed, BridgeError> {
        let entry = self.decompressors.get_mut(handle.0).ok_or_else(|| stale(handle.0))?;
        let processed = bridge::decompress(&mut entry.session, output, input);
        entry.progress = processed.progress;
        Ok(processed)
    }

    /// One decompression step over explicit `(region, start, end)` bounds.
    #[allow(clippy::too_many_arguments)]
    pub fn decompress_bounds(
        &mut self,
        handle: DecompressorHandle,
        output: &mut [u8],
        output_start: usize,
        output_end: usize,
        input: &[u8],
        input_start: usize,
        input_end: usize,
    ) -> Result<Processed, BridgeError> {
        let mut output = OutputCursor::new(output, output_start, output_end);
        let input = InputCursor::new(input, input_start, input_end);
        self.decompress(handle, &mut output, &input)
    }

    /// Progress record of the compressor's most recent step.
    pub fn compressor_progress(&self, handle: CompressorHandle) -> Result<Progress, BridgeError> {
        self.compressors
            .get(handle.0)
            .map(|entry| entry.progress)
            .ok_or(BridgeError::StaleHandle)
    }

    /// Progress record of the decompressor's most recent step.
    pub fn decompressor_progress(
        &self,
        handle: DecompressorHandle,
    ) -> Result<Progress, BridgeError> {
        self.decompressors
            .get(handle.0)
            .map(|entry| entry.progress)
            .ok_or(BridgeError::StaleHandle)
    }

    /// Release the session. Closing an already-closed handle reports
    /// [`BridgeError::StaleHandle`] and touches nothing.
    pub fn close_compressor(&mut self, handle: CompressorHandle) -> Result<(), BridgeError> {
        let session = self.compressors.remove(handle.0).ok_or_else(|| stale(handle.0))?;
        drop(session);
        debug!("closed compressor {}", handle.0);
        Ok(())
    }

    pub fn close_decompressor(&mut self, handle: DecompressorHandle) -> Result<(), BridgeError> {
        let session = self.decompressors.remove(handle.0).ok_or_else(|| stale(handle.0))?;
        drop(session);
        debug!("closed decompressor {}", handle.0);
        Ok(())
    }

    /// Open sessions across both directions.
    pub fn open_sessions(&self) -> usize {
        self.compressors.len() + self.decompressors.len()
    }
}

fn stale(handle: SessionHandle) -> BridgeError {
    warn!("rejected stale session handle {handle}");
    BridgeError::StaleHandle
}
