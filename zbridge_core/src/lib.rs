pub mod bridge;
pub mod codec;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod params;
pub mod reader;
pub mod session;
pub mod status;
pub mod writer;

pub use bridge::{Processed, Progress};
pub use codec::{Direction, StreamCompressor, StreamDecompressor};
pub use cursor::{BufferCursor, InWindow, InputCursor, OutWindow, OutputCursor};
pub use engine::{CompressorHandle, DecompressorHandle, Engine};
pub use error::BridgeError;
pub use params::CompressOptions;
pub use reader::DecompressReader;
pub use session::{SessionHandle, SessionTable};
pub use status::{error_name, is_error, EndMode, Status};
pub use writer::CompressWriter;
