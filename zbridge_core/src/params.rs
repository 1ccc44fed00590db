//! Compression parameter ids and the options that set them.
//!
//! Ids are numbered like `ZSTD_cParameter` and passed through unchanged; the
//! codec decides what is valid. Note that the codec clamps compression levels
//! into its supported range instead of rejecting them, while log-sized
//! parameters such as the window log are bounds-checked.

use log::debug;

use crate::codec::StreamCompressor;
use crate::error::BridgeError;
use crate::status::{error_name, Status};

pub const C_COMPRESSION_LEVEL: i32 = 100;
pub const C_WINDOW_LOG: i32 = 101;
pub const C_HASH_LOG: i32 = 102;
pub const C_CHAIN_LOG: i32 = 103;
pub const C_SEARCH_LOG: i32 = 104;
pub const C_MIN_MATCH: i32 = 105;
pub const C_TARGET_LENGTH: i32 = 106;
pub const C_STRATEGY: i32 = 107;
pub const C_ENABLE_LONG_DISTANCE_MATCHING: i32 = 160;
pub const C_LDM_HASH_LOG: i32 = 161;
pub const C_LDM_MIN_MATCH: i32 = 162;
pub const C_LDM_BUCKET_SIZE_LOG: i32 = 163;
pub const C_LDM_HASH_RATE_LOG: i32 = 164;
pub const C_CONTENT_SIZE_FLAG: i32 = 200;
pub const C_CHECKSUM_FLAG: i32 = 201;
pub const C_DICT_ID_FLAG: i32 = 202;

/// The codec's default level when none is set.
pub const DEFAULT_LEVEL: i32 = 3;

/// Session configuration applied right after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressOptions {
    pub level: i32,
    /// Append a 4-byte content checksum to every frame.
    pub checksum: bool,
    /// Record the decompressed size in the frame header when it is known.
    pub content_size: bool,
    /// `None` leaves the window to the level's default.
    pub window_log: Option<u32>,
    pub long_distance_matching: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            checksum: false,
            content_size: true,
            window_log: None,
            long_distance_matching: false,
        }
    }
}

impl CompressOptions {
    pub fn with_level(level: i32) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// `(param, value)` pairs in the order they are applied.
    pub fn parameters(&self) -> Vec<(i32, i32)> {
        let mut params = vec![
            (C_COMPRESSION_LEVEL, self.level),
            (C_CHECKSUM_FLAG, self.checksum as i32),
            (C_CONTENT_SIZE_FLAG, self.content_size as i32),
        ];
        if let Some(window_log) = self.window_log {
            params.push((C_WINDOW_LOG, i32::try_from(window_log).unwrap_or(i32::MAX)));
        }
        if self.long_distance_matching {
            params.push((C_ENABLE_LONG_DISTANCE_MATCHING, 1));
        }
        params
    }

    /// Set every parameter on `codec`, stopping at the first rejection.
    pub fn apply<C: StreamCompressor + ?Sized>(&self, codec: &mut C) -> Result<(), BridgeError> {
        for (param, value) in self.parameters() {
            check_parameter(param, value, codec.set_parameter(param, value))?;
        }
        debug!("applied {self:?}");
        Ok(())
    }
}

/// Turn a `set_parameter` status into a typed result.
pub fn check_parameter(param: i32, value: i32, code: usize) -> Result<(), BridgeError> {
    match Status::from_code(code) {
        Status::Hint(_) => Ok(()),
        _ => Err(BridgeError::InvalidParameter {
            param,
            value,
            code,
            name: error_name(code).unwrap_or("Unspecified error code"),
        }),
    }
}
