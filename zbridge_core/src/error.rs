use thiserror::Error;

use crate::codec::Direction;

/// Everything the bridge can report to its caller. Nothing is retried
/// internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The codec could not allocate a native context.
    #[error("failed to allocate a {0} context")]
    AllocationFailure(Direction),

    /// The codec rejected a parameter id or value.
    #[error("parameter {param}={value} rejected: {name}")]
    InvalidParameter {
        param: i32,
        value: i32,
        code: usize,
        name: &'static str,
    },

    /// One of the byte regions could not be resolved; the codec was not called.
    #[error("buffer access failure: region missing or cursor out of bounds")]
    BufferAccess,

    /// The codec's `process` call failed.
    #[error("codec error: {name}")]
    Codec { code: usize, name: &'static str },

    /// The handle was closed or never issued by this table.
    #[error("stale or closed session handle")]
    StaleHandle,

    #[error("unknown end mode {0}")]
    UnknownEndMode(i32),
}

impl From<BridgeError> for std::io::Error {
    fn from(err: BridgeError) -> Self {
        std::io::Error::other(err)
    }
}
