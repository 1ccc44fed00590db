//! Status codes and the error mapper.
//!
//! Every codec call answers with one machine word. Non-error values are
//! byte-count hints; errors are the two's-complement negatives of the codec's
//! error enumeration and occupy the top of the `usize` range:
//!
//! ```text
//!   0 ..= usize::MAX - ERROR_MAX_CODE      hint (bytes pending / expected)
//!   usize::MAX - ERROR_MAX_CODE + 1 ..     error, code = -(error enum)
//! ```

use zstd::zstd_safe;

use crate::error::BridgeError;

/// Largest error enumeration value reserved by the codec (`ZSTD_error_maxCode`).
pub const ERROR_MAX_CODE: usize = 120;

// A subset of `ZSTD_ErrorCode`; enough to synthesize statuses without the codec.
pub const ERROR_GENERIC: usize = 1;
pub const ERROR_PARAMETER_UNSUPPORTED: usize = 40;
pub const ERROR_PARAMETER_OUT_OF_BOUND: usize = 42;
pub const ERROR_MEMORY_ALLOCATION: usize = 64;

/// Encode an error enumeration value as a status code.
#[inline]
pub const fn error_code(error: usize) -> usize {
    error.wrapping_neg()
}

/// True iff `code` lies in the codec's reserved error range.
#[inline]
pub fn is_error(code: usize) -> bool {
    code > error_code(ERROR_MAX_CODE)
}

/// The codec's description of `code`, or `None` when it is not an error.
///
/// Hints never get a name, even though the codec would happily describe them
/// as "No error detected".
pub fn error_name(code: usize) -> Option<&'static str> {
    if is_error(code) {
        Some(zstd_safe::get_error_name(code))
    } else {
        None
    }
}

/// Compression-side directive, numbered like `ZSTD_EndDirective`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum EndMode {
    /// Keep streaming; output may lag behind input.
    Continue = 0,
    /// Emit everything buffered, ending the current block but not the frame.
    Flush = 1,
    /// Finish the frame: final block, optional checksum.
    End = 2,
}

impl TryFrom<i32> for EndMode {
    type Error = BridgeError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(EndMode::Continue),
            1 => Ok(EndMode::Flush),
            2 => Ok(EndMode::End),
            other => Err(BridgeError::UnknownEndMode(other)),
        }
    }
}

/// Outcome of one bridge step, classified but never rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Non-error code from the codec: bytes still pending (compression) or
    /// expected (decompression). Zero means done.
    Hint(usize),
    /// Error code from the codec, unmodified.
    Error(usize),
    /// The bridge could not resolve one of the regions; the codec was not
    /// called.
    BufferAccessFailure,
}

impl Status {
    pub fn from_code(code: usize) -> Self {
        if is_error(code) {
            Status::Error(code)
        } else {
            Status::Hint(code)
        }
    }

    /// The raw machine word for the integer call surface.
    ///
    /// A buffer-access failure maps to the codec's generic error so that
    /// integer-only callers still see an error. The distinct name is lost on
    /// that path: `error_name(status.code())` answers "Error (generic)", and
    /// only [`Status::error_name`] reports "Buffer access failure".
    pub fn code(&self) -> usize {
        match *self {
            Status::Hint(code) | Status::Error(code) => code,
            Status::BufferAccessFailure => error_code(ERROR_GENERIC),
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Status::Hint(_))
    }

    /// True when the codec reported nothing left to do.
    pub fn is_done(&self) -> bool {
        matches!(self, Status::Hint(0))
    }

    pub fn error_name(&self) -> Option<&'static str> {
        match *self {
            Status::Hint(_) => None,
            Status::Error(code) => error_name(code),
            Status::BufferAccessFailure => Some("Buffer access failure"),
        }
    }

    /// The hint, or the typed error for this status.
    pub fn into_result(self) -> Result<usize, BridgeError> {
        match self {
            Status::Hint(hint) => Ok(hint),
            Status::Error(code) => Err(BridgeError::Codec {
                code,
                name: zstd_safe::get_error_name(code),
            }),
            Status::BufferAccessFailure => Err(BridgeError::BufferAccess),
        }
    }
}
