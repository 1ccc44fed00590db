use log::debug;
use zstd::zstd_safe::zstd_sys::ZSTD_EndDirective;
use zstd::zstd_safe::{CCtx, CParameter, InBuffer, OutBuffer, SafeResult, Strategy};

use zbridge_core::params::*;
use zbridge_core::status::{error_code, ERROR_PARAMETER_OUT_OF_BOUND, ERROR_PARAMETER_UNSUPPORTED};
use zbridge_core::{EndMode, InWindow, OutWindow, StreamCompressor};

/// Zstandard compression session.
///
/// Wraps one `ZSTD_CCtx`. Parameters persist across frames; after a frame is
/// ended with [`EndMode::End`] the next `Continue` starts a new frame with the
/// same settings.
pub struct ZstdCompressor {
    ctx: CCtx<'static>,
}

impl StreamCompressor for ZstdCompressor {
    fn create() -> Option<Self> {
        let ctx = CCtx::try_create()?;
        debug!("allocated zstd compression context");
        Some(Self { ctx })
    }

    fn set_parameter(&mut self, param: i32, value: i32) -> usize {
        match cparameter(param, value) {
            Ok(parameter) => status_word(self.ctx.set_parameter(parameter)),
            Err(code) => code,
        }
    }

    fn compress_stream(
        &mut self,
        output: &mut OutWindow<'_>,
        input: &mut InWindow<'_>,
        mode: EndMode,
    ) -> usize {
        let mut in_buf = InBuffer::around(input.unread());
        let mut out_buf = OutBuffer::around(output.unfilled());
        let result = self
            .ctx
            .compress_stream2(&mut out_buf, &mut in_buf, directive(mode));
        let consumed = in_buf.pos();
        let produced = out_buf.pos();
        input.pos += consumed;
        output.pos += produced;
        status_word(result)
    }
}

/// Collapse zstd-safe's split result back into the codec's single word.
pub(crate) fn status_word(result: SafeResult) -> usize {
    match result {
        Ok(hint) => hint,
        Err(code) => code,
    }
}

fn directive(mode: EndMode) -> ZSTD_EndDirective {
    match mode {
        EndMode::Continue => ZSTD_EndDirective::ZSTD_e_continue,
        EndMode::Flush => ZSTD_EndDirective::ZSTD_e_flush,
        EndMode::End => ZSTD_EndDirective::ZSTD_e_end,
    }
}

/// Map a raw `ZSTD_cParameter` id and value onto zstd-safe's typed parameter.
///
/// Ids outside the supported set answer `parameter_unsupported`; values that
/// cannot be represented (negative logs, unknown strategies) answer
/// `parameter_outOfBound`. Range checks on representable values are left to
/// the codec.
fn cparameter(param: i32, value: i32) -> Result<CParameter, usize> {
    let unsigned = || u32::try_from(value).map_err(|_| error_code(ERROR_PARAMETER_OUT_OF_BOUND));
    let flag = value != 0;

    let parameter = match param {
        C_COMPRESSION_LEVEL => CParameter::CompressionLevel(value),
        C_WINDOW_LOG => CParameter::WindowLog(unsigned()?),
        C_HASH_LOG => CParameter::HashLog(unsigned()?),
        C_CHAIN_LOG => CParameter::ChainLog(unsigned()?),
        C_SEARCH_LOG => CParameter::SearchLog(unsigned()?),
        C_MIN_MATCH => CParameter::MinMatch(unsigned()?),
        C_TARGET_LENGTH => CParameter::TargetLength(unsigned()?),
        C_STRATEGY => CParameter::Strategy(strategy(value)?),
        C_ENABLE_LONG_DISTANCE_MATCHING => CParameter::EnableLongDistanceMatching(flag),
        C_LDM_HASH_LOG => CParameter::LdmHashLog(unsigned()?),
        C_LDM_MIN_MATCH => CParameter::LdmMinMatch(unsigned()?),
        C_LDM_BUCKET_SIZE_LOG => CParameter::LdmBucketSizeLog(unsigned()?),
        C_LDM_HASH_RATE_LOG => CParameter::LdmHashRateLog(unsigned()?),
        C_CONTENT_SIZE_FLAG => CParameter::ContentSizeFlag(flag),
        C_CHECKSUM_FLAG => CParameter::ChecksumFlag(flag),
        C_DICT_ID_FLAG => CParameter::DictIdFlag(flag),
        _ => return Err(error_code(ERROR_PARAMETER_UNSUPPORTED)),
    };
    Ok(parameter)
}

fn strategy(value: i32) -> Result<Strategy, usize> {
    Ok(match value {
        1 => Strategy::ZSTD_fast,
        2 => Strategy::ZSTD_dfast,
        3 => Strategy::ZSTD_greedy,
        4 => Strategy::ZSTD_lazy,
        5 => Strategy::ZSTD_lazy2,
        6 => Strategy::ZSTD_btlazy2,
        7 => Strategy::ZSTD_btopt,
        8 => Strategy::ZSTD_btultra,
        9 => Strategy::ZSTD_btultra2,
        _ => return Err(error_code(ERROR_PARAMETER_OUT_OF_BOUND)),
    })
}
