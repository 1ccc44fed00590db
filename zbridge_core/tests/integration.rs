/// Integration tests: drive real Zstandard sessions through the bridge.
///
/// Covers the known frame vectors, cursor offsets, partial-call streaming with
/// tiny regions, the edge scenarios (empty frame, truncated frame, rejected
/// parameter), handle hygiene, and the `Write`/`Read` adapters.
use std::io::{self, Read, Write};

use xxhash_rust::xxh3::xxh3_64;

use zbridge_codecs::{decoder, encoder, zstd_compressor, zstd_decompressor, ZstdEngine};
use zbridge_core::params::{C_CHECKSUM_FLAG, C_COMPRESSION_LEVEL, C_WINDOW_LOG};
use zbridge_core::status::{error_code, ERROR_GENERIC};
use zbridge_core::{
    error_name, is_error, BridgeError, CompressOptions, CompressWriter, DecompressReader, EndMode,
    InputCursor, OutputCursor, Progress, Status,
};

const HELLO_WORLD: &[u8] = b"hello world";
const HELLO_WORLD_ZSTD: &str = "28b52ffd200b59000068656c6c6f20776f726c64";
const HELLO_WORLD_ZSTD_CHECKSUM: &str = "28b52ffd240b59000068656c6c6f20776f726c6468691eb2";
const EMPTY_ZSTD: &str = "28b52ffd2000010000";

// ── helpers ───────────────────────────────────────────────────────────────

fn unhex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

/// Generate `len` deterministic bytes using a simple LCG.
fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = seed;
    (0..len)
        .map(|_| {
            rng = rng
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (rng >> 56) as u8
        })
        .collect()
}

/// Generate `len` highly compressible bytes (repeating pattern).
fn compressible_bytes(len: usize) -> Vec<u8> {
    let pattern = b"the quick brown fox jumps over the lazy dog. ";
    (0..len).map(|i| pattern[i % pattern.len()]).collect()
}

/// Compress `data` through the engine, `in_chunk` input bytes and `out_chunk`
/// output bytes per call. Returns the frame and the summed `consumed` count.
fn compress_all(
    data: &[u8],
    options: &CompressOptions,
    in_chunk: usize,
    out_chunk: usize,
) -> (Vec<u8>, usize) {
    let mut engine = ZstdEngine::new();
    let handle = engine.create_compressor().unwrap();
    for (param, value) in options.parameters() {
        assert!(!engine.set_parameter(handle, param, value).unwrap().is_error());
    }

    let mut frame = Vec::new();
    let mut scratch = vec![0u8; out_chunk];
    let mut consumed_total = 0;
    let mut start = 0;

    while start < data.len() {
        let end = (start + in_chunk).min(data.len());
        let input = InputCursor::new(data, start, end);
        let mut output = OutputCursor::full(&mut scratch[..]);
        let processed = engine
            .compress(handle, &mut output, &input, EndMode::Continue)
            .unwrap();
        assert!(!processed.status.is_error(), "{:?}", processed.status);
        assert!(processed.progress.input_bytes_processed <= end - start);
        assert!(processed.progress.output_bytes_processed <= out_chunk);

        frame.extend_from_slice(&scratch[..processed.progress.output_bytes_processed]);
        start += processed.progress.input_bytes_processed;
        consumed_total += processed.progress.input_bytes_processed;
    }

    loop {
        let input = InputCursor::new(data, data.len(), data.len());
        let mut output = OutputCursor::full(&mut scratch[..]);
        let processed = engine.compress(handle, &mut output, &input, EndMode::End).unwrap();
        assert_eq!(processed.progress.input_bytes_processed, 0);
        frame.extend_from_slice(&scratch[..processed.progress.output_bytes_processed]);
        if processed.status.into_result().unwrap() == 0 {
            break;
        }
    }

    engine.close_compressor(handle).unwrap();
    (frame, consumed_total)
}

/// Decompress `frame` through the engine with bounded regions per call.
fn decompress_all(frame: &[u8], in_chunk: usize, out_chunk: usize) -> Vec<u8> {
    let mut engine = ZstdEngine::new();
    let handle = engine.create_decompressor().unwrap();

    let mut decoded = Vec::new();
    let mut scratch = vec![0u8; out_chunk];
    let mut start = 0;

    loop {
        let end = (start + in_chunk).min(frame.len());
        let input = InputCursor::new(frame, start, end);
        let mut output = OutputCursor::full(&mut scratch[..]);
        let processed = engine.decompress(handle, &mut output, &input).unwrap();
        let Progress {
            input_bytes_processed: consumed,
            output_bytes_processed: produced,
        } = processed.progress;

        decoded.extend_from_slice(&scratch[..produced]);
        start += consumed;
        let hint = processed.status.into_result().unwrap();
        if hint == 0 && start == frame.len() {
            break;
        }
        assert!(consumed > 0 || produced > 0, "decompression stalled at {start}");
    }

    engine.close_decompressor(handle).unwrap();
    decoded
}

// ── known vectors ─────────────────────────────────────────────────────────

#[test]
fn test_compress_hello_world_matches_reference_frame() {
    // A single End step lets the codec record the content size in the header.
    let mut engine = ZstdEngine::new();
    let handle = engine.create_compressor().unwrap();
    let mut out = [0u8; 1024];
    let mut output = OutputCursor::full(&mut out[..]);
    let input = InputCursor::full(HELLO_WORLD);
    let processed = engine.compress(handle, &mut output, &input, EndMode::End).unwrap();

    assert_eq!(processed.status, Status::Hint(0));
    assert_eq!(processed.progress.input_bytes_processed, HELLO_WORLD.len());
    let frame = output.written(processed.progress.output_bytes_processed);
    assert_eq!(frame, unhex(HELLO_WORLD_ZSTD).as_slice());
    assert_eq!(decompress_all(frame, 3, 4), HELLO_WORLD);
}

#[test]
fn test_compress_single_call_with_checksum() {
    let mut engine = ZstdEngine::new();
    let handle = engine.create_compressor().unwrap();
    // A successful set answers with the value applied, not zero.
    let status = engine.set_parameter(handle, C_CHECKSUM_FLAG, 1).unwrap();
    assert!(!status.is_error(), "{status:?}");
    let status = engine.set_parameter(handle, C_COMPRESSION_LEVEL, 7).unwrap();
    assert!(!status.is_error());

    let mut out = [0u8; 1024];
    let processed = engine
        .compress_bounds(handle, &mut out, 0, 1024, HELLO_WORLD, 0, 11, EndMode::End)
        .unwrap();

    assert_eq!(processed.status, Status::Hint(0));
    let produced = processed.progress.output_bytes_processed;
    assert_eq!(&out[..produced], unhex(HELLO_WORLD_ZSTD_CHECKSUM).as_slice());
}

#[test]
fn test_compress_with_offsets() {
    // 5 bytes of leading garbage and 7 of trailing garbage around the input,
    // output written from offset 9.
    let mut input = vec![0xAAu8; 5];
    input.extend_from_slice(HELLO_WORLD);
    input.extend_from_slice(&[0xBB; 7]);
    let mut out = vec![0xCCu8; 1024];

    let mut engine = ZstdEngine::new();
    let handle = engine.create_compressor().unwrap();
    let processed = engine
        .compress_bounds(handle, &mut out, 9, 1024, &input, 5, 16, EndMode::End)
        .unwrap();

    assert_eq!(processed.status, Status::Hint(0));
    assert_eq!(processed.progress.input_bytes_processed, 11);
    let produced = processed.progress.output_bytes_processed;
    assert_eq!(&out[9..9 + produced], unhex(HELLO_WORLD_ZSTD).as_slice());
    assert!(out[..9].iter().all(|&b| b == 0xCC), "bytes before start untouched");
    assert_eq!(engine.compressor_progress(handle).unwrap(), processed.progress);
}

#[test]
fn test_decompress_with_offsets() {
    let compressed = unhex(HELLO_WORLD_ZSTD);
    let mut input = vec![0u8; 5];
    input.extend_from_slice(&compressed);
    input.extend_from_slice(&[0u8; 7]);
    let mut out = vec![0u8; 1024];

    let mut engine = ZstdEngine::new();
    let handle = engine.create_decompressor().unwrap();
    let processed = engine
        .decompress_bounds(handle, &mut out, 9, 1024, &input, 5, 5 + compressed.len())
        .unwrap();

    assert_eq!(processed.status, Status::Hint(0));
    assert_eq!(processed.progress.input_bytes_processed, compressed.len());
    assert_eq!(processed.progress.output_bytes_processed, HELLO_WORLD.len());
    assert_eq!(&out[9..20], HELLO_WORLD);
}

// ── edge scenarios ────────────────────────────────────────────────────────

#[test]
fn test_empty_input_end_emits_minimal_frame() {
    let mut engine = ZstdEngine::new();
    let handle = engine.create_compressor().unwrap();
    let mut out = [0u8; 64];

    let processed = engine
        .compress_bounds(handle, &mut out, 0, 64, &[], 0, 0, EndMode::End)
        .unwrap();

    assert_eq!(processed.status, Status::Hint(0));
    assert_eq!(processed.progress.input_bytes_processed, 0);
    assert_eq!(processed.progress.output_bytes_processed, 9);
    assert_eq!(&out[..9], unhex(EMPTY_ZSTD).as_slice());
    assert_eq!(decompress_all(&out[..9], 64, 64), Vec::<u8>::new());
}

#[test]
fn test_zero_length_input_is_not_an_error() {
    let mut engine = ZstdEngine::new();
    let handle = engine.create_compressor().unwrap();
    let mut out = [0u8; 64];
    let data = [1u8, 2, 3];

    let processed = engine
        .compress_bounds(handle, &mut out, 0, 64, &data, 3, 3, EndMode::Continue)
        .unwrap();
    assert!(!processed.status.is_error());
    assert_eq!(processed.progress.input_bytes_processed, 0);

    let dec = engine.create_decompressor().unwrap();
    let processed = engine
        .decompress_bounds(dec, &mut out, 0, 64, &data, 0, 0)
        .unwrap();
    assert!(!processed.status.is_error());
    assert_eq!(processed.progress, Progress::default());
}

#[test]
fn test_zero_space_output_is_not_an_error() {
    let mut engine = ZstdEngine::new();
    let handle = engine.create_decompressor().unwrap();
    let compressed = unhex(HELLO_WORLD_ZSTD);
    let mut out = [0u8; 16];

    let processed = engine
        .decompress_bounds(handle, &mut out, 16, 16, &compressed, 0, compressed.len())
        .unwrap();
    assert!(!processed.status.is_error());
    assert_eq!(processed.progress.output_bytes_processed, 0);
}

#[test]
fn test_truncated_frame_asks_for_more_input() {
    // Drop the 4-byte checksum trailer.
    let full = unhex(HELLO_WORLD_ZSTD_CHECKSUM);
    let truncated = &full[..full.len() - 4];

    let mut engine = ZstdEngine::new();
    let handle = engine.create_decompressor().unwrap();
    let mut out = [0u8; 64];
    let processed = engine
        .decompress_bounds(handle, &mut out, 0, 64, truncated, 0, truncated.len())
        .unwrap();

    assert!(!processed.status.is_error());
    assert!(matches!(processed.status, Status::Hint(n) if n > 0));
    assert_eq!(processed.progress.input_bytes_processed, truncated.len());
    assert_eq!(&out[..processed.progress.output_bytes_processed], HELLO_WORLD);

    // Supplying the trailer completes the frame.
    let processed = engine
        .decompress_bounds(handle, &mut out, 0, 64, &full, truncated.len(), full.len())
        .unwrap();
    assert_eq!(processed.status, Status::Hint(0));
}

#[test]
fn test_truncated_frame_reader_reports_eof() {
    let full = unhex(HELLO_WORLD_ZSTD_CHECKSUM);
    let truncated = &full[..full.len() - 4];
    let mut reader = decoder(truncated).unwrap();

    let mut buf = [0u8; 64];
    let n = reader.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], HELLO_WORLD);
    assert!(!reader.at_frame_boundary());

    let err = reader.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn test_rejected_parameter_leaves_session_usable() {
    let mut engine = ZstdEngine::new();
    let handle = engine.create_compressor().unwrap();

    let status = engine.set_parameter(handle, C_WINDOW_LOG, 100).unwrap();
    assert!(status.is_error());
    assert!(status.error_name().is_some());

    let status = engine.set_parameter(handle, 12345, 1).unwrap();
    assert!(status.is_error());
    assert!(is_error(status.code()));

    let mut out = [0u8; 1024];
    let processed = engine
        .compress_bounds(handle, &mut out, 0, 1024, HELLO_WORLD, 0, 11, EndMode::End)
        .unwrap();
    assert_eq!(processed.status, Status::Hint(0));
    let produced = processed.progress.output_bytes_processed;
    assert_eq!(&out[..produced], unhex(HELLO_WORLD_ZSTD).as_slice());
}

#[test]
fn test_out_of_range_level_is_clamped_not_rejected() {
    let mut engine = ZstdEngine::new();
    let handle = engine.create_compressor().unwrap();

    for level in [1000, -200_000_000] {
        let status = engine.set_parameter(handle, C_COMPRESSION_LEVEL, level).unwrap();
        assert!(!status.is_error(), "level {level}: {status:?}");
    }

    let data = compressible_bytes(4096);
    let mut out = vec![0u8; 8192];
    let processed = engine
        .compress_bounds(handle, &mut out, 0, 8192, &data, 0, data.len(), EndMode::End)
        .unwrap();
    assert_eq!(processed.status, Status::Hint(0));
    let produced = processed.progress.output_bytes_processed;
    assert_eq!(zstd::decode_all(&out[..produced]).unwrap(), data);

    let options = CompressOptions::with_level(1000);
    assert!(zstd_compressor(&options).is_ok());
}

#[test]
fn test_options_reject_window_log_out_of_bounds() {
    let options = CompressOptions {
        window_log: Some(100),
        ..CompressOptions::default()
    };
    let err = zstd_compressor(&options).err().unwrap();
    assert!(
        matches!(err, BridgeError::InvalidParameter { param: C_WINDOW_LOG, value: 100, .. }),
        "got {err:?}"
    );
}

#[test]
fn test_corrupt_input_is_a_codec_error() {
    let mut engine = ZstdEngine::new();
    let handle = engine.create_decompressor().unwrap();
    let garbage = b"this is definitely not a zstd frame";
    let mut out = [0u8; 64];

    let processed = engine
        .decompress_bounds(handle, &mut out, 0, 64, garbage, 0, garbage.len())
        .unwrap();

    assert!(matches!(processed.status, Status::Error(_)));
    assert!(is_error(processed.code()));
    let name = error_name(processed.code()).unwrap();
    assert!(!name.is_empty());
    assert!(matches!(
        processed.status.into_result(),
        Err(BridgeError::Codec { .. })
    ));
}

#[test]
fn test_unset_region_is_a_buffer_access_failure() {
    let mut engine = ZstdEngine::new();
    let handle = engine.create_compressor().unwrap();

    let ok = engine
        .compress_bounds(handle, &mut [0u8; 64], 0, 64, HELLO_WORLD, 0, 5, EndMode::Continue)
        .unwrap();
    assert_eq!(engine.compressor_progress(handle).unwrap(), ok.progress);

    let mut output = OutputCursor::unset();
    let input = InputCursor::full(HELLO_WORLD);
    let processed = engine
        .compress(handle, &mut output, &input, EndMode::Continue)
        .unwrap();

    assert_eq!(processed.status, Status::BufferAccessFailure);
    assert_eq!(processed.code(), error_code(ERROR_GENERIC));
    assert_eq!(processed.progress, Progress::default());
    assert_eq!(engine.compressor_progress(handle).unwrap(), Progress::default());
}

// ── streaming ─────────────────────────────────────────────────────────────

#[test]
fn test_continue_calls_consume_everything_with_tiny_regions() {
    let data = compressible_bytes(10_000);
    let (frame, consumed) = compress_all(&data, &CompressOptions::default(), 13, 7);

    assert_eq!(consumed, data.len());
    assert!(frame.len() < data.len());
    assert_eq!(zstd::decode_all(&frame[..]).unwrap(), data);
    assert_eq!(decompress_all(&frame, 5, 3), data);
}

#[test]
fn test_roundtrip_incompressible_with_checksum() {
    let data = pseudo_random_bytes(300_000, 0xDEAD_BEEF);
    let options = CompressOptions {
        checksum: true,
        ..CompressOptions::with_level(1)
    };
    let (frame, consumed) = compress_all(&data, &options, 64 * 1024, 4096);
    assert_eq!(consumed, data.len());

    let decoded = decompress_all(&frame, 1000, 777);
    assert_eq!(xxh3_64(&decoded), xxh3_64(&data));
}

#[test]
fn test_decode_frame_from_reference_encoder() {
    let data = compressible_bytes(50_000);
    let frame = zstd::encode_all(&data[..], 19).unwrap();
    assert_eq!(decompress_all(&frame, 100, 1000), data);
}

// ── handles ───────────────────────────────────────────────────────────────

#[test]
fn test_closed_handle_is_rejected() {
    let mut engine = ZstdEngine::new();
    let first = engine.create_compressor().unwrap();
    let dec = engine.create_decompressor().unwrap();
    assert_eq!(engine.open_sessions(), 2);

    engine.close_compressor(first).unwrap();
    assert_eq!(engine.close_compressor(first), Err(BridgeError::StaleHandle));
    assert_eq!(
        engine.set_parameter(first, C_COMPRESSION_LEVEL, 3),
        Err(BridgeError::StaleHandle)
    );

    // The freed slot is reused, but the old handle still cannot reach it.
    let second = engine.create_compressor().unwrap();
    assert_ne!(first, second);
    let mut out = [0u8; 64];
    let result = engine.compress_bounds(first, &mut out, 0, 64, &[], 0, 0, EndMode::End);
    assert_eq!(result, Err(BridgeError::StaleHandle));

    engine.close_decompressor(dec).unwrap();
    engine.close_compressor(second).unwrap();
    assert_eq!(engine.open_sessions(), 0);
}

// ── stream adapters ───────────────────────────────────────────────────────

#[test]
fn test_writer_reader_roundtrip() {
    let data = compressible_bytes(1024 * 1024 + 17);
    let mut writer = encoder(Vec::new(), &CompressOptions::default()).unwrap();
    for chunk in data.chunks(10_000) {
        writer.write_all(chunk).unwrap();
    }
    assert_eq!(writer.total_in(), data.len() as u64);
    let compressed = writer.finish().unwrap();
    assert!(compressed.len() < data.len() / 10);

    let mut reader = decoder(&compressed[..]).unwrap();
    let mut decoded = Vec::new();
    reader.read_to_end(&mut decoded).unwrap();
    assert_eq!(decoded, data);
    assert_eq!(reader.total_in(), compressed.len() as u64);
}

#[test]
fn test_writer_output_readable_by_reference_decoder() {
    let data = pseudo_random_bytes(200_000, 7);
    let codec = zstd_compressor(&CompressOptions::default()).unwrap();
    let mut writer = CompressWriter::with_output_chunk(Vec::new(), codec, 333);
    writer.write_all(&data).unwrap();
    let compressed = writer.finish().unwrap();
    assert_eq!(zstd::decode_all(&compressed[..]).unwrap(), data);
}

#[test]
fn test_empty_stream_roundtrip() {
    let writer = encoder(Vec::new(), &CompressOptions::default()).unwrap();
    let compressed = writer.finish().unwrap();
    assert_eq!(compressed, unhex(EMPTY_ZSTD));

    let mut decoded = Vec::new();
    decoder(&compressed[..]).unwrap().read_to_end(&mut decoded).unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn test_flush_makes_data_decodable() {
    let mut writer = encoder(Vec::new(), &CompressOptions::default()).unwrap();
    writer.write_all(HELLO_WORLD).unwrap();
    writer.flush().unwrap();

    // The frame is still open, but everything written is already decodable.
    let partial = writer.get_ref().clone();
    let mut reader = decoder(&partial[..]).unwrap();
    let mut buf = [0u8; 11];
    reader.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, HELLO_WORLD);
    let err = reader.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

    writer.write_all(b", again").unwrap();
    let compressed = writer.finish().unwrap();
    let mut decoded = String::new();
    decoder(&compressed[..]).unwrap().read_to_string(&mut decoded).unwrap();
    assert_eq!(decoded, "hello world, again");
}

#[test]
fn test_reader_decodes_concatenated_frames() {
    let mut stream = zstd::encode_all(&b"first frame, "[..], 3).unwrap();
    stream.extend(unhex(HELLO_WORLD_ZSTD));

    let mut decoded = Vec::new();
    let mut reader = DecompressReader::new(&stream[..], zstd_decompressor().unwrap());
    reader.read_to_end(&mut decoded).unwrap();
    assert_eq!(decoded, b"first frame, hello world");
    assert!(reader.at_frame_boundary());
}

#[test]
fn test_reader_one_byte_at_a_time() {
    let data = compressible_bytes(5000);
    let frame = zstd::encode_all(&data[..], 3).unwrap();

    // A BufReader with capacity 1 hands the codec a single byte per step.
    let inner = io::BufReader::with_capacity(1, &frame[..]);
    let mut reader = decoder(inner).unwrap();
    let mut decoded = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte).unwrap() {
            0 => break,
            n => decoded.extend_from_slice(&byte[..n]),
        }
    }
    assert_eq!(decoded, data);
}

#[test]
fn test_reader_surfaces_codec_errors() {
    let mut frame = zstd::encode_all(&compressible_bytes(4096)[..], 3).unwrap();
    frame[0] ^= 0xFF; // break the magic number

    let mut decoded = Vec::new();
    let err = decoder(&frame[..]).unwrap().read_to_end(&mut decoded).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::Other);
}

#[test]
fn test_writer_propagates_inner_write_failure() {
    struct Broken;
    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "boom!"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let mut writer = encoder(Broken, &CompressOptions::default()).unwrap();
    let data = pseudo_random_bytes(1024 * 1024, 1);
    let err = writer.write_all(&data).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
}
