use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};
use xxhash_rust::xxh3::Xxh3;

use zbridge_codecs::{decoder, encoder};
use zbridge_core::params::DEFAULT_LEVEL;
use zbridge_core::writer::DEFAULT_OUTPUT_CHUNK;
use zbridge_core::CompressOptions;

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "zbridge",
    about = "Streaming zstd compression and decompression over bounded buffers",
    version
)]
struct Cli {
    /// Log codec steps to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a single zstd frame
    Compress {
        /// Source file ("-" reads stdin)
        input: PathBuf,
        /// Destination file ("-" writes stdout)
        output: PathBuf,
        /// Compression level (zstd clamps out-of-range values)
        #[arg(short, long, default_value_t = DEFAULT_LEVEL)]
        level: i32,
        /// Append a content checksum to the frame
        #[arg(long)]
        checksum: bool,
        /// Maximum back-reference distance as a power of two
        #[arg(long)]
        window_log: Option<u32>,
        /// Bytes fed to the compressor per step
        #[arg(long, default_value_t = DEFAULT_OUTPUT_CHUNK)]
        chunk_size: usize,
    },
    /// Decompress one or more concatenated zstd frames
    Decompress {
        /// Source file ("-" reads stdin)
        input: PathBuf,
        /// Destination file ("-" writes stdout)
        output: PathBuf,
        /// Compressed bytes buffered per step
        #[arg(long, default_value_t = DEFAULT_OUTPUT_CHUNK)]
        chunk_size: usize,
    },
    /// Decompress a file, print its xxh3 digest, and optionally compare it
    /// with the digest of the original
    Verify {
        /// Compressed file ("-" reads stdin)
        file: PathBuf,
        /// Uncompressed original to compare against
        #[arg(short, long)]
        original: Option<PathBuf>,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.parse_default_env();
    builder.format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()));
    let _ = builder.try_init();
}

fn is_stdio(path: &Path) -> bool {
    path.to_str() == Some("-")
}

fn open_input(path: &Path) -> anyhow::Result<Box<dyn Read>> {
    if is_stdio(path) {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("opening input file {:?}", path))?;
    Ok(Box::new(file))
}

fn create_output(path: &Path) -> anyhow::Result<Box<dyn Write>> {
    if is_stdio(path) {
        return Ok(Box::new(io::stdout().lock()));
    }
    let file = File::create(path).with_context(|| format!("creating output file {:?}", path))?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Write sink that keeps a running xxh3 digest and a byte count.
struct DigestSink {
    hasher: Xxh3,
    len: u64,
}

impl DigestSink {
    fn new() -> Self {
        Self {
            hasher: Xxh3::new(),
            len: 0,
        }
    }
}

impl Write for DigestSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.hasher.update(buf);
        self.len += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

fn throughput(bytes: u64, secs: f64) -> String {
    if secs > 0.0 {
        format!("{}/s", human_bytes((bytes as f64 / secs) as u64))
    } else {
        "n/a".to_string()
    }
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_compress(
    input: PathBuf,
    output: PathBuf,
    options: CompressOptions,
    chunk_size: usize,
) -> anyhow::Result<()> {
    let mut src = open_input(&input)?;
    let dst = create_output(&output)?;
    let mut writer = encoder(dst, &options).context("configuring compressor")?;
    debug!("compressing {:?} -> {:?} with {:?}", input, output, options);

    let t0 = Instant::now();
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let n = src.read(&mut buf).context("reading input")?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).context("compressing")?;
    }

    let raw_size = writer.total_in();
    let mut dst = writer.finish().context("closing frame")?;
    dst.flush()?;
    let elapsed = t0.elapsed().as_secs_f64();

    let compressed_size = if is_stdio(&output) {
        None
    } else {
        Some(std::fs::metadata(&output)?.len())
    };

    eprintln!("  level       : {}", options.level);
    eprintln!("  checksum    : {}", options.checksum);
    eprintln!("  raw size    : {}", human_bytes(raw_size));
    if let Some(compressed) = compressed_size {
        eprintln!("  compressed  : {}", human_bytes(compressed));
        if compressed > 0 {
            eprintln!("  ratio       : {:.2}x", raw_size as f64 / compressed as f64);
        }
    }
    eprintln!("  throughput  : {}", throughput(raw_size, elapsed));
    eprintln!("  elapsed     : {:.3}s", elapsed);
    Ok(())
}

fn run_decompress(input: PathBuf, output: PathBuf, chunk_size: usize) -> anyhow::Result<()> {
    let src = BufReader::with_capacity(chunk_size.max(1), open_input(&input)?);
    let mut dst = create_output(&output)?;
    let mut reader = decoder(src).context("creating decompressor")?;

    let t0 = Instant::now();
    let raw_size = io::copy(&mut reader, &mut dst)
        .with_context(|| format!("decompressing {:?}", input))?;
    dst.flush()?;
    let elapsed = t0.elapsed().as_secs_f64();

    eprintln!("  compressed  : {}", human_bytes(reader.total_in()));
    eprintln!("  raw size    : {}", human_bytes(raw_size));
    eprintln!("  throughput  : {}", throughput(raw_size, elapsed));
    eprintln!("  elapsed     : {:.3}s", elapsed);
    Ok(())
}

fn run_verify(file: PathBuf, original: Option<PathBuf>) -> anyhow::Result<()> {
    let src = BufReader::new(open_input(&file)?);
    let mut reader = decoder(src).context("creating decompressor")?;
    let mut decoded = DigestSink::new();
    io::copy(&mut reader, &mut decoded)
        .with_context(|| format!("decompressing {:?}", file))?;
    let digest = decoded.hasher.digest();

    println!("{:016x}  {}", digest, file.display());
    eprintln!("  raw size    : {}", human_bytes(decoded.len));

    if let Some(original) = original {
        let mut src = open_input(&original)?;
        let mut expected = DigestSink::new();
        io::copy(&mut src, &mut expected)
            .with_context(|| format!("reading original {:?}", original))?;
        let expected_digest = expected.hasher.digest();
        if expected_digest != digest || expected.len != decoded.len {
            anyhow::bail!(
                "mismatch: decoded {:016x} ({} bytes), original {:016x} ({} bytes)",
                digest,
                decoded.len,
                expected_digest,
                expected.len
            );
        }
        eprintln!("  matches     : {:?}", original);
    }
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Compress {
            input,
            output,
            level,
            checksum,
            window_log,
            chunk_size,
        } => {
            let options = CompressOptions {
                checksum,
                window_log,
                ..CompressOptions::with_level(level)
            };
            run_compress(input, output, options, chunk_size)
        }
        Commands::Decompress {
            input,
            output,
            chunk_size,
        } => run_decompress(input, output, chunk_size),
        Commands::Verify { file, original } => run_verify(file, original),
    }
}
