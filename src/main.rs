use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use file_compressor::batch::{run_batch, BatchReport};
use file_compressor::{compress_with, decompress, files_equal, inspect, CompressOptions, EmptyInputPolicy};

/// Static Huffman file compressor.
#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress SRC into DST.
    Compress {
        src: PathBuf,
        dst: PathBuf,
        /// Fail on empty input instead of writing a header-only file.
        #[arg(long)]
        reject_empty: bool,
    },
    /// Decompress SRC into DST.
    Decompress { src: PathBuf, dst: PathBuf },
    /// Check that two files have identical contents.
    Verify { a: PathBuf, b: PathBuf },
    /// Print the header and code table of a compressed file.
    Inspect { src: PathBuf },
    /// Compress each FILE to FILE.huff and report timings.
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Also decompress to FILE.out and compare with the input.
        #[arg(long)]
        verify: bool,
        #[arg(long)]
        reject_empty: bool,
    },
}

fn options(reject_empty: bool) -> CompressOptions {
    CompressOptions {
        empty_input: if reject_empty {
            EmptyInputPolicy::Reject
        } else {
            EmptyInputPolicy::HeaderOnly
        },
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(report: &BatchReport) {
    match &report.outcome {
        Ok(trip) => {
            print!(
                "{} -> {}: {} -> {} bytes in {:.3}s",
                report.input.display(),
                trip.compressed.display(),
                trip.input_bytes,
                trip.compressed_bytes,
                trip.compress_time.as_secs_f64()
            );
            match &trip.check {
                Some(check) => println!(
                    ", restored in {:.3}s, {}",
                    check.decompress_time.as_secs_f64(),
                    if check.matches { "identical" } else { "MISMATCH" }
                ),
                None => println!(),
            }
        }
        Err(err) => println!("{}: failed: {}", report.input.display(), err),
    }
}

fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Compress { src, dst, reject_empty } => {
            compress_with(&src, &dst, &options(reject_empty))
                .with_context(|| format!("compressing {}", src.display()))?;
        }
        Command::Decompress { src, dst } => {
            decompress(&src, &dst).with_context(|| format!("decompressing {}", src.display()))?;
        }
        Command::Verify { a, b } => {
            let equal = files_equal(&a, &b);
            println!("{}", if equal { "identical" } else { "different" });
            return Ok(equal);
        }
        Command::Inspect { src } => {
            let summary = inspect(&src).with_context(|| format!("inspecting {}", src.display()))?;
            println!(
                "symbols: {}  distinct: {}  body: {} bytes  depth: {}",
                summary.total_symbols, summary.distinct_symbols, summary.body_bytes, summary.tree_depth
            );
            for (symbol, count, code) in &summary.codes {
                println!("{:#04x} {:>10} {}", symbol, count, code);
            }
        }
        Command::Batch { files, verify, reject_empty } => {
            let reports = run_batch(&files, &options(reject_empty), verify);
            reports.iter().for_each(print_report);
            return Ok(reports.iter().all(BatchReport::is_ok));
        }
    }
    Ok(true)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    Ok(if run(cli)? { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
