//! Compress a caller-supplied list of files and time each one.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::codec::{compress_with, decompress, ratio, CompressOptions};
use crate::error::Result;
use crate::verify::files_equal;

#[derive(Debug, Clone, PartialEq)]
pub struct RoundTrip {
    pub compressed: PathBuf,
    pub input_bytes: u64,
    pub compressed_bytes: u64,
    pub compress_time: Duration,
    pub check: Option<Check>,
}

/// Result of decompressing the artifact again and comparing with the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    pub restored: PathBuf,
    pub decompress_time: Duration,
    pub matches: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub input: PathBuf,
    pub outcome: std::result::Result<RoundTrip, String>,
}

impl BatchReport {
    pub fn is_ok(&self) -> bool {
        match &self.outcome {
            Ok(trip) => trip.check.as_ref().map_or(true, |check| check.matches),
            Err(_) => false,
        }
    }
}

/// `<input>.huff`
pub fn artifact_path(input: &Path) -> PathBuf {
    with_suffix(input, ".huff")
}

/// `<input>.out`
pub fn restored_path(input: &Path) -> PathBuf {
    with_suffix(input, ".out")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Runs every input in order; a failing file does not stop the batch.
pub fn run_batch(inputs: &[PathBuf], options: &CompressOptions, verify: bool) -> Vec<BatchReport> {
    inputs
        .iter()
        .map(|input| {
            let outcome = round_trip(input, options, verify).map_err(|err| {
                error!(input = %input.display(), error = %err, "batch entry failed");
                err.to_string()
            });
            BatchReport {
                input: input.clone(),
                outcome,
            }
        })
        .collect()
}

fn round_trip(input: &Path, options: &CompressOptions, verify: bool) -> Result<RoundTrip> {
    let compressed = artifact_path(input);

    let start = Instant::now();
    compress_with(input, &compressed, options)?;
    let compress_time = start.elapsed();

    let input_bytes = fs::metadata(input)?.len();
    let compressed_bytes = fs::metadata(&compressed)?.len();
    info!(
        input = %input.display(),
        secs = compress_time.as_secs_f64(),
        ratio = ratio(compressed_bytes, input_bytes),
        "compression finished"
    );

    let check = if verify {
        let restored = restored_path(input);
        let start = Instant::now();
        decompress(&compressed, &restored)?;
        let decompress_time = start.elapsed();
        let matches = files_equal(input, &restored);
        info!(
            input = %input.display(),
            secs = decompress_time.as_secs_f64(),
            matches,
            "decompression finished"
        );
        Some(Check {
            restored,
            decompress_time,
            matches,
        })
    } else {
        None
    };

    Ok(RoundTrip {
        compressed,
        input_bytes,
        compressed_bytes,
        compress_time,
        check,
    })
}
