//! Compression and decompression entry points.
//!
//! A compressed artifact is the 1024-byte frequency header followed by the
//! bit-packed codes of every input byte. The decoder stops after exactly
//! `sum(frequencies)` symbols, so pad bits in the final byte are never read
//! as data.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::bits::{BitReader, BitWriter};
use crate::codes::{Code, CodeTable};
use crate::error::{CodecError, Result};
use crate::frequency::{FrequencyTable, HEADER_LEN};
use crate::tree::{HuffNode, HuffmanTree};

/// What to do with an input that has no bytes at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmptyInputPolicy {
    /// Write an all-zero header and no body.
    #[default]
    HeaderOnly,
    /// Fail with [`CodecError::EmptyInput`] and write nothing.
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressOptions {
    pub empty_input: EmptyInputPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    pub symbols: u64,
    pub distinct: usize,
    pub body_bits: u64,
}

impl EncodeStats {
    pub fn body_bytes(&self) -> u64 {
        self.body_bits.div_ceil(8)
    }

    pub fn artifact_bytes(&self) -> u64 {
        HEADER_LEN as u64 + self.body_bytes()
    }
}

/// Writes the artifact for `data` into `writer`.
pub fn encode<W: Write>(data: &[u8], mut writer: W, options: &CompressOptions) -> Result<EncodeStats> {
    let frequencies = FrequencyTable::count(data);
    frequencies.check_persistable()?;

    let tree = match HuffmanTree::build(&frequencies) {
        Some(tree) => tree,
        None => {
            if options.empty_input == EmptyInputPolicy::Reject {
                return Err(CodecError::EmptyInput);
            }
            frequencies.write_header(&mut writer)?;
            writer.flush()?;
            return Ok(EncodeStats::default());
        }
    };

    let codes = CodeTable::generate(&tree);
    // Every byte of `data` is in the table, since the table was counted from it.
    let lookup: Vec<&[bool]> = (0..=255u8)
        .map(|symbol| codes.get(symbol).map(Code::bits).unwrap_or(&[]))
        .collect();

    frequencies.write_header(&mut writer)?;

    let mut bits = BitWriter::new(&mut writer);
    for &byte in data {
        bits.write_bits(lookup[byte as usize])?;
    }
    let body_bits = bits.bits_written();
    bits.finish()?;

    Ok(EncodeStats {
        symbols: frequencies.total(),
        distinct: frequencies.distinct(),
        body_bits,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub symbols: u64,
    pub trailing_bytes: u64,
}

/// Reads an artifact from `reader` and writes the original bytes to `writer`.
pub fn decode<R: Read, W: Write>(mut reader: R, writer: W) -> Result<DecodeStats> {
    let frequencies = FrequencyTable::read_header(&mut reader)?;
    let total = frequencies.total();
    let mut out = BufWriter::new(writer);

    let tree = match HuffmanTree::build(&frequencies) {
        Some(tree) => tree,
        None => {
            out.flush()?;
            return Ok(DecodeStats::default());
        }
    };

    match tree.root() {
        HuffNode::Leaf { symbol, .. } => {
            // Single distinct symbol: its code is empty, so no bits are read.
            write_repeated(&mut out, *symbol, total)?;
        }
        HuffNode::Internal { .. } => {
            let mut bits = BitReader::new(&mut reader);
            for decoded in 0..total {
                let symbol = walk(tree.root(), &mut bits)?.ok_or(CodecError::TruncatedBody {
                    expected: total,
                    decoded,
                })?;
                out.write_all(&[symbol])?;
            }
        }
    }
    out.flush()?;

    let trailing_bytes = io::copy(&mut reader, &mut io::sink())?;
    if trailing_bytes > 0 {
        debug!(trailing_bytes, "ignoring bytes after the last symbol");
    }

    Ok(DecodeStats {
        symbols: total,
        trailing_bytes,
    })
}

/// Descends from `root` to a leaf; `None` if the bits run out first.
fn walk<R: Read>(root: &HuffNode, bits: &mut BitReader<R>) -> io::Result<Option<u8>> {
    let mut node = root;
    loop {
        match node {
            HuffNode::Leaf { symbol, .. } => return Ok(Some(*symbol)),
            HuffNode::Internal { left, right, .. } => {
                node = match bits.read_bit()? {
                    Some(false) => left,
                    Some(true) => right,
                    None => return Ok(None),
                };
            }
        }
    }
}

fn write_repeated<W: Write>(out: &mut W, symbol: u8, count: u64) -> io::Result<()> {
    let chunk = [symbol; 8192];
    let mut left = count;
    while left > 0 {
        let n = left.min(chunk.len() as u64) as usize;
        out.write_all(&chunk[..n])?;
        left -= n as u64;
    }
    Ok(())
}

pub fn compress_bytes(data: &[u8], options: &CompressOptions) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode(data, &mut out, options)?;
    Ok(out)
}

pub fn decompress_bytes(artifact: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decode(artifact, &mut out)?;
    Ok(out)
}

/// Compresses `input` into `output` with default options.
pub fn compress(input: &Path, output: &Path) -> Result<()> {
    compress_with(input, output, &CompressOptions::default())
}

#[tracing::instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn compress_with(input: &Path, output: &Path, options: &CompressOptions) -> Result<()> {
    let data = read_source(input)?;
    let stats = write_atomically(output, |writer| encode(&data, writer, options))?;

    info!(
        input_bytes = data.len(),
        output_bytes = stats.artifact_bytes(),
        distinct = stats.distinct,
        ratio = ratio(stats.artifact_bytes(), data.len() as u64),
        "compressed"
    );
    Ok(())
}

#[tracing::instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn decompress(input: &Path, output: &Path) -> Result<()> {
    let reader = BufReader::new(open_source(input)?);
    let stats = write_atomically(output, |writer| decode(reader, writer))?;

    info!(symbols = stats.symbols, "decompressed");
    Ok(())
}

/// Header-level view of an artifact, without decoding the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSummary {
    pub total_symbols: u64,
    pub distinct_symbols: usize,
    pub body_bytes: u64,
    pub tree_depth: usize,
    /// `(symbol, count, code)` in ascending symbol order.
    pub codes: Vec<(u8, u64, String)>,
}

pub fn inspect(path: &Path) -> Result<ArtifactSummary> {
    let file = open_source(path)?;
    let len = file.metadata()?.len();
    let frequencies = FrequencyTable::read_header(BufReader::new(file))?;

    let (tree_depth, codes) = match HuffmanTree::build(&frequencies) {
        Some(tree) => {
            let table = CodeTable::generate(&tree);
            let codes = table
                .iter()
                .map(|(symbol, code)| (symbol, frequencies.get(symbol), code.to_string()))
                .collect();
            (tree.depth(), codes)
        }
        None => (0, Vec::new()),
    };

    Ok(ArtifactSummary {
        total_symbols: frequencies.total(),
        distinct_symbols: frequencies.distinct(),
        body_bytes: len.saturating_sub(HEADER_LEN as u64),
        tree_depth,
        codes,
    })
}

pub(crate) fn ratio(output: u64, input: u64) -> f64 {
    if input == 0 {
        return 0.0;
    }
    output as f64 / input as f64
}

fn open_source(path: &Path) -> Result<File> {
    let unavailable = |source: io::Error| CodecError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(unavailable)?;
    if file.metadata().map_err(unavailable)?.is_dir() {
        return Err(unavailable(io::Error::new(
            io::ErrorKind::InvalidInput,
            "is a directory",
        )));
    }
    Ok(file)
}

fn read_source(path: &Path) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    BufReader::new(open_source(path)?)
        .read_to_end(&mut data)
        .map_err(|source| CodecError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(data)
}

// Plain-create mode, so the umask applies as it would for `File::create`.
#[cfg(unix)]
fn temp_builder<'a>() -> tempfile::Builder<'a, 'a> {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    let mut builder = tempfile::Builder::new();
    builder.permissions(Permissions::from_mode(0o666));
    builder
}

#[cfg(not(unix))]
fn temp_builder<'a>() -> tempfile::Builder<'a, 'a> {
    tempfile::Builder::new()
}

/// Runs `body` against a temp file next to `output` and renames it into
/// place only if `body` succeeds. On failure the temp file is removed and
/// `output` is untouched.
fn write_atomically<T, F>(output: &Path, body: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<T>,
{
    let sink_error = |source: io::Error| CodecError::SinkUnavailable {
        path: output.to_path_buf(),
        source,
    };

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut temp: NamedTempFile = temp_builder().tempfile_in(&dir).map_err(sink_error)?;

    let value = {
        let mut writer = BufWriter::new(temp.as_file_mut());
        let value = body(&mut writer)?;
        writer.flush()?;
        value
    };

    temp.persist(output).map_err(|err| sink_error(err.error))?;
    Ok(value)
}
