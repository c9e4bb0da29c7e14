//! Whole-file byte comparison for checking round trips.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::warn;

use crate::error::{CodecError, Result};

/// Byte-for-byte comparison of two files. Unreadable files compare unequal.
pub fn files_equal(a: &Path, b: &Path) -> bool {
    match try_files_equal(a, b) {
        Ok(equal) => equal,
        Err(err) => {
            warn!(a = %a.display(), b = %b.display(), error = %err, "cannot compare files");
            false
        }
    }
}

/// Like [`files_equal`] but reports why a file could not be read.
pub fn try_files_equal(a: &Path, b: &Path) -> Result<bool> {
    let fa = open(a)?;
    let fb = open(b)?;
    if fa.metadata()?.len() != fb.metadata()?.len() {
        return Ok(false);
    }

    let mut ra = BufReader::new(fa);
    let mut rb = BufReader::new(fb);
    let mut buf_a = [0u8; 8192];
    let mut buf_b = [0u8; 8192];
    loop {
        let n = read_full(&mut ra, &mut buf_a)?;
        let m = read_full(&mut rb, &mut buf_b)?;
        if n != m || buf_a[..n] != buf_b[..m] {
            return Ok(false);
        }
        if n == 0 {
            return Ok(true);
        }
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| CodecError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

// Fills `buf` unless the reader hits EOF first; returns the byte count.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
