//! # file_compressor
//!
//! Static Huffman compression of arbitrary files.
//!
//! A compressed file holds the input's 256-entry byte histogram (1024 bytes,
//! little-endian `u32` counts) followed by the MSB-first packed codes. The
//! code tree itself is never stored; both sides rebuild it from the
//! histogram.
//!
//! ```no_run
//! use std::path::Path;
//! use file_compressor::{compress, decompress, files_equal};
//!
//! compress(Path::new("book.txt"), Path::new("book.txt.huff"))?;
//! decompress(Path::new("book.txt.huff"), Path::new("book.txt.out"))?;
//! assert!(files_equal(Path::new("book.txt"), Path::new("book.txt.out")));
//! # Ok::<(), file_compressor::CodecError>(())
//! ```

pub mod batch;
pub mod bits;
pub mod codec;
pub mod codes;
pub mod error;
pub mod frequency;
pub mod tree;
pub mod verify;

pub use codec::{
    compress, compress_bytes, compress_with, decode, decompress, decompress_bytes, encode, inspect,
    ArtifactSummary, CompressOptions, EmptyInputPolicy,
};
pub use error::{CodecError, Result};
pub use frequency::{FrequencyTable, HEADER_LEN};
pub use tree::{HuffNode, HuffmanTree};
pub use verify::{files_equal, try_files_equal};
