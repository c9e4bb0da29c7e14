use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("cannot open {} for reading", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot open {} for writing", path.display())]
    SinkUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("frequency header is shorter than 256 entries")]
    TruncatedHeader,

    #[error("input contains no symbols")]
    EmptyInput,

    #[error("body ended after {decoded} of {expected} symbols")]
    TruncatedBody { expected: u64, decoded: u64 },

    #[error("symbol {symbol:#04x} occurs {count} times, more than the header can store")]
    FrequencyOverflow { symbol: u8, count: u64 },

    #[error(transparent)]
    Io(#[from] io::Error),
}
