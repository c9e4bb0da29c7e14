//! Byte histogram and the fixed 1024-byte header it is persisted as.

use std::fmt;
use std::io::{self, Read, Write};

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::{self, SerializeTuple};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CodecError, Result};

/// Number of distinct symbols, one per byte value.
pub const SYMBOLS: usize = 256;

/// Size in bytes of the persisted header: 256 little-endian `u32` counts.
pub const HEADER_LEN: usize = SYMBOLS * 4;

#[derive(Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; SYMBOLS],
}

impl FrequencyTable {
    pub fn count(bytes: &[u8]) -> Self {
        let mut counts = [0u64; SYMBOLS];
        for &byte in bytes {
            counts[byte as usize] += 1;
        }
        FrequencyTable { counts }
    }

    pub fn from_counts(counts: [u64; SYMBOLS]) -> Self {
        FrequencyTable { counts }
    }

    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Sum of all counts, i.e. the length of the data this table describes.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&count| count == 0)
    }

    /// Symbols with a nonzero count, in ascending symbol order.
    pub fn present(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }

    /// Fails if any count is too large for the header's `u32` slots.
    pub fn check_persistable(&self) -> Result<()> {
        match self.present().find(|&(_, count)| u32::try_from(count).is_err()) {
            Some((symbol, count)) => Err(CodecError::FrequencyOverflow { symbol, count }),
            None => Ok(()),
        }
    }

    pub fn write_header<W: Write>(&self, writer: W) -> Result<()> {
        self.check_persistable()?;
        bincode::serialize_into(writer, self).map_err(|err| match *err {
            bincode::ErrorKind::Io(e) => CodecError::Io(e),
            other => CodecError::Io(io::Error::new(io::ErrorKind::InvalidData, other.to_string())),
        })
    }

    pub fn read_header<R: Read>(reader: R) -> Result<Self> {
        bincode::deserialize_from(reader).map_err(|err| match *err {
            bincode::ErrorKind::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                CodecError::TruncatedHeader
            }
            bincode::ErrorKind::Io(e) => CodecError::Io(e),
            _ => CodecError::TruncatedHeader,
        })
    }
}

impl fmt::Debug for FrequencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.present()).finish()
    }
}

impl Serialize for FrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(SYMBOLS)?;
        for &count in self.counts.iter() {
            let count = u32::try_from(count)
                .map_err(|_| <S::Error as ser::Error>::custom(format!("count {} does not fit in u32", count)))?;
            tuple.serialize_element(&count)?;
        }
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for FrequencyTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct HeaderVisitor;

        impl<'de> Visitor<'de> for HeaderVisitor {
            type Value = FrequencyTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} u32 symbol counts", SYMBOLS)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
                let mut counts = [0u64; SYMBOLS];
                for (i, slot) in counts.iter_mut().enumerate() {
                    let count: u32 = seq
                        .next_element()?
                        .ok_or_else(|| <A::Error as de::Error>::invalid_length(i, &self))?;
                    *slot = u64::from(count);
                }
                Ok(FrequencyTable { counts })
            }
        }

        deserializer.deserialize_tuple(SYMBOLS, HeaderVisitor)
    }
}
