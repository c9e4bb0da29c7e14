//! MSB-first bit packing on top of byte streams.

use std::io::{self, Read, Write};

pub struct BitWriter<W: Write> {
    inner: W,
    buffer: u8,
    filled: u8,
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        BitWriter {
            inner,
            buffer: 0,
            filled: 0,
            bits_written: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        if bit {
            self.buffer |= 1 << (7 - self.filled);
        }
        self.filled += 1;
        self.bits_written += 1;

        if self.filled == 8 {
            self.inner.write_all(&[self.buffer])?;
            self.buffer = 0;
            self.filled = 0;
        }
        Ok(())
    }

    pub fn write_bits(&mut self, bits: &[bool]) -> io::Result<()> {
        for &bit in bits {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Emits the pending partial byte, low bits zero-padded.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.filled > 0 {
            self.inner.write_all(&[self.buffer])?;
            self.buffer = 0;
            self.filled = 0;
        }
        self.inner.flush()
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.flush()?;
        Ok(self.inner)
    }
}

pub struct BitReader<R: Read> {
    inner: R,
    buffer: u8,
    remaining: u8,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        BitReader {
            inner,
            buffer: 0,
            remaining: 0,
        }
    }

    /// `Ok(None)` once the underlying reader is exhausted.
    pub fn read_bit(&mut self) -> io::Result<Option<bool>> {
        if self.remaining == 0 {
            let mut byte = [0u8; 1];
            match self.inner.read_exact(&mut byte) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
                Err(e) => return Err(e),
            }
            self.buffer = byte[0];
            self.remaining = 8;
        }

        self.remaining -= 1;
        Ok(Some((self.buffer >> self.remaining) & 1 == 1))
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}
