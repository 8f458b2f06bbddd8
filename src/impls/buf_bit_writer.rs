/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::impls::BUFFER_LEN;
use crate::traits::BitWrite;
use std::io::{self, Write};

/// An implementation of [`BitWrite`] for any [`Write`] backend.
///
/// Bits accumulate most-significant-first in a partial byte; the struct
/// tracks the number of free (low) bits left in it. Full bytes advance into a
/// 64 KiB buffer, and a full buffer is flushed to the backend, so no write to
/// the backend is ever smaller than the buffer except the final one.
///
/// [`flush`](BufBitWriter::flush) pads the trailing partial byte with zero
/// bits and writes out the buffer's live prefix; dropping the writer performs
/// the same flush on a best-effort basis, ignoring errors.
///
/// # Example
/// ```
/// use huffstream::prelude::*;
///
/// let mut buf = Vec::new();
/// let mut writer = BufBitWriter::new(&mut buf);
/// writer.write_bits(0b101, 3)?;
/// writer.write_bits(0b0000_0001, 8)?;
/// assert_eq!(writer.bits_written(), 11);
/// writer.flush()?;
/// assert_eq!(buf, vec![0b1010_0000, 0b0010_0000]);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct BufBitWriter<W: Write> {
    /// The [`Write`] to which full buffers are written.
    backend: W,
    /// Completed bytes not yet written to the backend.
    buffer: Vec<u8>,
    /// The byte under construction.
    current: u8,
    /// Number of free (low) bits in `current`. Always in `1..=8`.
    free_bits: u32,
    /// Total bits accepted, including bits still buffered.
    bits_written: u64,
}

impl<W: Write> BufBitWriter<W> {
    /// Create a new [`BufBitWriter`] around a byte sink.
    pub fn new(backend: W) -> Self {
        Self {
            backend,
            buffer: Vec::with_capacity(BUFFER_LEN),
            current: 0,
            free_bits: 8,
            bits_written: 0,
        }
    }

    /// Move the completed `current` byte into the buffer, flushing the
    /// buffer to the backend if it is full.
    #[inline(always)]
    fn push_current(&mut self) -> io::Result<()> {
        self.buffer.push(self.current);
        self.current = 0;
        self.free_bits = 8;
        if self.buffer.len() >= BUFFER_LEN {
            self.backend.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        Ok(())
    }

    fn flush_inner(&mut self) -> io::Result<()> {
        if self.free_bits < 8 {
            // zero-pad the low bits of the trailing partial byte
            self.buffer.push(self.current);
            self.current = 0;
            self.free_bits = 8;
        }
        if !self.buffer.is_empty() {
            self.backend.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        self.backend.flush()
    }

    /// Flush the trailing partial byte (zero-padded in its unused low bits)
    /// and the buffer's live prefix, then flush and release the backend.
    pub fn flush(mut self) -> io::Result<()> {
        self.flush_inner()
    }
}

impl<W: Write> Drop for BufBitWriter<W> {
    fn drop(&mut self) {
        // During a drop we can't report anything if it goes bad
        let _ = self.flush_inner();
    }
}

impl<W: Write> BitWrite for BufBitWriter<W> {
    type Error = io::Error;

    fn write_bits(&mut self, value: u64, n: usize) -> Result<usize, io::Error> {
        debug_assert!(n <= 64, "at most 64 bits can be written at a time");
        if n == 0 {
            return Ok(0);
        }
        let value = if n < 64 { value & ((1_u64 << n) - 1) } else { value };

        let mut bits = n as u32;
        while bits > 0 {
            if self.free_bits < bits {
                // top free_bits of the group complete the current byte
                self.current |= (value >> (bits - self.free_bits)) as u8;
                bits -= self.free_bits;
                self.free_bits = 0;
            } else {
                self.current |= (value << (self.free_bits - bits)) as u8;
                self.free_bits -= bits;
                bits = 0;
            }
            if self.free_bits == 0 {
                self.push_current()?;
            }
        }
        self.bits_written += n as u64;
        Ok(n)
    }

    #[inline]
    fn write_byte(&mut self, byte: u8) -> Result<(), io::Error> {
        debug_assert!(self.free_bits == 8, "write_byte needs a byte-aligned writer");
        self.current = byte;
        self.free_bits = 0;
        self.push_current()?;
        self.bits_written += 8;
        Ok(())
    }

    #[inline(always)]
    fn bits_written(&self) -> u64 {
        self.bits_written
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::impls::BufBitReader;
    use crate::traits::BitRead;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn partial_byte_is_zero_padded() -> anyhow::Result<()> {
        let mut buf = Vec::new();
        let mut writer = BufBitWriter::new(&mut buf);
        writer.write_bits(0b1_1011, 5)?;
        writer.flush()?;
        assert_eq!(buf, vec![0b1101_1000]);
        Ok(())
    }

    #[test]
    fn bytes_bypass_bit_accumulation() -> anyhow::Result<()> {
        let mut buf = Vec::new();
        let mut writer = BufBitWriter::new(&mut buf);
        writer.write_byte(0xab)?;
        writer.write_bits(0x12, 8)?;
        writer.write_byte(0xcd)?;
        assert_eq!(writer.bits_written(), 24);
        writer.flush()?;
        assert_eq!(buf, vec![0xab, 0x12, 0xcd]);
        Ok(())
    }

    #[test]
    fn groups_split_across_byte_boundaries() -> anyhow::Result<()> {
        let mut buf = Vec::new();
        let mut writer = BufBitWriter::new(&mut buf);
        // 3 + 13 + 16 = 32 bits, so the output is exactly four bytes
        writer.write_bits(0b010, 3)?;
        writer.write_bits(0x1fff, 13)?;
        writer.write_bits(0xbeef, 16)?;
        writer.flush()?;
        assert_eq!(buf, vec![0b0101_1111, 0xff, 0xbe, 0xef]);
        Ok(())
    }

    #[test]
    fn roundtrip_random_groups() -> anyhow::Result<()> {
        const ITER: usize = 10_000;
        let mut buf = Vec::new();
        {
            let mut r = SmallRng::seed_from_u64(0);
            let mut v = SmallRng::seed_from_u64(1);
            let mut writer = BufBitWriter::new(&mut buf);
            for _ in 0..ITER {
                let n = r.random_range(1..=64);
                let value: u64 = v.random();
                writer.write_bits(value, n)?;
            }
            writer.flush()?;
        }

        let mut r = SmallRng::seed_from_u64(0);
        let mut v = SmallRng::seed_from_u64(1);
        let mut reader = BufBitReader::new(&buf[..])?;
        for _ in 0..ITER {
            let n = r.random_range(1..=64);
            let value: u64 = v.random();
            let expected = if n < 64 { value & ((1_u64 << n) - 1) } else { value };
            assert_eq!(reader.read_bits(n)?, expected);
        }
        Ok(())
    }

    #[test]
    fn multibuffer_output_loses_no_bits() -> anyhow::Result<()> {
        // more than one internal buffer's worth of 24-bit groups
        const ITER: usize = 3 * super::BUFFER_LEN / 3;
        let mut buf = Vec::new();
        {
            let mut writer = BufBitWriter::new(&mut buf);
            for i in 0..ITER {
                writer.write_bits(i as u64, 24)?;
            }
            writer.flush()?;
        }
        assert_eq!(buf.len(), ITER * 3);
        let mut reader = BufBitReader::new(&buf[..])?;
        for i in 0..ITER {
            assert_eq!(reader.read_bits(24)?, i as u64 & 0xff_ffff);
        }
        Ok(())
    }
}
