/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::traits::BitWrite;
use core::convert::Infallible;

/// An implementation of [`BitWrite`] for a growable in-memory byte vector.
///
/// Since nothing can fail, the error type is [`Infallible`] and callers can
/// discharge the `Result` with an empty match. The codec uses this to capture
/// the serialized tree header during the encode phase, before any destination
/// exists.
///
/// # Example
/// ```
/// use huffstream::prelude::*;
///
/// let mut writer = MemBitWriter::new();
/// writer.write_bits(0b01, 2).unwrap();
/// let (bytes, bit_len) = writer.into_parts();
/// assert_eq!((bytes, bit_len), (vec![0b0100_0000], 2));
/// ```
#[derive(Debug, Default)]
pub struct MemBitWriter {
    bytes: Vec<u8>,
    current: u8,
    /// Number of free (low) bits in `current`. Always in `1..=8`.
    free_bits: u32,
    bits_written: u64,
}

impl MemBitWriter {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            current: 0,
            free_bits: 8,
            bits_written: 0,
        }
    }

    /// Return the accumulated bytes and the exact bit length; the unused low
    /// bits of the final byte are zero.
    pub fn into_parts(mut self) -> (Vec<u8>, u64) {
        if self.free_bits < 8 {
            self.bytes.push(self.current);
        }
        (self.bytes, self.bits_written)
    }
}

impl BitWrite for MemBitWriter {
    type Error = Infallible;

    fn write_bits(&mut self, value: u64, n: usize) -> Result<usize, Infallible> {
        debug_assert!(n <= 64, "at most 64 bits can be written at a time");
        if n == 0 {
            return Ok(0);
        }
        let value = if n < 64 { value & ((1_u64 << n) - 1) } else { value };

        let mut bits = n as u32;
        while bits > 0 {
            if self.free_bits < bits {
                self.current |= (value >> (bits - self.free_bits)) as u8;
                bits -= self.free_bits;
                self.free_bits = 0;
            } else {
                self.current |= (value << (self.free_bits - bits)) as u8;
                self.free_bits -= bits;
                bits = 0;
            }
            if self.free_bits == 0 {
                self.bytes.push(self.current);
                self.current = 0;
                self.free_bits = 8;
            }
        }
        self.bits_written += n as u64;
        Ok(n)
    }

    #[inline]
    fn write_byte(&mut self, byte: u8) -> Result<(), Infallible> {
        debug_assert!(self.free_bits == 8, "write_byte needs a byte-aligned writer");
        self.bytes.push(byte);
        self.bits_written += 8;
        Ok(())
    }

    #[inline(always)]
    fn bits_written(&self) -> u64 {
        self.bits_written
    }
}
