/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::impls::BUFFER_LEN;
use crate::traits::BitRead;
use std::io::{self, Read};

/// An implementation of [`BitRead`] for any [`Read`] backend.
///
/// Bits come back most-significant-first, in the order a
/// [`BufBitWriter`](crate::impls::BufBitWriter) emitted them. The reader
/// keeps a 64 KiB buffer and refills it whenever fewer than 9 bits remain
/// buffered and the backend is not exhausted: the 1-byte margin lets an
/// 8-bit read spanning a refill merge the tail of the current byte with the
/// head of the next without special cases.
///
/// [`remaining_bits`](BitRead::remaining_bits) counts the bits still
/// buffered; thanks to the refill discipline it is exact as soon as the
/// backend is exhausted, which is what lets a decoder stop precisely at a
/// known padding boundary. Reading past the last bit fails with an
/// [`UnexpectedEof`](std::io::ErrorKind::UnexpectedEof) error.
///
/// # Example
/// ```
/// use huffstream::prelude::*;
///
/// let data = [0b1011_0001_u8, 0xff];
/// let mut reader = BufBitReader::new(&data[..])?;
/// assert!(reader.read_bit()?);
/// assert_eq!(reader.read_bits(3)?, 0b011);
/// assert_eq!(reader.read_bits(8)?, 0b0001_1111);
/// assert_eq!(reader.remaining_bits(), 4);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct BufBitReader<R: Read> {
    /// The [`Read`] from which the buffer is refilled.
    backend: R,
    buffer: Box<[u8]>,
    /// Number of valid bytes in `buffer`.
    filled: usize,
    /// Index of the byte currently being consumed.
    pos: usize,
    /// Bits of `buffer[pos]` already consumed. Always in `0..8`.
    bit_pos: u32,
    /// Valid bits left in the buffer.
    remaining: u64,
    /// The backend reported end of stream.
    exhausted: bool,
}

impl<R: Read> BufBitReader<R> {
    /// Create a new [`BufBitReader`] around a byte source, performing the
    /// initial buffer fill.
    pub fn new(backend: R) -> io::Result<Self> {
        let mut reader = Self {
            backend,
            buffer: vec![0; BUFFER_LEN].into_boxed_slice(),
            filled: 0,
            pos: 0,
            bit_pos: 0,
            remaining: 0,
            exhausted: false,
        };
        reader.refill()?;
        Ok(reader)
    }

    /// Top up the buffer from the backend, keeping the unread tail (at most
    /// two bytes when called from the read paths) at the front.
    fn refill(&mut self) -> io::Result<()> {
        if self.exhausted {
            return Ok(());
        }
        self.buffer.copy_within(self.pos..self.filled, 0);
        self.filled -= self.pos;
        self.pos = 0;
        while self.filled < self.buffer.len() {
            match self.backend.read(&mut self.buffer[self.filled..]) {
                Ok(0) => {
                    self.exhausted = true;
                    break;
                }
                Ok(n) => {
                    self.filled += n;
                    self.remaining += n as u64 * 8;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl<R: Read> BitRead for BufBitReader<R> {
    type Error = io::Error;

    #[inline]
    fn read_bit(&mut self) -> Result<bool, io::Error> {
        Ok(self.read_bits(1)? != 0)
    }

    fn read_bits(&mut self, mut n: usize) -> Result<u64, io::Error> {
        debug_assert!(n <= 64, "at most 64 bits can be read at a time");
        let mut result = 0_u64;
        while n > 0 {
            if self.remaining == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "bit stream exhausted",
                ));
            }
            // merge the readable part of the current byte
            let take = n
                .min((8 - self.bit_pos) as usize)
                .min(self.remaining as usize);
            let shift = 8 - self.bit_pos as usize - take;
            let bits = (self.buffer[self.pos] as u64 >> shift) & ((1_u64 << take) - 1);
            result = (result << take) | bits;

            self.bit_pos += take as u32;
            self.remaining -= take as u64;
            if self.bit_pos == 8 {
                self.bit_pos = 0;
                self.pos += 1;
            }
            if self.remaining < 9 && !self.exhausted {
                self.refill()?;
            }
            n -= take;
        }
        Ok(result)
    }

    #[inline(always)]
    fn remaining_bits(&self) -> u64 {
        self.remaining
    }
}
