/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::error::Error;

/// Sequential, streaming bit-by-bit writes.
///
/// Bits are emitted most-significant-first within each group passed to
/// [`write_bits`](BitWrite::write_bits). All buffer arithmetic stays behind
/// this trait: callers only ever deal in whole bits and whole bytes, so code
/// layered on top (tree serialization, payload emission) never manipulates
/// raw buffers directly.
pub trait BitWrite {
    type Error: Error + Send + Sync + 'static;

    /// Write the lowest `n` bits of `value`, most significant first.
    ///
    /// `n` must be at most 64; bits of `value` above the lowest `n` are
    /// ignored. Returns the number of bits written.
    fn write_bits(&mut self, value: u64, n: usize) -> Result<usize, Self::Error>;

    /// Write a whole byte, bypassing bit accumulation.
    ///
    /// May be called only when the writer is byte-aligned, which is
    /// debug-asserted by implementations.
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// The total number of bits accepted so far, including bits still
    /// sitting in internal buffers.
    fn bits_written(&self) -> u64;
}

/// Sequential, streaming bit-by-bit reads.
///
/// The dual of [`BitWrite`]: bits come back in exactly the order they were
/// written.
pub trait BitRead {
    type Error: Error + Send + Sync + 'static;

    /// Read a single bit.
    fn read_bit(&mut self) -> Result<bool, Self::Error>;

    /// Read `n` bits and return them in the lowest bits, most significant
    /// first. `n` must be at most 64.
    fn read_bits(&mut self, n: usize) -> Result<u64, Self::Error>;

    /// The number of bits still readable from the internal buffer.
    ///
    /// Once the underlying source is exhausted this is exact; before that it
    /// is a lower bound, but the refill discipline of implementations keeps
    /// it above 8 whenever more source data exists.
    fn remaining_bits(&self) -> u64;
}
