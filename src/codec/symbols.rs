/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::codes::Code;
use crate::impls::BUFFER_LEN;
use std::io::{self, Read};

/// Per-byte-value bookkeeping: occurrence count, derived frequency, and the
/// assigned code. The code is meaningful only after table derivation; before
/// that its length is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolRecord {
    pub count: u64,
    /// `count / total`, a probability in `[0, 1]`.
    pub freq: f64,
    pub code: Code,
}

/// The 256-entry symbol table built by scanning a source exactly once.
///
/// A fresh table is built per encode call, so no per-symbol state ever leaks
/// across sources.
#[derive(Debug)]
pub struct SymbolTable {
    records: Box<[SymbolRecord; 256]>,
    total: u64,
    distinct: u16,
}

impl SymbolTable {
    /// Scan a byte source to completion, one 64 KiB buffer at a time.
    pub fn scan<R: Read>(mut source: R) -> io::Result<Self> {
        let mut counts = [0_u64; 256];
        let mut buffer = vec![0_u8; BUFFER_LEN];
        loop {
            match source.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    for &byte in &buffer[..n] {
                        counts[byte as usize] += 1;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(Self::from_counts(counts))
    }

    /// Build the table from an in-memory source.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0_u64; 256];
        for &byte in data {
            counts[byte as usize] += 1;
        }
        Self::from_counts(counts)
    }

    fn from_counts(counts: [u64; 256]) -> Self {
        let total: u64 = counts.iter().sum();
        let mut records = Box::new([SymbolRecord::default(); 256]);
        let mut distinct = 0;
        for (record, &count) in records.iter_mut().zip(&counts) {
            record.count = count;
            if count > 0 {
                record.freq = count as f64 / total as f64;
                distinct += 1;
            }
        }
        Self {
            records,
            total,
            distinct,
        }
    }

    /// The occurrence counts, in symbol order.
    pub fn counts(&self) -> [u64; 256] {
        let mut counts = [0_u64; 256];
        for (count, record) in counts.iter_mut().zip(self.records.iter()) {
            *count = record.count;
        }
        counts
    }

    pub(crate) fn set_codes(&mut self, codes: &[Code; 256]) {
        for (record, &code) in self.records.iter_mut().zip(codes.iter()) {
            record.code = code;
        }
    }

    /// The record for one byte value.
    #[inline(always)]
    pub fn record(&self, symbol: u8) -> &SymbolRecord {
        &self.records[symbol as usize]
    }

    /// All 256 records, in symbol order.
    pub fn records(&self) -> impl Iterator<Item = &SymbolRecord> + Clone {
        self.records.iter()
    }

    /// Total number of bytes scanned.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct byte values present.
    pub fn distinct(&self) -> u16 {
        self.distinct
    }

    /// Exact payload size of a compressed stream over this table, in bits.
    pub fn payload_bits(&self) -> u64 {
        self.records
            .iter()
            .map(|r| r.count * r.code.len as u64)
            .sum()
    }
}
