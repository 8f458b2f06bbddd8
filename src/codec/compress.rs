/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{Error, SourceError, SymbolTable};
use crate::codes::{CodeStats, HuffmanTree};
use crate::impls::{BufBitWriter, MemBitWriter, BUFFER_LEN};
use crate::traits::BitWrite;
use log::debug;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

/// The tree header captured during code-table derivation, replayed verbatim
/// at the start of every container this code emits.
#[derive(Debug)]
struct TreeHeader {
    /// Header bits, zero-padded in the final byte.
    bytes: Vec<u8>,
    /// Exact length in bits.
    bit_len: u64,
}

/// The result of the encode phase, and the only way into the compress phase.
///
/// Holds the populated symbol table, the captured tree header, and the code
/// statistics. Compressing requires a successfully encoded value, so the
/// "encode before compress" ordering of the two phases is a fact of the type
/// rather than a runtime precondition.
///
/// # Example
/// ```
/// use huffstream::prelude::*;
///
/// let code = HuffmanCode::encode_bytes(b"abracadabra")?;
/// let mut container = Vec::new();
/// code.compress_bytes(b"abracadabra", &mut container)?;
/// // header + 3-bit padding field + payload + padding is byte-aligned
/// assert!(container.len() < b"abracadabra".len() + 8);
/// # Ok::<(), huffstream::codec::Error>(())
/// ```
#[derive(Debug)]
pub struct HuffmanCode {
    table: SymbolTable,
    header: TreeHeader,
    stats: CodeStats,
}

impl HuffmanCode {
    /// Encode phase over a file: scan it once, build the tree and the code
    /// table, capture the header, compute the statistics.
    ///
    /// Fails with [`Error::FileOpen`] if the file cannot be opened or read,
    /// and with [`Error::Source`] if it holds fewer than two distinct byte
    /// values.
    pub fn encode_path<P: AsRef<Path>>(source: P) -> Result<Self, Error> {
        let file = File::open(source).map_err(Error::FileOpen)?;
        let table = SymbolTable::scan(file).map_err(Error::FileOpen)?;
        Self::from_table(table)
    }

    /// Encode phase over in-memory bytes.
    pub fn encode_bytes(data: &[u8]) -> Result<Self, Error> {
        Self::from_table(SymbolTable::from_bytes(data))
    }

    fn from_table(mut table: SymbolTable) -> Result<Self, Error> {
        let tree = HuffmanTree::from_counts(&table.counts())
            .map_err(|e| Error::Source(e.into()))?;

        let mut header_writer = MemBitWriter::new();
        let codes = match tree.derive_codes(&mut header_writer) {
            Ok(codes) => codes,
            Err(never) => match never {},
        };
        table.set_codes(&codes);

        let stats = CodeStats::new(table.records().map(|r| (r.freq, r.code.len)));
        let (bytes, bit_len) = header_writer.into_parts();
        debug!(
            "encoded {} bytes, {} distinct symbols, {} header bits, {:.4} bits/symbol",
            table.total(),
            table.distinct(),
            bit_len,
            stats.average_length
        );
        Ok(Self {
            table,
            header: TreeHeader { bytes, bit_len },
            stats,
        })
    }

    /// The populated symbol table, for callers that want to display
    /// per-symbol counts, frequencies, or code patterns.
    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    /// Entropy, average code length, code-length variance, and efficiency of
    /// this code over the scanned source.
    pub fn statistics(&self) -> CodeStats {
        self.stats
    }

    /// Compress phase between files. The source must be the one the encode
    /// phase scanned.
    ///
    /// Creates or overwrites the destination; fails with
    /// [`Error::Destination`] if it cannot be created or written, and closes
    /// it on every exit path.
    pub fn compress_path<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        destination: Q,
    ) -> Result<(), Error> {
        let source = File::open(source).map_err(Error::FileOpen)?;
        let destination = File::create(destination).map_err(Error::Destination)?;
        self.compress_stream(source, destination)
    }

    /// Compress phase from in-memory bytes into any byte sink.
    pub fn compress_bytes<W: Write>(&self, data: &[u8], destination: W) -> Result<(), Error> {
        self.compress_stream(data, destination)
    }

    /// Emit the container: captured header, 3-bit padding-length field,
    /// then one code per source byte, zero-padded to a byte boundary.
    fn compress_stream<R: Read, W: Write>(
        &self,
        mut source: R,
        destination: W,
    ) -> Result<(), Error> {
        let mut writer = BufBitWriter::new(destination);

        // the header starts at bit zero, so its whole bytes stay aligned
        let whole_bytes = (self.header.bit_len / 8) as usize;
        for &byte in &self.header.bytes[..whole_bytes] {
            writer.write_byte(byte).map_err(Error::Destination)?;
        }
        let tail_bits = (self.header.bit_len % 8) as u32;
        if tail_bits > 0 {
            let tail = self.header.bytes[whole_bytes] >> (8 - tail_bits);
            writer
                .write_bits(tail as u64, tail_bits as usize)
                .map_err(Error::Destination)?;
        }

        let payload_bits = self.table.payload_bits();
        let total_bits = self.header.bit_len + 3 + payload_bits;
        let padding = (8 - total_bits % 8) % 8;
        writer.write_bits(padding, 3).map_err(Error::Destination)?;
        debug!("compressing: {payload_bits} payload bits, {padding} padding bits");

        let mut buffer = vec![0_u8; BUFFER_LEN];
        loop {
            match source.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    for &byte in &buffer[..n] {
                        let code = self.table.record(byte).code;
                        if code.len == 0 {
                            return Err(Error::Source(SourceError::UnknownSymbol(byte)));
                        }
                        writer
                            .write_bits(code.code, code.len as usize)
                            .map_err(Error::Destination)?;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::FileOpen(e)),
            }
        }

        debug_assert_eq!(
            (writer.bits_written() + padding) % 8,
            0,
            "container must byte-align"
        );
        writer.flush().map_err(Error::Destination)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn container_size_is_exact() -> anyhow::Result<()> {
        // 3 distinct symbols: header 2·1 + 3·9 = 29 bits, padding field 3,
        // payload 4·1 + 2·2 + 1·2 = 10, padding 6: 48 bits, 6 bytes
        let code = HuffmanCode::encode_bytes(b"aaaabbc")?;
        let mut container = Vec::new();
        code.compress_bytes(b"aaaabbc", &mut container)?;
        assert_eq!(container.len(), 6);
        Ok(())
    }

    #[test]
    fn two_symbol_container_needs_no_padding() -> anyhow::Result<()> {
        // header 1 + 2·9 = 19 bits, field 3, payload 2: exactly 3 bytes
        let code = HuffmanCode::encode_bytes(b"ab")?;
        let mut container = Vec::new();
        code.compress_bytes(b"ab", &mut container)?;
        assert_eq!(container.len(), 3);
        Ok(())
    }

    #[test]
    fn degenerate_sources_produce_no_container() {
        for data in [&b""[..], b"x", b"xxxxxxx"] {
            assert!(matches!(
                HuffmanCode::encode_bytes(data),
                Err(Error::Source(SourceError::Degenerate(_)))
            ));
        }
    }

    #[test]
    fn compressing_unseen_symbols_fails() -> anyhow::Result<()> {
        let code = HuffmanCode::encode_bytes(b"aabb")?;
        let mut container = Vec::new();
        let err = code.compress_bytes(b"aabbz", &mut container).unwrap_err();
        assert!(matches!(
            err,
            Error::Source(SourceError::UnknownSymbol(b'z'))
        ));
        Ok(())
    }

    #[test]
    fn statistics_match_the_known_example() -> anyhow::Result<()> {
        let code = HuffmanCode::encode_bytes(b"aaaabbc")?;
        let stats = code.statistics();
        assert!((stats.average_length - 10.0 / 7.0).abs() < 1e-12);
        assert!(stats.entropy <= stats.average_length);
        assert!(stats.efficiency > 0.0 && stats.efficiency <= 1.0);
        Ok(())
    }
}
