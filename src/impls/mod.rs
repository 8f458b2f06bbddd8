/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Implementations of bit streams.

If you need to write bits to a file or any backend implementing
[`std::io::Write`], wrap it in a [`BufBitWriter`]; the dual for
[`std::io::Read`] backends is [`BufBitReader`]. Both keep a fixed 64 KiB
internal buffer, so memory use does not depend on the length of the stream.

If instead you want to accumulate bits in memory, [`MemBitWriter`] writes
into a growable byte vector and cannot fail.

*/

mod buf_bit_reader;
pub use buf_bit_reader::BufBitReader;

mod buf_bit_writer;
pub use buf_bit_writer::BufBitWriter;

mod mem_bit_writer;
pub use mem_bit_writer::MemBitWriter;

/// Size of the internal byte buffers used by the streaming readers, writers,
/// and source scans.
pub(crate) const BUFFER_LEN: usize = 1 << 16;
