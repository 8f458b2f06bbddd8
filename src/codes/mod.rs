/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Huffman code construction, serialization, and statistics.

[`HuffmanTree`] builds the optimal prefix code over the byte values present
in a source, breaking weight ties in favor of shallower nodes so that the
code-length variance is minimized. A single preorder traversal then derives
the per-symbol [`Code`]s and, through any [`BitWrite`](crate::traits::BitWrite),
the self-describing tree header that lets [`DecodeTree`] rebuild the code on
the decoding side without any external table.

*/

mod huffman;
pub use huffman::*;

mod stats;
pub use stats::*;
