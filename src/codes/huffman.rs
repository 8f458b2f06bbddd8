/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Huffman tree construction with a variance-minimizing tie-break, and the
//! preorder in-band serialization of the tree.

use crate::traits::{BitRead, BitWrite};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use thiserror::Error;

/// Maximum admissible root-to-leaf depth while parsing a tree header: a legal
/// tree over at most 256 symbols never exceeds 255.
const MAX_DEPTH: u32 = 255;

/// A representation of a binary codeword.
///
/// The bit-pattern of the codeword is the low [`len`](Code::len) bits of
/// [`code`](Code::code), most significant first; the [`Display`]
/// implementation renders exactly those bits. A zero `len` marks a symbol
/// with no assigned code.
///
/// [`Display`]: core::fmt::Display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Code {
    pub code: u64,
    pub len: u8,
}

impl core::fmt::Display for Code {
    #[inline(always)]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:0width$b}", self.code, width = self.len as usize)
    }
}

impl core::ops::Shl<bool> for Code {
    type Output = Self;

    /// Append one bit to the codeword.
    #[inline(always)]
    fn shl(mut self, bit: bool) -> Self {
        debug_assert!(self.len < u64::BITS as u8, "code too long");
        self.code <<= 1;
        self.code |= bit as u64;
        self.len += 1;
        self
    }
}

/// Why a symbol set cannot be assigned a prefix code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BuildError {
    /// No symbol has a nonzero count.
    #[error("empty symbol set")]
    Empty,
    /// A single distinct symbol cannot receive a nonzero-length code.
    #[error("single distinct symbol")]
    SingleSymbol,
}

/// An error while rebuilding a tree from its serialized header.
#[derive(Debug, Error)]
pub enum TreeError<E: std::error::Error + 'static> {
    #[error("bit stream error while parsing tree header")]
    Read(#[source] E),
    #[error("tree header implies a depth beyond 255 levels")]
    TooDeep,
}

/// Node of a Huffman tree in construction.
///
/// `depth` is zero for leaves and `1 + max(child depths)` for internal
/// nodes; it only serves as the tie-break during construction and is not the
/// final code length.
#[derive(Debug)]
enum Node {
    Leaf {
        symbol: u8,
        count: u64,
    },
    Internal {
        count: u64,
        depth: u16,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    #[inline(always)]
    fn count(&self) -> u64 {
        match self {
            Self::Leaf { count, .. } => *count,
            Self::Internal { count, .. } => *count,
        }
    }

    #[inline(always)]
    fn depth(&self) -> u16 {
        match self {
            Self::Leaf { .. } => 0,
            Self::Internal { depth, .. } => *depth,
        }
    }
}

/// Wrapper giving [`BinaryHeap`] min-heap behavior on `(count, depth)`.
///
/// Among equal counts the shallower node wins, which is the rule that
/// minimizes code-length variance among equal-probability symbols.
struct HeapNode(Box<Node>);

impl HeapNode {
    #[inline(always)]
    fn key(&self) -> (u64, u16) {
        (self.0.count(), self.0.depth())
    }
}

impl PartialEq for HeapNode {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}
impl Eq for HeapNode {}
impl PartialOrd for HeapNode {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapNode {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed so the smallest (count, depth) has the highest priority
        other.key().cmp(&self.key())
    }
}

/// A Huffman tree over the byte values with nonzero count.
///
/// Construction seeds one leaf per present symbol and repeatedly merges the
/// two minimum nodes; the first node extracted becomes the left child. The
/// resulting tree has exactly `K` leaves and `K - 1` internal nodes for `K`
/// distinct symbols, and requires `K ≥ 2`.
#[derive(Debug)]
pub struct HuffmanTree {
    root: Box<Node>,
    leaves: u16,
}

impl HuffmanTree {
    /// Build the tree from per-byte occurrence counts.
    pub fn from_counts(counts: &[u64; 256]) -> Result<Self, BuildError> {
        let mut queue = BinaryHeap::new();
        for (symbol, &count) in counts.iter().enumerate() {
            if count > 0 {
                queue.push(HeapNode(Box::new(Node::Leaf {
                    symbol: symbol as u8,
                    count,
                })));
            }
        }
        let leaves = queue.len() as u16;
        match leaves {
            0 => return Err(BuildError::Empty),
            1 => return Err(BuildError::SingleSymbol),
            _ => {}
        }

        while queue.len() > 1 {
            let HeapNode(left) = queue.pop().unwrap();
            let HeapNode(right) = queue.pop().unwrap();
            queue.push(HeapNode(Box::new(Node::Internal {
                count: left.count() + right.count(),
                depth: 1 + left.depth().max(right.depth()),
                left,
                right,
            })));
        }
        let HeapNode(root) = queue.pop().unwrap();
        Ok(Self { root, leaves })
    }

    /// Number of distinct symbols in the tree.
    pub fn leaves(&self) -> u16 {
        self.leaves
    }

    /// Derive the 256-entry code table and simultaneously emit the serialized
    /// tree header.
    ///
    /// One preorder traversal does both: descending left appends bit `1` to
    /// the running codeword, descending right appends `0`; every internal
    /// node contributes a `0` marker bit to the header and every leaf a `1`
    /// marker bit followed by its raw 8-bit symbol. The decoding side relies
    /// on this shared traversal order, so the two emissions cannot drift
    /// apart.
    pub fn derive_codes<W: BitWrite>(&self, writer: &mut W) -> Result<Box<[Code; 256]>, W::Error> {
        let mut codes = Box::new([Code::default(); 256]);
        Self::visit(&self.root, Code::default(), writer, &mut codes)?;
        Ok(codes)
    }

    fn visit<W: BitWrite>(
        node: &Node,
        code: Code,
        writer: &mut W,
        codes: &mut [Code; 256],
    ) -> Result<(), W::Error> {
        match node {
            Node::Leaf { symbol, .. } => {
                writer.write_bits(1, 1)?;
                writer.write_bits(*symbol as u64, 8)?;
                codes[*symbol as usize] = code;
            }
            Node::Internal { left, right, .. } => {
                writer.write_bits(0, 1)?;
                Self::visit(left, code << true, writer, codes)?;
                Self::visit(right, code << false, writer, codes)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
enum DecodeNode {
    Leaf(u8),
    Internal {
        left: Box<DecodeNode>,
        right: Box<DecodeNode>,
    },
}

/// A Huffman tree rebuilt top-down from its serialized header.
///
/// Structurally the mirror of [`HuffmanTree`], but carries no weights: the
/// header alone determines the shape, so decoding needs no side channel.
#[derive(Debug)]
pub struct DecodeTree {
    root: DecodeNode,
    leaves: u32,
}

impl DecodeTree {
    /// Rebuild a tree from header bits: `1` means "read 8 more bits as a
    /// leaf symbol", `0` means "two children follow, left subtree first".
    pub fn parse<R: BitRead>(reader: &mut R) -> Result<Self, TreeError<R::Error>> {
        let mut leaves = 0;
        let root = Self::parse_node(reader, 0, &mut leaves)?;
        Ok(Self { root, leaves })
    }

    fn parse_node<R: BitRead>(
        reader: &mut R,
        depth: u32,
        leaves: &mut u32,
    ) -> Result<DecodeNode, TreeError<R::Error>> {
        if depth > MAX_DEPTH {
            return Err(TreeError::TooDeep);
        }
        if reader.read_bit().map_err(TreeError::Read)? {
            let symbol = reader.read_bits(8).map_err(TreeError::Read)? as u8;
            *leaves += 1;
            Ok(DecodeNode::Leaf(symbol))
        } else {
            let left = Box::new(Self::parse_node(reader, depth + 1, leaves)?);
            let right = Box::new(Self::parse_node(reader, depth + 1, leaves)?);
            Ok(DecodeNode::Internal { left, right })
        }
    }

    /// Number of leaves the header described.
    pub fn leaves(&self) -> u32 {
        self.leaves
    }

    /// Walk from the root following one payload bit per step (`1` goes
    /// left, `0` goes right) until a leaf is reached, and return its symbol.
    pub fn decode_symbol<R: BitRead>(&self, reader: &mut R) -> Result<u8, R::Error> {
        let mut node = &self.root;
        loop {
            match node {
                DecodeNode::Leaf(symbol) => return Ok(*symbol),
                DecodeNode::Internal { left, right } => {
                    node = if reader.read_bit()? { left } else { right };
                }
            }
        }
    }
}
