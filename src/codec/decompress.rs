/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{source_read_error, Error, SourceError};
use crate::codes::{DecodeTree, TreeError};
use crate::impls::{BufBitReader, BufBitWriter};
use crate::traits::{BitRead, BitWrite};
use log::debug;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Decompress one container file into a destination file.
///
/// Needs no prior state: the tree header and padding-length field inside the
/// container fully determine the decoding. A container that cannot be opened
/// is an [`Error::Source`] failure, like every other fault on the container
/// side. Creates or overwrites the destination, and closes both files on
/// every exit path.
pub fn decompress_path<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    destination: Q,
) -> Result<(), Error> {
    let source = File::open(source).map_err(|e| Error::Source(SourceError::Io(e)))?;
    let destination = File::create(destination).map_err(Error::Destination)?;
    decompress_stream(source, destination)
}

/// Decompress a container from any byte source into any byte sink.
///
/// Reads the preorder tree header, the 3-bit padding-length field, then
/// walks the rebuilt tree once per payload codeword until only the declared
/// padding remains. A container whose header describes a single-leaf tree is
/// rejected as [`SourceError::MalformedHeader`]: no encoder produces one,
/// and its payload codewords would be empty.
pub fn decompress_stream<R: Read, W: Write>(source: R, destination: W) -> Result<(), Error> {
    let mut reader = BufBitReader::new(source).map_err(source_read_error)?;

    let tree = DecodeTree::parse(&mut reader).map_err(|e| match e {
        TreeError::Read(e) => source_read_error(e),
        TreeError::TooDeep => Error::Source(SourceError::MalformedHeader),
    })?;
    if tree.leaves() < 2 {
        return Err(Error::Source(SourceError::MalformedHeader));
    }
    let padding = reader.read_bits(3).map_err(source_read_error)?;
    debug!("decompressing: {} leaves, {padding} padding bits", tree.leaves());

    let mut writer = BufBitWriter::new(destination);
    let mut produced = 0_u64;
    while reader.remaining_bits() > padding {
        let symbol = tree.decode_symbol(&mut reader).map_err(source_read_error)?;
        writer.write_byte(symbol).map_err(Error::Destination)?;
        produced += 1;
    }
    // a mid-codeword exhaustion leaves fewer bits than the declared padding
    if reader.remaining_bits() != padding {
        return Err(Error::Source(SourceError::Truncated));
    }
    debug!("decompressed {produced} symbols");
    writer.flush().map_err(Error::Destination)
}
