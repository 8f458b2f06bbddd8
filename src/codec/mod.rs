/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

The container codec: two-phase compression and stateless decompression.

[`HuffmanCode`] is the result of the encode phase (frequency scan, tree
construction, code-table derivation with header capture, statistics); only a
value of that type can run the compress phase, so the phase ordering is
enforced structurally. [`decompress_path`] and [`decompress_stream`] need no
prior state: the container's in-band header is all they read.

Every failure surfaces synchronously as an [`Error`]; nothing is retried and
no partial success goes unreported.

*/

use std::io;
use thiserror::Error;

mod symbols;
pub use symbols::*;

mod compress;
pub use compress::*;

mod decompress;
pub use decompress::*;

/// Top-level error taxonomy of the codec.
#[derive(Debug, Error)]
pub enum Error {
    /// The source of an encode or compress phase cannot be opened or read.
    #[error("cannot open source")]
    FileOpen(#[source] io::Error),
    /// The source material itself is unusable: degenerate alphabet on the
    /// encoding side, or a broken container on the decoding side.
    #[error("source error")]
    Source(#[from] SourceError),
    /// The destination cannot be created or written.
    #[error("cannot create or write destination")]
    Destination(#[source] io::Error),
}

/// Detail for [`Error::Source`].
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Degenerate(#[from] crate::codes::BuildError),
    /// The source handed to the compress phase contains a byte that was not
    /// present when the code table was built.
    #[error("symbol {0:#04x} has no assigned code")]
    UnknownSymbol(u8),
    /// The container ended before the padding boundary implied by its own
    /// padding-length field.
    #[error("compressed stream truncated")]
    Truncated,
    /// The container's tree header cannot describe a usable code tree.
    #[error("malformed tree header")]
    MalformedHeader,
    /// An I/O failure while opening or reading the container.
    #[error("cannot read source")]
    Io(#[source] io::Error),
}

/// Classify an I/O error on the decode-side source: running out of bytes is
/// a structural container fault, anything else is plain I/O.
fn source_read_error(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::Source(SourceError::Truncated)
    } else {
        Error::Source(SourceError::Io(e))
    }
}
