use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a single line failed structural validation.
///
/// A malformed line is a per-line, recoverable condition: the stream keeps
/// going and the caller decides whether to skip, log, or halt. The variants
/// keep the "suspiciously few tokens" and "wrong column count" cases apart
/// so diagnostics can say which one happened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedKind {
    /// Exactly one token on the line; the input is probably not tab-delimited.
    #[error("only one field detected; verify that the input is tab-delimited")]
    SingleToken,

    /// The token count does not match what the first data line established.
    #[error("expected {expected} fields but found {found}")]
    FieldCountMismatch { expected: u16, found: u16 },

    /// A coordinate column did not hold a parseable non-negative integer.
    #[error("coordinate is not a non-negative integer")]
    BadCoordinate,

    /// Start was greater than end after coordinate normalization.
    #[error("start is greater than end")]
    ReversedCoordinates,

    /// The first data line matched none of the BED/VCF/GFF layouts.
    #[error("unrecognized line layout; expected tab-delimited BED, GFF, or VCF")]
    UnknownFormat,
}

/// Errors raised while opening or consuming an interval file.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// The path could not be opened at all.
    #[error("cannot open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file carries a `.gz` extension but does not start with the gzip magic.
    #[error("unrecognized compression in {path:?}; expected gzip")]
    UnrecognizedCompression { path: PathBuf },

    /// The stream looks like SAM/BAM, which this reader does not parse.
    #[error("unsupported format at data line {line}: input looks like SAM; convert to BED, GFF, or VCF first")]
    UnsupportedFormat { line: u64 },

    /// Rewind/seek was requested on a source that cannot honor it.
    #[error("source does not support seeking")]
    UnseekableSource,

    #[error(transparent)]
    Io(#[from] io::Error),
}
