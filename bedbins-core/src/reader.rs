//! Sequential, line-oriented access to interval files.
//!
//! A [`FeatureReader`] owns one input source: a filesystem path (plain or
//! gzip-compressed, detected by magic bytes) or standard input via the `-`
//! or `stdin` tokens. It hands out one parsed [`Feature`] per data line and
//! tracks the 1-based data-line number for diagnostics.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::errors::ReaderError;
use crate::models::{Feature, FileType, LineStatus};
use crate::parser::{self, LineParser, ParserError};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

///
/// Streaming reader over a BED/GFF/VCF file.
///
/// The reader opens its source eagerly, so an unreadable path fails at
/// [`open`](FeatureReader::open) rather than on the first read. Iteration
/// yields every line's record (valid, header, blank, or malformed); end of
/// stream is a plain `None`.
///
pub struct FeatureReader {
    path: Option<PathBuf>,
    stream: Option<BufReader<Box<dyn Read>>>,
    parser: LineParser,
    line_num: u64,
    gzipped: bool,
}

impl FeatureReader {
    ///
    /// Open a reader over a path, or over standard input for `-`/`stdin`.
    ///
    /// Gzip input is detected from the two magic bytes and decompressed
    /// transparently. A `.gz` extension without the magic is rejected here,
    /// never deferred to the first read.
    ///
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReaderError> {
        let path = path.as_ref();

        if path == Path::new("-") || path == Path::new("stdin") {
            return Ok(FeatureReader {
                path: None,
                stream: Some(BufReader::new(Box::new(std::io::stdin()) as Box<dyn Read>)),
                parser: LineParser::new(),
                line_num: 0,
                gzipped: false,
            });
        }

        let gzipped = Self::sniff_gzip(path)?;
        let stream = Self::open_stream(path, gzipped)?;
        Ok(FeatureReader {
            path: Some(path.to_path_buf()),
            stream: Some(stream),
            parser: LineParser::new(),
            line_num: 0,
            gzipped,
        })
    }

    ///
    /// Read and parse the next line.
    ///
    /// `Ok(None)` means the stream is exhausted (or was closed); a malformed
    /// line is an ordinary `Ok(Some(feature))` whose status says what went
    /// wrong. Only stream-level failures (I/O, SAM-like input) are errors.
    ///
    pub fn next_feature(&mut self) -> Result<Option<Feature>, ReaderError> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };

        let mut line = String::new();
        if stream.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_num += 1;

        let fields = parser::tokenize(&line);
        let feature = self.parser.parse_line(fields).map_err(|err| match err {
            ParserError::UnsupportedFormat => ReaderError::UnsupportedFormat {
                line: self.line_num,
            },
        })?;

        // headers don't count toward the data-line numbering used in
        // diagnostics
        if feature.status == LineStatus::Header {
            self.line_num = self.line_num.saturating_sub(1);
        }
        Ok(Some(feature))
    }

    /// 1-based data-line number of the most recently returned record.
    pub fn line_number(&self) -> u64 {
        self.line_num
    }

    /// The format established for this stream so far.
    pub fn file_type(&self) -> FileType {
        self.parser.file_type()
    }

    ///
    /// Reposition the reader at byte 0.
    ///
    /// The source is reopened, which also works for gzip input. The
    /// established format and column count survive a rewind; only the line
    /// counter resets. Standard input cannot rewind.
    ///
    pub fn rewind(&mut self) -> Result<(), ReaderError> {
        let Some(path) = self.path.clone() else {
            return Err(ReaderError::UnseekableSource);
        };
        self.stream = Some(Self::open_stream(&path, self.gzipped)?);
        self.line_num = 0;
        Ok(())
    }

    ///
    /// Jump to an arbitrary byte offset in a plain file.
    ///
    /// Not supported for gzip input or standard input: a byte offset into a
    /// compressed stream does not correspond to a line boundary.
    ///
    pub fn seek(&mut self, offset: u64) -> Result<(), ReaderError> {
        let Some(path) = self.path.clone() else {
            return Err(ReaderError::UnseekableSource);
        };
        if self.gzipped {
            return Err(ReaderError::UnseekableSource);
        }
        let mut file = File::open(&path).map_err(|source| ReaderError::Open {
            path: path.clone(),
            source,
        })?;
        file.seek(SeekFrom::Start(offset))?;
        self.stream = Some(BufReader::new(Box::new(file) as Box<dyn Read>));
        Ok(())
    }

    ///
    /// Release the underlying handle. Safe to call more than once, and a
    /// no-op for standard input beyond dropping the buffered wrapper.
    ///
    pub fn close(&mut self) {
        self.stream = None;
    }

    fn open_stream(path: &Path, gzipped: bool) -> Result<BufReader<Box<dyn Read>>, ReaderError> {
        let file = File::open(path).map_err(|source| ReaderError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let inner: Box<dyn Read> = if gzipped {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(BufReader::new(inner))
    }

    /// Decide compression from the magic bytes; a `.gz` name that doesn't
    /// carry them is an error rather than garbage lines later.
    fn sniff_gzip(path: &Path) -> Result<bool, ReaderError> {
        let mut file = File::open(path).map_err(|source| ReaderError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut magic = [0u8; 2];
        let mut read = 0;
        while read < magic.len() {
            match file.read(&mut magic[read..])? {
                0 => break,
                n => read += n,
            }
        }
        let is_gzip = read == magic.len() && magic == GZIP_MAGIC;

        let claims_gzip = path.extension().is_some_and(|ext| ext == "gz");
        if claims_gzip && !is_gzip {
            return Err(ReaderError::UnrecognizedCompression {
                path: path.to_path_buf(),
            });
        }
        Ok(is_gzip)
    }
}

impl Iterator for FeatureReader {
    type Item = Result<Feature, ReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_feature().transpose()
    }
}
