//! The physical reader: record iteration over a readable, seekable byte
//! source (§4.C).

mod element;

pub use element::{collect_errors, ParseState};

use std::collections::HashSet;
use std::io::{Read, Seek, SeekFrom};

use flate2::read::ZlibDecoder;
use pqdif_core::codec::adler32;
use tracing::{debug, trace, warn};

use crate::error::{IoSnafu, Result, UnsupportedCompressionSnafu};
use crate::record::{CompressionAlgorithm, CompressionStyle, Record, RecordHeader};
use snafu::ResultExt;

/// Knobs for a [`PhysicalReader`], mirroring the configuration surface a
/// caller needs before the first record is read (§4.J, §7).
#[derive(Debug, Clone, Copy)]
pub struct PhysicalReaderOptions {
    /// Maximum number of recoverable structural errors tolerated across the
    /// whole stream before iteration halts as if EOF were reached. A
    /// negative value disables the budget (§4.C, §7).
    pub error_budget: i64,
}

impl Default for PhysicalReaderOptions {
    fn default() -> Self {
        PhysicalReaderOptions { error_budget: 100 }
    }
}

/// Iterates the records of a PQDIF byte stream, applying record-level
/// compression and accumulating structural-error budget across records.
pub struct PhysicalReader<R> {
    inner: R,
    options: PhysicalReaderOptions,
    stream_len: u64,
    current_position: u64,
    visited: HashSet<u64>,
    done: bool,
    compression_algorithm: CompressionAlgorithm,
    compression_style: CompressionStyle,
    parse_state: ParseState,
}

impl<R: Read + Seek> PhysicalReader<R> {
    /// Wrap a stream for record-by-record reading, starting at its current
    /// position (normally offset 0).
    pub fn new(mut inner: R, options: PhysicalReaderOptions) -> Result<Self> {
        let start = inner.stream_position().context(IoSnafu)?;
        let stream_len = inner.seek(SeekFrom::End(0)).context(IoSnafu)?;
        inner.seek(SeekFrom::Start(start)).context(IoSnafu)?;
        let parse_state = ParseState::new(0, options.error_budget);
        let mut visited = HashSet::new();
        visited.insert(start);
        Ok(PhysicalReader {
            inner,
            options,
            stream_len,
            current_position: start,
            visited,
            done: false,
            compression_algorithm: CompressionAlgorithm::None,
            compression_style: CompressionStyle::None,
            parse_state,
        })
    }

    /// The options this reader was constructed with.
    pub fn options(&self) -> PhysicalReaderOptions {
        self.options
    }

    /// Set the sticky record-level compression in effect for records read
    /// from this point on (§4.C: initialized by the logical sequencer from
    /// the Container record before subsequent records are parsed).
    pub fn set_compression(&mut self, algorithm: CompressionAlgorithm, style: CompressionStyle) {
        self.compression_algorithm = algorithm;
        self.compression_style = style;
    }

    /// Total recoverable structural errors accumulated across every record
    /// read so far (§7's "observable list", realized here as a count; the
    /// individual placeholders are still visible via [`collect_errors`] on
    /// each record's root).
    pub fn error_count(&self) -> usize {
        self.parse_state.error_count()
    }

    /// Reposition to the start of the stream, as `reset` does in the
    /// reference protocol (§5).
    pub fn reset(&mut self) -> Result<()> {
        self.inner.seek(SeekFrom::Start(0)).context(IoSnafu)?;
        self.current_position = 0;
        self.visited.clear();
        self.done = false;
        Ok(())
    }

    /// Recover the wrapped stream. Only meaningful once iteration is done;
    /// the reader is consumed either way.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn read_one(&mut self) -> Result<Record> {
        let position = self.current_position;
        self.inner.seek(SeekFrom::Start(position)).context(IoSnafu)?;

        let header = RecordHeader::read_from(&mut self.inner)?;
        debug!(position, record_type = %header.record_type, body_size = header.body_size, "read record header");

        if header.header_size != 64 {
            // §9 open question: we choose to read on rather than reject.
            warn!(got = header.header_size, "unexpected header_size, continuing");
        }

        let mut body = vec![0u8; header.body_size.max(0) as usize];
        self.inner.read_exact(&mut body).context(IoSnafu)?;

        let computed_checksum = adler32(&body);
        if computed_checksum != header.checksum {
            warn!(
                expected = header.checksum,
                computed = computed_checksum,
                "record body checksum mismatch"
            );
        }

        let body = self.decompress(body)?;

        self.parse_state.set_body_len(body.len() as u64);
        let root = element::parse_body(body, header.record_type, &mut self.parse_state).context(IoSnafu)?;

        let errors = collect_errors(&root);
        if !errors.is_empty() {
            trace!(count = errors.len(), "recovered structural errors in record body");
        }

        let next_pos = header.next_record_position;
        let advance = next_pos > 0
            && (next_pos as u64) < self.stream_len
            && !self.visited.contains(&(next_pos as u64))
            && !self.parse_state.budget_exceeded();

        if advance {
            self.visited.insert(next_pos as u64);
            self.current_position = next_pos as u64;
        } else {
            self.done = true;
        }

        Ok(Record::new(header, root, computed_checksum))
    }

    fn decompress(&self, body: Vec<u8>) -> Result<Vec<u8>> {
        match (self.compression_algorithm, self.compression_style) {
            (CompressionAlgorithm::None, _) | (_, CompressionStyle::None) => Ok(body),
            (CompressionAlgorithm::Zlib, CompressionStyle::RecordLevel) => {
                let mut decoder = ZlibDecoder::new(&body[..]);
                let mut out = Vec::new();
                decoder.read_to_end(&mut out).context(crate::error::InflateSnafu)?;
                Ok(out)
            }
            (algorithm, style) => UnsupportedCompressionSnafu { algorithm, style }.fail(),
        }
    }
}

impl<R: Read + Seek> Iterator for PhysicalReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.current_position >= self.stream_len {
            self.done = true;
            return None;
        }
        match self.read_one() {
            Ok(record) => Some(Ok(record)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
