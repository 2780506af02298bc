//! The physical writer: one record at a time, with the on-disk
//! record-chain `next_record_position` field patched retroactively once
//! the following record's start offset is known (§4.D).

mod element;

use std::io::{Seek, SeekFrom, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use pqdif_core::codec::adler32;
use pqdif_core::{Collection, Identifier};
use snafu::ResultExt;
use tracing::debug;

use crate::error::{DeflateSnafu, IoSnafu, Result};
use crate::record::{CompressionAlgorithm, CompressionStyle, RecordHeader, HEADER_SIZE};

/// Offset, within a written 64-byte header, of the `next_record_position`
/// field (§6).
const NEXT_RECORD_POSITION_OFFSET: u64 = 40;

/// Knobs for a [`PhysicalWriter`] (§4.J).
#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicalWriterOptions {
    /// Record-level compression to apply to every body written from this
    /// point on. `None` disables it.
    pub compression: Option<(CompressionAlgorithm, CompressionStyle)>,
}

/// Serializes records one at a time to a writable, seekable stream.
pub struct PhysicalWriter<W> {
    inner: W,
    options: PhysicalWriterOptions,
    pending_next_pos_field: Option<u64>,
}

impl<W: Write + Seek> PhysicalWriter<W> {
    /// Wrap a stream for record-by-record writing, starting at its current
    /// position (normally offset 0, for a fresh file).
    pub fn new(inner: W, options: PhysicalWriterOptions) -> Self {
        PhysicalWriter {
            inner,
            options,
            pending_next_pos_field: None,
        }
    }

    /// Serialize and write one record. Each call assumes it may be
    /// followed by another; the previous record's `next_record_position`
    /// is patched to point here before this record's header is emitted.
    /// The last record written keeps `next_record_position == 0` unless a
    /// further record follows it.
    pub fn write_record(&mut self, record_signature: Identifier, record_type: Identifier, root: &Collection) -> Result<()> {
        let mut body = Vec::new();
        element::serialize_collection_into(root, 0, &mut body)?;

        if let Some((algorithm, style)) = self.options.compression {
            body = self.compress(algorithm, style, body)?;
        }

        let checksum = adler32(&body);
        let position = self.inner.stream_position().context(IoSnafu)?;

        if let Some(field_offset) = self.pending_next_pos_field.take() {
            self.inner.seek(SeekFrom::Start(field_offset)).context(IoSnafu)?;
            self.inner.write_all(&(position as i32).to_le_bytes()).context(IoSnafu)?;
            self.inner.seek(SeekFrom::Start(position)).context(IoSnafu)?;
        }

        let header = RecordHeader {
            record_signature,
            record_type,
            header_size: HEADER_SIZE as i32,
            body_size: body.len() as i32,
            next_record_position: 0,
            checksum,
        };
        debug!(position, %record_type, body_size = header.body_size, "writing record header");
        header.write_to(&mut self.inner)?;
        self.inner.write_all(&body).context(IoSnafu)?;

        self.pending_next_pos_field = Some(position + NEXT_RECORD_POSITION_OFFSET);
        Ok(())
    }

    fn compress(&self, algorithm: CompressionAlgorithm, style: CompressionStyle, body: Vec<u8>) -> Result<Vec<u8>> {
        match (algorithm, style) {
            (CompressionAlgorithm::None, _) | (_, CompressionStyle::None) => Ok(body),
            (CompressionAlgorithm::Zlib, CompressionStyle::RecordLevel) => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&body).context(DeflateSnafu)?;
                encoder.finish().context(DeflateSnafu)
            }
            (algorithm, style) => crate::error::UnsupportedCompressionSnafu { algorithm, style }.fail(),
        }
    }

    /// Flush and recover the wrapped stream.
    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush().context(IoSnafu)?;
        Ok(self.inner)
    }
}
