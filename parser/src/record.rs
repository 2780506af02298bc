//! The physical record: a 64-byte header (§3, §6) plus a body that decodes
//! to a root [`Collection`](pqdif_core::Collection).

use std::io::{Read, Write};

use pqdif_core::{Collection, Identifier};
use snafu::ResultExt;

use crate::error::{IoSnafu, Result};

/// Record-level body compression algorithm, carried by the Container
/// record's `CompressionAlgorithm` child and sticky for the rest of the
/// parser instance (§4.C, §4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    /// No compression.
    None,
    /// zlib (RFC 1950) compression of the body bytes.
    Zlib,
    /// Whole-file compression. Explicitly unsupported (§1, §7).
    TotalFile,
    /// PKZIP compression. Explicitly unsupported (§1, §7).
    Pkzip,
}

impl CompressionAlgorithm {
    /// Map from the `CompressionAlgorithm` element's stored integer value.
    pub fn from_u32(v: u32) -> Self {
        match v {
            1 => CompressionAlgorithm::Zlib,
            2 => CompressionAlgorithm::TotalFile,
            3 => CompressionAlgorithm::Pkzip,
            _ => CompressionAlgorithm::None,
        }
    }

    /// The integer value stored in the `CompressionAlgorithm` element.
    pub fn to_u32(self) -> u32 {
        match self {
            CompressionAlgorithm::None => 0,
            CompressionAlgorithm::Zlib => 1,
            CompressionAlgorithm::TotalFile => 2,
            CompressionAlgorithm::Pkzip => 3,
        }
    }
}

/// Which records in the file are compressed (§4.C, §4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionStyle {
    /// No records are compressed.
    None,
    /// Every record after the Container is compressed individually.
    RecordLevel,
    /// The file as a whole is compressed. Explicitly unsupported (§1, §7).
    TotalFile,
}

impl CompressionStyle {
    /// Map from the `CompressionStyle` element's stored integer value.
    pub fn from_u32(v: u32) -> Self {
        match v {
            1 => CompressionStyle::RecordLevel,
            2 => CompressionStyle::TotalFile,
            _ => CompressionStyle::None,
        }
    }

    /// The integer value stored in the `CompressionStyle` element.
    pub fn to_u32(self) -> u32 {
        match self {
            CompressionStyle::None => 0,
            CompressionStyle::RecordLevel => 1,
            CompressionStyle::TotalFile => 2,
        }
    }
}

/// The fixed 64-byte record header (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Constant per file; identifies the file as PQDIF.
    pub record_signature: Identifier,
    /// The tag naming this record's logical type (Container, DataSource, …).
    pub record_type: Identifier,
    /// Always 64 on write; read verbatim (§9 open question).
    pub header_size: i32,
    /// Size of the on-disk body, in bytes (post-compression, if any).
    pub body_size: i32,
    /// Absolute file offset of the next record, or 0 for the last record.
    pub next_record_position: i32,
    /// Adler-32 checksum of the on-disk body bytes.
    pub checksum: u32,
}

/// On-disk size of a [`RecordHeader`].
pub const HEADER_SIZE: usize = 64;

impl RecordHeader {
    /// Read a 64-byte header from the stream at its current position.
    pub fn read_from(mut r: impl Read) -> Result<Self> {
        let mut buf = [0u8; HEADER_SIZE];
        r.read_exact(&mut buf).context(IoSnafu)?;

        let record_signature =
            Identifier::from_mixed_endian_bytes(buf[0..16].try_into().unwrap());
        let record_type = Identifier::from_mixed_endian_bytes(buf[16..32].try_into().unwrap());
        let header_size = i32::from_le_bytes(buf[32..36].try_into().unwrap());
        let body_size = i32::from_le_bytes(buf[36..40].try_into().unwrap());
        let next_record_position = i32::from_le_bytes(buf[40..44].try_into().unwrap());
        let checksum = u32::from_le_bytes(buf[44..48].try_into().unwrap());
        // buf[48..64] is the reserved block; always zero on write, ignored on read.

        Ok(RecordHeader {
            record_signature,
            record_type,
            header_size,
            body_size,
            next_record_position,
            checksum,
        })
    }

    /// Write the 64-byte header in the exact field order of §3/§6.
    pub fn write_to(&self, mut w: impl Write) -> Result<()> {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..16].copy_from_slice(&self.record_signature.to_mixed_endian_bytes());
        buf[16..32].copy_from_slice(&self.record_type.to_mixed_endian_bytes());
        buf[32..36].copy_from_slice(&self.header_size.to_le_bytes());
        buf[36..40].copy_from_slice(&self.body_size.to_le_bytes());
        buf[40..44].copy_from_slice(&self.next_record_position.to_le_bytes());
        buf[44..48].copy_from_slice(&self.checksum.to_le_bytes());
        // buf[48..64] stays zero: the 16 reserved bytes.
        w.write_all(&buf).context(IoSnafu)?;
        Ok(())
    }
}

/// A fully parsed physical record: its header plus the root collection its
/// body decoded to.
#[derive(Debug, Clone)]
pub struct Record {
    header: RecordHeader,
    root: Collection,
    computed_checksum: u32,
}

impl Record {
    /// Build a record from its parts. Used by both the reader (with a
    /// checksum computed from the on-disk bytes) and the writer.
    pub fn new(header: RecordHeader, root: Collection, computed_checksum: u32) -> Self {
        Record {
            header,
            root,
            computed_checksum,
        }
    }

    /// The record's header, as read from (or about to be written to) disk.
    pub fn header(&self) -> &RecordHeader {
        &self.header
    }

    /// The record body's root collection.
    pub fn root(&self) -> &Collection {
        &self.root
    }

    /// Mutably borrow the root collection.
    pub fn root_mut(&mut self) -> &mut Collection {
        &mut self.root
    }

    /// Consume the record, returning its root collection.
    pub fn into_root(self) -> Collection {
        self.root
    }

    /// The Adler-32 checksum computed over the on-disk body bytes this
    /// record was read from (or written with).
    pub fn computed_checksum(&self) -> u32 {
        self.computed_checksum
    }

    /// Whether `header.checksum` matches the bytes actually on disk
    /// (§4.C step 3, §8 scenario 4). A mismatch is never fatal by itself —
    /// callers decide what to do with it.
    pub fn checksum_ok(&self) -> bool {
        self.header.checksum == self.computed_checksum
    }
}
