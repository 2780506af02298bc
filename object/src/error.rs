//! Crate-level error types (§7, §4.H): protocol errors from the logical
//! sequencer and semantic-absence errors from the typed views are read-side
//! ([`ReadError`]); failures serializing logical records through the
//! physical writer are write-side ([`WriteError`]), following the teacher's
//! `ReadError`/`WriteError` split.

use snafu::Snafu;

use pqdif_core::Identifier;

/// Type alias for a read-side result from this crate.
pub type Result<T, E = ReadError> = ::std::result::Result<T, E>;

/// Type alias for a write-side result from this crate.
pub type WriteResult<T, E = WriteError> = ::std::result::Result<T, E>;

/// An error which may occur while sequencing or interpreting a PQDIF record
/// stream (§7).
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ReadError {
    /// The physical reader produced a fatal error before the sequencer
    /// could interpret the record stream.
    #[snafu(display("physical read failed"))]
    Physical {
        #[snafu(backtrace)]
        source: pqdif_parser::Error,
    },

    /// The stream contained no records at all.
    #[snafu(display("stream is empty, expected a leading Container record"))]
    EmptyStream,

    /// The first record in the stream was not a Container (§4.E).
    #[snafu(display("first record has type {got}, expected Container"))]
    MissingContainer { got: Identifier },

    /// A second Container record was encountered mid-stream (§4.E, §7).
    #[snafu(display("duplicate Container record encountered mid-stream"))]
    DuplicateContainer,

    /// An Observation record was yielded before any DataSource record had
    /// been seen (§4.E, §7).
    #[snafu(display("Observation record encountered before any DataSource record"))]
    ObservationWithoutDataSource,

    /// A record's body failed to parse as the collection a semantic view
    /// expected.
    #[snafu(display("element tree error"))]
    Core {
        #[snafu(backtrace)]
        source: pqdif_core::Error,
    },

    /// A typed accessor demanded a required child element that was
    /// missing or of the wrong kind (§7 "semantic absence").
    #[snafu(display("required element {tag} is missing or of the wrong kind on {record}"))]
    MissingField {
        /// The logical record type the accessor was reading.
        record: &'static str,
        /// The tag that was looked up.
        tag: Identifier,
    },

    /// A series referenced another series for scale/offset/values via
    /// `SeriesShareIndex`, and following that chain never reached a
    /// series with its own data (§9: a hardening choice beyond the
    /// reference behavior, which does not detect such cycles).
    #[snafu(display("series-share chain starting at index {start} does not terminate"))]
    SeriesShareCycle {
        /// The index the lookup started from.
        start: usize,
    },
}

impl From<pqdif_parser::Error> for ReadError {
    fn from(source: pqdif_parser::Error) -> Self {
        ReadError::Physical { source }
    }
}

impl From<pqdif_core::Error> for ReadError {
    fn from(source: pqdif_core::Error) -> Self {
        ReadError::Core { source }
    }
}

/// An error which may occur while serializing logical records through the
/// physical writer (§4.D, §7).
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum WriteError {
    /// The physical writer failed to serialize or emit a record.
    #[snafu(display("physical write failed"))]
    PhysicalWrite {
        #[snafu(backtrace)]
        source: pqdif_parser::Error,
    },
}

impl From<pqdif_parser::Error> for WriteError {
    fn from(source: pqdif_parser::Error) -> Self {
        WriteError::PhysicalWrite { source }
    }
}
