//! Crate-level error types.

use snafu::{Backtrace, Snafu};

/// Type alias for a result from this crate.
pub type Result<T, E = Error> = ::std::result::Result<T, E>;

/// Errors that can terminate a physical read or write outright. Per the
/// design's §7 taxonomy, stream errors and protocol errors (unsupported
/// compression) are fatal; structural errors inside an element tree are
/// instead captured as `Element::Error` nodes and never surface here.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// An I/O failure while reading or writing the underlying stream.
    #[snafu(display("I/O error"))]
    Io {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The Container declared `CompressionAlgorithm::TotalFile` or
    /// `CompressionStyle::Pkzip`/`TotalFile`, which this codec does not
    /// implement (§1 non-goals, §7 protocol errors).
    #[snafu(display("unsupported compression combination: algorithm={algorithm:?}, style={style:?}"))]
    UnsupportedCompression {
        /// The declared compression algorithm.
        algorithm: crate::record::CompressionAlgorithm,
        /// The declared compression style.
        style: crate::record::CompressionStyle,
    },

    /// zlib inflation of a record body failed.
    #[snafu(display("failed to inflate record body"))]
    Inflate {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// zlib deflation of a record body failed.
    #[snafu(display("failed to deflate record body"))]
    Deflate {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// An element-tree error surfaced from `pqdif-core` while building a
    /// value the writer cannot legally serialize (§4.D: the writer never
    /// produces corrupt output).
    #[snafu(display("cannot write element tree"))]
    Core {
        #[snafu(backtrace)]
        source: pqdif_core::Error,
    },

    /// The writer was asked to serialize a non-scalar element marked
    /// embedded, or a Scalar/Vector with an unrecognized value type
    /// (§4.D).
    #[snafu(display("{message}"))]
    Structural {
        /// Description of the structural problem.
        message: String,
    },
}

impl From<pqdif_core::Error> for Error {
    fn from(source: pqdif_core::Error) -> Self {
        Error::Core { source }
    }
}
