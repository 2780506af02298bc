//! Crate-level error types.

use snafu::Snafu;

use crate::identifier::Identifier;
use crate::value_type::PhysicalType;

/// Type alias for a result from this crate.
pub type Result<T, E = Error> = ::std::result::Result<T, E>;

/// The main data type for errors raised while building or reading element
/// trees, independently of any byte stream.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// A value-type byte did not match any known [`PhysicalType`] variant.
    #[snafu(display("unrecognized physical value type byte {byte:#04x}"))]
    UnknownPhysicalType {
        /// The unrecognized byte.
        byte: u8,
    },

    /// An element kind byte did not match Collection(1)/Scalar(2)/Vector(3).
    #[snafu(display("unrecognized element kind byte {byte:#04x}"))]
    UnknownElementKind {
        /// The unrecognized byte.
        byte: u8,
    },

    /// A scalar or vector buffer did not have the length its value type demands.
    #[snafu(display(
        "invalid buffer length for {value_type:?}: expected {expected} bytes, got {got}"
    ))]
    InvalidBufferLength {
        /// The value type the buffer is supposed to hold.
        value_type: PhysicalType,
        /// The expected byte length.
        expected: usize,
        /// The actual byte length.
        got: usize,
    },

    /// An accessor requested a value in a format incompatible with the
    /// element's actual [`PhysicalType`].
    #[snafu(display("cannot read {requested} out of a value of type {got:?}"))]
    CastValue {
        /// The representation that was requested.
        requested: &'static str,
        /// The value's actual type.
        got: PhysicalType,
    },

    /// A Char2 buffer did not contain well-formed UTF-16.
    #[snafu(display("invalid UTF-16 in Char2 value"))]
    InvalidUtf16,

    /// A timestamp's day component could not be represented.
    #[snafu(display("timestamp day offset out of range: {days}"))]
    TimestampOutOfRange {
        /// The offending day count.
        days: i64,
    },

    /// A typed accessor demanded a required child element that was absent.
    #[snafu(display("required element {tag} is missing"))]
    MissingElement {
        /// The tag that was looked up.
        tag: Identifier,
    },

    /// A Scalar was marked embedded but its value type does not fit in the
    /// 8-byte inline payload area (§4.C, §4.D).
    #[snafu(display("value type {value_type:?} ({size} bytes) cannot be embedded"))]
    NotEmbeddable {
        /// The value type that was rejected.
        value_type: PhysicalType,
        /// Its byte size.
        size: usize,
    },
}
