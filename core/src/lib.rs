//! Core data types for reading and writing Power Quality Data Interchange
//! Format (PQDIF, IEEE 1159.3-2003) files.
//!
//! This crate provides the primitive codec (§4.A of the design), the
//! element tree (§4.B) and the crate-wide error type. It has no notion of
//! records, streams, or the logical record types built on top of the
//! element tree — those live in `pqdif-parser` and `pqdif-object`
//! respectively.

pub mod codec;
pub mod collection;
pub mod element;
pub mod error;
pub mod identifier;
pub mod scalar;
pub mod value_type;
pub mod vector;

pub use collection::Collection;
pub use element::{Element, ErrorElement, Header, UnknownElement};
pub use error::{Error, Result};
pub use identifier::Identifier;
pub use scalar::{Scalar, ScalarValue};
pub use value_type::PhysicalType;
pub use vector::Vector;

/// Re-exports the types most commonly needed to work with this crate.
pub mod prelude {
    pub use crate::{Collection, Element, Error, Header, Identifier, PhysicalType, Result, Scalar, ScalarValue, Vector};
}
