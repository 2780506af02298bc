//! The element tree (§4.B): the tagged union at the heart of every PQDIF
//! record body.

use crate::collection::Collection;
use crate::identifier::Identifier;
use crate::scalar::Scalar;
use crate::value_type::PhysicalType;
use crate::vector::Vector;

/// Common behavior shared by every element kind.
pub trait Header {
    /// This element's tag.
    fn tag(&self) -> Identifier;
}

/// Placeholder for an element whose kind byte did not match any known
/// variant (1=Collection, 2=Scalar, 3=Vector). The reader preserves the
/// tag and value-type byte it did manage to read (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownElement {
    tag: Identifier,
    raw_value_type: u8,
}

impl UnknownElement {
    /// Build an unknown-kind placeholder.
    pub fn new(tag: Identifier, raw_value_type: u8) -> Self {
        UnknownElement { tag, raw_value_type }
    }

    /// The raw, unrecognized value-type byte.
    pub fn raw_value_type(&self) -> u8 {
        self.raw_value_type
    }
}

/// Placeholder inserted by the reader when an element fails to parse
/// (§4.C, §7). Carries enough of the original header to support diagnosis
/// without aborting the enclosing collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorElement {
    tag: Identifier,
    kind_byte: u8,
    value_type_byte: u8,
    cause: String,
}

impl ErrorElement {
    /// Build an error placeholder from the captured header bytes and a
    /// description of the failure.
    pub fn new(tag: Identifier, kind_byte: u8, value_type_byte: u8, cause: impl Into<String>) -> Self {
        ErrorElement {
            tag,
            kind_byte,
            value_type_byte,
            cause: cause.into(),
        }
    }

    /// The element-kind byte that was in the stream.
    pub fn kind_byte(&self) -> u8 {
        self.kind_byte
    }

    /// The value-type byte that was in the stream.
    pub fn value_type_byte(&self) -> u8 {
        self.value_type_byte
    }

    /// A human-readable description of why parsing failed.
    pub fn cause(&self) -> &str {
        &self.cause
    }
}

/// The tagged union of every element kind that may appear in a PQDIF
/// record body (§3).
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A single typed value.
    Scalar(Scalar),
    /// A homogeneous array of typed values.
    Vector(Vector),
    /// An ordered, tag-addressed list of child elements.
    Collection(Collection),
    /// A reader-only placeholder for an unrecognized element kind.
    Unknown(UnknownElement),
    /// A reader-only placeholder for an element that failed to parse.
    Error(ErrorElement),
}

impl Element {
    /// This element's physical value type, where applicable.
    /// `Collection` has no single value type; `Unknown` only has the raw,
    /// unrecognized byte it was tagged with.
    pub fn value_type(&self) -> Option<PhysicalType> {
        match self {
            Element::Scalar(s) => Some(s.value_type()),
            Element::Vector(v) => Some(v.value_type()),
            Element::Collection(_) => None,
            Element::Unknown(_) => None,
            Element::Error(e) => PhysicalType::from_byte(e.value_type_byte).ok(),
        }
    }

    /// Borrow this element as a [`Scalar`], if it is one.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Element::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Mutably borrow this element as a [`Scalar`], if it is one.
    pub fn as_scalar_mut(&mut self) -> Option<&mut Scalar> {
        match self {
            Element::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow this element as a [`Vector`], if it is one.
    pub fn as_vector(&self) -> Option<&Vector> {
        match self {
            Element::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Mutably borrow this element as a [`Vector`], if it is one.
    pub fn as_vector_mut(&mut self) -> Option<&mut Vector> {
        match self {
            Element::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow this element as a [`Collection`], if it is one.
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Element::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Mutably borrow this element as a [`Collection`], if it is one.
    pub fn as_collection_mut(&mut self) -> Option<&mut Collection> {
        match self {
            Element::Collection(c) => Some(c),
            _ => None,
        }
    }
}

impl Header for Element {
    fn tag(&self) -> Identifier {
        match self {
            Element::Scalar(s) => s.tag(),
            Element::Vector(v) => v.tag(),
            Element::Collection(c) => c.tag(),
            Element::Unknown(u) => u.tag,
            Element::Error(e) => e.tag,
        }
    }
}

impl From<Scalar> for Element {
    fn from(s: Scalar) -> Self {
        Element::Scalar(s)
    }
}

impl From<Vector> for Element {
    fn from(v: Vector) -> Self {
        Element::Vector(v)
    }
}

impl From<Collection> for Element {
    fn from(c: Collection) -> Self {
        Element::Collection(c)
    }
}
