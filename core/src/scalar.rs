//! Scalar elements (§3, §4.B): a single value of a fixed-size physical type,
//! stored in a 16-byte buffer (the largest value type, `Complex16`/`Guid`,
//! occupies all of it).

use chrono::{DateTime, Utc};

use crate::codec;
use crate::error::{self, Error};
use crate::identifier::Identifier;
use crate::value_type::PhysicalType;

/// A single typed value, dynamically tagged by its [`PhysicalType`].
///
/// This is the "as value-type" form referred to in §4.B: rather than a
/// boxed `dyn Any`, each physical type has its own narrow variant (§9
/// design note on standardizing to the narrowest exact type per value
/// type).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    /// `Boolean1` value.
    Boolean1(bool),
    /// `Boolean2` value.
    Boolean2(bool),
    /// `Boolean4` value.
    Boolean4(bool),
    /// `Char1` value: one 8-bit ASCII code unit.
    Char1(u8),
    /// `Char2` value: one 16-bit UTF-16LE code unit.
    Char2(u16),
    /// `Integer1` value.
    Integer1(i8),
    /// `Integer2` value.
    Integer2(i16),
    /// `Integer4` value.
    Integer4(i32),
    /// `UnsignedInteger1` value.
    UnsignedInteger1(u8),
    /// `UnsignedInteger2` value.
    UnsignedInteger2(u16),
    /// `UnsignedInteger4` value.
    UnsignedInteger4(u32),
    /// `Real4` value.
    Real4(f32),
    /// `Real8` value.
    Real8(f64),
    /// `Complex8` value (real, imaginary).
    Complex8(f32, f32),
    /// `Complex16` value (real, imaginary).
    Complex16(f64, f64),
    /// `Timestamp` value.
    Timestamp(DateTime<Utc>),
    /// `Guid` value.
    Guid(Identifier),
}

impl ScalarValue {
    /// The [`PhysicalType`] this value is tagged with.
    pub fn value_type(&self) -> PhysicalType {
        match self {
            ScalarValue::Boolean1(_) => PhysicalType::Boolean1,
            ScalarValue::Boolean2(_) => PhysicalType::Boolean2,
            ScalarValue::Boolean4(_) => PhysicalType::Boolean4,
            ScalarValue::Char1(_) => PhysicalType::Char1,
            ScalarValue::Char2(_) => PhysicalType::Char2,
            ScalarValue::Integer1(_) => PhysicalType::Integer1,
            ScalarValue::Integer2(_) => PhysicalType::Integer2,
            ScalarValue::Integer4(_) => PhysicalType::Integer4,
            ScalarValue::UnsignedInteger1(_) => PhysicalType::UnsignedInteger1,
            ScalarValue::UnsignedInteger2(_) => PhysicalType::UnsignedInteger2,
            ScalarValue::UnsignedInteger4(_) => PhysicalType::UnsignedInteger4,
            ScalarValue::Real4(_) => PhysicalType::Real4,
            ScalarValue::Real8(_) => PhysicalType::Real8,
            ScalarValue::Complex8(..) => PhysicalType::Complex8,
            ScalarValue::Complex16(..) => PhysicalType::Complex16,
            ScalarValue::Timestamp(_) => PhysicalType::Timestamp,
            ScalarValue::Guid(_) => PhysicalType::Guid,
        }
    }
}

/// A Scalar element: a tag, a physical type, and the bytes backing a single
/// value of that type.
#[derive(Debug, Clone, PartialEq)]
pub struct Scalar {
    tag: Identifier,
    value_type: PhysicalType,
    buffer: [u8; 16],
}

impl Scalar {
    /// Create a zero-valued scalar of the given type.
    pub fn new(tag: Identifier, value_type: PhysicalType) -> Self {
        Scalar {
            tag,
            value_type,
            buffer: [0u8; 16],
        }
    }

    /// This element's tag.
    pub fn tag(&self) -> Identifier {
        self.tag
    }

    /// This element's physical value type.
    pub fn value_type(&self) -> PhysicalType {
        self.value_type
    }

    /// Copy out exactly `value_type().byte_size()` bytes from the buffer.
    pub fn get_bytes(&self) -> Vec<u8> {
        self.buffer[..self.value_type.byte_size()].to_vec()
    }

    /// Copy `src` into the buffer starting at `offset`, without changing
    /// `value_type`. `src.len() + offset` must not exceed 16.
    pub fn set_bytes(&mut self, src: &[u8], offset: usize) {
        self.buffer[offset..offset + src.len()].copy_from_slice(src);
    }

    /// Decode the buffer according to the element's current `value_type`.
    pub fn get(&self) -> ScalarValue {
        let b = &self.buffer;
        match self.value_type {
            PhysicalType::Boolean1 => ScalarValue::Boolean1(b[0] != 0),
            PhysicalType::Boolean2 => {
                ScalarValue::Boolean2(u16::from_le_bytes(b[0..2].try_into().unwrap()) != 0)
            }
            PhysicalType::Boolean4 => {
                ScalarValue::Boolean4(u32::from_le_bytes(b[0..4].try_into().unwrap()) != 0)
            }
            PhysicalType::Char1 => ScalarValue::Char1(b[0]),
            PhysicalType::Char2 => {
                ScalarValue::Char2(u16::from_le_bytes(b[0..2].try_into().unwrap()))
            }
            PhysicalType::Integer1 => ScalarValue::Integer1(b[0] as i8),
            PhysicalType::Integer2 => {
                ScalarValue::Integer2(i16::from_le_bytes(b[0..2].try_into().unwrap()))
            }
            PhysicalType::Integer4 => {
                ScalarValue::Integer4(i32::from_le_bytes(b[0..4].try_into().unwrap()))
            }
            PhysicalType::UnsignedInteger1 => ScalarValue::UnsignedInteger1(b[0]),
            PhysicalType::UnsignedInteger2 => {
                ScalarValue::UnsignedInteger2(u16::from_le_bytes(b[0..2].try_into().unwrap()))
            }
            PhysicalType::UnsignedInteger4 => {
                ScalarValue::UnsignedInteger4(u32::from_le_bytes(b[0..4].try_into().unwrap()))
            }
            PhysicalType::Real4 => {
                ScalarValue::Real4(f32::from_le_bytes(b[0..4].try_into().unwrap()))
            }
            PhysicalType::Real8 => {
                ScalarValue::Real8(f64::from_le_bytes(b[0..8].try_into().unwrap()))
            }
            PhysicalType::Complex8 => {
                let (re, im) = codec::decode_complex8(&b[0..8].try_into().unwrap());
                ScalarValue::Complex8(re, im)
            }
            PhysicalType::Complex16 => {
                let (re, im) = codec::decode_complex16(b);
                ScalarValue::Complex16(re, im)
            }
            PhysicalType::Timestamp => {
                ScalarValue::Timestamp(codec::decode_timestamp(&b[0..12].try_into().unwrap()))
            }
            PhysicalType::Guid => {
                ScalarValue::Guid(Identifier::from_mixed_endian_bytes(*b))
            }
        }
    }

    /// Overwrite both `value_type` and the buffer from a dynamically typed
    /// value.
    pub fn set(&mut self, value: ScalarValue) {
        self.value_type = value.value_type();
        self.buffer = [0u8; 16];
        match value {
            ScalarValue::Boolean1(v) => self.buffer[0] = v as u8,
            ScalarValue::Boolean2(v) => self.buffer[0..2].copy_from_slice(&(v as u16).to_le_bytes()),
            ScalarValue::Boolean4(v) => self.buffer[0..4].copy_from_slice(&(v as u32).to_le_bytes()),
            ScalarValue::Char1(v) => self.buffer[0] = v,
            ScalarValue::Char2(v) => self.buffer[0..2].copy_from_slice(&v.to_le_bytes()),
            ScalarValue::Integer1(v) => self.buffer[0] = v as u8,
            ScalarValue::Integer2(v) => self.buffer[0..2].copy_from_slice(&v.to_le_bytes()),
            ScalarValue::Integer4(v) => self.buffer[0..4].copy_from_slice(&v.to_le_bytes()),
            ScalarValue::UnsignedInteger1(v) => self.buffer[0] = v,
            ScalarValue::UnsignedInteger2(v) => self.buffer[0..2].copy_from_slice(&v.to_le_bytes()),
            ScalarValue::UnsignedInteger4(v) => self.buffer[0..4].copy_from_slice(&v.to_le_bytes()),
            ScalarValue::Real4(v) => self.buffer[0..4].copy_from_slice(&v.to_le_bytes()),
            ScalarValue::Real8(v) => self.buffer[0..8].copy_from_slice(&v.to_le_bytes()),
            ScalarValue::Complex8(re, im) => {
                self.buffer[0..8].copy_from_slice(&codec::encode_complex8((re, im)))
            }
            ScalarValue::Complex16(re, im) => {
                self.buffer = codec::encode_complex16((re, im))
            }
            ScalarValue::Timestamp(v) => {
                self.buffer[0..12].copy_from_slice(&codec::encode_timestamp(v))
            }
            ScalarValue::Guid(v) => self.buffer = v.to_mixed_endian_bytes(),
        }
    }

    /// Read the value as `UnsignedInteger1`, failing if the element is not
    /// of that type. Deliberately narrow (§9 open question): callers that
    /// need widening do so explicitly at the call site.
    pub fn get_u1(&self) -> Result<u8, Error> {
        match self.get() {
            ScalarValue::UnsignedInteger1(v) => Ok(v),
            _ => error::CastValueSnafu {
                requested: "UnsignedInteger1",
                got: self.value_type,
            }
            .fail(),
        }
    }

    /// Read the value as `Integer4`, failing if the element is not of that
    /// type.
    pub fn get_i4(&self) -> Result<i32, Error> {
        match self.get() {
            ScalarValue::Integer4(v) => Ok(v),
            _ => error::CastValueSnafu {
                requested: "Integer4",
                got: self.value_type,
            }
            .fail(),
        }
    }

    /// Read the value as `UnsignedInteger4`, failing if the element is not
    /// of that type.
    pub fn get_u4(&self) -> Result<u32, Error> {
        match self.get() {
            ScalarValue::UnsignedInteger4(v) => Ok(v),
            _ => error::CastValueSnafu {
                requested: "UnsignedInteger4",
                got: self.value_type,
            }
            .fail(),
        }
    }

    /// Read the value as `Real8`, failing if the element is not of that
    /// type.
    pub fn get_real8(&self) -> Result<f64, Error> {
        match self.get() {
            ScalarValue::Real8(v) => Ok(v),
            _ => error::CastValueSnafu {
                requested: "Real8",
                got: self.value_type,
            }
            .fail(),
        }
    }

    /// Read the value as `Timestamp`, failing if the element is not of
    /// that type.
    pub fn get_timestamp(&self) -> Result<DateTime<Utc>, Error> {
        match self.get() {
            ScalarValue::Timestamp(v) => Ok(v),
            _ => error::CastValueSnafu {
                requested: "Timestamp",
                got: self.value_type,
            }
            .fail(),
        }
    }

    /// Read the value as `Guid`, failing if the element is not of that
    /// type.
    pub fn get_guid(&self) -> Result<Identifier, Error> {
        match self.get() {
            ScalarValue::Guid(v) => Ok(v),
            _ => error::CastValueSnafu {
                requested: "Guid",
                got: self.value_type,
            }
            .fail(),
        }
    }
}
