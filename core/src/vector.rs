//! Vector elements (§3, §4.B): a homogeneous, fixed-length array of values
//! of one physical type.

use crate::codec;
use crate::error::{self, Error};
use crate::identifier::Identifier;
use crate::scalar::ScalarValue;
use crate::value_type::PhysicalType;

/// A Vector element: `size` values of `value_type`, back by a
/// `size * value_type.byte_size()` byte buffer, little-endian on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    tag: Identifier,
    value_type: PhysicalType,
    size: usize,
    buffer: Vec<u8>,
}

impl Vector {
    /// Create an empty (`size == 0`) vector of the given type.
    pub fn new(tag: Identifier, value_type: PhysicalType) -> Self {
        Vector {
            tag,
            value_type,
            size: 0,
            buffer: Vec::new(),
        }
    }

    /// Construct a vector directly from a raw little-endian byte buffer
    /// whose length must equal `size * value_type.byte_size()`.
    pub fn from_raw_parts(
        tag: Identifier,
        value_type: PhysicalType,
        size: usize,
        buffer: Vec<u8>,
    ) -> Result<Self, Error> {
        let expected = size * value_type.byte_size();
        if buffer.len() != expected {
            return error::InvalidBufferLengthSnafu {
                value_type,
                expected,
                got: buffer.len(),
            }
            .fail();
        }
        Ok(Vector {
            tag,
            value_type,
            size,
            buffer,
        })
    }

    /// This element's tag.
    pub fn tag(&self) -> Identifier {
        self.tag
    }

    /// This element's physical value type.
    pub fn value_type(&self) -> PhysicalType {
        self.value_type
    }

    /// Number of values held.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the vector holds no values.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The raw backing bytes, `size * value_type.byte_size()` long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Resize the vector to `size` elements, reallocating the backing
    /// buffer and zero-filling any new space.
    pub fn resize(&mut self, size: usize) {
        self.size = size;
        self.buffer.resize(size * self.value_type.byte_size(), 0);
    }

    /// Change the value type, reallocating the backing buffer to match the
    /// current element count at the new type's size.
    pub fn set_value_type(&mut self, value_type: PhysicalType) {
        self.value_type = value_type;
        self.buffer.resize(self.size * value_type.byte_size(), 0);
    }

    fn slot(&self, index: usize) -> &[u8] {
        let unit = self.value_type.byte_size();
        &self.buffer[index * unit..(index + 1) * unit]
    }

    fn slot_mut(&mut self, index: usize) -> &mut [u8] {
        let unit = self.value_type.byte_size();
        &mut self.buffer[index * unit..(index + 1) * unit]
    }

    /// Decode element `index`, interpreting the backing bytes according to
    /// `value_type`. Complex types occupy one vector slot but two
    /// primitive lanes, per §3.
    pub fn get(&self, index: usize) -> ScalarValue {
        let b = self.slot(index);
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
                let (re, im) = codec::decode_complex16(&b[0..16].try_into().unwrap());
                ScalarValue::Complex16(re, im)
            }
            PhysicalType::Timestamp => {
                ScalarValue::Timestamp(codec::decode_timestamp(&b[0..12].try_into().unwrap()))
            }
            PhysicalType::Guid => {
                ScalarValue::Guid(Identifier::from_mixed_endian_bytes(b.try_into().unwrap()))
            }
        }
    }

    /// Encode `value` into slot `index`. Panics (via slicing) if `value`'s
    /// type does not match `self.value_type()`'s byte size — callers
    /// should only ever construct vectors with `ScalarValue`s of the
    /// declared type.
    pub fn set(&mut self, index: usize, value: ScalarValue) {
        let unit_bytes = self.value_type.byte_size();
        let mut tmp = [0u8; 16];
        match value {
            ScalarValue::Boolean1(v) => tmp[0] = v as u8,
            ScalarValue::Boolean2(v) => tmp[0..2].copy_from_slice(&(v as u16).to_le_bytes()),
            ScalarValue::Boolean4(v) => tmp[0..4].copy_from_slice(&(v as u32).to_le_bytes()),
            ScalarValue::Char1(v) => tmp[0] = v,
            ScalarValue::Char2(v) => tmp[0..2].copy_from_slice(&v.to_le_bytes()),
            ScalarValue::Integer1(v) => tmp[0] = v as u8,
            ScalarValue::Integer2(v) => tmp[0..2].copy_from_slice(&v.to_le_bytes()),
            ScalarValue::Integer4(v) => tmp[0..4].copy_from_slice(&v.to_le_bytes()),
            ScalarValue::UnsignedInteger1(v) => tmp[0] = v,
            ScalarValue::UnsignedInteger2(v) => tmp[0..2].copy_from_slice(&v.to_le_bytes()),
            ScalarValue::UnsignedInteger4(v) => tmp[0..4].copy_from_slice(&v.to_le_bytes()),
            ScalarValue::Real4(v) => tmp[0..4].copy_from_slice(&v.to_le_bytes()),
            ScalarValue::Real8(v) => tmp[0..8].copy_from_slice(&v.to_le_bytes()),
            ScalarValue::Complex8(re, im) => tmp[0..8].copy_from_slice(&codec::encode_complex8((re, im))),
            ScalarValue::Complex16(re, im) => tmp[0..16].copy_from_slice(&codec::encode_complex16((re, im))),
            ScalarValue::Timestamp(v) => tmp[0..12].copy_from_slice(&codec::encode_timestamp(v)),
            ScalarValue::Guid(v) => tmp.copy_from_slice(&v.to_mixed_endian_bytes()),
        }
        self.slot_mut(index).copy_from_slice(&tmp[..unit_bytes]);
    }
}
