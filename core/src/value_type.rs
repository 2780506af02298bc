//! The physical value type byte (§3) that classifies every Scalar and
//! Vector element.

use crate::error::{self, Error};

/// The physical representation of a single value, as stored on disk.
/// Meaningful on Scalar and Vector elements; zero/unused on Collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PhysicalType {
    /// Single-byte boolean.
    Boolean1,
    /// Two-byte boolean.
    Boolean2,
    /// Four-byte boolean.
    Boolean4,
    /// Single 8-bit ASCII character.
    Char1,
    /// Single 16-bit UTF-16LE code unit.
    Char2,
    /// Signed 8-bit integer.
    Integer1,
    /// Signed 16-bit integer.
    Integer2,
    /// Signed 32-bit integer.
    Integer4,
    /// Unsigned 8-bit integer.
    UnsignedInteger1,
    /// Unsigned 16-bit integer.
    UnsignedInteger2,
    /// Unsigned 32-bit integer.
    UnsignedInteger4,
    /// IEEE-754 single-precision float.
    Real4,
    /// IEEE-754 double-precision float.
    Real8,
    /// Two consecutive `Real4`s (real, imaginary).
    Complex8,
    /// Two consecutive `Real8`s (real, imaginary).
    Complex16,
    /// 12 bytes: `u32` days since 1900-01-01 plus `f64` seconds since midnight.
    Timestamp,
    /// 16-byte mixed-endian GUID.
    Guid,
}

impl PhysicalType {
    /// All variants, in their on-disk byte-code order.
    pub const ALL: [PhysicalType; 17] = [
        PhysicalType::Boolean1,
        PhysicalType::Boolean2,
        PhysicalType::Boolean4,
        PhysicalType::Char1,
        PhysicalType::Char2,
        PhysicalType::Integer1,
        PhysicalType::Integer2,
        PhysicalType::Integer4,
        PhysicalType::UnsignedInteger1,
        PhysicalType::UnsignedInteger2,
        PhysicalType::UnsignedInteger4,
        PhysicalType::Real4,
        PhysicalType::Real8,
        PhysicalType::Complex8,
        PhysicalType::Complex16,
        PhysicalType::Timestamp,
        PhysicalType::Guid,
    ];

    /// The fixed on-disk byte size of a single value of this type.
    pub const fn byte_size(self) -> usize {
        match self {
            PhysicalType::Boolean1 => 1,
            PhysicalType::Boolean2 => 2,
            PhysicalType::Boolean4 => 4,
            PhysicalType::Char1 => 1,
            PhysicalType::Char2 => 2,
            PhysicalType::Integer1 => 1,
            PhysicalType::Integer2 => 2,
            PhysicalType::Integer4 => 4,
            PhysicalType::UnsignedInteger1 => 1,
            PhysicalType::UnsignedInteger2 => 2,
            PhysicalType::UnsignedInteger4 => 4,
            PhysicalType::Real4 => 4,
            PhysicalType::Real8 => 8,
            PhysicalType::Complex8 => 8,
            PhysicalType::Complex16 => 16,
            PhysicalType::Timestamp => 12,
            PhysicalType::Guid => 16,
        }
    }

    /// Decode the single-byte on-disk discriminant.
    pub fn from_byte(byte: u8) -> Result<Self, Error> {
        PhysicalType::ALL
            .get(byte as usize)
            .copied()
            .ok_or(error::UnknownPhysicalTypeSnafu { byte }.build())
    }

    /// Encode the single-byte on-disk discriminant.
    pub fn to_byte(self) -> u8 {
        PhysicalType::ALL
            .iter()
            .position(|&t| t == self)
            .expect("PhysicalType::ALL is exhaustive") as u8
    }

    /// Whether a scalar of this type is small enough to be embedded inline
    /// in a 28-byte element header (§4.C, §4.D): `sizeof(value_type) < 8`.
    pub const fn is_embeddable(self) -> bool {
        self.byte_size() < 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_round_trip() {
        for ty in PhysicalType::ALL {
            assert_eq!(PhysicalType::from_byte(ty.to_byte()).unwrap(), ty);
        }
    }

    #[test]
    fn largest_is_sixteen_bytes() {
        assert!(PhysicalType::ALL.iter().all(|t| t.byte_size() <= 16));
    }

    #[test]
    fn embeddable_matches_spec_boundary() {
        assert!(PhysicalType::UnsignedInteger4.is_embeddable());
        assert!(PhysicalType::Real4.is_embeddable());
        assert!(!PhysicalType::Real8.is_embeddable());
        assert!(!PhysicalType::Complex16.is_embeddable());
        assert!(!PhysicalType::Guid.is_embeddable());
    }
}
