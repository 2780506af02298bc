//! The PQDIF tag: a 128-bit globally unique identifier used to address
//! every element, record type, and well-known value in the format.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// An opaque 128-bit identifier. Identifiers are compared by bit-equality;
/// they carry no further structure of their own. Record types, element
/// tags, and well-known field identifiers are all `Identifier`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(Uuid);

impl Identifier {
    /// The all-zero identifier. Used as the sentinel "unset root tag" in
    /// record bodies (§3: "the stored root tag is zero").
    pub const NIL: Identifier = Identifier(Uuid::nil());

    /// Wrap a [`Uuid`] as an `Identifier`.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Identifier(uuid)
    }

    /// Unwrap to the underlying [`Uuid`].
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Decode an identifier from its on-disk 16-byte representation.
    ///
    /// The standard's reference implementation writes GUIDs using the
    /// Microsoft "mixed-endian" layout: the first three fields
    /// (`u32`, `u16`, `u16`) are little-endian, and the remaining 8 bytes
    /// are taken verbatim. [`Uuid::from_fields_le`] implements exactly this
    /// convention.
    pub fn from_mixed_endian_bytes(bytes: [u8; 16]) -> Self {
        let d1 = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let d2 = u16::from_le_bytes(bytes[4..6].try_into().unwrap());
        let d3 = u16::from_le_bytes(bytes[6..8].try_into().unwrap());
        let d4: [u8; 8] = bytes[8..16].try_into().unwrap();
        Identifier(Uuid::from_fields_le(d1, d2, d3, &d4))
    }

    /// Encode this identifier into its on-disk 16-byte representation,
    /// inverse of [`Identifier::from_mixed_endian_bytes`].
    pub fn to_mixed_endian_bytes(self) -> [u8; 16] {
        let (d1, d2, d3, d4) = self.0.to_fields_le();
        let mut out = [0u8; 16];
        out[0..4].copy_from_slice(&d1.to_le_bytes());
        out[4..6].copy_from_slice(&d2.to_le_bytes());
        out[6..8].copy_from_slice(&d3.to_le_bytes());
        out[8..16].copy_from_slice(d4);
        out
    }
}

impl From<Uuid> for Identifier {
    fn from(uuid: Uuid) -> Self {
        Identifier(uuid)
    }
}

impl From<Identifier> for Uuid {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl FromStr for Identifier {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(Identifier)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
