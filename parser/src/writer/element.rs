//! Element-tree serialization (§4.D): embedded-scalar law, link offsets,
//! and 4-byte padding.

use pqdif_core::{Collection, Element, Header};

use crate::error::{Result, StructuralSnafu};

const ELEMENT_HEADER_SIZE: usize = 28;

fn padded(n: usize) -> usize {
    (n + 3) / 4 * 4
}

fn is_embedded(element: &Element) -> bool {
    matches!(element, Element::Scalar(s) if s.value_type().is_embeddable())
}

/// The unpadded byte length of `element`'s own serialized form, recursing
/// into nested collections (§4.D's padded-byte-size table, before the
/// final rounding at this element's own level).
fn natural_len(element: &Element) -> Result<usize> {
    match element {
        Element::Collection(c) => {
            let header_area = 4 + ELEMENT_HEADER_SIZE * c.len();
            let mut sum = 0usize;
            for child in c.children() {
                if !is_embedded(child) {
                    sum += padded(natural_len(child)?);
                }
            }
            Ok(header_area + sum)
        }
        Element::Vector(v) => Ok(4 + v.len() * v.value_type().byte_size()),
        Element::Scalar(s) => Ok(s.value_type().byte_size()),
        Element::Unknown(_) | Element::Error(_) => StructuralSnafu {
            message: "cannot write a reader-only Unknown or Error element",
        }
        .fail(),
    }
}

/// Serialize `collection` as a Collection payload (§6) whose blob begins
/// at absolute body offset `base_offset`, appending it to `out`.
pub fn serialize_collection_into(collection: &Collection, base_offset: u64, out: &mut Vec<u8>) -> Result<()> {
    let children: Vec<&Element> = collection.children().collect();
    let n = children.len();
    out.extend_from_slice(&(n as i32).to_le_bytes());

    let header_area_len = 4 + ELEMENT_HEADER_SIZE * n;
    let mut addrs: Vec<Option<u64>> = Vec::with_capacity(n);
    let mut next_addr = base_offset + header_area_len as u64;
    for child in &children {
        if is_embedded(child) {
            addrs.push(None);
        } else {
            addrs.push(Some(next_addr));
            next_addr += padded(natural_len(child)?) as u64;
        }
    }

    for (child, addr) in children.iter().zip(&addrs) {
        write_element_header(out, child, *addr)?;
    }

    for (child, addr) in children.iter().zip(&addrs) {
        let Some(addr) = addr else { continue };
        let mut payload = Vec::new();
        match child {
            Element::Collection(c) => serialize_collection_into(c, *addr, &mut payload)?,
            Element::Vector(v) => {
                payload.extend_from_slice(&(v.len() as i32).to_le_bytes());
                payload.extend_from_slice(v.as_bytes());
            }
            Element::Scalar(s) => payload.extend_from_slice(&s.get_bytes()),
            Element::Unknown(_) | Element::Error(_) => unreachable!("filtered by natural_len above"),
        }
        while payload.len() % 4 != 0 {
            payload.push(0);
        }
        out.extend_from_slice(&payload);
    }

    Ok(())
}

fn write_element_header(out: &mut Vec<u8>, element: &Element, addr: Option<u64>) -> Result<()> {
    out.extend_from_slice(&element.tag().to_mixed_endian_bytes());

    let (kind_byte, value_type_byte) = match element {
        Element::Collection(_) => (1u8, 0u8),
        Element::Scalar(s) => (2u8, s.value_type().to_byte()),
        Element::Vector(v) => (3u8, v.value_type().to_byte()),
        Element::Unknown(_) | Element::Error(_) => {
            return StructuralSnafu {
                message: "cannot write a reader-only Unknown or Error element",
            }
            .fail()
        }
    };
    out.push(kind_byte);
    out.push(value_type_byte);

    match addr {
        None => {
            out.push(1); // embedded
            out.push(0); // reserved
            let scalar = element.as_scalar().expect("checked above");
            let bytes = scalar.get_bytes();
            let mut inline = [0u8; 8];
            inline[..bytes.len()].copy_from_slice(&bytes);
            out.extend_from_slice(&inline);
        }
        Some(link) => {
            out.push(0); // not embedded
            out.push(0); // reserved
            out.extend_from_slice(&(link as i32).to_le_bytes());
            out.extend_from_slice(&(natural_len(element)? as i32).to_le_bytes());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pqdif_core::{Identifier, PhysicalType, Scalar, ScalarValue, Vector};
    use uuid::Uuid;

    fn tag(n: u128) -> Identifier {
        Identifier::from_uuid(Uuid::from_u128(n))
    }

    #[test]
    fn embedded_scalar_contributes_no_linked_payload() {
        let mut root = Collection::new(tag(0));
        let mut scalar = Scalar::new(tag(1), PhysicalType::UnsignedInteger1);
        scalar.set(ScalarValue::UnsignedInteger1(0x2A));
        root.add(scalar);

        let mut out = Vec::new();
        serialize_collection_into(&root, 0, &mut out).unwrap();
        // 4 (count) + 28 (header) = 32 bytes, no trailing payload.
        assert_eq!(out.len(), 32);
    }

    #[test]
    fn vector_payload_is_padded_to_four_bytes() {
        let mut root = Collection::new(tag(0));
        let mut v = Vector::new(tag(1), PhysicalType::UnsignedInteger1);
        v.resize(3);
        root.add(v);

        let mut out = Vec::new();
        serialize_collection_into(&root, 0, &mut out).unwrap();
        // 4 (count) + 28 (header) + pad(4 + 3) == 4+28+8 == 40.
        assert_eq!(out.len(), 40);
    }

    #[test]
    fn nested_collection_link_offset_is_absolute() {
        let mut root = Collection::new(tag(0));
        let mut inner = Collection::new(tag(1));
        let mut scalar = Scalar::new(tag(2), PhysicalType::Real8);
        scalar.set(ScalarValue::Real8(1.0));
        inner.add(scalar);
        root.add(inner);

        let mut out = Vec::new();
        serialize_collection_into(&root, 0, &mut out).unwrap();
        // root: count(4) + header(28) = 32, then inner blob at offset 32.
        let link = i32::from_le_bytes(out[20..24].try_into().unwrap());
        assert_eq!(link, 32);
    }
}
