//! Element-tree parsing with recovery (§4.C).
//!
//! The whole of a record body, once read (and decompressed, if
//! applicable) into memory, is itself exactly a Collection payload: a
//! 4-byte child count followed by that many 28-byte element headers and
//! their linked payloads. Parsing the body and parsing any nested linked
//! Collection therefore share one routine.

use std::io::{self, Cursor, Read};

use pqdif_core::{
    Collection, Element, ErrorElement, Identifier, PhysicalType, Scalar, UnknownElement, Vector,
};

const ELEMENT_HEADER_SIZE: u64 = 28;

/// Accumulated state for a single record's element-tree parse: how many
/// elements the stream actually contains (for link-offset bounds checking)
/// and the running count of recovered structural errors against the
/// configured budget (§4.C, §7).
pub struct ParseState {
    body_len: u64,
    error_count: usize,
    budget: i64,
}

impl ParseState {
    pub fn new(body_len: u64, budget: i64) -> Self {
        ParseState {
            body_len,
            error_count: 0,
            budget,
        }
    }

    fn record_error(&mut self) {
        self.error_count += 1;
    }

    /// Rebind the state to a new record's body length, keeping the running
    /// error count (and therefore the budget) shared across the whole
    /// reader instance rather than reset per record (§7: the budget halts
    /// iteration as a whole once exceeded).
    pub fn set_body_len(&mut self, body_len: u64) {
        self.body_len = body_len;
    }

    /// Whether the configured error budget has been exhausted. A negative
    /// budget disables the check entirely.
    pub fn budget_exceeded(&self) -> bool {
        self.budget >= 0 && self.error_count as i64 > self.budget
    }

    /// Total structural errors recorded so far.
    pub fn error_count(&self) -> usize {
        self.error_count
    }
}

/// Parse a record body into its root collection. The root tag always
/// defaults to the record-type tag (§3: the physical Collection payload
/// has no tag field of its own, so the "stored root tag" is always zero).
pub fn parse_body(body: Vec<u8>, record_type: Identifier, state: &mut ParseState) -> io::Result<Collection> {
    let mut cursor = Cursor::new(body);
    let (children, read_size) = parse_collection_payload(&mut cursor, state)?;
    Ok(Collection::from_children(record_type, children, read_size))
}

/// Read the 4-byte child count, then each child by explicit, reseek-based
/// indexing into the 28-byte header array — this is what lets parsing
/// resume at sibling `i+1` regardless of whatever happened reading sibling
/// `i` (§4.C recovery).
fn parse_collection_payload(
    cursor: &mut Cursor<Vec<u8>>,
    state: &mut ParseState,
) -> io::Result<(Vec<Element>, usize)> {
    let mut count_buf = [0u8; 4];
    cursor.read_exact(&mut count_buf)?;
    let count = i32::from_le_bytes(count_buf).max(0) as usize;

    let block_start = cursor.position();
    let mut children = Vec::with_capacity(count.min(1024));

    for i in 0..count {
        if state.budget_exceeded() {
            break;
        }
        let child_pos = block_start + (i as u64) * ELEMENT_HEADER_SIZE;
        if child_pos >= state.body_len {
            // Stream truncated before this child's header even starts.
            break;
        }
        cursor.set_position(child_pos);
        match parse_element(cursor, state)? {
            Some(element) => children.push(element),
            None => break,
        }
    }

    Ok((children, count))
}

/// Parse one element: its 28-byte header, then its embedded or linked
/// payload. Returns `Ok(None)` when the stream ends before a full header
/// can be read (truncation, not a structural error).
fn parse_element(cursor: &mut Cursor<Vec<u8>>, state: &mut ParseState) -> io::Result<Option<Element>> {
    let mut header = [0u8; ELEMENT_HEADER_SIZE as usize];
    if let Err(e) = cursor.read_exact(&mut header) {
        return if e.kind() == io::ErrorKind::UnexpectedEof {
            Ok(None)
        } else {
            Err(e)
        };
    }

    let tag = Identifier::from_mixed_endian_bytes(header[0..16].try_into().unwrap());
    let kind_byte = header[16];
    let value_type_byte = header[17];
    let embedded = header[18] != 0;
    let payload = &header[20..28];

    if kind_byte != 1 && kind_byte != 2 && kind_byte != 3 {
        // Not a parse failure: the header decoded cleanly, it just names a
        // kind this codec does not know (§3).
        return Ok(Some(Element::Unknown(UnknownElement::new(tag, value_type_byte))));
    }

    if embedded && kind_byte != 2 {
        state.record_error();
        return Ok(Some(Element::Error(ErrorElement::new(
            tag,
            kind_byte,
            value_type_byte,
            "embedded flag set on a non-scalar element",
        ))));
    }

    let return_pos = cursor.position();

    let outcome = if embedded {
        embedded_scalar(tag, value_type_byte, payload)
    } else {
        linked_element(cursor, state, tag, kind_byte, value_type_byte, payload)
    };

    cursor.set_position(return_pos);

    match outcome {
        Ok(element) => Ok(Some(element)),
        Err(Recoverable(cause)) => {
            state.record_error();
            Ok(Some(Element::Error(ErrorElement::new(
                tag,
                kind_byte,
                value_type_byte,
                cause,
            ))))
        }
        Err(Fatal(e)) => Err(e),
    }
}

/// A structural problem local to one element is recoverable (§7): it
/// becomes an `Error` placeholder and parsing continues with the next
/// sibling. A stream I/O failure is not — it aborts the whole record.
enum ElementFailure {
    Recoverable(String),
    Fatal(io::Error),
}
use ElementFailure::{Fatal, Recoverable};

impl From<io::Error> for ElementFailure {
    fn from(e: io::Error) -> Self {
        Fatal(e)
    }
}

fn embedded_scalar(tag: Identifier, value_type_byte: u8, payload: &[u8]) -> Result<Element, ElementFailure> {
    let value_type = PhysicalType::from_byte(value_type_byte)
        .map_err(|e| Recoverable(e.to_string()))?;
    if !value_type.is_embeddable() {
        return Err(Recoverable(format!(
            "value type {value_type:?} ({} bytes) cannot be embedded",
            value_type.byte_size()
        )));
    }
    let size = value_type.byte_size();
    let mut scalar = Scalar::new(tag, value_type);
    scalar.set_bytes(&payload[..size], 0);
    Ok(Element::Scalar(scalar))
}

fn linked_element(
    cursor: &mut Cursor<Vec<u8>>,
    state: &mut ParseState,
    tag: Identifier,
    kind_byte: u8,
    value_type_byte: u8,
    payload: &[u8],
) -> Result<Element, ElementFailure> {
    let link = i32::from_le_bytes(payload[0..4].try_into().unwrap());
    let _declared_size = i32::from_le_bytes(payload[4..8].try_into().unwrap());

    if link < 0 || link as u64 >= state.body_len {
        return Err(Recoverable(format!(
            "link offset {link} outside body of length {}",
            state.body_len
        )));
    }

    cursor.set_position(link as u64);

    match kind_byte {
        1 => {
            let (children, read_size) = parse_collection_payload(cursor, state)?;
            Ok(Element::Collection(Collection::from_children(tag, children, read_size)))
        }
        2 => {
            let value_type =
                PhysicalType::from_byte(value_type_byte).map_err(|e| Recoverable(e.to_string()))?;
            let size = value_type.byte_size();
            let mut buf = vec![0u8; size];
            cursor.read_exact(&mut buf)?;
            let mut scalar = Scalar::new(tag, value_type);
            scalar.set_bytes(&buf, 0);
            Ok(Element::Scalar(scalar))
        }
        3 => {
            let value_type =
                PhysicalType::from_byte(value_type_byte).map_err(|e| Recoverable(e.to_string()))?;
            let mut size_buf = [0u8; 4];
            cursor.read_exact(&mut size_buf)?;
            let size = i32::from_le_bytes(size_buf).max(0) as usize;
            let mut buf = vec![0u8; size * value_type.byte_size()];
            cursor.read_exact(&mut buf)?;
            let vector = Vector::from_raw_parts(tag, value_type, size, buf)
                .map_err(|e| Recoverable(e.to_string()))?;
            Ok(Element::Vector(vector))
        }
        _ => unreachable!("kind byte already validated to be 1, 2 or 3"),
    }
}

/// Recursively collect every `Error` placeholder in a parsed tree, for the
/// reader's observable non-fatal error list (§7).
pub fn collect_errors(collection: &Collection) -> Vec<&ErrorElement> {
    let mut out = Vec::new();
    collect_errors_into(collection, &mut out);
    out
}

fn collect_errors_into<'a>(collection: &'a Collection, out: &mut Vec<&'a ErrorElement>) {
    for child in collection.children() {
        match child {
            Element::Error(e) => out.push(e),
            Element::Collection(c) => collect_errors_into(c, out),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn tag(n: u128) -> Identifier {
        Identifier::from_uuid(Uuid::from_u128(n))
    }

    fn build_embedded_scalar_body(record_type: Identifier, child_tag: Identifier, value: u8) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&1i32.to_le_bytes());
        body.extend_from_slice(&child_tag.to_mixed_endian_bytes());
        body.push(2); // Scalar
        body.push(PhysicalType::UnsignedInteger1.to_byte());
        body.push(1); // embedded
        body.push(0); // reserved
        let mut inline = [0u8; 8];
        inline[0] = value;
        body.extend_from_slice(&inline);
        let _ = record_type;
        body
    }

    #[test]
    fn parses_one_embedded_scalar() {
        let body = build_embedded_scalar_body(tag(0), tag(1), 0x2A);
        let mut state = ParseState::new(body.len() as u64, 100);
        let root = parse_body(body, tag(0), &mut state).unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(root.tag(), tag(0));
        let scalar = root.get_scalar_by_tag(tag(1)).unwrap();
        assert_eq!(scalar.get_u1().unwrap(), 0x2A);
        assert_eq!(state.error_count(), 0);
    }

    #[test]
    fn unknown_kind_byte_is_preserved_not_errored() {
        let mut body = Vec::new();
        body.extend_from_slice(&1i32.to_le_bytes());
        body.extend_from_slice(&tag(1).to_mixed_endian_bytes());
        body.push(9); // unrecognized kind
        body.push(0);
        body.push(0);
        body.push(0);
        body.extend_from_slice(&[0u8; 8]);

        let mut state = ParseState::new(body.len() as u64, 100);
        let root = parse_body(body, tag(0), &mut state).unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(state.error_count(), 0);
        match root.children().next().unwrap() {
            Element::Unknown(u) => assert_eq!(u.raw_value_type(), 0),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_link_becomes_error_element_and_counts_against_budget() {
        let mut body = Vec::new();
        body.extend_from_slice(&1i32.to_le_bytes());
        body.extend_from_slice(&tag(1).to_mixed_endian_bytes());
        body.push(3); // Vector
        body.push(PhysicalType::Real4.to_byte());
        body.push(0); // not embedded
        body.push(0);
        body.extend_from_slice(&9999i32.to_le_bytes());
        body.extend_from_slice(&0i32.to_le_bytes());

        let mut state = ParseState::new(body.len() as u64, 100);
        let root = parse_body(body, tag(0), &mut state).unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(state.error_count(), 1);
        assert!(matches!(root.children().next().unwrap(), Element::Error(_)));
        assert_eq!(collect_errors(&root).len(), 1);
    }

    #[test]
    fn truncated_stream_stops_without_error_element() {
        // Claims 2 children but the stream only has room for one header.
        let mut body = Vec::new();
        body.extend_from_slice(&2i32.to_le_bytes());
        body.extend_from_slice(&tag(1).to_mixed_endian_bytes());
        body.push(2);
        body.push(PhysicalType::UnsignedInteger1.to_byte());
        body.push(1);
        body.push(0);
        body.extend_from_slice(&[0u8; 8]);

        let mut state = ParseState::new(body.len() as u64, 100);
        let root = parse_body(body, tag(0), &mut state).unwrap();
        assert_eq!(root.read_size(), 2);
        assert_eq!(root.len(), 1);
        assert_eq!(state.error_count(), 0);
    }

    #[test]
    fn budget_stops_iteration_early() {
        let mut body = Vec::new();
        body.extend_from_slice(&3i32.to_le_bytes());
        for _ in 0..3 {
            body.extend_from_slice(&tag(1).to_mixed_endian_bytes());
            body.push(3); // Vector, linked
            body.push(PhysicalType::Real4.to_byte());
            body.push(0);
            body.push(0);
            body.extend_from_slice(&(-1i32).to_le_bytes()); // always out of range
            body.extend_from_slice(&0i32.to_le_bytes());
        }

        let mut state = ParseState::new(body.len() as u64, 0);
        let root = parse_body(body, tag(0), &mut state).unwrap();
        assert_eq!(root.len(), 1);
        assert!(state.budget_exceeded());
    }
}
