//! End-to-end read/write scenarios over an in-memory stream.

use std::io::Cursor;

use chrono::{TimeZone, Utc};
use pqdif_core::{Collection, Identifier, PhysicalType, Scalar, ScalarValue, Vector};
use pqdif_parser::{
    CompressionAlgorithm, CompressionStyle, PhysicalReader, PhysicalReaderOptions, PhysicalWriter,
    PhysicalWriterOptions,
};
use uuid::Uuid;

fn tag(n: u128) -> Identifier {
    Identifier::from_uuid(Uuid::from_u128(n))
}

const SIGNATURE: u128 = 0xA1FA_8B9D_5C1B_2C5E_89C9_C5B8_2B5A_EDA7;
const CONTAINER_TYPE: u128 = 1;
const OBSERVATION_TYPE: u128 = 2;

fn write_single_record(root: &Collection, record_type: Identifier, compression: Option<(CompressionAlgorithm, CompressionStyle)>) -> Vec<u8> {
    let mut writer = PhysicalWriter::new(
        Cursor::new(Vec::new()),
        PhysicalWriterOptions {
            compression,
            ..Default::default()
        },
    );
    writer.write_record(tag(SIGNATURE), record_type, root).unwrap();
    writer.into_inner().unwrap().into_inner()
}

#[test]
fn empty_container_round_trips() {
    let mut root = Collection::new(tag(0));
    let version = root.get_or_add_vector(tag(10), PhysicalType::UnsignedInteger4);
    version.resize(4);
    version.set(0, ScalarValue::UnsignedInteger4(1));
    version.set(1, ScalarValue::UnsignedInteger4(5));
    version.set(2, ScalarValue::UnsignedInteger4(1));
    version.set(3, ScalarValue::UnsignedInteger4(0));

    let mut name = Scalar::new(tag(11), PhysicalType::Char1);
    name.set(ScalarValue::Char1(b'a'));
    root.add(name);

    let mut creation = Scalar::new(tag(12), PhysicalType::Timestamp);
    creation.set(ScalarValue::Timestamp(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()));
    root.add(creation);

    let bytes = write_single_record(&root, tag(CONTAINER_TYPE), None);

    let reader = PhysicalReader::new(Cursor::new(bytes), PhysicalReaderOptions::default()).unwrap();
    let records: Vec<_> = reader.map(Result::unwrap).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].header().next_record_position, 0);
    assert_eq!(
        records[0].root().get_vector_by_tag(tag(10)).unwrap().get(1),
        ScalarValue::UnsignedInteger4(5)
    );
}

#[test]
fn one_embedded_scalar_round_trips() {
    let mut root = Collection::new(tag(0));
    let mut scalar = Scalar::new(tag(20), PhysicalType::UnsignedInteger1);
    scalar.set(ScalarValue::UnsignedInteger1(0x2A));
    root.add(scalar);

    let bytes = write_single_record(&root, tag(OBSERVATION_TYPE), None);
    assert_eq!(bytes.len() - 64, 32); // 4 (count) + 28 (embedded header), no linked payload

    let reader = PhysicalReader::new(Cursor::new(bytes), PhysicalReaderOptions::default()).unwrap();
    let records: Vec<_> = reader.map(Result::unwrap).collect();
    let record = &records[0];
    assert_eq!(record.root().get_scalar_by_tag(tag(20)).unwrap().get_u1().unwrap(), 0x2A);
}

#[test]
fn one_vector_of_real4_round_trips() {
    let mut root = Collection::new(tag(0));
    let mut v = Vector::new(tag(21), PhysicalType::Real4);
    v.resize(3);
    v.set(0, ScalarValue::Real4(1.0));
    v.set(1, ScalarValue::Real4(2.0));
    v.set(2, ScalarValue::Real4(3.0));
    root.add(v);

    let bytes = write_single_record(&root, tag(OBSERVATION_TYPE), None);
    assert_eq!(bytes.len() - 64, 4 + 28 + 16);

    let reader = PhysicalReader::new(Cursor::new(bytes), PhysicalReaderOptions::default()).unwrap();
    let records: Vec<_> = reader.map(Result::unwrap).collect();
    let values = records[0].root().get_vector_by_tag(tag(21)).unwrap();
    assert_eq!(values.get(0), ScalarValue::Real4(1.0));
    assert_eq!(values.get(2), ScalarValue::Real4(3.0));
}

#[test]
fn flipped_body_byte_surfaces_checksum_mismatch_without_aborting() {
    let mut root = Collection::new(tag(0));
    let mut scalar = Scalar::new(tag(20), PhysicalType::UnsignedInteger1);
    scalar.set(ScalarValue::UnsignedInteger1(1));
    root.add(scalar);

    let mut bytes = write_single_record(&root, tag(OBSERVATION_TYPE), None);
    let body_start = 64;
    bytes[body_start] ^= 0xFF;

    let reader = PhysicalReader::new(Cursor::new(bytes), PhysicalReaderOptions::default()).unwrap();
    let records: Vec<_> = reader.map(Result::unwrap).collect();
    assert_eq!(records.len(), 1);
    assert!(!records[0].checksum_ok());
}

#[test]
fn cycle_between_two_records_terminates() {
    let empty = Collection::new(tag(0));

    let mut buf = Vec::new();
    let mut writer = PhysicalWriter::new(Cursor::new(Vec::new()), PhysicalWriterOptions::default());
    writer.write_record(tag(SIGNATURE), tag(CONTAINER_TYPE), &empty).unwrap();
    writer.write_record(tag(SIGNATURE), tag(OBSERVATION_TYPE), &empty).unwrap();
    buf.extend(writer.into_inner().unwrap().into_inner());

    // Patch record B's next_record_position (already 0, meaning "last") to
    // point back at record A, offset 0 — the first record written.
    let record_a_len = 64 + 4; // header + empty-collection body (count=0)
    let record_b_next_field = record_a_len + 40;
    buf[record_b_next_field..record_b_next_field + 4].copy_from_slice(&0i32.to_le_bytes());

    let reader = PhysicalReader::new(Cursor::new(buf), PhysicalReaderOptions::default()).unwrap();
    let records: Vec<_> = reader.map(Result::unwrap).collect();
    assert_eq!(records.len(), 2);
}

#[test]
fn cycle_not_touching_the_first_record_is_still_caught() {
    let empty = Collection::new(tag(0));

    let mut writer = PhysicalWriter::new(Cursor::new(Vec::new()), PhysicalWriterOptions::default());
    writer.write_record(tag(SIGNATURE), tag(CONTAINER_TYPE), &empty).unwrap(); // A, offset 0
    writer.write_record(tag(SIGNATURE), tag(OBSERVATION_TYPE), &empty).unwrap(); // B, offset 68
    writer.write_record(tag(SIGNATURE), tag(OBSERVATION_TYPE), &empty).unwrap(); // C, offset 136
    let mut buf = writer.into_inner().unwrap().into_inner();

    let record_len = 64 + 4;
    let b_offset = record_len as i32;
    let c_offset = (record_len * 2) as i32;

    // B -> C (already the natural chain) ; patch C -> B, forming a cycle
    // that never revisits the first record's offset 0.
    let c_next_field = (c_offset as usize) + 40;
    buf[c_next_field..c_next_field + 4].copy_from_slice(&b_offset.to_le_bytes());

    let reader = PhysicalReader::new(Cursor::new(buf), PhysicalReaderOptions::default()).unwrap();
    let records: Vec<_> = reader.map(Result::unwrap).collect();
    // A, B, then C (first visit) — the second arrival at B's offset is
    // where the cycle guard stops iteration.
    assert_eq!(records.len(), 3);
}

#[test]
fn zlib_record_round_trips() {
    let mut root = Collection::new(tag(0));
    let mut v = Vector::new(tag(22), PhysicalType::Real8);
    v.resize(5);
    for i in 0..5 {
        v.set(i, ScalarValue::Real8(i as f64));
    }
    root.add(v);

    let bytes = write_single_record(
        &root,
        tag(OBSERVATION_TYPE),
        Some((CompressionAlgorithm::Zlib, CompressionStyle::RecordLevel)),
    );

    let mut reader = PhysicalReader::new(Cursor::new(bytes), PhysicalReaderOptions::default()).unwrap();
    reader.set_compression(CompressionAlgorithm::Zlib, CompressionStyle::RecordLevel);
    let records: Vec<_> = reader.map(Result::unwrap).collect();
    assert_eq!(records.len(), 1);
    assert!(records[0].checksum_ok());
    let values = records[0].root().get_vector_by_tag(tag(22)).unwrap();
    assert_eq!(values.get(4), ScalarValue::Real8(4.0));
}
