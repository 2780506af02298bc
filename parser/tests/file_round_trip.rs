//! Round-trips a record through an actual file on disk, rather than an
//! in-memory buffer, exercising the generic `Write + Seek` / `Read + Seek`
//! bounds against a real file handle.

use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom};

use pqdif_core::{Collection, Identifier, PhysicalType, Scalar, ScalarValue};
use pqdif_parser::{PhysicalReader, PhysicalReaderOptions, PhysicalWriter, PhysicalWriterOptions};
use tempfile::NamedTempFile;
use uuid::Uuid;

fn tag(n: u128) -> Identifier {
    Identifier::from_uuid(Uuid::from_u128(n))
}

#[test]
fn writes_and_reads_back_through_a_real_file() {
    let file = NamedTempFile::new().expect("tempfile should be creatable");
    let path = file.path().to_path_buf();

    let handle = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(&path)
        .unwrap();

    let mut root = Collection::new(tag(0));
    let mut scalar = Scalar::new(tag(1), PhysicalType::Integer4);
    scalar.set(ScalarValue::Integer4(-7));
    root.add(scalar);

    let mut writer = PhysicalWriter::new(handle, PhysicalWriterOptions::default());
    writer
        .write_record(tag(99), tag(2), &root)
        .expect("writing a single record should succeed");
    writer.into_inner().unwrap();

    let mut handle = OpenOptions::new().read(true).open(&path).unwrap();
    handle.seek(SeekFrom::Start(0)).unwrap();

    let reader = PhysicalReader::new(handle, PhysicalReaderOptions::default()).unwrap();
    let records: Vec<_> = reader.map(Result::unwrap).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].root().get_scalar_by_tag(tag(1)).unwrap().get_i4().unwrap(),
        -7
    );
}
