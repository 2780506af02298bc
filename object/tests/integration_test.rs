//! End-to-end exercise of the logical sequencer over a constructed
//! in-memory PQDIF stream: Container, DataSource, MonitorSettings, then
//! two Observations, verifying cross-record tracking and the transducer
//! ratio pulled from the current MonitorSettings.

use std::io::Cursor;

use chrono::{TimeZone, Utc};
use pqdif_core::Identifier;
use pqdif_parser::{PhysicalReaderOptions, PhysicalWriter, PhysicalWriterOptions};
use uuid::Uuid;

use pqdif_object::views::series::{SeriesInstance, StorageMethods};
use pqdif_object::well_known::{RECORD_SIGNATURE, RECORD_TYPE_CONTAINER, RECORD_TYPE_DATA_SOURCE, RECORD_TYPE_MONITOR_SETTINGS, RECORD_TYPE_OBSERVATION};
use pqdif_object::{ContainerRecord, DataSourceRecord, LogicalSequencer, LogicalWriter, MonitorSettingsRecord, ObservationRecord};

fn quantity_type() -> Identifier {
    Identifier::from_uuid(Uuid::from_u128(0x5E08_2F19))
}

fn build_stream() -> Vec<u8> {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();

    let container = ContainerRecord::with_default_file_name(now);

    let mut data_source = DataSourceRecord::new("meter-1");
    data_source.add_channel_definition(quantity_type());

    let mut monitor_settings = MonitorSettingsRecord::new();
    monitor_settings.add_channel_setting(0, 120.0, 1.0);

    let mut series = SeriesInstance::new(StorageMethods::empty());
    series.set_values(&[1.0, 2.0, 3.0]);
    let mut observation = ObservationRecord::new(now);
    observation.set_use_transducer(true);
    observation.add_channel_instance_with_series(0, vec![series]);

    let mut writer = PhysicalWriter::new(Cursor::new(Vec::new()), PhysicalWriterOptions::default());
    writer.write_record(RECORD_SIGNATURE, RECORD_TYPE_CONTAINER, &container.into_collection()).unwrap();
    writer.write_record(RECORD_SIGNATURE, RECORD_TYPE_DATA_SOURCE, &data_source.into_collection()).unwrap();
    writer.write_record(RECORD_SIGNATURE, RECORD_TYPE_MONITOR_SETTINGS, &monitor_settings.into_collection()).unwrap();
    writer.write_record(RECORD_SIGNATURE, RECORD_TYPE_OBSERVATION, &observation.into_collection()).unwrap();
    writer.into_inner().unwrap().into_inner()
}

#[test]
fn sequencer_tracks_data_source_and_applies_transducer_ratio() {
    let bytes = build_stream();
    let mut sequencer = LogicalSequencer::open(Cursor::new(bytes), PhysicalReaderOptions::default()).unwrap();

    assert_eq!(sequencer.container().file_name().unwrap(), "2024-06-01_08.00.00.pqd");

    let observation = sequencer.next_observation().unwrap().expect("one observation in the stream");
    assert!(sequencer.next_observation().unwrap().is_none());

    let data_source = sequencer.current_data_source().expect("DataSource seen before Observation");
    assert_eq!(data_source.data_source_name().unwrap(), "meter-1");

    let monitor_settings = sequencer.current_monitor_settings().expect("MonitorSettings seen before Observation");
    let values = observation.original_values(0, 0, Some(monitor_settings)).unwrap();
    assert_eq!(values, vec![120.0, 240.0, 360.0]);
}

#[test]
fn observation_without_data_source_is_rejected() {
    let empty = pqdif_core::Collection::new(Identifier::NIL);
    let mut writer = PhysicalWriter::new(Cursor::new(Vec::new()), PhysicalWriterOptions::default());
    writer.write_record(RECORD_SIGNATURE, RECORD_TYPE_CONTAINER, &empty).unwrap();
    writer.write_record(RECORD_SIGNATURE, RECORD_TYPE_OBSERVATION, &empty).unwrap();
    let bytes = writer.into_inner().unwrap().into_inner();

    let mut sequencer = LogicalSequencer::open(Cursor::new(bytes), PhysicalReaderOptions::default()).unwrap();
    assert!(sequencer.next_observation().is_err());
}

#[test]
fn duplicate_container_is_rejected() {
    let empty = pqdif_core::Collection::new(Identifier::NIL);
    let mut writer = PhysicalWriter::new(Cursor::new(Vec::new()), PhysicalWriterOptions::default());
    writer.write_record(RECORD_SIGNATURE, RECORD_TYPE_CONTAINER, &empty).unwrap();
    writer.write_record(RECORD_SIGNATURE, RECORD_TYPE_CONTAINER, &empty).unwrap();
    let bytes = writer.into_inner().unwrap().into_inner();

    let mut sequencer = LogicalSequencer::open(Cursor::new(bytes), PhysicalReaderOptions::default()).unwrap();
    assert!(sequencer.next_observation().is_err());
}

#[test]
fn empty_stream_is_rejected() {
    let bytes = Vec::new();
    let result = LogicalSequencer::open(Cursor::new(bytes), PhysicalReaderOptions::default());
    assert!(result.is_err());
}

#[test]
fn logical_writer_round_trips_through_logical_sequencer() {
    let now = Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap();
    let container = ContainerRecord::with_default_file_name(now);

    let mut data_source = DataSourceRecord::new("meter-2");
    data_source.add_channel_definition(quantity_type());

    let mut series = SeriesInstance::new(StorageMethods::empty());
    series.set_values(&[4.0, 5.0]);
    let mut observation = ObservationRecord::new(now);
    observation.add_channel_instance_with_series(0, vec![series]);

    let mut writer = LogicalWriter::open(Cursor::new(Vec::new()), &container).unwrap();
    writer.write_data_source(&data_source).unwrap();
    writer.write_observation(&observation).unwrap();
    let bytes = writer.into_inner().unwrap().into_inner();

    let mut sequencer = LogicalSequencer::open(Cursor::new(bytes), PhysicalReaderOptions::default()).unwrap();
    assert_eq!(sequencer.container().file_name().unwrap(), container.file_name().unwrap());

    let observation = sequencer.next_observation().unwrap().expect("one observation in the stream");
    assert_eq!(observation.original_values(0, 0, None).unwrap(), vec![4.0, 5.0]);

    let data_source = sequencer.current_data_source().expect("DataSource seen before Observation");
    assert_eq!(data_source.data_source_name().unwrap(), "meter-2");
}
