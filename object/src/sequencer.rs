//! The logical read/write layer (§4.E, §4.D): [`LogicalSequencer`] wraps the
//! physical reader, consumes the leading Container record, and yields
//! Observation records while tracking the most-recently-seen DataSource and
//! MonitorSettings; [`LogicalWriter`] is its write-side counterpart.

use std::io::{Read, Seek, Write};

use pqdif_core::Collection;
use pqdif_parser::{
    CompressionAlgorithm, CompressionStyle, PhysicalReader, PhysicalReaderOptions, PhysicalWriter, PhysicalWriterOptions,
};
use snafu::ResultExt;
use tracing::{debug, trace};

use crate::error::{self, PhysicalWriteSnafu, Result, WriteResult};
use crate::views::{ContainerRecord, DataSourceRecord, MonitorSettingsRecord, ObservationRecord};
use crate::well_known::{
    RECORD_SIGNATURE, RECORD_TYPE_CONTAINER, RECORD_TYPE_DATA_SOURCE, RECORD_TYPE_MONITOR_SETTINGS, RECORD_TYPE_OBSERVATION,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    Done,
}

/// Pulls Observation records out of a PQDIF byte stream, threading the
/// Container's compression settings into the physical reader and tracking
/// the most recently seen DataSource/MonitorSettings records (§4.E).
pub struct LogicalSequencer<R> {
    reader: PhysicalReader<R>,
    state: State,
    container: ContainerRecord,
    current_data_source: Option<DataSourceRecord>,
    current_monitor_settings: Option<MonitorSettingsRecord>,
    data_sources_seen: Vec<DataSourceRecord>,
}

impl<R: Read + Seek> LogicalSequencer<R> {
    /// Open a stream, reading and validating the leading Container record.
    pub fn open(inner: R, options: PhysicalReaderOptions) -> Result<Self> {
        let mut reader = PhysicalReader::new(inner, options)?;

        let first = reader.next().transpose()?;
        let first = first.ok_or(error::ReadError::EmptyStream)?;

        if first.header().record_type != RECORD_TYPE_CONTAINER {
            return error::MissingContainerSnafu {
                got: first.header().record_type,
            }
            .fail();
        }

        let container = ContainerRecord::from_collection(first.into_root())?;

        let algorithm = CompressionAlgorithm::from_u32(
            container
                .compression_algorithm_raw()
                .unwrap_or(0),
        );
        let style = CompressionStyle::from_u32(container.compression_style_raw().unwrap_or(0));
        reader.set_compression(algorithm, style);
        debug!(?algorithm, ?style, "sequencer initialized from Container record");

        Ok(LogicalSequencer {
            reader,
            state: State::Scanning,
            container,
            current_data_source: None,
            current_monitor_settings: None,
            data_sources_seen: Vec::new(),
        })
    }

    /// The Container record this sequencer was opened with.
    pub fn container(&self) -> &ContainerRecord {
        &self.container
    }

    /// The most recently seen DataSource record, if any.
    pub fn current_data_source(&self) -> Option<&DataSourceRecord> {
        self.current_data_source.as_ref()
    }

    /// The most recently seen MonitorSettings record, if any.
    pub fn current_monitor_settings(&self) -> Option<&MonitorSettingsRecord> {
        self.current_monitor_settings.as_ref()
    }

    /// Every DataSource record encountered so far, for random-access
    /// lookup (§4.E).
    pub fn data_sources_seen(&self) -> &[DataSourceRecord] {
        &self.data_sources_seen
    }

    /// Total recoverable structural errors accumulated by the underlying
    /// physical reader.
    pub fn error_count(&self) -> usize {
        self.reader.error_count()
    }

    fn advance_past_non_observations(&mut self) -> Result<Option<Collection>> {
        loop {
            let Some(record) = self.reader.next().transpose()? else {
                self.state = State::Done;
                return Ok(None);
            };
            let record_type = record.header().record_type;

            if record_type == RECORD_TYPE_CONTAINER {
                self.state = State::Done;
                return error::DuplicateContainerSnafu.fail();
            } else if record_type == RECORD_TYPE_DATA_SOURCE {
                let ds = DataSourceRecord::from_collection(record.into_root())?;
                trace!(name = ?ds.data_source_name(), "sequencer updated current DataSource");
                self.current_data_source = Some(ds.clone());
                self.data_sources_seen.push(ds);
            } else if record_type == RECORD_TYPE_MONITOR_SETTINGS {
                let ms = MonitorSettingsRecord::from_collection(record.into_root())?;
                trace!("sequencer updated current MonitorSettings");
                self.current_monitor_settings = Some(ms);
            } else if record_type == RECORD_TYPE_OBSERVATION {
                return Ok(Some(record.into_root()));
            }
            // Any other record type is skipped (forward-compatible with
            // record types this codec does not yet model).
        }
    }

    /// Pull the next Observation record, or `None` once the stream is
    /// exhausted. Fails if an Observation is encountered with no
    /// preceding DataSource (§4.E, §7).
    pub fn next_observation(&mut self) -> Result<Option<ObservationRecord>> {
        if self.state == State::Done {
            return Ok(None);
        }
        let Some(root) = self.advance_past_non_observations()? else {
            return Ok(None);
        };
        if self.current_data_source.is_none() {
            return error::ObservationWithoutDataSourceSnafu.fail();
        }
        Ok(Some(ObservationRecord::from_collection(root)?))
    }
}

/// Serializes a Container record followed by any mix of DataSource,
/// MonitorSettings and Observation records through one physical writer,
/// the write-side counterpart to [`LogicalSequencer`] (§4.D, mirroring the
/// teacher's `write_dataset_with_ts`-style entry points).
pub struct LogicalWriter<W> {
    writer: PhysicalWriter<W>,
}

impl<W: Write + Seek> LogicalWriter<W> {
    /// Open a destination stream, writing `container` as the leading
    /// record and configuring the physical writer's record-level
    /// compression from the settings it declares.
    pub fn open(inner: W, container: &ContainerRecord) -> WriteResult<Self> {
        let algorithm = CompressionAlgorithm::from_u32(container.compression_algorithm_raw().unwrap_or(0));
        let style = CompressionStyle::from_u32(container.compression_style_raw().unwrap_or(0));
        let options = PhysicalWriterOptions {
            compression: Some((algorithm, style)),
        };
        let mut writer = PhysicalWriter::new(inner, options);
        writer
            .write_record(RECORD_SIGNATURE, RECORD_TYPE_CONTAINER, container.root())
            .context(PhysicalWriteSnafu)?;
        debug!(?algorithm, ?style, "writer initialized from Container record");
        Ok(LogicalWriter { writer })
    }

    /// Append a DataSource record.
    pub fn write_data_source(&mut self, record: &DataSourceRecord) -> WriteResult<()> {
        self.writer
            .write_record(RECORD_SIGNATURE, RECORD_TYPE_DATA_SOURCE, record.root())
            .context(PhysicalWriteSnafu)
    }

    /// Append a MonitorSettings record.
    pub fn write_monitor_settings(&mut self, record: &MonitorSettingsRecord) -> WriteResult<()> {
        self.writer
            .write_record(RECORD_SIGNATURE, RECORD_TYPE_MONITOR_SETTINGS, record.root())
            .context(PhysicalWriteSnafu)
    }

    /// Append an Observation record.
    pub fn write_observation(&mut self, record: &ObservationRecord) -> WriteResult<()> {
        self.writer
            .write_record(RECORD_SIGNATURE, RECORD_TYPE_OBSERVATION, record.root())
            .context(PhysicalWriteSnafu)
    }

    /// Flush and recover the wrapped stream.
    pub fn into_inner(self) -> WriteResult<W> {
        self.writer.into_inner().context(PhysicalWriteSnafu)
    }
}
