//! Logical record types, tag registry, and typed semantic views for Power
//! Quality Data Interchange Format (PQDIF, IEEE 1159.3-2003) files.
//!
//! This crate sits on top of `pqdif-parser`'s physical record stream: the
//! [`sequencer`] module turns that stream into a Container followed by a
//! sequence of Observations (§4.E), each record interpreted through the
//! typed [`views`] (§4.G) using the identifiers named in [`well_known`]
//! and, for enumerated fields, resolved against the [`registry`] (§4.F)
//! through the [`semantic`] caches.

pub mod error;
pub mod registry;
pub mod semantic;
pub mod sequencer;
pub mod views;
pub mod well_known;

pub use error::{ReadError, Result, WriteError, WriteResult};
pub use sequencer::{LogicalSequencer, LogicalWriter};
pub use views::{
    ChannelDefinition, ChannelInstance, ChannelSetting, ContainerRecord, DataSourceRecord, MonitorSettingsRecord,
    ObservationRecord, SeriesInstance, StorageMethods,
};

/// Re-exports the types most commonly needed to read or write PQDIF
/// records through this crate.
pub mod prelude {
    pub use crate::{
        ChannelDefinition, ChannelInstance, ChannelSetting, ContainerRecord, DataSourceRecord, LogicalSequencer,
        LogicalWriter, MonitorSettingsRecord, ObservationRecord, ReadError, Result, SeriesInstance, StorageMethods,
        WriteError, WriteResult,
    };
}
