//! Typed semantic views (§4.G): record-specific wrappers over the raw
//! element tree, each addressing its children by well-known tag rather
//! than requiring callers to walk `Collection`s by hand.

pub mod container;
pub mod data_source;
pub mod monitor_settings;
pub mod observation;
pub mod series;

pub use container::ContainerRecord;
pub use data_source::{ChannelDefinition, DataSourceRecord};
pub use monitor_settings::{ChannelSetting, MonitorSettingsRecord};
pub use observation::{ChannelInstance, ObservationRecord};
pub use series::{SeriesInstance, StorageMethods};
