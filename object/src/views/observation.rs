//! `ObservationRecord` and `ChannelInstance` (§4.G): one observed event,
//! with per-channel series data tied back to the data source's channel
//! definitions by index.

use chrono::{DateTime, Utc};
use pqdif_core::{Collection, Identifier, PhysicalType, ScalarValue};

use crate::error::{MissingFieldSnafu, Result};
use crate::views::container::{char1_vector_to_string, set_char1_vector};
use crate::views::monitor_settings::MonitorSettingsRecord;
use crate::views::series::SeriesInstance;
use crate::well_known::*;

const RECORD_NAME: &str = "ObservationRecord";
const CHANNEL_INSTANCE: &str = "ChannelInstance";

/// Typed view over an Observation record's root collection.
#[derive(Debug, Clone)]
pub struct ObservationRecord {
    root: Collection,
}

impl ObservationRecord {
    /// Wrap an already-parsed root collection as an `ObservationRecord`.
    pub fn from_collection(root: Collection) -> Result<Self> {
        Ok(ObservationRecord { root })
    }

    /// Build a fresh Observation record starting at `start_time`.
    pub fn new(start_time: DateTime<Utc>) -> Self {
        let mut record = ObservationRecord {
            root: Collection::new(RECORD_TYPE_OBSERVATION),
        };
        record.set_start_time(start_time);
        record
    }

    /// Consume the view, returning its root collection.
    pub fn into_collection(self) -> Collection {
        self.root
    }

    /// Borrow the root collection backing this view, for writing without
    /// consuming it.
    pub fn root(&self) -> &Collection {
        &self.root
    }

    /// Human-readable name of this observation, if set.
    pub fn name(&self) -> Option<String> {
        self.root.get_vector_by_tag(TAG_OBSERVATION_NAME).map(char1_vector_to_string)
    }

    /// Set the human-readable name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        set_char1_vector(&mut self.root, TAG_OBSERVATION_NAME, &name.into());
    }

    /// UTC timestamp this observation begins.
    pub fn start_time(&self) -> Result<DateTime<Utc>> {
        self.root
            .get_scalar_by_tag(TAG_START_TIME)
            .and_then(|s| s.get_timestamp().ok())
            .ok_or_else(|| {
                MissingFieldSnafu {
                    record: RECORD_NAME,
                    tag: TAG_START_TIME,
                }
                .build()
            })
    }

    /// Overwrite the start timestamp.
    pub fn set_start_time(&mut self, at: DateTime<Utc>) {
        self.root
            .get_or_add_scalar(TAG_START_TIME, PhysicalType::Timestamp)
            .set(ScalarValue::Timestamp(at));
    }

    /// Whether series values in this observation should be scaled by the
    /// matching channel's transducer ratio (§4.G). Defaults to `false`
    /// when unset.
    pub fn use_transducer(&self) -> bool {
        match self.root.get_scalar_by_tag(TAG_USE_TRANSDUCER).map(|s| s.get()) {
            Some(ScalarValue::Boolean4(v)) => v,
            _ => false,
        }
    }

    /// Set whether this observation's series should be scaled by the
    /// channel's transducer ratio.
    pub fn set_use_transducer(&mut self, value: bool) {
        self.root
            .get_or_add_scalar(TAG_USE_TRANSDUCER, PhysicalType::Boolean4)
            .set(ScalarValue::Boolean4(value));
    }

    /// The disturbance category this observation was triggered by, if any.
    pub fn disturbance_category(&self) -> Option<Identifier> {
        self.root.get_scalar_by_tag(TAG_DISTURBANCE_CATEGORY_ID).and_then(|s| s.get_guid().ok())
    }

    /// Set the disturbance category.
    pub fn set_disturbance_category(&mut self, category: Identifier) {
        self.root
            .get_or_add_scalar(TAG_DISTURBANCE_CATEGORY_ID, PhysicalType::Guid)
            .set(ScalarValue::Guid(category));
    }

    /// Every `ChannelInstance` child, in collection order.
    pub fn channel_instances(&self) -> Vec<ChannelInstance> {
        self.root
            .get_collection_by_tag(TAG_CHANNEL_INSTANCES)
            .into_iter()
            .flat_map(|c| c.children())
            .filter_map(|e| e.as_collection())
            .map(|c| ChannelInstance { root: c.clone() })
            .collect()
    }

    /// Append a new `ChannelInstance` for `definition_index`, auto-creating
    /// the `ChannelInstances` collection on first insert (§4.G).
    pub fn add_channel_instance(&mut self, definition_index: u32) -> &mut Self {
        if self.root.get_collection_by_tag(TAG_CHANNEL_INSTANCES).is_none() {
            self.root.add(Collection::new(TAG_CHANNEL_INSTANCES));
        }
        let mut child = Collection::new(TAG_CHANNEL_INSTANCE);
        child
            .get_or_add_scalar(TAG_CHANNEL_INSTANCE_DEFINITION_INDEX, PhysicalType::UnsignedInteger4)
            .set(ScalarValue::UnsignedInteger4(definition_index));

        let container = self
            .root
            .children_mut()
            .find(|e| e.tag() == TAG_CHANNEL_INSTANCES)
            .and_then(|e| e.as_collection_mut())
            .expect("just ensured above");
        container.add(child);
        self
    }

    /// Append a new `ChannelInstance` for `definition_index` carrying
    /// `series` as its `SeriesInstances`, in one call.
    pub fn add_channel_instance_with_series(
        &mut self,
        definition_index: u32,
        series: impl IntoIterator<Item = crate::views::series::SeriesInstance>,
    ) -> &mut Self {
        self.add_channel_instance(definition_index);
        let channel_instances = self
            .root
            .children_mut()
            .find(|e| e.tag() == TAG_CHANNEL_INSTANCES)
            .and_then(|e| e.as_collection_mut())
            .expect("just ensured above");
        let last = channel_instances
            .children_mut()
            .last()
            .and_then(|e| e.as_collection_mut())
            .expect("just added above");
        for instance in series {
            if last.get_collection_by_tag(TAG_SERIES_INSTANCES).is_none() {
                last.add(Collection::new(TAG_SERIES_INSTANCES));
            }
            let series_container = last
                .children_mut()
                .find(|e| e.tag() == TAG_SERIES_INSTANCES)
                .and_then(|e| e.as_collection_mut())
                .expect("just ensured above");
            series_container.add(instance.into_collection());
        }
        self
    }

    /// Compute `OriginalValues` for one series of one channel instance,
    /// resolving the transducer ratio against `monitor_settings` when this
    /// observation has `UseTransducer` set (§4.G).
    pub fn original_values(
        &self,
        channel_index: usize,
        series_index: usize,
        monitor_settings: Option<&MonitorSettingsRecord>,
    ) -> Result<Vec<f64>> {
        let channels = self.channel_instances();
        let channel = channels
            .get(channel_index)
            .ok_or_else(|| MissingFieldSnafu { record: RECORD_NAME, tag: TAG_CHANNEL_INSTANCES }.build())?;

        let ratio = if self.use_transducer() {
            channel
                .definition_index()
                .ok()
                .and_then(|idx| monitor_settings.and_then(|ms| ms.channel_setting_for(idx)))
                .and_then(|cs| cs.ratio())
        } else {
            None
        };

        let series = channel.series_instances();
        let target = series
            .get(series_index)
            .ok_or_else(|| MissingFieldSnafu { record: CHANNEL_INSTANCE, tag: TAG_SERIES_INSTANCE }.build())?;
        target.original_values(series_index, &series, ratio)
    }
}

/// One monitored channel's data within an observation (§4.G).
#[derive(Debug, Clone)]
pub struct ChannelInstance {
    root: Collection,
}

impl ChannelInstance {
    /// The index into the data source's `ChannelDefinitions` this instance
    /// carries data for.
    pub fn definition_index(&self) -> Result<u32> {
        self.root
            .get_scalar_by_tag(TAG_CHANNEL_INSTANCE_DEFINITION_INDEX)
            .and_then(|s| s.get_u4().ok())
            .ok_or_else(|| {
                MissingFieldSnafu {
                    record: CHANNEL_INSTANCE,
                    tag: TAG_CHANNEL_INSTANCE_DEFINITION_INDEX,
                }
                .build()
            })
    }

    /// Every `SeriesInstance` child, in collection order.
    pub fn series_instances(&self) -> Vec<SeriesInstance> {
        self.root
            .get_collection_by_tag(TAG_SERIES_INSTANCES)
            .into_iter()
            .flat_map(|c| c.children())
            .filter_map(|e| e.as_collection())
            .map(SeriesInstance::from_collection)
            .collect()
    }

    /// Append an already-built `SeriesInstance`, auto-creating the
    /// `SeriesInstances` collection on first insert.
    pub fn add_series(&mut self, series: SeriesInstance) -> &mut Self {
        if self.root.get_collection_by_tag(TAG_SERIES_INSTANCES).is_none() {
            self.root.add(Collection::new(TAG_SERIES_INSTANCES));
        }
        let container = self
            .root
            .children_mut()
            .find(|e| e.tag() == TAG_SERIES_INSTANCES)
            .and_then(|e| e.as_collection_mut())
            .expect("just ensured above");
        container.add(series.into_collection());
        self
    }

    /// Append a new, empty `SeriesInstance`, auto-creating the
    /// `SeriesInstances` collection on first insert.
    pub fn add_series_instance(&mut self) -> &mut Self {
        if self.root.get_collection_by_tag(TAG_SERIES_INSTANCES).is_none() {
            self.root.add(Collection::new(TAG_SERIES_INSTANCES));
        }
        let container = self
            .root
            .children_mut()
            .find(|e| e.tag() == TAG_SERIES_INSTANCES)
            .and_then(|e| e.as_collection_mut())
            .expect("just ensured above");
        container.add(Collection::new(TAG_SERIES_INSTANCE));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn add_channel_instance_creates_container_lazily() {
        let mut obs = ObservationRecord::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(obs.channel_instances().is_empty());
        obs.add_channel_instance(2);
        let channels = obs.channel_instances();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].definition_index().unwrap(), 2);
    }

    #[test]
    fn use_transducer_defaults_to_false() {
        let obs = ObservationRecord::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(!obs.use_transducer());
    }

    #[test]
    fn original_values_applies_monitor_settings_ratio() {
        use crate::views::series::{SeriesInstance, StorageMethods};

        let mut series = SeriesInstance::new(StorageMethods::empty());
        series.set_values(&[1.0, 2.0, 3.0]);

        let mut obs = ObservationRecord::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        obs.set_use_transducer(true);
        obs.add_channel_instance_with_series(0, vec![series]);

        let mut monitor_settings = MonitorSettingsRecord::new();
        monitor_settings.add_channel_setting(0, 120.0, 1.0);

        let values = obs.original_values(0, 0, Some(&monitor_settings)).unwrap();
        assert_eq!(values, vec![120.0, 240.0, 360.0]);
    }

    #[test]
    fn original_values_ignores_ratio_without_use_transducer() {
        use crate::views::series::{SeriesInstance, StorageMethods};

        let mut series = SeriesInstance::new(StorageMethods::empty());
        series.set_values(&[1.0, 2.0]);

        let mut obs = ObservationRecord::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        obs.add_channel_instance_with_series(0, vec![series]);

        let mut monitor_settings = MonitorSettingsRecord::new();
        monitor_settings.add_channel_setting(0, 120.0, 1.0);

        let values = obs.original_values(0, 0, Some(&monitor_settings)).unwrap();
        assert_eq!(values, vec![1.0, 2.0]);
    }
}
