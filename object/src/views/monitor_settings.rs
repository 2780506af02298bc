//! `MonitorSettingsRecord` and `ChannelSetting` (§4.G): per-channel
//! transducer-ratio settings in force for the data source's channels.

use pqdif_core::{Collection, PhysicalType, ScalarValue};

use crate::error::{MissingFieldSnafu, Result};
use crate::well_known::*;

const CHANNEL_SETTING: &str = "ChannelSetting";

/// Typed view over a MonitorSettings record's root collection.
#[derive(Debug, Clone)]
pub struct MonitorSettingsRecord {
    root: Collection,
}

impl MonitorSettingsRecord {
    /// Wrap an already-parsed root collection as a `MonitorSettingsRecord`.
    pub fn from_collection(root: Collection) -> Result<Self> {
        Ok(MonitorSettingsRecord { root })
    }

    /// Build an empty MonitorSettings record.
    pub fn new() -> Self {
        MonitorSettingsRecord {
            root: Collection::new(RECORD_TYPE_MONITOR_SETTINGS),
        }
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

    /// Every `ChannelSetting` child, in collection order.
    pub fn channel_settings(&self) -> Vec<ChannelSetting> {
        self.root
            .get_collection_by_tag(TAG_CHANNEL_SETTINGS)
            .into_iter()
            .flat_map(|c| c.children())
            .filter_map(|e| e.as_collection())
            .map(|c| ChannelSetting { root: c.clone() })
            .collect()
    }

    /// The `ChannelSetting` naming `definition_index` among the data
    /// source's `ChannelDefinitions`, if this record carries one (§4.G:
    /// consulted by `SeriesInstance::original_values` for the transducer
    /// ratio).
    pub fn channel_setting_for(&self, definition_index: u32) -> Option<ChannelSetting> {
        self.channel_settings()
            .into_iter()
            .find(|cs| cs.definition_index().ok() == Some(definition_index))
    }

    /// Append a new `ChannelSetting` for `definition_index` with the given
    /// transducer ratio sides, auto-creating the `ChannelSettings`
    /// collection on first insert (§4.G).
    pub fn add_channel_setting(&mut self, definition_index: u32, system_side_ratio: f64, monitor_side_ratio: f64) -> &mut Self {
        if self.root.get_collection_by_tag(TAG_CHANNEL_SETTINGS).is_none() {
            self.root.add(Collection::new(TAG_CHANNEL_SETTINGS));
        }
        let mut child = Collection::new(TAG_CHANNEL_SETTING);
        child
            .get_or_add_scalar(TAG_CHANNEL_SETTING_DEFINITION_INDEX, PhysicalType::UnsignedInteger4)
            .set(ScalarValue::UnsignedInteger4(definition_index));
        child
            .get_or_add_scalar(TAG_TRANSDUCER_RATIO_SYSTEM_SIDE, PhysicalType::Real8)
            .set(ScalarValue::Real8(system_side_ratio));
        child
            .get_or_add_scalar(TAG_TRANSDUCER_RATIO_MONITOR_SIDE, PhysicalType::Real8)
            .set(ScalarValue::Real8(monitor_side_ratio));

        let container = self
            .root
            .children_mut()
            .find(|e| e.tag() == TAG_CHANNEL_SETTINGS)
            .and_then(|e| e.as_collection_mut())
            .expect("just ensured above");
        container.add(child);
        self
    }
}

impl Default for MonitorSettingsRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// A single channel's transducer-ratio setting (§4.G).
#[derive(Debug, Clone)]
pub struct ChannelSetting {
    root: Collection,
}

impl ChannelSetting {
    /// The index into the data source's `ChannelDefinitions` this setting
    /// applies to.
    pub fn definition_index(&self) -> Result<u32> {
        self.root
            .get_scalar_by_tag(TAG_CHANNEL_SETTING_DEFINITION_INDEX)
            .and_then(|s| s.get_u4().ok())
            .ok_or_else(|| {
                MissingFieldSnafu {
                    record: CHANNEL_SETTING,
                    tag: TAG_CHANNEL_SETTING_DEFINITION_INDEX,
                }
                .build()
            })
    }

    /// The system-side magnitude of the transducer ratio, if set.
    pub fn transducer_ratio_system_side(&self) -> Option<f64> {
        self.root.get_scalar_by_tag(TAG_TRANSDUCER_RATIO_SYSTEM_SIDE).and_then(|s| s.get_real8().ok())
    }

    /// The monitor-side magnitude of the transducer ratio, if set.
    pub fn transducer_ratio_monitor_side(&self) -> Option<f64> {
        self.root.get_scalar_by_tag(TAG_TRANSDUCER_RATIO_MONITOR_SIDE).and_then(|s| s.get_real8().ok())
    }

    /// `system_side / monitor_side`, when both sides are present (§4.G).
    pub fn ratio(&self) -> Option<f64> {
        match (self.transducer_ratio_system_side(), self.transducer_ratio_monitor_side()) {
            (Some(system_side), Some(monitor_side)) => Some(system_side / monitor_side),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_channel_setting_creates_container_lazily() {
        let mut ms = MonitorSettingsRecord::new();
        assert!(ms.channel_settings().is_empty());
        ms.add_channel_setting(3, 120.0, 1.0);
        let found = ms.channel_setting_for(3).unwrap();
        assert_eq!(found.definition_index().unwrap(), 3);
        assert_eq!(found.ratio(), Some(120.0));
    }

    #[test]
    fn ratio_requires_both_sides() {
        let ms = MonitorSettingsRecord::new();
        assert!(ms.channel_setting_for(0).is_none());
    }

    #[test]
    fn unset_channel_setting_ratio_is_none_before_insertion() {
        let root = Collection::new(RECORD_TYPE_MONITOR_SETTINGS);
        let ms = MonitorSettingsRecord::from_collection(root).unwrap();
        assert!(ms.channel_setting_for(0).is_none());
    }
}
