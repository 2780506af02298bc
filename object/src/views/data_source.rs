//! `DataSourceRecord` and `ChannelDefinition` (§4.G): describes the
//! instrument and the channels it monitors.

use chrono::{DateTime, Utc};
use pqdif_core::{Collection, Identifier, PhysicalType, ScalarValue};

use crate::error::{MissingFieldSnafu, Result};
use crate::views::container::{char1_vector_to_string, set_char1_vector};
use crate::well_known::*;

const RECORD_NAME: &str = "DataSourceRecord";
const CHANNEL_DEFINITION: &str = "ChannelDefinition";

/// Typed view over a DataSource record's root collection.
#[derive(Debug, Clone)]
pub struct DataSourceRecord {
    root: Collection,
}

impl DataSourceRecord {
    pub fn from_collection(root: Collection) -> Result<Self> {
        Ok(DataSourceRecord { root })
    }

    pub fn new(name: impl Into<String>) -> Self {
        let mut record = DataSourceRecord {
            root: Collection::new(RECORD_TYPE_DATA_SOURCE),
        };
        record.set_data_source_name(name);
        record
    }

    pub fn into_collection(self) -> Collection {
        self.root
    }

    /// Borrow the root collection backing this view, for writing without
    /// consuming it.
    pub fn root(&self) -> &Collection {
        &self.root
    }

    pub fn data_source_name(&self) -> Option<String> {
        self.root.get_vector_by_tag(TAG_DATA_SOURCE_NAME).map(char1_vector_to_string)
    }

    pub fn set_data_source_name(&mut self, name: impl Into<String>) {
        set_char1_vector(&mut self.root, TAG_DATA_SOURCE_NAME, &name.into());
    }

    pub fn effective_from(&self) -> Option<DateTime<Utc>> {
        self.root.get_scalar_by_tag(TAG_EFFECTIVE_FROM).and_then(|s| s.get_timestamp().ok())
    }

    pub fn set_effective_from(&mut self, at: DateTime<Utc>) {
        self.root
            .get_or_add_scalar(TAG_EFFECTIVE_FROM, PhysicalType::Timestamp)
            .set(ScalarValue::Timestamp(at));
    }

    pub fn effective_to(&self) -> Option<DateTime<Utc>> {
        self.root.get_scalar_by_tag(TAG_EFFECTIVE_TO).and_then(|s| s.get_timestamp().ok())
    }

    pub fn set_effective_to(&mut self, at: DateTime<Utc>) {
        self.root
            .get_or_add_scalar(TAG_EFFECTIVE_TO, PhysicalType::Timestamp)
            .set(ScalarValue::Timestamp(at));
    }

    /// Every `ChannelDefinition` child, in collection order.
    pub fn channel_definitions(&self) -> Vec<ChannelDefinition> {
        self.root
            .get_collection_by_tag(TAG_CHANNEL_DEFINITIONS)
            .into_iter()
            .flat_map(|c| c.children())
            .filter_map(|e| e.as_collection())
            .map(|c| ChannelDefinition { root: c.clone() })
            .collect()
    }

    /// Append a new `ChannelDefinition`, auto-creating the
    /// `ChannelDefinitions` collection on first insert (§4.G, mirroring
    /// the Observation/ChannelInstances cross-cutting behavior).
    pub fn add_channel_definition(&mut self, quantity_type: Identifier) -> &mut Self {
        if self.root.get_collection_by_tag(TAG_CHANNEL_DEFINITIONS).is_none() {
            self.root.add(Collection::new(TAG_CHANNEL_DEFINITIONS));
        }
        let mut child = Collection::new(TAG_CHANNEL_DEFINITION);
        child
            .get_or_add_scalar(TAG_QUANTITY_TYPE_ID, PhysicalType::Guid)
            .set(ScalarValue::Guid(quantity_type));

        let container = self
            .root
            .children_mut()
            .find(|e| e.tag() == TAG_CHANNEL_DEFINITIONS)
            .and_then(|e| e.as_collection_mut())
            .expect("just ensured above");
        container.add(child);
        self
    }
}

/// A single channel's static definition (§4.G).
#[derive(Debug, Clone)]
pub struct ChannelDefinition {
    root: Collection,
}

impl ChannelDefinition {
    /// The well-known identifier naming the kind of quantity this channel
    /// measures (resolved against the `QuantityType` semantic helper).
    pub fn quantity_type(&self) -> Result<Identifier> {
        self.root
            .get_scalar_by_tag(TAG_QUANTITY_TYPE_ID)
            .and_then(|s| s.get_guid().ok())
            .ok_or_else(|| {
                MissingFieldSnafu {
                    record: CHANNEL_DEFINITION,
                    tag: TAG_QUANTITY_TYPE_ID,
                }
                .build()
            })
    }

    pub fn name(&self) -> Option<String> {
        self.root.get_vector_by_tag(TAG_CHANNEL_DEFINITION_NAME).map(char1_vector_to_string)
    }

    pub fn equipment(&self) -> Option<Identifier> {
        self.root.get_scalar_by_tag(TAG_EQUIPMENT).and_then(|s| s.get_guid().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn tag(n: u128) -> Identifier {
        Identifier::from_uuid(Uuid::from_u128(n))
    }

    #[test]
    fn add_channel_definition_creates_container_lazily() {
        let mut ds = DataSourceRecord::new("meter-1");
        assert!(ds.channel_definitions().is_empty());
        ds.add_channel_definition(tag(42));
        let defs = ds.channel_definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].quantity_type().unwrap(), tag(42));
    }
}
