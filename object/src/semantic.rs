//! Semantic helper caches (§4.F): thin, self-invalidating maps from a
//! well-known tag's enumerated `Identifier`s to their [`IdentifierEntry`]
//! metadata, built once from the live [`TagRegistry`](crate::registry)
//! snapshot and rebuilt only when that snapshot changes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pqdif_core::Identifier;

use crate::registry::{self, IdentifierEntry, TagInfo};
use crate::well_known;

type Snapshot = (Arc<TagInfo>, Arc<HashMap<Identifier, IdentifierEntry>>);

/// A cache from one well-known enumerated tag's values to their metadata,
/// invalidated by comparing the registry's `TagInfo` pointer rather than
/// re-parsing on every lookup (§4.F, §9).
pub struct SemanticLookup {
    tag: Identifier,
    cache: Mutex<Option<Snapshot>>,
}

impl SemanticLookup {
    const fn new(tag: Identifier) -> Self {
        SemanticLookup {
            tag,
            cache: Mutex::new(None),
        }
    }

    /// Resolve `value` against this lookup's enumerated identifiers, or
    /// `None` if the tag is unregistered or `value` is not among its
    /// enumerated entries.
    pub fn get(&self, value: Identifier) -> Option<IdentifierEntry> {
        let info = registry::get(self.tag)?;
        let mut guard = self.cache.lock().unwrap();
        let stale = match &*guard {
            Some((cached, _)) => !Arc::ptr_eq(cached, &info),
            None => true,
        };
        if stale {
            let map = info.identifiers.iter().map(|e| (e.value, e.clone())).collect();
            *guard = Some((Arc::clone(&info), Arc::new(map)));
        }
        guard.as_ref().and_then(|(_, map)| map.get(&value).cloned())
    }

    /// Every enumerated entry currently registered for this tag.
    pub fn entries(&self) -> Vec<IdentifierEntry> {
        match registry::get(self.tag) {
            Some(info) => info.identifiers.clone(),
            None => Vec::new(),
        }
    }
}

/// `QuantityType` enumeration (§4.F): the kind of physical quantity a
/// channel measures (voltage, current, ...).
pub static QUANTITY_TYPE: SemanticLookup = SemanticLookup::new(well_known::TAG_QUANTITY_TYPE_ID);

/// `Equipment` enumeration (§4.F): the kind of equipment a channel is
/// attached to.
pub static EQUIPMENT: SemanticLookup = SemanticLookup::new(well_known::TAG_EQUIPMENT);

/// `DisturbanceCategory` enumeration (§4.F): the kind of disturbance that
/// triggered an observation.
pub static DISTURBANCE_CATEGORY: SemanticLookup = SemanticLookup::new(well_known::TAG_DISTURBANCE_CATEGORY_ID);

/// `SeriesValueType` enumeration (§4.F): what a series' values represent
/// (time, instantaneous value, minimum, maximum, ...).
pub static SERIES_VALUE_TYPE: SemanticLookup = SemanticLookup::new(well_known::TAG_VALUE_TYPE_ID);

/// `QuantityCharacteristic` enumeration (§4.F): the waveform
/// characteristic a series captures (RMS, peak, ...).
pub static QUANTITY_CHARACTERISTIC: SemanticLookup = SemanticLookup::new(well_known::TAG_QUANTITY_CHARACTERISTIC_ID);
