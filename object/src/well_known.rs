//! Well-known tag identifiers (§4.F, §6): the closed list of record types
//! and field tags the semantic views address by name.
//!
//! The reference source's actual bit patterns are an external artifact we
//! do not have on hand; the identifiers below are this codec's own stable
//! internal set, chosen once and never renumbered (see `DESIGN.md`). They
//! line up with the standard-name entries in the bundled tag-definition
//! document (`pqdif-dictionary-std`).

use pqdif_core::Identifier;
use uuid::Uuid;

const fn id(n: u128) -> Identifier {
    Identifier::from_uuid(Uuid::from_u128(n))
}

/// Constant per file, identifying it as PQDIF.
pub const RECORD_SIGNATURE: Identifier = id(0xA1FA_8B9D_5C1B_2C5E_89C9_C5B8_2B5A_EDA7);

pub const RECORD_TYPE_CONTAINER: Identifier = id(0x8DB1_1519_0000_0000_0000_000000000000);
pub const RECORD_TYPE_DATA_SOURCE: Identifier = id(0x8DB1_1519_0000_0000_0000_000000000001);
pub const RECORD_TYPE_MONITOR_SETTINGS: Identifier = id(0x8DB1_1519_0000_0000_0000_000000000002);
pub const RECORD_TYPE_OBSERVATION: Identifier = id(0x8DB1_1519_0000_0000_0000_000000000003);

pub const TAG_VERSION_INFO: Identifier = id(0x8DB1_1520_0000_0000_0000_000000000001);
pub const TAG_FILE_NAME: Identifier = id(0x8DB1_1520_0000_0000_0000_000000000002);
pub const TAG_CREATION: Identifier = id(0x8DB1_1520_0000_0000_0000_000000000003);
pub const TAG_COMPRESSION_ALGORITHM: Identifier = id(0x8DB1_1520_0000_0000_0000_000000000004);
pub const TAG_COMPRESSION_STYLE: Identifier = id(0x8DB1_1520_0000_0000_0000_000000000005);

pub const TAG_EFFECTIVE_FROM: Identifier = id(0x8DB1_1521_0000_0000_0000_000000000001);
pub const TAG_EFFECTIVE_TO: Identifier = id(0x8DB1_1521_0000_0000_0000_000000000002);
pub const TAG_DATA_SOURCE_NAME: Identifier = id(0x8DB1_1521_0000_0000_0000_000000000003);
pub const TAG_CHANNEL_DEFINITIONS: Identifier = id(0x8DB1_1521_0000_0000_0000_000000000004);
pub const TAG_CHANNEL_DEFINITION: Identifier = id(0x8DB1_1521_0000_0000_0000_000000000005);

pub const TAG_QUANTITY_TYPE_ID: Identifier = id(0x8DB1_1522_0000_0000_0000_000000000001);
pub const TAG_CHANNEL_DEFINITION_NAME: Identifier = id(0x8DB1_1522_0000_0000_0000_000000000002);
pub const TAG_EQUIPMENT: Identifier = id(0x8DB1_1522_0000_0000_0000_000000000003);
pub const TAG_DISTURBANCE_CATEGORY_ID: Identifier = id(0x8DB1_1530_0000_0000_0000_000000000007);
pub const TAG_QUANTITY_CHARACTERISTIC_ID: Identifier = id(0x8DB1_1532_0000_0000_0000_000000000007);

pub const TAG_CHANNEL_SETTINGS: Identifier = id(0x8DB1_1523_0000_0000_0000_000000000001);
pub const TAG_CHANNEL_SETTING: Identifier = id(0x8DB1_1523_0000_0000_0000_000000000002);
pub const TAG_CHANNEL_SETTING_DEFINITION_INDEX: Identifier = id(0x8DB1_1523_0000_0000_0000_000000000003);
pub const TAG_TRANSDUCER_RATIO_SYSTEM_SIDE: Identifier = id(0x8DB1_1523_0000_0000_0000_000000000004);
pub const TAG_TRANSDUCER_RATIO_MONITOR_SIDE: Identifier = id(0x8DB1_1523_0000_0000_0000_000000000005);

pub const TAG_OBSERVATION_NAME: Identifier = id(0x8DB1_1530_0000_0000_0000_000000000001);
pub const TAG_START_TIME: Identifier = id(0x8DB1_1530_0000_0000_0000_000000000002);
pub const TAG_CHANNEL_INSTANCES: Identifier = id(0x8DB1_1530_0000_0000_0000_000000000003);
pub const TAG_CHANNEL_INSTANCE: Identifier = id(0x8DB1_1530_0000_0000_0000_000000000004);
pub const TAG_CHANNEL_INSTANCE_DEFINITION_INDEX: Identifier = id(0x8DB1_1530_0000_0000_0000_000000000005);
pub const TAG_USE_TRANSDUCER: Identifier = id(0x8DB1_1530_0000_0000_0000_000000000006);

pub const TAG_SERIES_INSTANCES: Identifier = id(0x8DB1_1531_0000_0000_0000_000000000001);
pub const TAG_SERIES_INSTANCE: Identifier = id(0x8DB1_1531_0000_0000_0000_000000000002);

pub const TAG_VALUES: Identifier = id(0x8DB1_1532_0000_0000_0000_000000000001);
pub const TAG_STORAGE_METHOD_ID: Identifier = id(0x8DB1_1532_0000_0000_0000_000000000002);
pub const TAG_VALUE_TYPE_ID: Identifier = id(0x8DB1_1532_0000_0000_0000_000000000003);
pub const TAG_SCALE: Identifier = id(0x8DB1_1532_0000_0000_0000_000000000004);
pub const TAG_OFFSET: Identifier = id(0x8DB1_1532_0000_0000_0000_000000000005);
pub const TAG_SERIES_SHARE_INDEX: Identifier = id(0x8DB1_1532_0000_0000_0000_000000000006);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_well_known_tag_is_distinct() {
        let all = [
            RECORD_SIGNATURE,
            RECORD_TYPE_CONTAINER,
            RECORD_TYPE_DATA_SOURCE,
            RECORD_TYPE_MONITOR_SETTINGS,
            RECORD_TYPE_OBSERVATION,
            TAG_VERSION_INFO,
            TAG_FILE_NAME,
            TAG_CREATION,
            TAG_COMPRESSION_ALGORITHM,
            TAG_COMPRESSION_STYLE,
            TAG_EFFECTIVE_FROM,
            TAG_EFFECTIVE_TO,
            TAG_DATA_SOURCE_NAME,
            TAG_CHANNEL_DEFINITIONS,
            TAG_CHANNEL_DEFINITION,
            TAG_QUANTITY_TYPE_ID,
            TAG_CHANNEL_DEFINITION_NAME,
            TAG_EQUIPMENT,
            TAG_DISTURBANCE_CATEGORY_ID,
            TAG_QUANTITY_CHARACTERISTIC_ID,
            TAG_CHANNEL_SETTINGS,
            TAG_CHANNEL_SETTING,
            TAG_CHANNEL_SETTING_DEFINITION_INDEX,
            TAG_TRANSDUCER_RATIO_SYSTEM_SIDE,
            TAG_TRANSDUCER_RATIO_MONITOR_SIDE,
            TAG_OBSERVATION_NAME,
            TAG_START_TIME,
            TAG_CHANNEL_INSTANCES,
            TAG_CHANNEL_INSTANCE,
            TAG_CHANNEL_INSTANCE_DEFINITION_INDEX,
            TAG_USE_TRANSDUCER,
            TAG_SERIES_INSTANCES,
            TAG_SERIES_INSTANCE,
            TAG_VALUES,
            TAG_STORAGE_METHOD_ID,
            TAG_VALUE_TYPE_ID,
            TAG_SCALE,
            TAG_OFFSET,
            TAG_SERIES_SHARE_INDEX,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
