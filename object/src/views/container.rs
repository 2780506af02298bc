//! `ContainerRecord` (§4.G): the file's leading record, carrying version
//! info, file name, creation time and compression settings.

use chrono::{DateTime, Utc};
use pqdif_core::{Collection, PhysicalType, ScalarValue};

use crate::error::{MissingFieldSnafu, Result};
use crate::well_known::*;

const RECORD_NAME: &str = "ContainerRecord";

/// Typed view over a Container record's root collection.
#[derive(Debug, Clone)]
pub struct ContainerRecord {
    root: Collection,
}

impl ContainerRecord {
    /// Wrap an already-parsed root collection as a `ContainerRecord`.
    pub fn from_collection(root: Collection) -> Result<Self> {
        Ok(ContainerRecord { root })
    }

    /// Build a fresh Container record with the creation defaults named in
    /// §4.G: `writer = 1.5`, `compatible = 1.0`, a timestamped file name,
    /// and `creation = now`.
    pub fn new(file_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        let mut record = ContainerRecord {
            root: Collection::new(RECORD_TYPE_CONTAINER),
        };
        record.set_writer_version(1, 5);
        record.set_compatible_version(1, 0);
        record.set_file_name(file_name);
        record.set_creation_time(now);
        record
    }

    /// Build a Container record with the standard default file name,
    /// `yyyy-MM-dd_HH.mm.ss.pqd`, derived from `now`.
    pub fn with_default_file_name(now: DateTime<Utc>) -> Self {
        let name = now.format("%Y-%m-%d_%H.%M.%S.pqd").to_string();
        Self::new(name, now)
    }

    /// The root collection backing this view.
    pub fn into_collection(self) -> Collection {
        self.root
    }

    /// Borrow the root collection backing this view, for writing without
    /// consuming it.
    pub fn root(&self) -> &Collection {
        &self.root
    }

    fn version_info(&self) -> Result<&pqdif_core::Vector> {
        self.root
            .get_vector_by_tag(TAG_VERSION_INFO)
            .ok_or_else(|| {
                MissingFieldSnafu {
                    record: RECORD_NAME,
                    tag: TAG_VERSION_INFO,
                }
                .build()
            })
    }

    fn version_component(&self, index: usize) -> Result<u32> {
        match self.version_info()?.get(index) {
            ScalarValue::UnsignedInteger4(v) => Ok(v),
            _ => MissingFieldSnafu {
                record: RECORD_NAME,
                tag: TAG_VERSION_INFO,
            }
            .fail(),
        }
    }

    /// `VersionInfo[0]`: the major version of the writer that produced
    /// this file.
    pub fn writer_major(&self) -> Result<u32> {
        self.version_component(0)
    }

    /// `VersionInfo[1]`: the minor version of the writer that produced
    /// this file.
    pub fn writer_minor(&self) -> Result<u32> {
        self.version_component(1)
    }

    /// `VersionInfo[2]`: the major version this file is compatible with.
    pub fn compatible_major(&self) -> Result<u32> {
        self.version_component(2)
    }

    /// `VersionInfo[3]`: the minor version this file is compatible with.
    pub fn compatible_minor(&self) -> Result<u32> {
        self.version_component(3)
    }

    fn set_version_component(&mut self, index: usize, value: u32) {
        let v = self.root.get_or_add_vector(TAG_VERSION_INFO, PhysicalType::UnsignedInteger4);
        if v.len() < 4 {
            v.resize(4);
        }
        v.set(index, ScalarValue::UnsignedInteger4(value));
    }

    /// Set `VersionInfo[0..2]`, the writer's own version.
    pub fn set_writer_version(&mut self, major: u32, minor: u32) {
        self.set_version_component(0, major);
        self.set_version_component(1, minor);
    }

    /// Set `VersionInfo[2..4]`, the compatible version.
    pub fn set_compatible_version(&mut self, major: u32, minor: u32) {
        self.set_version_component(2, major);
        self.set_version_component(3, minor);
    }

    /// The file name this container was written under.
    pub fn file_name(&self) -> Result<String> {
        let v = self.root.get_vector_by_tag(TAG_FILE_NAME).ok_or_else(|| {
            MissingFieldSnafu {
                record: RECORD_NAME,
                tag: TAG_FILE_NAME,
            }
            .build()
        })?;
        Ok(char1_vector_to_string(v))
    }

    /// Overwrite the file name.
    pub fn set_file_name(&mut self, name: impl Into<String>) {
        set_char1_vector(&mut self.root, TAG_FILE_NAME, &name.into());
    }

    /// UTC creation timestamp.
    pub fn creation_time(&self) -> Result<DateTime<Utc>> {
        self.root
            .get_scalar_by_tag(TAG_CREATION)
            .and_then(|s| s.get_timestamp().ok())
            .ok_or_else(|| {
                MissingFieldSnafu {
                    record: RECORD_NAME,
                    tag: TAG_CREATION,
                }
                .build()
            })
    }

    /// Overwrite the creation timestamp.
    pub fn set_creation_time(&mut self, at: DateTime<Utc>) {
        self.root
            .get_or_add_scalar(TAG_CREATION, PhysicalType::Timestamp)
            .set(ScalarValue::Timestamp(at));
    }

    /// The raw `CompressionAlgorithm` integer, if present.
    pub fn compression_algorithm_raw(&self) -> Option<u32> {
        self.root.get_scalar_by_tag(TAG_COMPRESSION_ALGORITHM).and_then(|s| s.get_u4().ok())
    }

    /// The raw `CompressionStyle` integer, if present.
    pub fn compression_style_raw(&self) -> Option<u32> {
        self.root.get_scalar_by_tag(TAG_COMPRESSION_STYLE).and_then(|s| s.get_u4().ok())
    }

    /// Set the record-level compression this file declares.
    pub fn set_compression(&mut self, algorithm: u32, style: u32) {
        self.root
            .get_or_add_scalar(TAG_COMPRESSION_ALGORITHM, PhysicalType::UnsignedInteger4)
            .set(ScalarValue::UnsignedInteger4(algorithm));
        self.root
            .get_or_add_scalar(TAG_COMPRESSION_STYLE, PhysicalType::UnsignedInteger4)
            .set(ScalarValue::UnsignedInteger4(style));
    }
}

/// Decode a `Char1` vector as a `String`, one byte per code unit (ASCII,
/// per §3).
pub(crate) fn char1_vector_to_string(v: &pqdif_core::Vector) -> String {
    let mut s = String::with_capacity(v.len());
    for i in 0..v.len() {
        if let ScalarValue::Char1(b) = v.get(i) {
            s.push(b as char);
        }
    }
    s
}

/// Replace (or create) a `Char1` vector child with the bytes of `s`.
pub(crate) fn set_char1_vector(root: &mut Collection, tag: pqdif_core::Identifier, s: &str) {
    let v = root.get_or_add_vector(tag, PhysicalType::Char1);
    v.resize(s.len());
    for (i, b) in s.bytes().enumerate() {
        v.set(i, ScalarValue::Char1(b));
    }
}
