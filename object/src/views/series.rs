//! `SeriesInstance` (§4.G, §8): one column of data within a channel
//! instance, together with the increment-expansion, scale/offset, and
//! series-share algebra that turns its raw storage into `OriginalValues`.

use std::collections::HashSet;

use pqdif_core::{Collection, Identifier, PhysicalType, ScalarValue, Vector};

use crate::error::{Result, SeriesShareCycleSnafu};
use crate::well_known::*;

bitflags::bitflags! {
    /// Bits of `StorageMethodID` selecting how `Values` must be decoded
    /// (§4.G).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StorageMethods: u32 {
        /// `Values` holds `(count, increment)` pairs to be expanded rather
        /// than literal series values (§8).
        const INCREMENT = 0x1;
        /// Raw values must be transformed by `offset + scale * raw` before
        /// use, except when the series' value type is `Timestamp` (§8).
        const SCALED = 0x2;
    }
}

/// Typed view over a SeriesInstance record's root collection.
#[derive(Debug, Clone)]
pub struct SeriesInstance {
    root: Collection,
}

impl SeriesInstance {
    /// Wrap an already-parsed root collection as a `SeriesInstance`.
    pub fn from_collection(root: Collection) -> Self {
        SeriesInstance { root }
    }

    /// Build an empty series of the given storage methods.
    pub fn new(storage_methods: StorageMethods) -> Self {
        let mut root = Collection::new(TAG_SERIES_INSTANCE);
        root.get_or_add_scalar(TAG_STORAGE_METHOD_ID, PhysicalType::UnsignedInteger4)
            .set(ScalarValue::UnsignedInteger4(storage_methods.bits()));
        SeriesInstance { root }
    }

    /// Consume the view, returning its root collection.
    pub fn into_collection(self) -> Collection {
        self.root
    }

    /// The identifier naming the kind of value this series stores (e.g.
    /// time, min, max), if set.
    pub fn value_type(&self) -> Option<Identifier> {
        self.root.get_scalar_by_tag(TAG_VALUE_TYPE_ID).and_then(|s| s.get_guid().ok())
    }

    /// The identifier naming the waveform characteristic this series
    /// captures (e.g. RMS, peak), if set.
    pub fn quantity_characteristic(&self) -> Option<Identifier> {
        self.root.get_scalar_by_tag(TAG_QUANTITY_CHARACTERISTIC_ID).and_then(|s| s.get_guid().ok())
    }

    /// The `StorageMethodID` bit flags governing how `Values` is decoded.
    /// Defaults to empty (no increment expansion, no scaling) when unset.
    pub fn storage_methods(&self) -> StorageMethods {
        match self.root.get_scalar_by_tag(TAG_STORAGE_METHOD_ID).and_then(|s| s.get_u4().ok()) {
            Some(bits) => StorageMethods::from_bits_truncate(bits),
            None => StorageMethods::empty(),
        }
    }

    /// The index, among the same channel instance's series, this series
    /// shares scale/offset/values with when its own elements are absent.
    pub fn series_share_index(&self) -> Option<usize> {
        self.root
            .get_scalar_by_tag(TAG_SERIES_SHARE_INDEX)
            .and_then(|s| s.get_u4().ok())
            .map(|v| v as usize)
    }

    /// Set the `SeriesShareIndex`, so this series falls back to another's
    /// scale/offset/values when its own are absent.
    pub fn set_series_share_index(&mut self, index: usize) {
        self.root
            .get_or_add_scalar(TAG_SERIES_SHARE_INDEX, PhysicalType::UnsignedInteger4)
            .set(ScalarValue::UnsignedInteger4(index as u32));
    }

    /// This series' own `Scale`, not following a share chain.
    fn own_scale(&self) -> Option<f64> {
        self.root.get_scalar_by_tag(TAG_SCALE).and_then(|s| s.get_real8().ok())
    }

    /// This series' own `Offset`, not following a share chain.
    fn own_offset(&self) -> Option<f64> {
        self.root.get_scalar_by_tag(TAG_OFFSET).and_then(|s| s.get_real8().ok())
    }

    /// This series' own `Values` vector, not following a share chain.
    fn own_values_vector(&self) -> Option<&Vector> {
        self.root.get_vector_by_tag(TAG_VALUES)
    }

    /// Replace (or create) the `Values` vector, storing `values` as
    /// `Real8` literals (`StorageMethods::INCREMENT` is the caller's
    /// responsibility to set and encode for separately).
    pub fn set_values(&mut self, values: &[f64]) {
        let v = self.root.get_or_add_vector(TAG_VALUES, PhysicalType::Real8);
        v.resize(values.len());
        for (i, value) in values.iter().enumerate() {
            v.set(i, ScalarValue::Real8(*value));
        }
    }

    /// `OriginalValues` for this series (§4.G, §8): increment-expand raw
    /// storage, apply `offset + scale * raw` unless the resolved values
    /// are `Timestamp`s, then apply the caller-supplied transducer
    /// `ratio` (also bypassed for timestamps). `index` must be this
    /// series' own position within `siblings`, which must list every
    /// series of the same channel instance in collection order so that
    /// `SeriesShareIndex` can be followed.
    pub fn original_values(&self, index: usize, siblings: &[SeriesInstance], ratio: Option<f64>) -> Result<Vec<f64>> {
        let (raw, is_timestamp, methods) = resolve_values(siblings, index)?;

        let scaled = if methods.contains(StorageMethods::SCALED) && !is_timestamp {
            let scale = resolve_scalar(siblings, index, SeriesInstance::own_scale)?.unwrap_or(1.0);
            let offset = resolve_scalar(siblings, index, SeriesInstance::own_offset)?.unwrap_or(0.0);
            raw.into_iter().map(|v| offset + scale * v).collect()
        } else {
            raw
        };

        Ok(match ratio {
            Some(ratio) if !is_timestamp => scaled.into_iter().map(|v| v * ratio).collect(),
            _ => scaled,
        })
    }
}

fn decode_vector_to_f64(v: &Vector) -> Vec<f64> {
    (0..v.len())
        .map(|i| match v.get(i) {
            ScalarValue::Real4(x) => x as f64,
            ScalarValue::Real8(x) => x,
            ScalarValue::Integer1(x) => x as f64,
            ScalarValue::Integer2(x) => x as f64,
            ScalarValue::Integer4(x) => x as f64,
            ScalarValue::UnsignedInteger1(x) => x as f64,
            ScalarValue::UnsignedInteger2(x) => x as f64,
            ScalarValue::UnsignedInteger4(x) => x as f64,
            ScalarValue::Timestamp(ts) => ts.timestamp() as f64 + f64::from(ts.timestamp_subsec_nanos()) / 1e9,
            ScalarValue::Boolean1(b) | ScalarValue::Boolean2(b) | ScalarValue::Boolean4(b) => {
                if b { 1.0 } else { 0.0 }
            }
            ScalarValue::Char1(c) => f64::from(c),
            ScalarValue::Char2(c) => f64::from(c),
            ScalarValue::Complex8(re, _) => re as f64,
            ScalarValue::Complex16(re, _) => re,
            ScalarValue::Guid(_) => 0.0,
        })
        .collect()
}

/// Expand a leading `rate_count` followed by `(count, increment)` pairs into
/// literal series values (§8): `item[j + Σ_{m<i} c_m] = (Σ_{m<i} c_m·inc_m) +
/// j·inc_i`. The leading `rate_count` field itself is not part of any pair
/// and is only skipped over.
fn expand_increments(raw: &[f64]) -> Vec<f64> {
    let Some((_rate_count, pairs)) = raw.split_first() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut cumulative_start = 0.0;
    for pair in pairs.chunks_exact(2) {
        let count = pair[0] as usize;
        let increment = pair[1];
        for j in 0..count {
            out.push(cumulative_start + (j as f64) * increment);
        }
        cumulative_start += (count as f64) * increment;
    }
    out
}

/// Follow `SeriesShareIndex` from `start` until a series with its own
/// `Values` is found, detecting cycles (§9 hardening choice).
fn resolve_values(siblings: &[SeriesInstance], start: usize) -> Result<(Vec<f64>, bool, StorageMethods)> {
    let mut seen = HashSet::new();
    let mut idx = start;
    loop {
        if !seen.insert(idx) {
            return SeriesShareCycleSnafu { start }.fail();
        }
        let Some(series) = siblings.get(idx) else {
            return SeriesShareCycleSnafu { start }.fail();
        };
        if let Some(vector) = series.own_values_vector() {
            let is_timestamp = vector.value_type() == PhysicalType::Timestamp;
            let raw = decode_vector_to_f64(vector);
            let methods = series.storage_methods();
            let values = if methods.contains(StorageMethods::INCREMENT) {
                expand_increments(&raw)
            } else {
                raw
            };
            return Ok((values, is_timestamp, methods));
        }
        match series.series_share_index() {
            Some(next) => idx = next,
            None => return Ok((Vec::new(), false, StorageMethods::empty())),
        }
    }
}

/// Follow `SeriesShareIndex` from `start` to resolve a per-series scalar
/// field (`Scale` or `Offset`) through `getter`, detecting cycles.
fn resolve_scalar(
    siblings: &[SeriesInstance],
    start: usize,
    getter: impl Fn(&SeriesInstance) -> Option<f64>,
) -> Result<Option<f64>> {
    let mut seen = HashSet::new();
    let mut idx = start;
    loop {
        if !seen.insert(idx) {
            return SeriesShareCycleSnafu { start }.fail();
        }
        let Some(series) = siblings.get(idx) else {
            return SeriesShareCycleSnafu { start }.fail();
        };
        if let Some(value) = getter(series) {
            return Ok(Some(value));
        }
        match series.series_share_index() {
            Some(next) => idx = next,
            None => return Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_values_round_trip_without_scaling() {
        let mut s = SeriesInstance::new(StorageMethods::empty());
        s.set_values(&[1.0, 2.0, 3.0]);
        let siblings = vec![s.clone()];
        assert_eq!(siblings[0].original_values(0, &siblings, None).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn scaled_values_apply_offset_and_scale() {
        let mut s = SeriesInstance::new(StorageMethods::SCALED);
        s.set_values(&[1.0, 2.0, 3.0]);
        s.root.get_or_add_scalar(TAG_SCALE, PhysicalType::Real8).set(ScalarValue::Real8(10.0));
        s.root.get_or_add_scalar(TAG_OFFSET, PhysicalType::Real8).set(ScalarValue::Real8(5.0));
        let siblings = vec![s.clone()];
        assert_eq!(siblings[0].original_values(0, &siblings, None).unwrap(), vec![15.0, 25.0, 35.0]);
    }

    #[test]
    fn transducer_ratio_multiplies_scaled_values() {
        let mut s = SeriesInstance::new(StorageMethods::empty());
        s.set_values(&[2.0, 4.0]);
        let siblings = vec![s.clone()];
        assert_eq!(siblings[0].original_values(0, &siblings, Some(120.0)).unwrap(), vec![240.0, 480.0]);
    }

    #[test]
    fn increment_expansion_matches_testable_property() {
        let mut s = SeriesInstance::new(StorageMethods::INCREMENT);
        // Leading rate_count (unused by expansion itself), then two groups:
        // 3 values starting at 0 stepping by 1, then 2 values continuing
        // from 3 stepping by 10.
        s.set_values(&[2.0, 3.0, 1.0, 2.0, 10.0]);
        let siblings = vec![s.clone()];
        assert_eq!(
            siblings[0].original_values(0, &siblings, None).unwrap(),
            vec![0.0, 1.0, 2.0, 3.0, 13.0]
        );
    }

    #[test]
    fn timestamp_values_bypass_scale_and_ratio() {
        let mut s = SeriesInstance::new(StorageMethods::SCALED);
        let v = s.root.get_or_add_vector(TAG_VALUES, PhysicalType::Timestamp);
        v.resize(1);
        use chrono::{TimeZone, Utc};
        v.set(0, ScalarValue::Timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        s.root.get_or_add_scalar(TAG_SCALE, PhysicalType::Real8).set(ScalarValue::Real8(10.0));
        let siblings = vec![s.clone()];
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().timestamp() as f64;
        assert_eq!(siblings[0].original_values(0, &siblings, Some(2.0)).unwrap(), vec![expected]);
    }

    #[test]
    fn series_share_falls_back_to_another_series_values() {
        let mut donor = SeriesInstance::new(StorageMethods::empty());
        donor.set_values(&[7.0, 8.0]);
        let mut sharer = SeriesInstance::new(StorageMethods::empty());
        sharer.set_series_share_index(0);
        let siblings = vec![donor, sharer];
        assert_eq!(siblings[1].original_values(1, &siblings, None).unwrap(), vec![7.0, 8.0]);
    }

    #[test]
    fn series_share_cycle_is_detected() {
        let mut a = SeriesInstance::new(StorageMethods::empty());
        a.set_series_share_index(1);
        let mut b = SeriesInstance::new(StorageMethods::empty());
        b.set_series_share_index(0);
        let siblings = vec![a, b];
        assert!(siblings[0].original_values(0, &siblings, None).is_err());
    }
}
