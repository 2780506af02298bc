//! Primitive codec (§4.A): pure functions mapping byte slices to values and
//! back, always little-endian on the wire regardless of host endianness.
//!
//! Every helper here operates on a slice that is already known to be the
//! right length; callers (the [`crate::scalar::Scalar`] and
//! [`crate::vector::Vector`] accessors, and the physical reader/writer)
//! are responsible for slicing the backing buffer first.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

/// The epoch the standard measures timestamps from.
fn epoch_1900() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap()
}

/// The standard's documented day offset (1900-01-01 to 1970-01-01) is
/// 25569 days, but the reference implementation is off by two; the true
/// difference used on the wire is 25567. This constant is the correction
/// applied on both read (subtract) and write (add), per §3.
const DAY_CORRECTION: i64 = 2;

/// Decode a 12-byte Timestamp value: 4 bytes `u32` days since 1900-01-01,
/// followed by 8 bytes `f64` seconds since midnight of that day.
pub fn decode_timestamp(bytes: &[u8; 12]) -> DateTime<Utc> {
    let days = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
    let seconds = f64::from_le_bytes(bytes[4..12].try_into().unwrap());
    epoch_1900()
        + Duration::days(days as i64 - DAY_CORRECTION)
        + Duration::nanoseconds((seconds * 1e9).round() as i64)
}

/// Encode a timestamp into its 12-byte on-disk representation, the inverse
/// of [`decode_timestamp`].
pub fn encode_timestamp(ts: DateTime<Utc>) -> [u8; 12] {
    let epoch = epoch_1900();
    let midnight = Utc
        .with_ymd_and_hms(ts.year(), ts.month(), ts.day(), 0, 0, 0)
        .unwrap();
    let days = (midnight - epoch).num_days() + DAY_CORRECTION;
    let seconds = (ts - midnight).num_nanoseconds().unwrap_or(0) as f64 / 1e9;

    let mut out = [0u8; 12];
    out[0..4].copy_from_slice(&(days as u32).to_le_bytes());
    out[4..12].copy_from_slice(&seconds.to_le_bytes());
    out
}

/// Decode two consecutive little-endian `f32`s as a complex value
/// (real, imaginary).
pub fn decode_complex8(bytes: &[u8; 8]) -> (f32, f32) {
    let re = f32::from_le_bytes(bytes[0..4].try_into().unwrap());
    let im = f32::from_le_bytes(bytes[4..8].try_into().unwrap());
    (re, im)
}

/// Encode a `Complex8` value, the inverse of [`decode_complex8`].
pub fn encode_complex8(value: (f32, f32)) -> [u8; 8] {
    let mut out = [0u8; 8];
    out[0..4].copy_from_slice(&value.0.to_le_bytes());
    out[4..8].copy_from_slice(&value.1.to_le_bytes());
    out
}

/// Decode two consecutive little-endian `f64`s as a complex value
/// (real, imaginary).
pub fn decode_complex16(bytes: &[u8; 16]) -> (f64, f64) {
    let re = f64::from_le_bytes(bytes[0..8].try_into().unwrap());
    let im = f64::from_le_bytes(bytes[8..16].try_into().unwrap());
    (re, im)
}

/// Encode a `Complex16` value, the inverse of [`decode_complex16`].
pub fn encode_complex16(value: (f64, f64)) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[0..8].copy_from_slice(&value.0.to_le_bytes());
    out[8..16].copy_from_slice(&value.1.to_le_bytes());
    out
}

/// Adler-32 checksum (RFC 1950 §8.2) over a byte slice, used to verify
/// record bodies on disk (§6, §7).
pub fn adler32(data: &[u8]) -> u32 {
    const MOD_ADLER: u32 = 65521;
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    for &byte in data {
        a = (a + byte as u32) % MOD_ADLER;
        b = (b + a) % MOD_ADLER;
    }
    (b << 16) | a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_symmetry() {
        let t = Utc.with_ymd_and_hms(2024, 3, 15, 13, 37, 9).unwrap();
        let encoded = encode_timestamp(t);
        let decoded = decode_timestamp(&encoded);
        assert_eq!(decoded.timestamp(), t.timestamp());
    }

    #[test]
    fn timestamp_epoch_is_two_days_off_standard() {
        // 1970-01-01 on the wire is days=25567, not the standard's 25569.
        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&25567u32.to_le_bytes());
        let t = decode_timestamp(&bytes);
        assert_eq!(t, Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn adler32_matches_known_vector() {
        // "Wikipedia" -> 0x11E60398 per the RFC 1950 reference algorithm.
        assert_eq!(adler32(b"Wikipedia"), 0x11E6_0398);
    }

    #[test]
    fn complex_round_trip() {
        assert_eq!(decode_complex8(&encode_complex8((1.5, -2.5))), (1.5, -2.5));
        assert_eq!(
            decode_complex16(&encode_complex16((1.5, -2.5))),
            (1.5, -2.5)
        );
    }
}
