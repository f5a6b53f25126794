//! Google encoded polyline format.
//!
//! Each point is a pair of deltas (latitude then longitude) against the
//! previous point, in units of 1e-5 degrees. A delta is zig-zag encoded and
//! split into 5-bit chunks, least significant first. Every chunk but the last
//! carries the 0x20 continuation bit, and 63 is added to land in `'?'..='~'`.

use crate::models::{Coordinate, DecodedPath};
use thiserror::Error;

const PRECISION: f64 = 1e5;

// 7 chunks cover 35 bits, far beyond any delta between valid coordinates.
const MAX_SHIFT: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("polyline ends inside a value at offset {offset}")]
    Truncated { offset: usize },
    #[error("byte {byte:#04x} at offset {offset} is outside the polyline alphabet")]
    InvalidCharacter { offset: usize, byte: u8 },
    #[error("value starting before offset {offset} does not fit in 35 bits")]
    Overflow { offset: usize },
}

/// Decodes an encoded polyline into its ordered points.
///
/// Malformed input is rejected as a whole, a partial path is never returned.
pub fn decode(encoded: &str) -> Result<DecodedPath, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        lat += next_value(bytes, &mut index)?;
        lng += next_value(bytes, &mut index)?;
        points.push(Coordinate::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    Ok(points)
}

fn next_value(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let mut shift = 0;
    let mut result: i64 = 0;
    loop {
        let byte = *bytes.get(*index).ok_or(PolylineError::Truncated { offset: *index })?;
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter { offset: *index, byte });
        }
        if shift > MAX_SHIFT {
            return Err(PolylineError::Overflow { offset: *index });
        }
        let b = (byte - 63) as i64;
        *index += 1;
        result |= (b & 0x1f) << shift;
        shift += 5;
        if b < 0x20 {
            break;
        }
    }
    Ok(if result & 1 != 0 { !(result >> 1) } else { result >> 1 })
}

/// Encodes points at 1e-5 degree precision. `decode(&encode(p))` returns `p`
/// rounded to five decimals.
pub fn encode(points: &[Coordinate]) -> String {
    let mut out = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;
    for point in points {
        let lat = (point.latitude * PRECISION).round() as i64;
        let lng = (point.longitude * PRECISION).round() as i64;
        push_value(&mut out, lat - prev_lat);
        push_value(&mut out, lng - prev_lng);
        prev_lat = lat;
        prev_lng = lng;
    }
    out
}

fn push_value(out: &mut String, delta: i64) {
    let mut value = (delta << 1) ^ (delta >> 63);
    while value >= 0x20 {
        out.push(char::from((0x20 | (value & 0x1f)) as u8 + 63));
        value >>= 5;
    }
    out.push(char::from(value as u8 + 63));
}
