//! Polyline representation for route geometries.
//!
//! Provider routes arrive as compressed polyline strings (delta + zig-zag
//! encoding, five bits per character offset by 63). Decoding happens at the
//! boundary, right before the geometry is drawn; the rest of the crate keeps
//! the encoded string untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinate::Coordinate;

/// Default number of decimal digits kept by the encoding (factor 1e5).
pub const DEFAULT_PRECISION: u32 = 5;

const CHAR_OFFSET: i64 = 63;
const CONTINUATION_BIT: i64 = 0x20;
const CHUNK_MASK: i64 = 0x1f;
const MAX_SHIFT: u32 = 55;

#[derive(Debug, Clone, PartialEq, Serialize, Error)]
pub enum DecodeError {
    #[error("invalid polyline character {found:?} at byte {index}")]
    InvalidCharacter { index: usize, found: char },

    #[error("polyline ends in the middle of a value at byte {index}")]
    Truncated { index: usize },

    #[error("polyline value starting at byte {index} overflows")]
    Overflow { index: usize },

    #[error("decoded point {index} ({lat}, {lng}) is outside the valid range")]
    OutOfRange { index: usize, lat: f64, lng: f64 },
}

/// An encoded polyline string as received from the routing provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedPath(String);

impl EncodedPath {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decodes the path with the default precision.
    pub fn decode(&self) -> Result<Polyline, DecodeError> {
        decode(&self.0).map(Polyline::new)
    }
}

/// A polyline representing a route geometry as decoded coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Coordinate> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Coordinate> {
        self.points.last().copied()
    }

    /// Encodes the points back into the compressed string form.
    pub fn encode(&self) -> EncodedPath {
        EncodedPath(encode(&self.points, DEFAULT_PRECISION))
    }
}

/// Decodes a polyline string using the default precision of five digits.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, DecodeError> {
    decode_with_precision(encoded, DEFAULT_PRECISION)
}

/// Decodes a polyline string where every value was scaled by `10^precision`.
///
/// An empty string decodes to an empty sequence.
pub fn decode_with_precision(encoded: &str, precision: u32) -> Result<Vec<Coordinate>, DecodeError> {
    let factor = 10f64.powi(precision as i32);
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut cursor = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while cursor < bytes.len() {
        let (dlat, next) = next_value(encoded, cursor)?;
        if next >= bytes.len() {
            // A latitude without its longitude.
            return Err(DecodeError::Truncated { index: next });
        }
        let (dlng, next) = next_value(encoded, next)?;
        cursor = next;

        lat += dlat;
        lng += dlng;

        let point_lat = lat as f64 / factor;
        let point_lng = lng as f64 / factor;
        let point = Coordinate::checked(point_lat, point_lng).ok_or(DecodeError::OutOfRange {
            index: points.len(),
            lat: point_lat,
            lng: point_lng,
        })?;
        points.push(point);
    }

    Ok(points)
}

/// Reads one zig-zag encoded value starting at `start`.
///
/// Returns the signed value and the offset of the next unread byte.
fn next_value(encoded: &str, start: usize) -> Result<(i64, usize), DecodeError> {
    let bytes = encoded.as_bytes();
    let mut result: i64 = 0;
    let mut shift: u32 = 0;
    let mut index = start;

    loop {
        let Some(&byte) = bytes.get(index) else {
            return Err(DecodeError::Truncated { index });
        };
        let chunk = byte as i64 - CHAR_OFFSET;
        if !(0..64).contains(&chunk) {
            let found = encoded[index..].chars().next().unwrap_or(byte as char);
            return Err(DecodeError::InvalidCharacter { index, found });
        }
        if shift > MAX_SHIFT {
            return Err(DecodeError::Overflow { index: start });
        }

        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;
        index += 1;

        if chunk < CONTINUATION_BIT {
            break;
        }
    }

    let value = if result & 1 == 1 { !(result >> 1) } else { result >> 1 };
    Ok((value, index))
}

/// Encodes coordinates into a polyline string with `precision` digits.
pub fn encode(coords: &[Coordinate], precision: u32) -> String {
    let factor = 10f64.powi(precision as i32);
    let mut out = String::with_capacity(coords.len() * 8);
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for coord in coords {
        let lat = (coord.lat * factor).round() as i64;
        let lng = (coord.lng * factor).round() as i64;
        push_value(&mut out, lat - prev_lat);
        push_value(&mut out, lng - prev_lng);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

fn push_value(out: &mut String, value: i64) {
    let mut rest = if value < 0 { !(value << 1) } else { value << 1 };
    while rest >= CONTINUATION_BIT {
        let chunk = (CONTINUATION_BIT | (rest & CHUNK_MASK)) + CHAR_OFFSET;
        out.push(chunk as u8 as char);
        rest >>= 5;
    }
    out.push((rest + CHAR_OFFSET) as u8 as char);
}
