//! Polyline representation for route geometries.
//!
//! Routing services return geometries in the compressed polyline format
//! (five decimal digits of precision). Decoding happens here, at the
//! boundary; everything downstream works on [`Coordinate`] sequences.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Coordinate;

const PRECISION: f64 = 1e5;

/// Reasons an encoded polyline is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("invalid character {character:?} at byte {position}")]
    InvalidCharacter { character: char, position: usize },
    #[error("polyline ends in the middle of a value")]
    Truncated,
    #[error("coordinate out of range at byte {position}")]
    Overflow { position: usize },
}

/// A route geometry as decoded coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    /// Creates a polyline from already decoded points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Decodes an encoded polyline string.
    pub fn decode(encoded: &str) -> Result<Self, PolylineError> {
        let bytes = encoded.as_bytes();
        let mut points = Vec::new();
        let mut position = 0;
        let mut latitude: i64 = 0;
        let mut longitude: i64 = 0;

        while position < bytes.len() {
            latitude = accumulate(latitude, bytes, &mut position)?;
            longitude = accumulate(longitude, bytes, &mut position)?;
            points.push(Coordinate::new(
                latitude as f64 / PRECISION,
                longitude as f64 / PRECISION,
            ));
        }

        Ok(Self { points })
    }

    /// Encodes the points back into the compressed format.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        let mut previous = (0i64, 0i64);
        for point in &self.points {
            let latitude = (point.latitude * PRECISION).round() as i64;
            let longitude = (point.longitude * PRECISION).round() as i64;
            encode_value(latitude - previous.0, &mut out);
            encode_value(longitude - previous.1, &mut out);
            previous = (latitude, longitude);
        }
        out
    }

    /// Returns the decoded points in route order.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consumes the polyline, returning its points.
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Adds the next delta to a running total, rejecting totals that overflow.
fn accumulate(total: i64, bytes: &[u8], position: &mut usize) -> Result<i64, PolylineError> {
    let start = *position;
    let delta = decode_value(bytes, position)?;
    total
        .checked_add(delta)
        .ok_or(PolylineError::Overflow { position: start })
}

fn decode_value(bytes: &[u8], position: &mut usize) -> Result<i64, PolylineError> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let Some(&byte) = bytes.get(*position) else {
            return Err(PolylineError::Truncated);
        };
        if !(63..=126).contains(&byte) || shift > 60 {
            return Err(PolylineError::InvalidCharacter {
                character: byte as char,
                position: *position,
            });
        }
        *position += 1;

        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    if result & 1 == 1 {
        Ok(!(result >> 1))
    } else {
        Ok(result >> 1)
    }
}

fn encode_value(value: i64, out: &mut String) {
    let mut value = if value < 0 { !(value << 1) } else { value << 1 };
    while value >= 0x20 {
        out.push((((value & 0x1f) | 0x20) as u8 + 63) as char);
        value >>= 5;
    }
    out.push((value as u8 + 63) as char);
}
