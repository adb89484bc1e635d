//! Distance helpers: proximity metrics and a haversine travel-time matrix.
//!
//! The planar metric compares raw degree offsets and is only meaningful at
//! city scale. The haversine metric is available when stops are spread out
//! or sit far from the equator.

use serde::{Deserialize, Serialize};

use crate::models::Coordinate;
use crate::traits::DistanceMatrixProvider;

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default arrival radius in raw degrees (roughly 50 m).
pub const DEFAULT_THRESHOLD_DEGREES: f64 = 0.0005;

/// Great-circle distance between two points in kilometers.
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Euclidean distance on raw degrees.
pub fn planar_degrees(from: Coordinate, to: Coordinate) -> f64 {
    let dx = from.latitude - to.latitude;
    let dy = from.longitude - to.longitude;
    (dx * dx + dy * dy).sqrt()
}

/// How "close enough to a stop" is measured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProximityMetric {
    Planar { threshold_degrees: f64 },
    Haversine { threshold_meters: f64 },
}

impl Default for ProximityMetric {
    fn default() -> Self {
        ProximityMetric::Planar {
            threshold_degrees: DEFAULT_THRESHOLD_DEGREES,
        }
    }
}

impl ProximityMetric {
    /// True when `position` is strictly inside the arrival radius of `target`.
    pub fn is_within(&self, position: Coordinate, target: Coordinate) -> bool {
        match *self {
            ProximityMetric::Planar { threshold_degrees } => {
                planar_degrees(position, target) < threshold_degrees
            }
            ProximityMetric::Haversine { threshold_meters } => {
                haversine_km(position, target) * 1000.0 < threshold_meters
            }
        }
    }
}

/// Haversine-based distance matrix provider.
///
/// Estimates travel time using straight-line distance and an assumed speed.
/// Used by the local planner when no road network is available.
#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineMatrix {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Straight-line driving time between two stops, in whole seconds.
    pub fn travel_seconds(&self, from: Coordinate, to: Coordinate) -> i32 {
        (haversine_km(from, to) / self.speed_kmh * 3600.0).round() as i32
    }
}

impl DistanceMatrixProvider for HaversineMatrix {
    fn matrix_for(&self, locations: &[Coordinate]) -> Vec<Vec<i32>> {
        locations
            .iter()
            .map(|&from| {
                locations
                    .iter()
                    .map(|&to| if from == to { 0 } else { self.travel_seconds(from, to) })
                    .collect()
            })
            .collect()
    }
}
