//! Seams between the courier run and its collaborators.
//!
//! Providers (geocoding, directions, travel matrices, trip planning) and
//! the position feed are traits so tests and alternative backends can be
//! swapped in without touching the state tracking.

use crate::error::{PlanningError, RouteError};
use crate::models::{Address, Coordinate};

/// Resolves a free-text address into a coordinate.
///
/// `Ok(None)` means the provider answered but found nothing.
pub trait Geocoder: Sync {
    fn geocode(&self, query: &str) -> Result<Option<Coordinate>, RouteError>;
}

/// A driving route request: origin, intermediate stops, final stop.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRequest {
    pub origin: Coordinate,
    pub waypoints: Vec<Coordinate>,
    pub destination: Coordinate,
}

/// Raw provider answer for a route, before decoding.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DirectionsResponse {
    /// Encoded overview polyline of the first route, if any route was found.
    pub encoded_path: Option<String>,
    /// Step instructions as returned, possibly containing markup.
    pub instructions: Vec<String>,
}

/// Computes a driving route through a set of stops.
pub trait DirectionsProvider {
    fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsResponse, RouteError>;
}

/// Provides a travel-time matrix (seconds) for a set of locations.
///
/// The matrix is indexed by the provided location order.
pub trait DistanceMatrixProvider {
    fn matrix_for(&self, locations: &[Coordinate]) -> Vec<Vec<i32>>;
}

/// Orders selected addresses into a suggested visiting sequence.
pub trait TripPlanner {
    fn plan(&self, addresses: &[Address]) -> Result<Vec<Address>, PlanningError>;
}

/// A feed of vehicle positions, simulated or real.
pub trait PositionSource {
    /// Moves to the next position. Returns `None` once the feed has ended.
    fn advance(&mut self) -> Option<Coordinate>;

    /// The latest known position.
    fn current(&self) -> Option<Coordinate>;

    /// True once the feed will never produce another position.
    fn is_finished(&self) -> bool;
}

/// Camera placement requested from the map surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPosition {
    pub center: Coordinate,
    pub zoom: f64,
    pub pitch: f64,
    pub heading: f64,
}

/// The drawing surface the route screen talks to.
pub trait MapSurface {
    fn animate_camera(&mut self, camera: CameraPosition, duration_ms: u64);
}
