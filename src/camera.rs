//! Map presentation boundary: camera follow, marker sizing and styling.
//!
//! The map itself is an external drawing surface; this module decides what
//! to ask of it.

use serde::Serialize;

use crate::models::{Coordinate, DeliveryStatus};
use crate::traits::{CameraPosition, MapSurface};

/// Zoom level used while following the vehicle.
pub const FOLLOW_ZOOM: f64 = 17.0;
/// Camera animation for each followed move.
pub const FOLLOW_ANIMATION_MS: u64 = 300;
/// Camera animation when the user taps recenter.
pub const RECENTER_ANIMATION_MS: u64 = 400;

const BASE_MARKER_SIZE: f64 = 12.0;
const BASE_MARKER_BORDER: f64 = 2.0;
const MAX_ZOOM_SCALE: f64 = 2.0;
const REFERENCE_LATITUDE_DELTA: f64 = 0.04;

fn camera_at(center: Coordinate) -> CameraPosition {
    CameraPosition {
        center,
        zoom: FOLLOW_ZOOM,
        pitch: 0.0,
        heading: 0.0,
    }
}

/// Tracks follow mode and issues camera commands.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraController {
    following: bool,
}

impl Default for CameraController {
    fn default() -> Self {
        Self { following: true }
    }
}

impl CameraController {
    pub fn is_following(&self) -> bool {
        self.following
    }

    /// The user dragged the map; stop following until recentered.
    pub fn user_panned(&mut self) {
        self.following = false;
    }

    /// Called after every cursor move.
    pub fn cursor_moved<M: MapSurface + ?Sized>(&self, map: &mut M, cursor: Coordinate) {
        if self.following {
            map.animate_camera(camera_at(cursor), FOLLOW_ANIMATION_MS);
        }
    }

    /// Re-enables follow mode and jumps to the cursor, if there is one.
    pub fn recenter<M: MapSurface + ?Sized>(&mut self, map: &mut M, cursor: Option<Coordinate>) {
        self.following = true;
        if let Some(cursor) = cursor {
            map.animate_camera(camera_at(cursor), RECENTER_ANIMATION_MS);
        }
    }
}

/// Marker scale derived from the visible latitude span.
pub fn zoom_scale(latitude_delta: f64) -> f64 {
    if latitude_delta <= 0.0 {
        return MAX_ZOOM_SCALE;
    }
    (REFERENCE_LATITUDE_DELTA / latitude_delta).min(MAX_ZOOM_SCALE)
}

/// How a delivery marker is filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MarkerFill {
    /// Visited stop.
    Filled,
    /// Pending stop.
    Hollow,
}

/// Size and fill of one delivery marker, already scaled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub coordinate: Coordinate,
    pub fill: MarkerFill,
    pub diameter: f64,
    pub border: f64,
}

/// Glyph for a delivery marker. Cancelled stops are not drawn.
pub fn marker_style(coordinate: Coordinate, status: DeliveryStatus, scale: f64) -> Option<MarkerStyle> {
    let fill = match status {
        DeliveryStatus::Pending => MarkerFill::Hollow,
        DeliveryStatus::Visited => MarkerFill::Filled,
        DeliveryStatus::Cancelled(_) => return None,
    };
    Some(MarkerStyle {
        coordinate,
        fill,
        diameter: BASE_MARKER_SIZE * scale,
        border: if fill == MarkerFill::Hollow { BASE_MARKER_BORDER * scale } else { 0.0 },
    })
}

/// Everything a renderer needs to draw one frame of the route screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFrame {
    pub vehicle: Option<Coordinate>,
    pub path: Vec<Coordinate>,
    pub markers: Vec<MarkerStyle>,
    pub show_recenter_button: bool,
}
