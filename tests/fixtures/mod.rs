//! Test fixtures for courier-route.
//!
//! Provides:
//! - Mogi das Cruzes locations near the distribution base
//! - Scripted geocoding / directions providers
//! - A map surface that records camera commands

#![allow(dead_code)]

pub mod mogi_locations;

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use courier_route::error::RouteError;
use courier_route::models::Coordinate;
use courier_route::polyline::Polyline;
use courier_route::traits::{
    CameraPosition, DirectionsProvider, DirectionsRequest, DirectionsResponse, Geocoder, MapSurface,
};

pub use mogi_locations::*;

// ============================================================================
// Geocoding
// ============================================================================

#[derive(Debug, Clone)]
pub enum Answer {
    Found(Coordinate),
    NotFound,
    Fails(&'static str),
}

/// Geocoder answering from a fixed table keyed by query text.
#[derive(Default)]
pub struct ScriptedGeocoder {
    answers: HashMap<String, Answer>,
    calls: AtomicUsize,
}

impl ScriptedGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, query: &str, answer: Answer) -> Self {
        self.answers.insert(query.to_string(), answer);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for ScriptedGeocoder {
    fn geocode(&self, query: &str) -> Result<Option<Coordinate>, RouteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answers.get(query) {
            Some(Answer::Found(coordinate)) => Ok(Some(*coordinate)),
            Some(Answer::NotFound) | None => Ok(None),
            Some(Answer::Fails(message)) => Err(RouteError::Provider(message.to_string())),
        }
    }
}

// ============================================================================
// Directions
// ============================================================================

/// Directions provider returning a canned response and recording requests.
pub struct ScriptedDirections {
    response: DirectionsResponse,
    pub requests: RefCell<Vec<DirectionsRequest>>,
}

impl ScriptedDirections {
    pub fn route(points: &[Coordinate], instructions: &[&str]) -> Self {
        Self {
            response: DirectionsResponse {
                encoded_path: Some(Polyline::new(points.to_vec()).encode()),
                instructions: instructions.iter().map(|s| s.to_string()).collect(),
            },
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn raw(encoded: &str) -> Self {
        Self {
            response: DirectionsResponse {
                encoded_path: Some(encoded.to_string()),
                instructions: Vec::new(),
            },
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn no_route() -> Self {
        Self {
            response: DirectionsResponse::default(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl DirectionsProvider for ScriptedDirections {
    fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsResponse, RouteError> {
        self.requests.borrow_mut().push(request.clone());
        Ok(self.response.clone())
    }
}

// ============================================================================
// Map surface
// ============================================================================

#[derive(Default)]
pub struct RecordingMap {
    pub moves: Vec<(CameraPosition, u64)>,
}

impl RecordingMap {
    pub fn last_center(&self) -> Option<Coordinate> {
        self.moves.last().map(|(camera, _)| camera.center)
    }
}

impl MapSurface for RecordingMap {
    fn animate_camera(&mut self, camera: CameraPosition, duration_ms: u64) {
        self.moves.push((camera, duration_ms));
    }
}

/// Evenly spaced points between `from` and `to`, both included.
pub fn straight_path(from: Coordinate, to: Coordinate, steps: usize) -> Vec<Coordinate> {
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            Coordinate::new(
                from.latitude + (to.latitude - from.latitude) * t,
                from.longitude + (to.longitude - from.longitude) * t,
            )
        })
        .collect()
}
