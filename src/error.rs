//! Error types for the courier run.
//!
//! Every failure is scoped to the current screen: nothing here is fatal to
//! the process, and callers decide whether to alert and navigate back.

use std::io;

use thiserror::Error;

use crate::polyline::PolylineError;

/// Failures while geocoding addresses or fetching a route.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("no valid destinations to route through")]
    NoValidDestinations,
    #[error("no route found")]
    NoRouteFound,
    #[error("invalid route geometry: {0}")]
    Polyline(#[from] PolylineError),
}

/// Failures talking to the trip planning backend.
#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("select at least one address to continue")]
    EmptySelection,
    #[error("trip planning failed: {0}")]
    PlanningFailed(String),
}

impl From<reqwest::Error> for PlanningError {
    fn from(err: reqwest::Error) -> Self {
        PlanningError::PlanningFailed(err.to_string())
    }
}

/// Rejected delivery state transitions. The tracker is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("no delivery at index {0}")]
    UnknownDelivery(usize),
    #[error("a cancellation reason is required")]
    MissingReason,
    #[error("delivery {0} is already closed")]
    AlreadyTerminal(usize),
    #[error("{remaining} deliveries are still pending")]
    NotReady { remaining: usize },
}

/// Failures loading configuration or catalog data.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("missing required setting {0}")]
    Missing(&'static str),
}

/// Top-level error surfaced to the courier.
#[derive(Debug, Error)]
pub enum CourierError {
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Planning(#[from] PlanningError),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("result arrived after the screen was closed")]
    Stale,
}
