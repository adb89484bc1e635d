//! State of the route screen and the tick loop that drives it.
//!
//! All mutation happens on the caller's thread. The only thing shared
//! across threads is the [`ScreenScope`] flag, so a fetch that finishes
//! after the screen closed can be recognised and dropped.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::camera::{self, CameraController, MapFrame};
use crate::error::{CourierError, TrackerError};
use crate::haversine::ProximityMetric;
use crate::models::{CancelReason, Coordinate, DeliveryPoint, DeliveryStatus};
use crate::route_fetch::FetchedRoute;
use crate::simulator::RouteSimulator;
use crate::tracker::{DeliveryTracker, RunSummary};
use crate::traits::{MapSurface, PositionSource};

/// Lifetime of the route screen.
#[derive(Debug, Clone)]
pub struct ScreenScope {
    active: Arc<AtomicBool>,
}

impl Default for ScreenScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenScope {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Marks the screen as gone. Affects every clone.
    pub fn close(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Passes `value` through while the screen is open, otherwise reports it stale.
    pub fn deliver<T>(&self, value: T) -> Result<T, CourierError> {
        if self.is_active() {
            Ok(value)
        } else {
            debug!("discarding result delivered after the screen closed");
            Err(CourierError::Stale)
        }
    }
}

/// Result of one simulation step.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Moved { position: Coordinate, reached: Vec<usize> },
    Finished,
}

/// Why the tick loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEnd {
    NotStarted,
    Completed,
    ScopeClosed,
    RouteReplaced,
    Stopped,
}

/// Everything the route screen shows and mutates.
pub struct RouteSession<P: PositionSource = RouteSimulator> {
    path: Vec<Coordinate>,
    instructions: Vec<String>,
    tracker: DeliveryTracker,
    source: P,
    camera: CameraController,
    metric: ProximityMetric,
    zoom_scale: f64,
    route_version: u64,
}

impl RouteSession<RouteSimulator> {
    /// Builds a simulated session from a fetched route.
    pub fn simulated(route: FetchedRoute, metric: ProximityMetric) -> Self {
        let path = route.path.into_points();
        let source = RouteSimulator::new(path.clone());
        Self::with_source(path, route.instructions, route.deliveries, source, metric)
    }

    /// Swaps in a new route. Any running loop for the old route stops.
    pub fn replace_route(&mut self, route: FetchedRoute) {
        let path = route.path.into_points();
        self.source = RouteSimulator::new(path.clone());
        self.path = path;
        self.instructions = route.instructions;
        self.tracker = DeliveryTracker::new(route.deliveries);
        self.route_version += 1;
        info!(version = self.route_version, "route replaced");
    }

    /// Index of the vehicle in the route path.
    pub fn cursor(&self) -> usize {
        self.source.cursor()
    }
}

impl<P: PositionSource> RouteSession<P> {
    /// Builds a session around any position source.
    ///
    /// `path` is only drawn; arrivals are decided from the positions `source` yields.
    pub fn with_source(
        path: Vec<Coordinate>,
        instructions: Vec<String>,
        deliveries: Vec<DeliveryPoint>,
        source: P,
        metric: ProximityMetric,
    ) -> Self {
        Self {
            path,
            instructions,
            tracker: DeliveryTracker::new(deliveries),
            source,
            camera: CameraController::default(),
            metric,
            zoom_scale: 1.0,
            route_version: 0,
        }
    }

    /// False when the source has nothing to yield, e.g. an empty route.
    pub fn can_start(&self) -> bool {
        !self.source.is_finished()
    }

    /// Advances the position source once and records arrivals.
    pub fn tick<M: MapSurface + ?Sized>(&mut self, map: &mut M) -> TickOutcome {
        let Some(position) = self.source.advance() else {
            return TickOutcome::Finished;
        };
        let reached = self.tracker.observe_position(position, &self.metric);
        self.camera.cursor_moved(map, position);
        TickOutcome::Moved { position, reached }
    }

    /// Cancels a pending stop. A reason is required.
    pub fn cancel(&mut self, index: usize, reason: Option<CancelReason>) -> Result<(), TrackerError> {
        self.tracker.cancel(index, reason)
    }

    /// The user dragged the map; follow mode is off until [`recenter`](Self::recenter).
    pub fn user_panned(&mut self) {
        self.camera.user_panned();
    }

    /// Turns follow mode back on and moves the camera to the vehicle.
    pub fn recenter<M: MapSurface + ?Sized>(&mut self, map: &mut M) {
        self.camera.recenter(map, self.source.current());
    }

    /// Recomputes the marker scale from the visible latitude span.
    pub fn region_changed(&mut self, latitude_delta: f64) {
        self.zoom_scale = camera::zoom_scale(latitude_delta);
    }

    pub fn is_following(&self) -> bool {
        self.camera.is_following()
    }

    /// Current vehicle position, if the source has one.
    pub fn position(&self) -> Option<Coordinate> {
        self.source.current()
    }

    pub fn status(&self, index: usize) -> Option<DeliveryStatus> {
        self.tracker.status(index)
    }

    pub fn tracker(&self) -> &DeliveryTracker {
        &self.tracker
    }

    pub fn is_ready_to_finish(&self) -> bool {
        self.tracker.is_ready_to_finish()
    }

    /// Summarizes the run once every stop is closed.
    pub fn finish(&self) -> Result<RunSummary, TrackerError> {
        self.tracker.finish()
    }

    /// The instruction shown on the route screen.
    ///
    /// Always the first step; it does not follow the cursor.
    pub fn current_instruction(&self) -> Option<&str> {
        self.instructions.first().map(String::as_str)
    }

    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    /// Bumped every time the route is replaced.
    pub fn route_version(&self) -> u64 {
        self.route_version
    }

    /// Snapshot for the renderer. Cancelled stops have no marker.
    pub fn frame(&self) -> MapFrame {
        let markers = self
            .tracker
            .points()
            .iter()
            .zip(self.tracker.statuses())
            .filter_map(|(point, status)| camera::marker_style(point.coordinate, *status, self.zoom_scale))
            .collect();

        MapFrame {
            vehicle: self.source.current(),
            path: self.path.clone(),
            markers,
            show_recenter_button: !self.camera.is_following(),
        }
    }
}

/// Drives `session` at a fixed period until the route ends or the screen closes.
///
/// `on_tick` runs after each step on the same thread and may apply user
/// actions to the session; returning `ControlFlow::Break` stops the loop.
pub fn run_simulation<P, M, F>(
    session: &mut RouteSession<P>,
    map: &mut M,
    scope: &ScreenScope,
    period: Duration,
    mut on_tick: F,
) -> SimulationEnd
where
    P: PositionSource,
    M: MapSurface + ?Sized,
    F: FnMut(&mut RouteSession<P>, &mut M, &TickOutcome) -> ControlFlow<()>,
{
    if !session.can_start() {
        return SimulationEnd::NotStarted;
    }
    let version = session.route_version();

    loop {
        if !period.is_zero() {
            thread::sleep(period);
        }
        if !scope.is_active() {
            return SimulationEnd::ScopeClosed;
        }
        if session.route_version() != version {
            return SimulationEnd::RouteReplaced;
        }

        let outcome = session.tick(map);
        let finished = outcome == TickOutcome::Finished;
        if on_tick(session, map, &outcome).is_break() {
            return SimulationEnd::Stopped;
        }
        if session.route_version() != version {
            return SimulationEnd::RouteReplaced;
        }
        if finished {
            return SimulationEnd::Completed;
        }
    }
}
