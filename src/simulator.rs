//! Simulated vehicle movement along a fetched route.
//!
//! Stands in for live positioning: each tick moves the cursor one
//! coordinate forward. The cursor never moves backwards and stops for good
//! at the last coordinate.

use tracing::debug;

use crate::models::Coordinate;
use crate::traits::PositionSource;

/// Steps through a decoded route one coordinate per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSimulator {
    route: Vec<Coordinate>,
    cursor: usize,
    halted: bool,
}

impl RouteSimulator {
    /// Starts at the first coordinate. An empty route is halted from the start.
    pub fn new(route: Vec<Coordinate>) -> Self {
        let halted = route.is_empty();
        Self {
            route,
            cursor: 0,
            halted,
        }
    }

    /// Index of the current coordinate.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn route(&self) -> &[Coordinate] {
        &self.route
    }

    /// False for an empty route: such a simulator never starts.
    pub fn is_startable(&self) -> bool {
        !self.route.is_empty()
    }
}

impl PositionSource for RouteSimulator {
    fn advance(&mut self) -> Option<Coordinate> {
        if self.halted {
            return None;
        }

        let next = self.cursor + 1;
        if next < self.route.len() {
            self.cursor = next;
            Some(self.route[next])
        } else {
            debug!(cursor = self.cursor, "simulation reached end of route");
            self.halted = true;
            None
        }
    }

    fn current(&self) -> Option<Coordinate> {
        self.route.get(self.cursor).copied()
    }

    fn is_finished(&self) -> bool {
        self.halted
    }
}
