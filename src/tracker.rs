//! Per-delivery status tracking for a single run.

use serde::Serialize;
use tracing::info;

use crate::error::TrackerError;
use crate::haversine::ProximityMetric;
use crate::models::{CancelReason, Coordinate, DeliveryPoint, DeliveryStatus};

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    /// Count of visited stops.
    pub visited: usize,
    /// Address id and reason of every cancelled stop.
    pub cancelled: Vec<(u32, CancelReason)>,
}

/// Status of every resolved stop, indexed like the fetched deliveries.
#[derive(Debug, Clone)]
pub struct DeliveryTracker {
    points: Vec<DeliveryPoint>,
    statuses: Vec<DeliveryStatus>,
}

impl DeliveryTracker {
    /// Starts tracking `points`, all pending.
    pub fn new(points: Vec<DeliveryPoint>) -> Self {
        let statuses = vec![DeliveryStatus::Pending; points.len()];
        Self { points, statuses }
    }

    /// Number of tracked stops.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Tracked stops in delivery order.
    pub fn points(&self) -> &[DeliveryPoint] {
        &self.points
    }

    /// Status of the stop at `index`, or `None` if there is no such stop.
    pub fn status(&self, index: usize) -> Option<DeliveryStatus> {
        self.statuses.get(index).copied()
    }

    /// Statuses parallel to [`points`](Self::points).
    pub fn statuses(&self) -> &[DeliveryStatus] {
        &self.statuses
    }

    /// Marks every pending delivery near `position` as visited.
    ///
    /// Returns the indices that changed.
    pub fn observe_position(&mut self, position: Coordinate, metric: &ProximityMetric) -> Vec<usize> {
        let mut reached = Vec::new();
        for (index, point) in self.points.iter().enumerate() {
            if self.statuses[index] == DeliveryStatus::Pending && metric.is_within(position, point.coordinate) {
                self.statuses[index] = DeliveryStatus::Visited;
                reached.push(index);
            }
        }
        for index in &reached {
            info!(index, address_id = self.points[*index].address_id, "delivery visited");
        }
        reached
    }

    /// Closes a pending delivery with a reason.
    ///
    /// Leaves the tracker unchanged on error.
    pub fn cancel(&mut self, index: usize, reason: Option<CancelReason>) -> Result<(), TrackerError> {
        let status = self
            .statuses
            .get_mut(index)
            .ok_or(TrackerError::UnknownDelivery(index))?;
        if status.is_terminal() {
            return Err(TrackerError::AlreadyTerminal(index));
        }
        let reason = reason.ok_or(TrackerError::MissingReason)?;

        *status = DeliveryStatus::Cancelled(reason);
        info!(index, %reason, "delivery cancelled");
        Ok(())
    }

    /// Number of stops reached by the vehicle.
    pub fn visited_count(&self) -> usize {
        self.statuses
            .iter()
            .filter(|s| **s == DeliveryStatus::Visited)
            .count()
    }

    /// Number of stops closed with a reason.
    pub fn cancelled_count(&self) -> usize {
        self.statuses
            .iter()
            .filter(|s| matches!(s, DeliveryStatus::Cancelled(_)))
            .count()
    }

    /// True once no stop is pending.
    pub fn is_ready_to_finish(&self) -> bool {
        self.visited_count() + self.cancelled_count() == self.len()
    }

    /// Label for the finish button, e.g. `2/5`.
    pub fn progress_label(&self) -> String {
        format!("{}/{}", self.visited_count(), self.len())
    }

    /// Summarizes the run.
    ///
    /// Fails with [`TrackerError::NotReady`] while any stop is still pending.
    pub fn finish(&self) -> Result<RunSummary, TrackerError> {
        if !self.is_ready_to_finish() {
            return Err(TrackerError::NotReady {
                remaining: self.len() - self.visited_count() - self.cancelled_count(),
            });
        }

        let cancelled = self
            .points
            .iter()
            .zip(&self.statuses)
            .filter_map(|(point, status)| match status {
                DeliveryStatus::Cancelled(reason) => Some((point.address_id, *reason)),
                _ => None,
            })
            .collect();

        Ok(RunSummary {
            total: self.len(),
            visited: self.visited_count(),
            cancelled,
        })
    }
}
