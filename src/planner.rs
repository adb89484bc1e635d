//! Visiting-order planner.
//!
//! Urgent stops come first. Within each group the next stop is always the
//! nearest unvisited one by travel time, starting from the depot for the
//! urgent group and from the last urgent stop for the rest.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::GeocodeConfig;
use crate::error::PlanningError;
use crate::models::{Address, Coordinate};
use crate::traits::{DistanceMatrixProvider, Geocoder, TripPlanner};

/// An address with the coordinate it geocoded to.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedStop {
    pub address: Address,
    pub coordinate: Coordinate,
}

/// Orders geocoded stops starting from `origin`.
pub fn plan_visit_order<M>(
    origin: Coordinate,
    stops: Vec<PlannedStop>,
    matrix_provider: &M,
) -> Result<Vec<PlannedStop>, PlanningError>
where
    M: DistanceMatrixProvider + ?Sized,
{
    if stops.is_empty() {
        return Err(PlanningError::EmptySelection);
    }

    // Location 0 is the origin, stop i is location i + 1.
    let mut locations = Vec::with_capacity(stops.len() + 1);
    locations.push(origin);
    locations.extend(stops.iter().map(|stop| stop.coordinate));

    let matrix = matrix_provider.matrix_for(&locations);
    if matrix.len() != locations.len() || matrix.iter().any(|row| row.len() != locations.len()) {
        return Err(PlanningError::PlanningFailed(
            "travel time matrix unavailable".to_string(),
        ));
    }

    let (urgent, normal): (Vec<usize>, Vec<usize>) =
        (1..locations.len()).partition(|&location| stops[location - 1].address.is_urgent());

    let mut order = nearest_neighbor(0, urgent, &matrix);
    let start = order.last().copied().unwrap_or(0);
    order.extend(nearest_neighbor(start, normal, &matrix));

    debug!(?order, "planned visiting order");

    let mut slots: Vec<Option<PlannedStop>> = stops.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|location| slots[location - 1].take())
        .collect())
}

fn nearest_neighbor(start: usize, mut remaining: Vec<usize>, matrix: &[Vec<i32>]) -> Vec<usize> {
    let mut order = Vec::with_capacity(remaining.len());
    let mut current = start;

    while !remaining.is_empty() {
        let mut best = 0;
        for candidate in 1..remaining.len() {
            if matrix[current][remaining[candidate]] < matrix[current][remaining[best]] {
                best = candidate;
            }
        }
        current = remaining.remove(best);
        order.push(current);
    }

    order
}

/// Plans locally: geocodes each address, drops the unresolved ones and
/// orders the rest with [`plan_visit_order`].
pub struct LocalTripPlanner<'a, G: ?Sized, M: ?Sized> {
    pub geocoder: &'a G,
    pub matrix: &'a M,
    pub geocode: &'a GeocodeConfig,
    pub origin: Coordinate,
}

impl<G, M> TripPlanner for LocalTripPlanner<'_, G, M>
where
    G: Geocoder + ?Sized,
    M: DistanceMatrixProvider + ?Sized,
{
    fn plan(&self, addresses: &[Address]) -> Result<Vec<Address>, PlanningError> {
        if addresses.is_empty() {
            return Err(PlanningError::EmptySelection);
        }

        let geocoder = self.geocoder;
        let geocode = self.geocode;
        let stops: Vec<PlannedStop> = addresses
            .par_iter()
            .filter_map(|address| {
                match geocoder.geocode(&geocode.query_for(&address.text)) {
                    Ok(Some(coordinate)) => Some(PlannedStop {
                        address: address.clone(),
                        coordinate,
                    }),
                    Ok(None) => None,
                    Err(err) => {
                        debug!(address_id = address.id, error = %err, "geocoding failed while planning");
                        None
                    }
                }
            })
            .collect();

        if stops.is_empty() {
            return Err(PlanningError::PlanningFailed("no valid address".to_string()));
        }

        let planned = plan_visit_order(self.origin, stops, self.matrix)?;
        info!(stops = planned.len(), "visiting order planned locally");
        Ok(planned.into_iter().map(|stop| stop.address).collect())
    }
}
