//! Geocode the selected addresses and fetch one driving route through them.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::GeocodeConfig;
use crate::error::RouteError;
use crate::models::{Address, Coordinate, DeliveryPoint};
use crate::polyline::Polyline;
use crate::traits::{DirectionsProvider, DirectionsRequest, Geocoder};

/// Everything the route screen needs once the fetch has completed.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRoute {
    pub path: Polyline,
    /// Plain-text step instructions, in route order.
    pub instructions: Vec<String>,
    /// Resolved stops in input order. The last one is the final destination.
    pub deliveries: Vec<DeliveryPoint>,
    /// Ids of addresses the geocoder could not resolve.
    pub dropped: Vec<u32>,
}

/// Resolves `addresses` concurrently and requests a route from `origin`.
///
/// Unresolved addresses are dropped. When nothing resolves the directions
/// provider is never called.
pub fn fetch_route<G, D>(
    geocoder: &G,
    directions: &D,
    origin: Coordinate,
    addresses: &[Address],
    geocode: &GeocodeConfig,
) -> Result<FetchedRoute, RouteError>
where
    G: Geocoder,
    D: DirectionsProvider + ?Sized,
{
    let outcomes: Vec<Result<Option<Coordinate>, RouteError>> = addresses
        .par_iter()
        .map(|address| geocoder.geocode(&geocode.query_for(&address.text)))
        .collect();

    let mut deliveries = Vec::with_capacity(addresses.len());
    let mut dropped = Vec::new();
    let mut first_error = None;

    for (input_index, (address, outcome)) in addresses.iter().zip(outcomes).enumerate() {
        match outcome {
            Ok(Some(coordinate)) => deliveries.push(DeliveryPoint {
                address_id: address.id,
                input_index,
                coordinate: Coordinate::new(
                    coordinate.latitude - geocode.latitude_offset,
                    coordinate.longitude,
                ),
            }),
            Ok(None) => {
                debug!(address_id = address.id, "address did not resolve");
                dropped.push(address.id);
            }
            Err(err) => {
                debug!(address_id = address.id, error = %err, "geocoding failed");
                dropped.push(address.id);
                first_error.get_or_insert(err);
            }
        }
    }

    if deliveries.is_empty() {
        // A provider-wide failure (bad key, network down) is more useful to
        // the courier than a generic "nothing resolved".
        return Err(first_error.unwrap_or(RouteError::NoValidDestinations));
    }
    if !dropped.is_empty() {
        warn!(dropped = dropped.len(), resolved = deliveries.len(), "continuing with partial destinations");
    }

    let coordinates: Vec<Coordinate> = deliveries.iter().map(|d| d.coordinate).collect();
    let (destination, waypoints) = match coordinates.split_last() {
        Some((last, rest)) => (*last, rest.to_vec()),
        None => return Err(RouteError::NoValidDestinations),
    };

    let response = directions.directions(&DirectionsRequest {
        origin,
        waypoints,
        destination,
    })?;

    let Some(encoded) = response.encoded_path else {
        warn!("directions provider returned no route");
        return Err(RouteError::NoRouteFound);
    };
    let path = Polyline::decode(&encoded)?;
    let instructions = response.instructions.iter().map(|s| strip_markup(s)).collect();

    info!(points = path.len(), stops = deliveries.len(), "route fetched");

    Ok(FetchedRoute {
        path,
        instructions,
        deliveries,
        dropped,
    })
}

/// Removes `<...>` tags from an instruction.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('>') {
            Some(close) if close > 0 => rest = &after[close + 1..],
            _ => {
                out.push('<');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
