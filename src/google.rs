//! Google Maps web service adapter (geocoding + directions).

use serde::Deserialize;
use tracing::debug;

use crate::config::GoogleConfig;
use crate::error::RouteError;
use crate::models::Coordinate;
use crate::traits::{DirectionsProvider, DirectionsRequest, DirectionsResponse, Geocoder};

/// Blocking client for the geocoding and directions APIs.
#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    config: GoogleConfig,
    client: reqwest::blocking::Client,
}

impl GoogleMapsClient {
    /// Builds the HTTP client with the configured timeout.
    pub fn new(config: GoogleConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn get<T>(&self, service: &str, params: &[(&str, String)]) -> Result<T, RouteError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}/json", self.config.base_url, service);
        let body = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", self.config.api_key.as_str())])
            .send()?
            .error_for_status()?
            .json::<T>()?;
        Ok(body)
    }
}

impl Geocoder for GoogleMapsClient {
    fn geocode(&self, query: &str) -> Result<Option<Coordinate>, RouteError> {
        debug!(query, "geocoding address");
        let body: GeocodeResponse = self.get("geocode", &[("address", query.to_string())])?;
        parse_geocode(body)
    }
}

impl DirectionsProvider for GoogleMapsClient {
    fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsResponse, RouteError> {
        let mut params = vec![
            ("origin", request.origin.to_query()),
            ("destination", request.destination.to_query()),
            ("mode", "driving".to_string()),
            ("language", self.config.language.clone()),
        ];
        if !request.waypoints.is_empty() {
            let waypoints = request
                .waypoints
                .iter()
                .map(Coordinate::to_query)
                .collect::<Vec<_>>()
                .join("|");
            params.push(("waypoints", waypoints));
        }

        debug!(waypoints = request.waypoints.len(), "requesting directions");
        let body: DirectionsBody = self.get("directions", &params)?;
        parse_directions(body)
    }
}

fn provider_error(status: String, message: Option<String>) -> RouteError {
    match message {
        Some(message) => RouteError::Provider(format!("{}: {}", status, message)),
        None => RouteError::Provider(status),
    }
}

fn parse_geocode(body: GeocodeResponse) -> Result<Option<Coordinate>, RouteError> {
    match body.status.as_str() {
        "OK" | "ZERO_RESULTS" => Ok(body
            .results
            .first()
            .map(|result| Coordinate::new(result.geometry.location.lat, result.geometry.location.lng))),
        _ => Err(provider_error(body.status, body.error_message)),
    }
}

fn parse_directions(body: DirectionsBody) -> Result<DirectionsResponse, RouteError> {
    match body.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => return Ok(DirectionsResponse::default()),
        _ => return Err(provider_error(body.status, body.error_message)),
    }

    let Some(route) = body.routes.into_iter().next() else {
        return Ok(DirectionsResponse::default());
    };

    let instructions = route
        .legs
        .into_iter()
        .flat_map(|leg| leg.steps)
        .map(|step| step.html_instructions)
        .collect();

    Ok(DirectionsResponse {
        encoded_path: Some(route.overview_polyline.points),
        instructions,
    })
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct DirectionsBody {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    overview_polyline: OverviewPolyline,
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct OverviewPolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct Leg {
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    html_instructions: String,
}
