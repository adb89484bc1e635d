//! OSRM HTTP adapter for routes and travel-time matrices.
//!
//! A self-hosted alternative to the hosted directions provider. OSRM does
//! not return prose instructions, so they are built from step maneuvers.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::RouteError;
use crate::models::Coordinate;
use crate::traits::{DirectionsProvider, DirectionsRequest, DirectionsResponse, DistanceMatrixProvider};

/// OSRM server settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Blocking client for an OSRM server.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn url(&self, service: &str, locations: &[Coordinate], query: &str) -> String {
        format!(
            "{}/{}/v1/{}/{}?{}",
            self.config.base_url,
            service,
            self.config.profile,
            coordinate_list(locations),
            query
        )
    }
}

/// OSRM expects `lng,lat` pairs separated by `;`.
fn coordinate_list(locations: &[Coordinate]) -> String {
    locations
        .iter()
        .map(|c| format!("{:.6},{:.6}", c.longitude, c.latitude))
        .collect::<Vec<_>>()
        .join(";")
}

impl DistanceMatrixProvider for OsrmClient {
    fn matrix_for(&self, locations: &[Coordinate]) -> Vec<Vec<i32>> {
        if locations.is_empty() {
            return Vec::new();
        }

        let url = self.url("table", locations, "annotations=duration");
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmTableResponse>());

        match response {
            Ok(body) => body
                .durations
                .unwrap_or_default()
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|value| value.map(|v| v.round() as i32).unwrap_or(i32::MAX))
                        .collect()
                })
                .collect(),
            Err(err) => {
                warn!(error = %err, "OSRM table request failed");
                Vec::new()
            }
        }
    }
}

impl DirectionsProvider for OsrmClient {
    fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsResponse, RouteError> {
        let mut stops = Vec::with_capacity(request.waypoints.len() + 2);
        stops.push(request.origin);
        stops.extend_from_slice(&request.waypoints);
        stops.push(request.destination);

        let url = self.url(
            "route",
            &stops,
            "overview=full&geometries=polyline&steps=true",
        );
        debug!(stops = stops.len(), "requesting OSRM route");

        let response = self.client.get(url).send()?;
        let status = response.status();
        let body = response.text()?;
        let parsed: OsrmRouteResponse = serde_json::from_str(&body)
            .map_err(|_| RouteError::Provider(format!("OSRM returned HTTP {}", status)))?;

        parse_route(parsed)
    }
}

fn parse_route(body: OsrmRouteResponse) -> Result<DirectionsResponse, RouteError> {
    match body.code.as_str() {
        "Ok" => {}
        "NoRoute" => return Ok(DirectionsResponse::default()),
        other => {
            let message = body.message.unwrap_or_else(|| other.to_string());
            return Err(RouteError::Provider(message));
        }
    }

    let Some(route) = body.routes.into_iter().next() else {
        return Ok(DirectionsResponse::default());
    };

    let instructions = route
        .legs
        .iter()
        .flat_map(|leg| leg.steps.iter())
        .map(describe_step)
        .collect();

    Ok(DirectionsResponse {
        encoded_path: Some(route.geometry),
        instructions,
    })
}

fn describe_step(step: &OsrmStep) -> String {
    let maneuver = &step.maneuver;
    let action = match maneuver.kind.as_str() {
        "depart" => "Head out".to_string(),
        "arrive" => return "Arrive at the stop".to_string(),
        "roundabout" | "rotary" => match maneuver.exit {
            Some(exit) => format!("At the roundabout take exit {}", exit),
            None => "Enter the roundabout".to_string(),
        },
        kind => match &maneuver.modifier {
            Some(modifier) if kind == "turn" || kind == "end of road" => format!("Turn {}", modifier),
            Some(modifier) => format!("{} {}", capitalize(kind), modifier),
            None => capitalize(kind),
        },
    };

    if step.name.is_empty() {
        action
    } else {
        format!("{} onto {}", action, step.name)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    durations: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: String,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    #[serde(default)]
    steps: Vec<OsrmStep>,
}

#[derive(Debug, Deserialize)]
struct OsrmStep {
    #[serde(default)]
    name: String,
    maneuver: OsrmManeuver,
}

#[derive(Debug, Deserialize)]
struct OsrmManeuver {
    #[serde(rename = "type")]
    kind: String,
    modifier: Option<String>,
    exit: Option<u32>,
}
