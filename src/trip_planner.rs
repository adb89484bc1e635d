//! HTTP client for the trip planning backend.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::PlannerConfig;
use crate::error::PlanningError;
use crate::models::Address;
use crate::traits::TripPlanner;

#[derive(Debug, Serialize)]
struct PlanRequest<'a> {
    #[serde(rename = "enderecos")]
    addresses: &'a [Address],
}

/// Asks the planning backend for a visiting order.
#[derive(Debug, Clone)]
pub struct TripPlannerClient {
    config: PlannerConfig,
    client: reqwest::blocking::Client,
}

impl TripPlannerClient {
    pub fn new(config: PlannerConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl TripPlanner for TripPlannerClient {
    fn plan(&self, addresses: &[Address]) -> Result<Vec<Address>, PlanningError> {
        if addresses.is_empty() {
            return Err(PlanningError::EmptySelection);
        }

        let url = format!("{}/rota", self.config.base_url.trim_end_matches('/'));
        debug!(count = addresses.len(), "requesting visiting order");

        let body: Value = self
            .client
            .post(url)
            .json(&PlanRequest { addresses })
            .send()?
            .error_for_status()?
            .json()?;

        parse_plan(body)
    }
}

/// Extracts the ordered stops from the backend answer.
fn parse_plan(body: Value) -> Result<Vec<Address>, PlanningError> {
    let Some(Value::Array(items)) = body.get("rota") else {
        warn!("planning backend answered without a route");
        return Err(PlanningError::PlanningFailed("malformed response".to_string()));
    };

    serde_json::from_value(Value::Array(items.clone()))
        .map_err(|err| PlanningError::PlanningFailed(err.to_string()))
}
