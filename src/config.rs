//! Runtime configuration.
//!
//! Every section has a `Default` matching the deployment the app was built
//! for (Mogi das Cruzes, SP). `CourierConfig::from_env` overlays `COURIER_*`
//! environment variables on top of the defaults.

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::haversine::ProximityMetric;
use crate::models::Coordinate;
use crate::osrm::OsrmConfig;

/// Fixed starting point of every run (the distribution base).
pub const DEFAULT_ORIGIN: Coordinate = Coordinate::new(-23.514397, -46.187431);

/// How addresses are turned into geocoder queries and markers.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeConfig {
    /// Appended to each address before it is sent to the geocoder.
    pub locality_suffix: Option<String>,
    /// Subtracted from resolved latitudes so markers do not sit on the path.
    pub latitude_offset: f64,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            locality_suffix: Some(", Mogi das Cruzes - SP".to_string()),
            latitude_offset: 0.00003,
        }
    }
}

impl GeocodeConfig {
    /// Query text sent to the geocoder for `address`.
    pub fn query_for(&self, address: &str) -> String {
        match &self.locality_suffix {
            Some(suffix) => format!("{}{}", address, suffix),
            None => address.to_string(),
        }
    }
}

/// Google Maps web service settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleConfig {
    pub base_url: String,
    pub api_key: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api".to_string(),
            api_key: String::new(),
            language: "pt-BR".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Which service computes the driving route.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingProvider {
    Google,
    Osrm,
}

impl FromStr for RoutingProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(RoutingProvider::Google),
            "osrm" => Ok(RoutingProvider::Osrm),
            _ => Err(ConfigError::InvalidValue {
                key: "COURIER_ROUTING_PROVIDER",
                value: value.to_string(),
            }),
        }
    }
}

/// Trip planning backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub tick: Duration,
    pub metric: ProximityMetric,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(300),
            metric: ProximityMetric::default(),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CourierConfig {
    pub origin: Coordinate,
    pub provider: RoutingProvider,
    pub geocode: GeocodeConfig,
    pub google: GoogleConfig,
    pub osrm: OsrmConfig,
    pub planner: PlannerConfig,
    pub simulation: SimulationConfig,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN,
            provider: RoutingProvider::Google,
            geocode: GeocodeConfig::default(),
            google: GoogleConfig::default(),
            osrm: OsrmConfig::default(),
            planner: PlannerConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl CourierConfig {
    /// Reads `COURIER_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("COURIER_ORIGIN") {
            config.origin = parse_coordinate("COURIER_ORIGIN", &value)?;
        }
        if let Some(value) = lookup("COURIER_LOCALITY") {
            config.geocode.locality_suffix = if value.is_empty() { None } else { Some(value) };
        }
        if let Some(value) = lookup("COURIER_LATITUDE_OFFSET") {
            config.geocode.latitude_offset = parse("COURIER_LATITUDE_OFFSET", &value)?;
        }
        if let Some(value) = lookup("COURIER_ROUTING_PROVIDER") {
            config.provider = value.parse()?;
        }
        if let Some(value) = lookup("COURIER_GOOGLE_API_KEY") {
            config.google.api_key = value;
        }
        if let Some(value) = lookup("COURIER_GOOGLE_URL") {
            config.google.base_url = value;
        }
        if let Some(value) = lookup("COURIER_LANGUAGE") {
            config.google.language = value;
        }
        if let Some(value) = lookup("COURIER_OSRM_URL") {
            config.osrm.base_url = value;
        }
        if let Some(value) = lookup("COURIER_OSRM_PROFILE") {
            config.osrm.profile = value;
        }
        if let Some(value) = lookup("COURIER_PLANNER_URL") {
            config.planner.base_url = value;
        }
        if let Some(value) = lookup("COURIER_TICK_MS") {
            config.simulation.tick = Duration::from_millis(parse("COURIER_TICK_MS", &value)?);
        }
        if let Some(value) = lookup("COURIER_ARRIVAL_METERS") {
            config.simulation.metric = ProximityMetric::Haversine {
                threshold_meters: parse("COURIER_ARRIVAL_METERS", &value)?,
            };
        }

        // Addresses are always geocoded by the hosted service, whichever router is used.
        if config.google.api_key.is_empty() {
            return Err(ConfigError::Missing("COURIER_GOOGLE_API_KEY"));
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_coordinate(key: &'static str, value: &str) -> Result<Coordinate, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    };
    let (lat, lng) = value.split_once(',').ok_or_else(invalid)?;
    let latitude = lat.trim().parse().map_err(|_| invalid())?;
    let longitude = lng.trim().parse().map_err(|_| invalid())?;
    Ok(Coordinate::new(latitude, longitude))
}
