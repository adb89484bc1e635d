//! Command-line driver: plan, route and simulate one delivery run.
//!
//! The address file is a JSON array of `{ "id", "endereco", "tipo"? }`.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use courier_route::config::{CourierConfig, RoutingProvider};
use courier_route::error::{ConfigError, CourierError, PlanningError};
use courier_route::google::GoogleMapsClient;
use courier_route::haversine::HaversineMatrix;
use courier_route::models::{Address, CancelReason};
use courier_route::osrm::OsrmClient;
use courier_route::planner::LocalTripPlanner;
use courier_route::route_fetch::fetch_route;
use courier_route::session::{RouteSession, ScreenScope, SimulationEnd, TickOutcome, run_simulation};
use courier_route::tracker::RunSummary;
use courier_route::traits::{CameraPosition, DirectionsProvider, MapSurface, TripPlanner};
use courier_route::trip_planner::TripPlannerClient;

/// Plans, routes and simulates one courier run, then prints its summary.
#[derive(Debug, Parser)]
#[command(name = "courier-route", version)]
struct Args {
    /// JSON file with the selected addresses
    addresses: PathBuf,

    /// Order stops locally instead of asking the planning backend
    #[arg(long)]
    local_plan: bool,
}

/// Map surface for a terminal: camera moves are only logged.
struct LogMap;

impl MapSurface for LogMap {
    fn animate_camera(&mut self, camera: CameraPosition, duration_ms: u64) {
        debug!(
            lat = camera.center.latitude,
            lng = camera.center.longitude,
            duration_ms,
            "camera"
        );
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    match run(&args.addresses, args.local_plan) {
        Ok(summary) => {
            match serde_json::to_string_pretty(&summary) {
                Ok(json) => println!("{}", json),
                Err(err) => error!(error = %err, "could not print summary"),
            }
            ExitCode::SUCCESS
        }
        Err(CourierError::Planning(PlanningError::EmptySelection)) => {
            warn!("select at least one address to continue");
            ExitCode::from(2)
        }
        Err(err) => {
            error!(error = %err, "run aborted");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &Path, local_plan: bool) -> Result<RunSummary, CourierError> {
    let config = CourierConfig::from_env()?;
    let raw = std::fs::read_to_string(path).map_err(ConfigError::from)?;
    let addresses: Vec<Address> = serde_json::from_str(&raw).map_err(ConfigError::from)?;

    let google = GoogleMapsClient::new(config.google.clone()).map_err(client_error)?;

    let ordered = if local_plan {
        let matrix = HaversineMatrix::default();
        LocalTripPlanner {
            geocoder: &google,
            matrix: &matrix,
            geocode: &config.geocode,
            origin: config.origin,
        }
        .plan(&addresses)?
    } else {
        TripPlannerClient::new(config.planner.clone())
            .map_err(client_error)?
            .plan(&addresses)?
    };
    info!(stops = ordered.len(), "visiting order received");

    let osrm;
    let directions: &dyn DirectionsProvider = match config.provider {
        RoutingProvider::Google => &google,
        RoutingProvider::Osrm => {
            osrm = OsrmClient::new(config.osrm.clone()).map_err(client_error)?;
            &osrm
        }
    };

    let scope = ScreenScope::new();
    let route = fetch_route(&google, directions, config.origin, &ordered, &config.geocode)?;
    let route = scope.deliver(route)?;

    let mut session = RouteSession::simulated(route, config.simulation.metric);
    if let Some(instruction) = session.current_instruction() {
        info!(instruction, "current instruction");
    }

    let mut map = LogMap;
    let end = run_simulation(&mut session, &mut map, &scope, config.simulation.tick, |session, _, outcome| {
        if let TickOutcome::Moved { reached, .. } = outcome {
            if !reached.is_empty() {
                info!(progress = %session.tracker().progress_label(), "stop reached");
            }
        }
        ControlFlow::Continue(())
    });
    info!(?end, cursor = session.cursor(), "simulation ended");
    scope.close();

    if end == SimulationEnd::NotStarted {
        warn!("route is empty, nothing to simulate");
    }

    // Stops the simulated vehicle never came close to are closed as "Other".
    for index in 0..session.tracker().len() {
        if session.cancel(index, Some(CancelReason::Other)).is_ok() {
            warn!(index, "stop not reached, cancelled");
        }
    }

    Ok(session.finish()?)
}

fn client_error(err: reqwest::Error) -> CourierError {
    CourierError::Route(err.into())
}
