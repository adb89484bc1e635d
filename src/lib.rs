//! courier-route
//!
//! Route planning, simulated progress and delivery tracking for a courier's
//! run: select addresses, obtain a visiting order, geocode and route them,
//! then follow the route and close every stop as visited or cancelled.

pub mod camera;
pub mod config;
pub mod error;
pub mod google;
pub mod haversine;
pub mod models;
pub mod osrm;
pub mod osrm_data;
pub mod planner;
pub mod polyline;
pub mod route_fetch;
pub mod selection;
pub mod session;
pub mod simulator;
pub mod tracker;
pub mod traits;
pub mod trip_planner;
