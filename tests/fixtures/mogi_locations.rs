//! Delivery locations in Mogi das Cruzes (SP) for realistic fixtures.
//!
//! Coordinates are approximate and rounded to five decimals so they survive
//! polyline encoding unchanged.

use courier_route::models::{Address, Coordinate};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    pub fn address(&self, id: u32) -> Address {
        Address::new(id, self.name)
    }
}

/// Distribution base every run starts from.
pub const BASE: Location = Location::new("Base de Entregas", -23.51440, -46.18743);

pub const CENTRO: &[Location] = &[
    Location::new("Rua Dr. Deodato Wertheimer, 1200", -23.52180, -46.18890),
    Location::new("Rua Jose Bonifacio, 300", -23.52350, -46.19210),
    Location::new("Rua Ipiranga, 560", -23.52640, -46.18610),
];

pub const BRAZ_CUBAS: &[Location] = &[
    Location::new("Avenida Francisco Ferreira Lopes, 900", -23.53470, -46.21330),
    Location::new("Rua Jose Urbano Sanches, 120", -23.53910, -46.21050),
];
