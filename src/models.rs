//! Domain records shared across the courier run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A point on the map in floating point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate from degrees.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Formats as `lat,lng` with six decimals, the form routing queries expect.
    pub fn to_query(&self) -> String {
        format!("{:.6},{:.6}", self.latitude, self.longitude)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(coordinate: Coordinate) -> Self {
        (coordinate.latitude, coordinate.longitude)
    }
}

/// Priority flag attached to an address by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressCategory {
    #[serde(rename = "urgente")]
    Urgent,
    /// Any other `tipo` the backend sends.
    #[serde(other)]
    Normal,
}

/// A delivery address picked by the courier.
///
/// Field names on the wire follow the planning backend's JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: u32,
    #[serde(rename = "endereco")]
    pub text: String,
    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<AddressCategory>,
}

impl Address {
    /// Creates an address without a category.
    pub fn new(id: u32, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            category: None,
        }
    }

    /// Marks the address as urgent.
    pub fn urgent(mut self) -> Self {
        self.category = Some(AddressCategory::Urgent);
        self
    }

    /// True for addresses the dispatcher flagged as urgent.
    pub fn is_urgent(&self) -> bool {
        self.category == Some(AddressCategory::Urgent)
    }
}

/// Fixed set of reasons a courier may give when abandoning a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CancelReason {
    CustomerAbsent,
    WrongAddress,
    PackageLost,
    Other,
}

impl CancelReason {
    /// Every reason, in the order offered to the courier.
    pub const ALL: [CancelReason; 4] = [
        CancelReason::CustomerAbsent,
        CancelReason::WrongAddress,
        CancelReason::PackageLost,
        CancelReason::Other,
    ];

    /// Text shown on the cancel dialog.
    pub fn label(&self) -> &'static str {
        match self {
            CancelReason::CustomerAbsent => "Customer Absent",
            CancelReason::WrongAddress => "Wrong Address",
            CancelReason::PackageLost => "Package Lost",
            CancelReason::Other => "Other",
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-delivery status. Visited and cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Pending,
    Visited,
    Cancelled(CancelReason),
}

impl DeliveryStatus {
    /// Visited and cancelled stops never change again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeliveryStatus::Pending)
    }
}

/// A geocoded address awaiting visitation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPoint {
    pub address_id: u32,
    /// Position of the source address in the input order.
    pub input_index: usize,
    pub coordinate: Coordinate,
}
