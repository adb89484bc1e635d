//! Region catalog and address selection before a run.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, PlanningError};
use crate::models::Address;

/// Neighborhoods the couriers are dispatched to.
pub const REGIONS: [&str; 8] = [
    "Centro",
    "Braz Cubas",
    "Vila Mogilar",
    "Vila Oliveira",
    "Vila Mogi Moderno",
    "Jundiapeba",
    "Socorro",
    "Jardim Camila",
];

/// Delivery addresses grouped by region name.
#[derive(Debug, Clone, Default)]
pub struct AddressCatalog {
    regions: HashMap<String, Vec<Address>>,
}

impl AddressCatalog {
    /// Parses a `{ region: [address, ...] }` map.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let regions = serde_json::from_str(json)?;
        Ok(Self { regions })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Addresses of `region`; empty when the region is unknown.
    pub fn addresses(&self, region: &str) -> &[Address] {
        self.regions.get(region).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Addresses picked by the courier, in the order they were picked.
#[derive(Debug, Clone, Default)]
pub struct AddressSelection {
    selected: Vec<Address>,
}

impl AddressSelection {
    /// Adds the address, or removes it if an address with the same id is already selected.
    pub fn toggle(&mut self, address: &Address) {
        if let Some(position) = self.selected.iter().position(|a| a.id == address.id) {
            self.selected.remove(position);
        } else {
            self.selected.push(address.clone());
        }
    }

    /// True if the address with `id` is picked.
    pub fn is_selected(&self, id: u32) -> bool {
        self.selected.iter().any(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Locks the selection in for planning.
    pub fn confirm(self) -> Result<Vec<Address>, PlanningError> {
        if self.selected.is_empty() {
            return Err(PlanningError::EmptySelection);
        }
        Ok(self.selected)
    }
}
