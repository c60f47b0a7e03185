//! # Identity Newtypes
//!
//! Wrappers for the identifiers the workflow layer hands to persistence.
//! A `ShipmentId` cannot be confused with any other UUID-backed value.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FreightError;

/// Unique identifier for a shipment (import, export, transit or transport process).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipmentId(pub Uuid);

impl ShipmentId {
    /// Generate a new random shipment identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Hyphenated UUID form, without the `shipment:` display prefix.
    ///
    /// This is the form used for file names and database keys.
    pub fn key(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl Default for ShipmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ShipmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "shipment:{}", self.0)
    }
}

impl FromStr for ShipmentId {
    type Err = FreightError;

    /// Accepts both the bare UUID and the `shipment:`-prefixed display form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("shipment:").unwrap_or(s);
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|e| FreightError::Validation(format!("invalid shipment id {s:?}: {e}")))
    }
}
