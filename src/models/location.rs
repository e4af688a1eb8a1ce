//! Location model for geographic coordinates

use serde::{Deserialize, Serialize};

/// A point on the globe in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Format coordinates the way the forecast lookup expects them
    #[must_use]
    pub fn format_query(&self) -> (String, String) {
        (
            format!("{:.6}", self.latitude),
            format!("{:.6}", self.longitude),
        )
    }
}

/// A city name together with its resolved coordinate. `name` is the natural key.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NamedLocation {
    pub name: String,
    pub coordinate: Coordinate,
}

impl NamedLocation {
    #[must_use]
    pub fn new(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            name: name.into(),
            coordinate,
        }
    }
}
