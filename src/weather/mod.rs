//! Upstream weather services
//!
//! The resolver and the forecast pipeline only see the two traits below;
//! `open_meteo` provides the production implementation of both.

use async_trait::async_trait;

use crate::Result;
use crate::models::Coordinate;

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Free-text place name lookup
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidates for `name`, best match first. An empty list means no match.
    async fn geocode(&self, name: &str) -> Result<Vec<Coordinate>>;
}

/// Hourly temperature forecast lookup
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Raw, unparsed response body for `coordinate`.
    async fn fetch_forecast(&self, coordinate: Coordinate) -> Result<Vec<u8>>;
}
