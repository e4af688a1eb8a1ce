//! Location Resolution Module
//!
//! Resolves city names to coordinates. The persistent store acts as a
//! cache in front of the geocoder: hits never reach the network, and every
//! successful geocode is written back before it is returned.

use std::sync::Arc;

use tracing::{debug, info};

use crate::Result;
use crate::cache::{CityLookup, CityStore};
use crate::error::WeatherError;
use crate::models::{Coordinate, NamedLocation};
use crate::weather::Geocoder;

/// Service for resolving city names into coordinates
#[derive(Clone)]
pub struct LocationResolver {
    store: Arc<dyn CityStore>,
    geocoder: Arc<dyn Geocoder>,
}

impl LocationResolver {
    pub fn new(store: Arc<dyn CityStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { store, geocoder }
    }

    /// Resolve a city name to its coordinate
    ///
    /// # Errors
    /// `StoreRead` if the cache cannot be queried, `NotFound` if the geocoder
    /// has no candidate, `StoreWrite` if the write-back fails. Geocoder
    /// transport errors are passed through.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, name: &str) -> Result<Coordinate> {
        if let CityLookup::Hit(coordinate) = self.store.lookup(name).await? {
            debug!(
                "Cache hit for {} at ({:.4}, {:.4})",
                name, coordinate.latitude, coordinate.longitude
            );
            return Ok(coordinate);
        }

        debug!("Geocoding location name: {}", name);
        let coordinate = self
            .geocoder
            .geocode(name)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::not_found(name))?;

        // A concurrent request may have stored the name first; its row wins.
        let resolved = self
            .store
            .insert_if_absent(&NamedLocation::new(name, coordinate))
            .await?
            .unwrap_or(coordinate);

        info!(
            "Resolved {} to ({:.4}, {:.4})",
            name, resolved.latitude, resolved.longitude
        );
        Ok(resolved)
    }
}
