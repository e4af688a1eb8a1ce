//! Persistent city cache
//!
//! Coordinates resolved by the geocoder are kept forever in the `cities`
//! keyspace of an embedded fjall database, keyed by the exact city name.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fjall::Keyspace;
use serde::{Deserialize, Serialize};
use tokio::task;

use crate::Result;
use crate::error::WeatherError;
use crate::models::{Coordinate, NamedLocation};

const CITIES_KEYSPACE: &str = "cities";

/// Outcome of a store lookup. Store failures are reported through `Err`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CityLookup {
    Hit(Coordinate),
    Miss,
}

/// Storage for resolved city coordinates
#[async_trait]
pub trait CityStore: Send + Sync {
    /// Look up the coordinate stored for `name`.
    async fn lookup(&self, name: &str) -> Result<CityLookup>;

    /// Store `location` unless a row for its name already exists.
    /// Returns the coordinate that was already stored, if any.
    async fn insert_if_absent(&self, location: &NamedLocation) -> Result<Option<Coordinate>>;
}

#[derive(Serialize, Deserialize)]
struct StoredCity {
    lat: f64,
    long: f64,
}

impl From<StoredCity> for Coordinate {
    fn from(city: StoredCity) -> Self {
        Coordinate::new(city.lat, city.long)
    }
}

impl From<Coordinate> for StoredCity {
    fn from(coordinate: Coordinate) -> Self {
        StoredCity {
            lat: coordinate.latitude,
            long: coordinate.longitude,
        }
    }
}

/// fjall backed [`CityStore`]
#[derive(Clone)]
pub struct PersistentCityStore {
    store: Keyspace,
    // Serializes the get+insert pair so two writers for one name cannot both insert.
    write_lock: Arc<Mutex<()>>,
}

fn get_from_store(store: &Keyspace, key: &[u8]) -> Result<Option<StoredCity>> {
    let bytes = store
        .get(key)
        .map_err(|e| WeatherError::store_read(e.to_string()))?;
    bytes
        .map(|v| postcard::from_bytes::<StoredCity>(&v))
        .transpose()
        .map_err(|e| WeatherError::store_read(format!("corrupt city record: {e}")))
}

fn insert_into_store(
    store: &Keyspace,
    write_lock: &Mutex<()>,
    key: &[u8],
    city: StoredCity,
) -> Result<Option<StoredCity>> {
    let _guard = write_lock
        .lock()
        .map_err(|_| WeatherError::store_write("store write lock poisoned"))?;

    let existing = store
        .get(key)
        .map_err(|e| WeatherError::store_write(e.to_string()))?;
    if let Some(bytes) = existing {
        let stored = postcard::from_bytes::<StoredCity>(&bytes)
            .map_err(|e| WeatherError::store_write(format!("corrupt city record: {e}")))?;
        return Ok(Some(stored));
    }

    let bytes = postcard::to_stdvec(&city).map_err(|e| WeatherError::store_write(e.to_string()))?;
    store
        .insert(key.to_vec(), bytes)
        .map_err(|e| WeatherError::store_write(e.to_string()))?;
    Ok(None)
}

impl PersistentCityStore {
    /// Open (or create) the city database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path)
            .open()
            .map_err(|e| WeatherError::store_read(format!("failed to open city database: {e}")))?;
        let store = db
            .keyspace(CITIES_KEYSPACE, fjall::KeyspaceCreateOptions::default)
            .map_err(|e| WeatherError::store_read(format!("failed to open keyspace: {e}")))?;
        Ok(PersistentCityStore {
            store,
            write_lock: Arc::new(Mutex::new(())),
        })
    }
}

fn join_error(e: task::JoinError) -> WeatherError {
    WeatherError::store_read(format!("store task failed: {e}"))
}

#[async_trait]
impl CityStore for PersistentCityStore {
    #[tracing::instrument(name = "query_city_cache", level = "debug", skip(self))]
    async fn lookup(&self, name: &str) -> Result<CityLookup> {
        let store = self.store.clone();
        let key = name.as_bytes().to_vec();

        let stored = task::spawn_blocking(move || get_from_store(&store, &key))
            .await
            .map_err(join_error)??;

        match stored {
            Some(city) => {
                tracing::debug!("City found in cache");
                Ok(CityLookup::Hit(city.into()))
            }
            None => {
                tracing::debug!("City not in cache");
                Ok(CityLookup::Miss)
            }
        }
    }

    #[tracing::instrument(name = "put_city_cache", level = "debug", skip(self))]
    async fn insert_if_absent(&self, location: &NamedLocation) -> Result<Option<Coordinate>> {
        let store = self.store.clone();
        let write_lock = Arc::clone(&self.write_lock);
        let key = location.name.as_bytes().to_vec();
        let coordinate = location.coordinate;

        let existing = task::spawn_blocking(move || {
            insert_into_store(&store, &write_lock, &key, coordinate.into())
        })
        .await
        .map_err(|e| WeatherError::store_write(format!("store task failed: {e}")))??;

        if existing.is_some() {
            tracing::debug!("City already cached by a concurrent request");
        }
        Ok(existing.map(Coordinate::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, PersistentCityStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistentCityStore::open(dir.path().join("cities")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_lookup_missing_city_is_miss() {
        let (_dir, store) = open_temp();
        assert_eq!(store.lookup("Paris").await.unwrap(), CityLookup::Miss);
    }

    #[tokio::test]
    async fn test_insert_then_lookup_hits() {
        let (_dir, store) = open_temp();
        let paris = Coordinate::new(48.8566, 2.3522);

        let existing = store
            .insert_if_absent(&NamedLocation::new("Paris", paris))
            .await
            .unwrap();
        assert!(existing.is_none());

        assert_eq!(store.lookup("Paris").await.unwrap(), CityLookup::Hit(paris));
    }

    #[tokio::test]
    async fn test_insert_if_absent_keeps_first_row() {
        let (_dir, store) = open_temp();
        let first = Coordinate::new(48.8566, 2.3522);
        let second = Coordinate::new(33.6609, -95.5555);

        store
            .insert_if_absent(&NamedLocation::new("Paris", first))
            .await
            .unwrap();
        let existing = store
            .insert_if_absent(&NamedLocation::new("Paris", second))
            .await
            .unwrap();

        assert_eq!(existing, Some(first));
        assert_eq!(store.lookup("Paris").await.unwrap(), CityLookup::Hit(first));
    }

    #[tokio::test]
    async fn test_lookup_is_exact_name_match() {
        let (_dir, store) = open_temp();
        store
            .insert_if_absent(&NamedLocation::new("Paris", Coordinate::new(48.8566, 2.3522)))
            .await
            .unwrap();

        assert_eq!(store.lookup("paris").await.unwrap(), CityLookup::Miss);
        assert_eq!(store.lookup("Paris ").await.unwrap(), CityLookup::Miss);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_store_one_row() {
        let (_dir, store) = open_temp();
        let a = Coordinate::new(1.0, 1.0);
        let b = Coordinate::new(2.0, 2.0);

        let first = NamedLocation::new("Springfield", a);
        let second = NamedLocation::new("Springfield", b);

        let (ra, rb) = tokio::join!(
            store.insert_if_absent(&first),
            store.insert_if_absent(&second)
        );
        let (ra, rb) = (ra.unwrap(), rb.unwrap());

        // Exactly one of the two writers saw an existing row.
        assert!(ra.is_none() ^ rb.is_none());
        let CityLookup::Hit(stored) = store.lookup("Springfield").await.unwrap() else {
            panic!("expected a cached row");
        };
        assert!(stored == a || stored == b);
    }
}
