//! citycast - hourly temperature forecasts by city name
//!
//! City names are resolved to coordinates through a persistent cache in front
//! of the Open-Meteo geocoder, then the hourly forecast for those coordinates
//! is turned into display-ready rows.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod forecast_pipeline;
pub mod location_resolver;
pub mod models;
pub mod weather;
pub mod weather_service;
pub mod web;

// Re-export core types for public API
pub use cache::{CityLookup, CityStore, PersistentCityStore};
pub use config::CitycastConfig;
pub use error::WeatherError;
pub use forecast_pipeline::{ForecastPipeline, transform};
pub use location_resolver::LocationResolver;
pub use models::{Coordinate, DisplayForecastEntry, NamedLocation, WeatherDisplay};
pub use weather::{ForecastSource, Geocoder, OpenMeteoClient};
pub use weather_service::WeatherService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherError>;
