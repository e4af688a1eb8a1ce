//! Data models for citycast
//!
//! - Location: coordinates and the persisted name/coordinate row
//! - Forecast: the display-ready forecast handed to the caller

pub mod forecast;
pub mod location;

pub use forecast::{DisplayForecastEntry, WeatherDisplay};
pub use location::{Coordinate, NamedLocation};
