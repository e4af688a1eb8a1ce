//! Display forecast model

use serde::{Deserialize, Serialize};

/// One formatted forecast row, e.g. `Mon 14:00` / `18.5°C`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DisplayForecastEntry {
    pub label: String,
    pub temperature_label: String,
}

/// Forecast for a city, rows ordered as delivered by the upstream source
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WeatherDisplay {
    pub city: String,
    pub forecasts: Vec<DisplayForecastEntry>,
}

impl WeatherDisplay {
    #[must_use]
    pub fn new(city: impl Into<String>, forecasts: Vec<DisplayForecastEntry>) -> Self {
        Self {
            city: city.into(),
            forecasts,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forecasts.is_empty()
    }
}
