//! Weather Service
//!
//! One query: resolve the city, then build its forecast, within a deadline.

use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::Result;
use crate::error::WeatherError;
use crate::forecast_pipeline::ForecastPipeline;
use crate::location_resolver::LocationResolver;
use crate::models::WeatherDisplay;

#[derive(Clone)]
pub struct WeatherService {
    resolver: LocationResolver,
    pipeline: ForecastPipeline,
    deadline: Duration,
}

impl WeatherService {
    pub fn new(resolver: LocationResolver, pipeline: ForecastPipeline, deadline: Duration) -> Self {
        Self {
            resolver,
            pipeline,
            deadline,
        }
    }

    /// Resolve `city` and return its display forecast
    #[instrument(skip(self))]
    pub async fn weather_for(&self, city: &str) -> Result<WeatherDisplay> {
        if city.trim().is_empty() {
            return Err(WeatherError::validation("City name cannot be empty"));
        }

        let query = async {
            let coordinate = self.resolver.resolve(city).await?;
            self.pipeline.forecast_for(city, coordinate).await
        };

        match tokio::time::timeout(self.deadline, query).await {
            Ok(result) => {
                if let Ok(forecast) = &result {
                    if forecast.is_empty() {
                        warn!("Forecast for {} has no entries", city);
                    } else {
                        info!("Built forecast for {} with {} entries", city, forecast.forecasts.len());
                    }
                }
                result
            }
            Err(_) => {
                warn!("Query for {} exceeded {:?}", city, self.deadline);
                Err(WeatherError::DeadlineExceeded(self.deadline))
            }
        }
    }
}
