//! Open-Meteo geocoding and forecast client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{ForecastSource, Geocoder};
use crate::Result;
use crate::config::CitycastConfig;
use crate::error::WeatherError;
use crate::models::Coordinate;

const USER_AGENT: &str = concat!("citycast/", env!("CARGO_PKG_VERSION"));

/// Geocoding response from Open-Meteo. `results` is omitted when nothing matches.
#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    #[serde(default)]
    pub results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResult {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
    pub country: Option<String>,
}

impl From<GeocodingResult> for Coordinate {
    fn from(result: GeocodingResult) -> Self {
        Coordinate::new(result.latitude, result.longitude)
    }
}

/// Hourly forecast response from Open-Meteo
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub hourly: HourlyData,
}

/// Parallel arrays: `temperature[i]` belongs to `time[i]`
#[derive(Debug, Deserialize)]
pub struct HourlyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m")]
    pub temperature: Vec<f64>,
}

/// HTTP client for both Open-Meteo endpoints
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    geocoding_base_url: String,
    geocoding_timeout: Duration,
    forecast_base_url: String,
    forecast_timeout: Duration,
}

impl OpenMeteoClient {
    pub fn new(config: &CitycastConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            geocoding_base_url: config.geocoding.base_url.trim_end_matches('/').to_string(),
            geocoding_timeout: Duration::from_secs(config.geocoding.timeout_seconds.into()),
            forecast_base_url: config.forecast.base_url.trim_end_matches('/').to_string(),
            forecast_timeout: Duration::from_secs(config.forecast.timeout_seconds.into()),
        })
    }

    fn geocoding_url(&self, name: &str) -> String {
        format!(
            "{}/search?name={}&count=1&language=en&format=json",
            self.geocoding_base_url,
            urlencoding::encode(name)
        )
    }

    fn forecast_url(&self, coordinate: Coordinate) -> String {
        let (latitude, longitude) = coordinate.format_query();
        format!(
            "{}/forecast?latitude={}&longitude={}&hourly=temperature_2m",
            self.forecast_base_url, latitude, longitude
        )
    }

    async fn get(&self, url: &str, timeout: Duration, service: &str) -> Result<Response> {
        debug!("{} request URL: {}", service, url);

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| WeatherError::upstream(format!("{service} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} returned status {}", service, status);
            return Err(WeatherError::upstream(format!(
                "{service} returned status {status}"
            )));
        }
        Ok(response)
    }

    async fn read_body(response: Response, service: &str) -> Result<Vec<u8>> {
        let body = response
            .bytes()
            .await
            .map_err(|e| WeatherError::body_read(format!("{service}: {e}")))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl Geocoder for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn geocode(&self, name: &str) -> Result<Vec<Coordinate>> {
        let url = self.geocoding_url(name);
        let response = self.get(&url, self.geocoding_timeout, "Geocoding API").await?;
        let body = Self::read_body(response, "Geocoding API").await?;

        let parsed: GeocodingResponse = serde_json::from_slice(&body).map_err(|e| {
            WeatherError::malformed(format!("error decoding geocoding response: {e}"))
        })?;

        if let Some(first) = parsed.results.first() {
            debug!(
                "Geocoded '{}' to {} ({}) at ({:.4}, {:.4})",
                name,
                first.name.as_deref().unwrap_or("?"),
                first.country.as_deref().unwrap_or("?"),
                first.latitude,
                first.longitude
            );
        }

        Ok(parsed.results.into_iter().map(Coordinate::from).collect())
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn fetch_forecast(&self, coordinate: Coordinate) -> Result<Vec<u8>> {
        let url = self.forecast_url(coordinate);
        let response = self.get(&url, self.forecast_timeout, "Weather API").await?;
        let body = Self::read_body(response, "Weather API").await?;
        debug!("Received {} bytes of forecast data", body.len());
        Ok(body)
    }
}
