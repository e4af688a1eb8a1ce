//! Forecast Pipeline
//!
//! Fetches the hourly temperature series for a coordinate and reshapes it into
//! display rows. Temperatures are always Celsius: the upstream request asks for
//! the default unit and any unit metadata in the response is ignored.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, instrument};

use crate::Result;
use crate::error::WeatherError;
use crate::models::{Coordinate, DisplayForecastEntry, WeatherDisplay};
use crate::weather::ForecastSource;
use crate::weather::open_meteo::ForecastResponse;

/// Layout of `hourly.time` entries, e.g. `2024-03-11T14:00`
pub const TIME_LAYOUT: &str = "%Y-%m-%dT%H:%M";

/// Layout of display labels, e.g. `Mon 14:00`
pub const LABEL_LAYOUT: &str = "%a %H:%M";

/// Byte shape of [`TIME_LAYOUT`]: `d` is an ASCII digit, anything else is literal
const TIME_SHAPE: &[u8] = b"dddd-dd-ddTdd:dd";

fn matches_time_shape(value: &str) -> bool {
    value.len() == TIME_SHAPE.len()
        && value
            .bytes()
            .zip(TIME_SHAPE.iter())
            .all(|(byte, &expected)| match expected {
                b'd' => byte.is_ascii_digit(),
                literal => byte == literal,
            })
}

/// Parse one forecast timestamp using the exact [`TIME_LAYOUT`].
pub fn parse_forecast_time(value: &str) -> Result<NaiveDateTime> {
    // chrono accepts padding, signs and unpadded fields; the upstream contract does not
    if !matches_time_shape(value) {
        return Err(WeatherError::time_parse(value, "expected YYYY-MM-DDTHH:MM"));
    }
    NaiveDateTime::parse_from_str(value, TIME_LAYOUT)
        .map_err(|e| WeatherError::time_parse(value, e.to_string()))
}

/// Format a Celsius temperature with one decimal, rounding half away from zero.
#[must_use]
pub fn format_temperature(celsius: f64) -> String {
    let scaled = celsius * 10.0;
    if !scaled.is_finite() {
        return format!("{celsius:.1}°C");
    }
    // + 0.0 turns -0.0 into 0.0
    let rounded = scaled.round() / 10.0 + 0.0;
    format!("{rounded:.1}°C")
}

/// Turn a raw forecast body into display rows for `city`.
///
/// Fails as a whole: one bad timestamp rejects the entire response.
pub fn transform(city: &str, raw_body: &[u8]) -> Result<WeatherDisplay> {
    let response: ForecastResponse = serde_json::from_slice(raw_body)
        .map_err(|e| WeatherError::malformed(format!("error decoding weather response: {e}")))?;

    let hourly = response.hourly;
    if hourly.time.len() != hourly.temperature.len() {
        return Err(WeatherError::malformed(format!(
            "hourly arrays differ in length: {} times, {} temperatures",
            hourly.time.len(),
            hourly.temperature.len()
        )));
    }

    let forecasts = hourly
        .time
        .iter()
        .zip(hourly.temperature.iter())
        .map(|(time, &temperature)| {
            let timestamp = parse_forecast_time(time)?;
            Ok(DisplayForecastEntry {
                label: timestamp.format(LABEL_LAYOUT).to_string(),
                temperature_label: format_temperature(temperature),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(WeatherDisplay::new(city, forecasts))
}

/// Fetches and transforms forecasts from a [`ForecastSource`]
#[derive(Clone)]
pub struct ForecastPipeline {
    source: Arc<dyn ForecastSource>,
}

impl ForecastPipeline {
    pub fn new(source: Arc<dyn ForecastSource>) -> Self {
        Self { source }
    }

    /// Raw forecast body for `coordinate`
    pub async fn fetch_forecast(&self, coordinate: Coordinate) -> Result<Vec<u8>> {
        self.source.fetch_forecast(coordinate).await
    }

    /// Fetch the forecast for `coordinate` and format it for `city`.
    #[instrument(skip(self))]
    pub async fn forecast_for(&self, city: &str, coordinate: Coordinate) -> Result<WeatherDisplay> {
        let raw = self.fetch_forecast(coordinate).await?;
        let forecast = transform(city, &raw)?;
        debug!("Built {} forecast rows for {}", forecast.forecasts.len(), city);
        Ok(forecast)
    }
}
