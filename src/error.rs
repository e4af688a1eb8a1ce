//! Error types and handling for the citycast service

use std::time::Duration;

use thiserror::Error;

/// Main error type for resolving a city and building its forecast
#[derive(Error, Debug)]
pub enum WeatherError {
    /// The geocoder returned no candidates for the name
    #[error("No location found for '{name}'")]
    NotFound { name: String },

    /// Transport-level failure talking to an upstream service
    #[error("Upstream service unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// The upstream response body could not be read completely
    #[error("Failed to read upstream response body: {message}")]
    BodyRead { message: String },

    /// The upstream body does not match the expected schema
    #[error("Malformed upstream response: {message}")]
    MalformedResponse { message: String },

    /// A forecast timestamp violates the expected layout
    #[error("Invalid forecast time '{value}': {message}")]
    TimeParse { value: String, message: String },

    /// The persistent store could not be queried
    #[error("Store read failed: {message}")]
    StoreRead { message: String },

    /// Write-back of a freshly geocoded city failed
    #[error("Store write failed: {message}")]
    StoreWrite { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// The whole query took longer than the configured deadline
    #[error("Query exceeded deadline of {}s", .0.as_secs())]
    DeadlineExceeded(Duration),

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl WeatherError {
    pub fn not_found<S: Into<String>>(name: S) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    pub fn body_read<S: Into<String>>(message: S) -> Self {
        Self::BodyRead {
            message: message.into(),
        }
    }

    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn time_parse<V: Into<String>, S: Into<String>>(value: V, message: S) -> Self {
        Self::TimeParse {
            value: value.into(),
            message: message.into(),
        }
    }

    pub fn store_read<S: Into<String>>(message: S) -> Self {
        Self::StoreRead {
            message: message.into(),
        }
    }

    pub fn store_write<S: Into<String>>(message: S) -> Self {
        Self::StoreWrite {
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True when the failure came from one of the upstream services
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            WeatherError::UpstreamUnavailable { .. }
                | WeatherError::BodyRead { .. }
                | WeatherError::MalformedResponse { .. }
                | WeatherError::TimeParse { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::NotFound { name } => format!("Could not find a place called '{name}'."),
            WeatherError::UpstreamUnavailable { .. } | WeatherError::BodyRead { .. } => {
                "Unable to reach the weather services. Please try again later.".to_string()
            }
            WeatherError::MalformedResponse { .. } | WeatherError::TimeParse { .. } => {
                "The weather service returned data we could not understand.".to_string()
            }
            WeatherError::StoreRead { .. } | WeatherError::StoreWrite { .. } => {
                "The location cache is unavailable. Please try again later.".to_string()
            }
            WeatherError::Validation { message } => format!("Invalid input: {message}"),
            WeatherError::DeadlineExceeded(_) => {
                "The request took too long. Please try again.".to_string()
            }
            WeatherError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
        }
    }
}
