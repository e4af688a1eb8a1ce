mod view;

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::WeatherError;
use crate::models::WeatherDisplay;
use crate::weather_service::WeatherService;

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    #[serde(default)]
    pub city: String,
}

/// Error returned to HTTP clients as `{"error": "..."}`
pub struct ApiError(WeatherError);

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        Self(err)
    }
}

/// HTTP status for each error kind
#[must_use]
pub fn status_for(err: &WeatherError) -> StatusCode {
    match err {
        WeatherError::Validation { .. } => StatusCode::BAD_REQUEST,
        WeatherError::NotFound { .. } => StatusCode::NOT_FOUND,
        WeatherError::UpstreamUnavailable { .. }
        | WeatherError::BodyRead { .. }
        | WeatherError::MalformedResponse { .. }
        | WeatherError::TimeParse { .. } => StatusCode::BAD_GATEWAY,
        WeatherError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
        WeatherError::StoreRead { .. }
        | WeatherError::StoreWrite { .. }
        | WeatherError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if self.0.is_upstream() {
            tracing::warn!("Upstream failure: {}", self.0);
        } else if status.is_server_error() {
            tracing::error!("Weather request failed: {}", self.0);
        } else {
            tracing::debug!("Weather request rejected: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

pub fn router(service: WeatherService) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/weather", get(get_weather))
        .with_state(service)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> &'static str {
    "ok"
}

/// Browsers submitting the index form ask for HTML; everything else gets JSON
fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

async fn get_weather(
    State(service): State<WeatherService>,
    headers: HeaderMap,
    Query(query): Query<WeatherQuery>,
) -> Response {
    let result = service.weather_for(&query.city).await;

    if wants_html(&headers) {
        return match result {
            Ok(forecast) => Html(view::render_weather(&forecast)).into_response(),
            Err(err) => {
                let status = status_for(&err);
                (status, Html(view::render_error(&err))).into_response()
            }
        };
    }

    match result {
        Ok(forecast) => Json::<WeatherDisplay>(forecast).into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}
