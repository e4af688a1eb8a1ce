//! End-to-end tests: real fjall store, Open-Meteo replaced by wiremock

use std::sync::Arc;
use std::time::Duration;

use citycast::{
    CityLookup, CityStore, CitycastConfig, Coordinate, DisplayForecastEntry, ForecastPipeline,
    LocationResolver, OpenMeteoClient, PersistentCityStore, WeatherDisplay, WeatherError,
    WeatherService,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    _dir: tempfile::TempDir,
    store: Arc<PersistentCityStore>,
    service: WeatherService,
}

fn harness(server: &MockServer, deadline: Duration) -> Harness {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = Arc::new(PersistentCityStore::open(dir.path().join("cities")).expect("store"));

    let mut config = CitycastConfig::default();
    config.geocoding.base_url = format!("{}/geo/v1", server.uri());
    config.forecast.base_url = format!("{}/api/v1", server.uri());
    let client = Arc::new(OpenMeteoClient::new(&config).expect("client"));

    let resolver = LocationResolver::new(store.clone(), client.clone());
    let pipeline = ForecastPipeline::new(client);
    Harness {
        _dir: dir,
        store,
        service: WeatherService::new(resolver, pipeline, deadline),
    }
}

async fn mount_paris_forecast(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/forecast"))
        .and(query_param("latitude", "48.856600"))
        .and(query_param("longitude", "2.352200"))
        .and(query_param("hourly", "temperature_2m"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latitude": 48.86,
            "longitude": 2.3399997,
            "timezone": "GMT",
            "hourly": {
                "time": ["2024-03-11T14:00"],
                "temperature_2m": [18.45]
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_paris_end_to_end_caches_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/v1/search"))
        .and(query_param("name", "Paris"))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"latitude": 48.8566, "longitude": 2.3522}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_paris_forecast(&server).await;

    let h = harness(&server, Duration::from_secs(10));
    assert_eq!(h.store.lookup("Paris").await.unwrap(), CityLookup::Miss);

    let display = h.service.weather_for("Paris").await.unwrap();
    assert_eq!(
        display,
        WeatherDisplay {
            city: "Paris".to_string(),
            forecasts: vec![DisplayForecastEntry {
                label: "Mon 14:00".to_string(),
                temperature_label: "18.5°C".to_string(),
            }],
        }
    );
    assert_eq!(
        h.store.lookup("Paris").await.unwrap(),
        CityLookup::Hit(Coordinate::new(48.8566, 2.3522))
    );

    // Served from the store; the geocoder mock expects exactly one call.
    let again = h.service.weather_for("Paris").await.unwrap();
    assert_eq!(again, display);
    server.verify().await;
}

#[tokio::test]
async fn test_unknown_city_is_not_found_and_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"generationtime_ms": 0.2})))
        .mount(&server)
        .await;

    let h = harness(&server, Duration::from_secs(10));
    let err = h.service.weather_for("Atlantis").await.unwrap_err();
    assert!(matches!(err, WeatherError::NotFound { .. }));
    assert_eq!(h.store.lookup("Atlantis").await.unwrap(), CityLookup::Miss);
}

#[tokio::test]
async fn test_bad_forecast_time_fails_request_but_keeps_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"latitude": 52.52, "longitude": 13.41}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hourly": {
                "time": ["2024-03-11T14:00", "2024-03-11T15:00:00"],
                "temperature_2m": [5.0, 6.0]
            }
        })))
        .mount(&server)
        .await;

    let h = harness(&server, Duration::from_secs(10));
    let err = h.service.weather_for("Berlin").await.unwrap_err();
    assert!(matches!(err, WeatherError::TimeParse { .. }));
    assert_eq!(
        h.store.lookup("Berlin").await.unwrap(),
        CityLookup::Hit(Coordinate::new(52.52, 13.41))
    );
}

#[tokio::test]
async fn test_slow_forecast_hits_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"latitude": 48.8566, "longitude": 2.3522}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"hourly": {"time": [], "temperature_2m": []}}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let h = harness(&server, Duration::from_millis(300));
    let err = h.service.weather_for("Paris").await.unwrap_err();
    assert!(matches!(err, WeatherError::DeadlineExceeded(_)));
}
