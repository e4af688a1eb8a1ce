use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use citycast::{
    CitycastConfig, ForecastPipeline, LocationResolver, OpenMeteoClient, PersistentCityStore,
    WeatherService, web,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(config: &CitycastConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("citycast={}", config.logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "compact" {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = CitycastConfig::load_from_path(config_path)?;
    init_tracing(&config);

    tracing::info!("Starting citycast {}", citycast::VERSION);

    let store = PersistentCityStore::open(&config.store.path)
        .with_context(|| format!("Failed to open city store at {}", config.store.path))?;
    tracing::info!("City store opened at {}", config.store.path);

    let client = Arc::new(OpenMeteoClient::new(&config)?);
    let resolver = LocationResolver::new(Arc::new(store), client.clone());
    let pipeline = ForecastPipeline::new(client);
    let service = WeatherService::new(resolver, pipeline, config.query_deadline());

    web::run(&config.bind_address(), service).await
}
