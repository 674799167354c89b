mod app;
mod auth;
mod config;
mod db;
mod errors;
mod external;
mod jobs;
mod logging;
mod models;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use config::AppConfig;
use external::brokerage::UnconfiguredBrokerageProvider;
use external::eodhd::EodhdProvider;
use external::price_provider::PriceProvider;
use jobs::queue::{self, JobContext};
use logging::LoggingConfig;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    logging::init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let reset = queue::recover_on_startup(&pool).await?;
    tracing::info!(reset, "startup job recovery complete");

    let price_provider: Arc<dyn PriceProvider> = match &config.eodhd_api_key {
        Some(key) => Arc::new(EodhdProvider::new(key.clone(), config.eodhd_api_base.clone())),
        None => {
            tracing::warn!("EODHD_API_KEY not set; market-data collection will fail upstream calls");
            Arc::new(EodhdProvider::new(String::new(), config.eodhd_api_base.clone()))
        }
    };
    let brokerage = Arc::new(UnconfiguredBrokerageProvider);
    let heavy_semaphore = Arc::new(Semaphore::new(config.heavy_job_limit));

    let bind_addr = config.bind_addr.clone();
    let watcher_delay = Duration::from_secs(config.watcher_startup_delay_secs);
    let config = Arc::new(config);

    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
        price_provider: price_provider.clone(),
        brokerage: brokerage.clone(),
        heavy_semaphore: heavy_semaphore.clone(),
    };

    let job_ctx = JobContext {
        pool,
        price_provider,
        brokerage,
        heavy_semaphore,
    };
    queue::spawn_watchers(job_ctx, 3, watcher_delay);

    let app = app::create_app(state);

    let addr: SocketAddr = bind_addr.parse().unwrap_or_else(|_| ([0, 0, 0, 0], 3000).into());
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Vire backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
