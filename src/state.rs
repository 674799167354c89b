use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::Semaphore;

use crate::config::AppConfig;
use crate::external::brokerage::BrokerageProvider;
use crate::external::price_provider::PriceProvider;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub price_provider: Arc<dyn PriceProvider>,
    pub brokerage: Arc<dyn BrokerageProvider>,
    pub heavy_semaphore: Arc<Semaphore>,
}
