pub mod api;
pub mod chain;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod services;

use std::sync::Arc;

use crate::chain::{ChainClient, TxVerifier};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub chain: Arc<ChainClient>,
    pub verifier: Arc<TxVerifier>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
