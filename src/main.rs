use std::sync::Arc;

use betmirror::api::router::create_router;
use betmirror::chain::{ChainClient, TxVerifier};
use betmirror::config::AppConfig;
use betmirror::services::sync;
use betmirror::{db, metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    let metrics_handle = metrics::init_metrics();

    tracing::info!("Connecting to database...");
    let db = db::init_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("Database connected");

    tracing::info!(rpc_url = %config.rpc_url, chain_id = config.chain_id, "Connecting chain provider...");
    let chain = Arc::new(ChainClient::connect(&config).await?);
    if !config.has_admin_signer() {
        tracing::warn!("No ADMIN_PRIVATE_KEY — admin market create/resolve endpoints will fail");
    }

    let verifier = Arc::new(TxVerifier::new(chain.clone(), config.receipt_policy));

    if config.sync_enabled {
        let sync_chain = chain.clone();
        let sync_db = db.clone();
        let interval = config.sync_interval_secs;
        tokio::spawn(async move {
            sync::run_sync_loop(sync_chain, sync_db, interval).await;
        });
        tracing::info!(interval_secs = config.sync_interval_secs, "Sync loop spawned");
    } else {
        tracing::info!("Sync loop disabled (SYNC_ENABLED=false)");
    }

    let state = AppState {
        db,
        config,
        chain,
        verifier,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
