pub mod config;
pub mod error;
pub mod log;
pub mod node;
pub mod providers;
pub mod rate_provider;
pub mod rewrite;
pub mod server;

pub use error::Error;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::node::store::HttpConfigStore;
use crate::providers::CryptoCompareProvider;
use crate::rewrite::Rewriter;
use crate::server::AppState;

const SERVICE_DESCRIPTION: &str = "Converts crypto to fiat currencies";

pub async fn run(settings: config::Settings) -> Result<()> {
    info!("Starting node - {}", settings.service_name);
    info!("Listening on {}", settings.listen_addr);
    info!("Workflow host at {}", settings.host_url);

    let provider = Arc::new(CryptoCompareProvider::new(
        &settings.oracle_url,
        &settings.oracle_api_key,
    ));
    let assets = config::ASSETS.iter().map(|s| s.to_string()).collect();

    let state = AppState {
        rewriter: Arc::new(Rewriter::new(assets, provider)),
        store: Arc::new(HttpConfigStore::new(&settings.host_url)),
        secret: Arc::new(settings.secret.clone()),
    };
    let app = server::router(state);

    node::registration::register(&settings, SERVICE_DESCRIPTION).await;

    let listener = tokio::net::TcpListener::bind(settings.listen_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
