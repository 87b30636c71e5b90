use anyhow::Result;
use clap::Parser;
use cryptofx_node::config::Settings;
use cryptofx_node::log::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::parse();

    init_logging(settings.verbose);

    let result = cryptofx_node::run(settings).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Service failed");
    }
    result
}
