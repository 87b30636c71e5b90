use std::net::SocketAddr;

use clap::Parser;

/// Recognized asset symbols, checked against structured payload keys in this
/// order. Fixed for the process lifetime.
pub const ASSETS: [&str; 3] = ["ETH", "XES", "MKR"];

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Settings {
    /// Address to bind the HTTP listener on
    #[arg(long, env = "SERVICE_ADDR", default_value = "127.0.0.1:8011")]
    pub listen_addr: SocketAddr,

    /// Base URL under which the workflow host can reach this node
    #[arg(long, env = "SERVICE_URL", default_value = "http://127.0.0.1:8011")]
    pub service_url: String,

    /// Human-readable service name announced to the workflow host
    #[arg(long, env = "SERVICE_NAME", default_value = "Crypto to Fiat Forex Rates")]
    pub service_name: String,

    /// Shared secret; bearer token expected on all node-scoped routes
    #[arg(long, env = "SERVICE_SECRET", default_value = "my secret")]
    pub secret: String,

    /// Base URL of the workflow host (registration and config storage)
    #[arg(long, env = "HOST_INSTANCE_URL", default_value = "http://127.0.0.1:1323")]
    pub host_url: String,

    /// Base URL of the price oracle
    #[arg(
        long,
        env = "ORACLE_URL",
        default_value = "https://min-api.cryptocompare.com"
    )]
    pub oracle_url: String,

    /// API key passed to the price oracle
    #[arg(long, env = "ORACLE_API_KEY", default_value = "API_KEY")]
    pub oracle_api_key: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
