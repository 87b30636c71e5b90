use serde::Serialize;
use tracing::{info, warn};

use crate::config::Settings;

#[derive(Serialize)]
struct Registration<'a> {
    name: &'a str,
    url: &'a str,
    secret: &'a str,
    description: &'a str,
}

/// One-shot announcement of this node to the workflow host. A failure is
/// logged and otherwise ignored; the node still serves requests and the host
/// may discover it later.
pub async fn register(settings: &Settings, description: &str) {
    let registration = Registration {
        name: &settings.service_name,
        url: &settings.service_url,
        secret: &settings.secret,
        description,
    };
    let url = format!(
        "{}/api/external/register",
        settings.host_url.trim_end_matches('/')
    );

    let result = reqwest::Client::new()
        .post(&url)
        .json(&registration)
        .send()
        .await;
    match result {
        Ok(response) if response.status().is_success() => {
            info!(host = %settings.host_url, "registered with workflow host");
        }
        Ok(response) => {
            warn!(host = %settings.host_url, status = %response.status(), "host rejected registration");
        }
        Err(e) => {
            warn!(host = %settings.host_url, "could not register with workflow host: {e}");
        }
    }
}
