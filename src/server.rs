//! HTTP surface: health, per-node configuration form, and the `/next`
//! payload-transformation endpoint.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{from_fn_with_state, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value};
use subtle::ConstantTimeEq;
use tower_http::trace::TraceLayer;

use crate::error::Error;
use crate::node::store::{self, ConfigStore, NodeConfig};
use crate::rewrite::{Payload, Rewriter};

#[derive(Clone)]
pub struct AppState {
    pub rewriter: Arc<Rewriter>,
    pub store: Arc<dyn ConfigStore>,
    pub secret: Arc<String>,
}

pub fn router(state: AppState) -> Router {
    let node = Router::new()
        .route("/config", get(show_config).post(update_config))
        .route("/next", post(next))
        .route("/remove", post(nop))
        .route("/close", post(nop))
        .route_layer(from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/health", get(health))
        .nest("/node/{id}", node)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Deserialize)]
struct AuthQuery {
    auth: Option<String>,
}

/// Bearer-token gate for all node-scoped routes. The token may arrive as an
/// `Authorization: Bearer` header or as the `auth` query parameter; either
/// must equal the shared secret, compared in constant time.
async fn require_token(
    State(state): State<AppState>,
    Query(query): Query<AuthQuery>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let header_token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));
    let token = header_token.or(query.auth.as_deref()).unwrap_or("");

    let ok: bool = token.as_bytes().ct_eq(state.secret.as_bytes()).into();
    if !ok {
        return Err((StatusCode::UNAUTHORIZED, "missing or invalid auth token"));
    }
    Ok(next.run(request).await)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn nop() -> StatusCode {
    StatusCode::OK
}

/// Runs the conversion pipeline: load node config, pick the rewrite strategy
/// from the request content type, and answer with the rewritten payload under
/// the same content type.
async fn next(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, Error> {
    let config = store::load_or_default(state.store.as_ref(), &id).await;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let payload = if content_type.starts_with("application/json") {
        let map: Map<String, Value> = serde_json::from_slice(&body)
            .map_err(|e| Error::PayloadMalformed(format!("invalid JSON body: {e}")))?;
        Payload::Structured(map)
    } else {
        let text = String::from_utf8(body.to_vec())
            .map_err(|e| Error::PayloadMalformed(format!("body is not valid UTF-8: {e}")))?;
        Payload::Textual(text)
    };

    match state.rewriter.rewrite(payload, &config).await? {
        Payload::Structured(map) => Ok(Json(Value::Object(map)).into_response()),
        Payload::Textual(text) => {
            let content_type = if content_type.is_empty() {
                "text/plain".to_string()
            } else {
                content_type
            };
            Ok(([(header::CONTENT_TYPE, content_type)], text).into_response())
        }
    }
}

async fn show_config(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AuthQuery>,
) -> Html<String> {
    let config = store::load_or_default(state.store.as_ref(), &id).await;
    Html(render_config_form(
        &id,
        query.auth.as_deref().unwrap_or(""),
        &config,
    ))
}

#[derive(Deserialize)]
struct ConfigForm {
    #[serde(default)]
    fiat_currency: String,
    #[serde(default)]
    from_currency: String,
    #[serde(default)]
    to_currency: String,
}

/// Validates and stores the submitted configuration, then re-renders the form
/// with the stored values. A validation failure leaves the stored record
/// untouched.
async fn update_config(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AuthQuery>,
    Form(form): Form<ConfigForm>,
) -> Result<Html<String>, Error> {
    let config = NodeConfig::from_form(
        &form.fiat_currency,
        &form.from_currency,
        &form.to_currency,
    )?;
    state.store.save(&id, &config).await?;

    Ok(Html(render_config_form(
        &id,
        query.auth.as_deref().unwrap_or(""),
        &config,
    )))
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render_config_form(node_id: &str, auth_token: &str, config: &NodeConfig) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body>
<form action="/node/{id}/config?auth={auth}" method="post">
Convert to fiat currency: <input type="text" size="4" name="fiat_currency" value="{fiat}"><br>
Replace amounts in: <input type="text" size="4" name="from_currency" value="{from}">
with: <input type="text" size="4" name="to_currency" value="{to}"><br>
<input type="submit" value="Submit">
</form>
</body>
</html>
"#,
        id = escape_attr(node_id),
        auth = escape_attr(auth_token),
        fiat = escape_attr(&config.fiat_currency),
        from = escape_attr(&config.from_currency),
        to = escape_attr(&config.to_currency),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_echoes_current_values() {
        let config = NodeConfig {
            fiat_currency: "EUR".to_string(),
            from_currency: "CHF".to_string(),
            to_currency: "XES".to_string(),
        };
        let html = render_config_form("node-1", "token", &config);
        assert!(html.contains(r#"action="/node/node-1/config?auth=token""#));
        assert!(html.contains(r#"name="fiat_currency" value="EUR""#));
        assert!(html.contains(r#"name="from_currency" value="CHF""#));
        assert!(html.contains(r#"name="to_currency" value="XES""#));
    }

    #[test]
    fn test_form_values_are_escaped() {
        let config = NodeConfig {
            fiat_currency: r#""><script>"#.to_string(),
            ..NodeConfig::default()
        };
        let html = render_config_form("node-1", "", &config);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
    }
}
