use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::error::Error;
use crate::rate_provider::RateProvider;

// CryptoCompare's HTTP implementation
pub struct CryptoCompareProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl CryptoCompareProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        CryptoCompareProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Single-shot GET returning the oracle's top-level JSON object. No
    /// retries, no caching: every call is a fresh round trip.
    async fn fetch_object(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Map<String, Value>, Error> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Requesting rate data from {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(Error::OracleUnreachable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::OracleBadResponse(format!(
                "server returned an unexpected answer: {status}"
            )));
        }

        let text = response.text().await.map_err(Error::OracleUnreachable)?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| Error::OracleBadResponse(format!("invalid JSON: {e}")))?;
        match value {
            Value::Object(map) => Ok(map),
            other => Err(Error::OracleBadResponse(format!(
                "expected a JSON object, got: {other}"
            ))),
        }
    }
}

fn quote_field(object: &Map<String, Value>, key: &str) -> Result<f64, Error> {
    let rate = object.get(key).and_then(Value::as_f64).ok_or_else(|| {
        Error::OracleBadResponse(format!("no quote for {key} in response: {object:?}"))
    })?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(Error::OracleBadResponse(format!(
            "non-positive quote {rate} for {key}"
        )));
    }
    Ok(rate)
}

#[async_trait]
impl RateProvider for CryptoCompareProvider {
    #[instrument(name = "SpotRateFetch", skip(self), fields(from = %from, to = %to))]
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64, Error> {
        let response = self
            .fetch_object(
                "/data/price",
                &[("fsym", from), ("tsyms", to), ("api_key", &self.api_key)],
            )
            .await?;
        quote_field(&response, to)
    }

    #[instrument(name = "HistoricalRateFetch", skip(self, at), fields(from = %from, to = %to))]
    async fn get_historical_rate(
        &self,
        from: &str,
        to: &str,
        at: DateTime<Utc>,
    ) -> Result<f64, Error> {
        let ts = at.timestamp().to_string();
        let response = self
            .fetch_object(
                "/data/pricehistorical",
                &[
                    ("fsym", from),
                    ("tsyms", to),
                    ("ts", &ts),
                    ("api_key", &self.api_key),
                ],
            )
            .await?;

        // Historical quotes arrive nested one level deeper: { FROM: { TO: rate } }
        let nested = response
            .get(from)
            .and_then(Value::as_object)
            .ok_or_else(|| {
                Error::OracleBadResponse(format!("no quote for {from} in response: {response:?}"))
            })?;
        quote_field(nested, to)
    }
}
