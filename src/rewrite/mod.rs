//! Payload-rewriting strategies.
//!
//! A payload is either a flat JSON object (rewritten by adding derived
//! `<fiat>_<asset>` keys) or opaque text (rewritten by substituting
//! `<amount> <symbol>` occurrences in place).

pub mod structured;
pub mod textual;

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::Error;
use crate::node::store::NodeConfig;
use crate::rate_provider::RateProvider;

pub enum Payload {
    Structured(Map<String, Value>),
    Textual(String),
}

/// Strategy dispatcher: holds the fixed asset list and the shared oracle
/// client, and picks the rewrite strategy from the payload shape.
pub struct Rewriter {
    assets: Vec<String>,
    provider: Arc<dyn RateProvider>,
}

impl Rewriter {
    pub fn new(assets: Vec<String>, provider: Arc<dyn RateProvider>) -> Self {
        Rewriter { assets, provider }
    }

    pub async fn rewrite(&self, payload: Payload, config: &NodeConfig) -> Result<Payload, Error> {
        match payload {
            Payload::Structured(map) => {
                let out = structured::rewrite(
                    map,
                    &self.assets,
                    &config.fiat_currency,
                    self.provider.as_ref(),
                )
                .await?;
                Ok(Payload::Structured(out))
            }
            Payload::Textual(text) => {
                let rate = self
                    .provider
                    .get_rate(&config.from_currency, &config.to_currency)
                    .await?;
                let out =
                    textual::rewrite(&text, &config.from_currency, &config.to_currency, rate)?;
                Ok(Payload::Textual(out))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;

    use crate::error::Error;
    use crate::rate_provider::RateProvider;

    /// Fixed-rate oracle stub keyed by `"FROM/TO"`; an equal-symbol pair
    /// always quotes 1.0.
    pub struct StubProvider {
        rates: HashMap<String, f64>,
    }

    impl StubProvider {
        pub fn new(rates: &[(&str, &str, f64)]) -> Self {
            StubProvider {
                rates: rates
                    .iter()
                    .map(|(from, to, rate)| (format!("{from}/{to}"), *rate))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl RateProvider for StubProvider {
        async fn get_rate(&self, from: &str, to: &str) -> Result<f64, Error> {
            if from == to {
                return Ok(1.0);
            }
            self.rates
                .get(&format!("{from}/{to}"))
                .copied()
                .ok_or_else(|| {
                    Error::OracleBadResponse(format!("no quote for pair {from}/{to}"))
                })
        }

        async fn get_historical_rate(
            &self,
            from: &str,
            to: &str,
            _at: DateTime<Utc>,
        ) -> Result<f64, Error> {
            self.get_rate(from, to).await
        }
    }
}
