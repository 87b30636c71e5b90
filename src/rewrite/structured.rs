//! Structured rewrite: inject converted `<fiat>_<asset>` keys into a flat
//! JSON object, leaving the original keys untouched.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Error;
use crate::rate_provider::RateProvider;

/// Walks the fixed asset list in order and, for every asset present in the
/// payload, stores its fiat value under `"<fiat>_<asset>"`.
///
/// Input contract: asset values arrive as JSON strings holding a decimal
/// amount. Anything else fails the whole request; a partially rewritten
/// payload is never returned. Multiplication is exact decimal arithmetic so
/// amounts with many significant digits survive the conversion.
pub async fn rewrite(
    mut payload: Map<String, Value>,
    assets: &[String],
    fiat: &str,
    provider: &dyn RateProvider,
) -> Result<Map<String, Value>, Error> {
    for asset in assets {
        let Some(value) = payload.get(asset) else {
            debug!(asset = %asset, "asset not found in payload, skipping");
            continue;
        };
        let raw = value.as_str().ok_or_else(|| {
            Error::PayloadMalformed(format!("value for asset {asset} is not a string"))
        })?;
        let amount = Decimal::from_str(raw.trim()).map_err(|e| {
            Error::PayloadMalformed(format!("could not convert value for asset {asset}: {e}"))
        })?;

        let rate = provider.get_rate(asset, fiat).await?;
        let rate = Decimal::try_from(rate).map_err(|e| {
            Error::OracleBadResponse(format!("rate {rate} for {asset}/{fiat} is unusable: {e}"))
        })?;

        let converted = (amount * rate).normalize();
        payload.insert(format!("{fiat}_{asset}"), Value::String(converted.to_string()));
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::test_support::StubProvider;
    use serde_json::json;

    fn assets() -> Vec<String> {
        vec!["ETH".to_string(), "XES".to_string(), "MKR".to_string()]
    }

    fn payload(entries: &[(&str, Value)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_derived_key_uses_exact_decimal_arithmetic() {
        let provider = StubProvider::new(&[("ETH", "USD", 300.0)]);
        let input = payload(&[("ETH", json!("2.5"))]);

        let out = rewrite(input, &assets(), "USD", &provider).await.unwrap();

        assert_eq!(out["USD_ETH"], json!("750"));
        assert_eq!(out["ETH"], json!("2.5"));
    }

    #[tokio::test]
    async fn test_many_significant_digits_survive() {
        let provider = StubProvider::new(&[("ETH", "USD", 3.0)]);
        let input = payload(&[("ETH", json!("0.123456789012345678"))]);

        let out = rewrite(input, &assets(), "USD", &provider).await.unwrap();
        assert_eq!(out["USD_ETH"], json!("0.370370367037037034"));
    }

    #[tokio::test]
    async fn test_absent_asset_is_skipped() {
        let provider = StubProvider::new(&[("ETH", "USD", 300.0)]);
        let input = payload(&[("ETH", json!("1")), ("unrelated", json!("x"))]);

        let out = rewrite(input, &assets(), "USD", &provider).await.unwrap();

        assert_eq!(out["USD_ETH"], json!("300"));
        assert!(!out.contains_key("USD_XES"));
        assert!(!out.contains_key("USD_MKR"));
        assert_eq!(out["unrelated"], json!("x"));
    }

    #[tokio::test]
    async fn test_non_numeric_value_aborts() {
        let provider = StubProvider::new(&[("ETH", "USD", 300.0)]);
        let input = payload(&[("ETH", json!("not a number"))]);

        let result = rewrite(input, &assets(), "USD", &provider).await;
        assert!(matches!(result, Err(Error::PayloadMalformed(_))));
    }

    #[tokio::test]
    async fn test_non_string_value_aborts() {
        let provider = StubProvider::new(&[("ETH", "USD", 300.0)]);
        let input = payload(&[("ETH", json!(2.5))]);

        let result = rewrite(input, &assets(), "USD", &provider).await;
        assert!(matches!(result, Err(Error::PayloadMalformed(_))));
    }

    #[tokio::test]
    async fn test_rate_lookup_failure_aborts() {
        let provider = StubProvider::new(&[]);
        let input = payload(&[("ETH", json!("2.5"))]);

        let result = rewrite(input, &assets(), "USD", &provider).await;
        assert!(matches!(result, Err(Error::OracleBadResponse(_))));
    }

    #[tokio::test]
    async fn test_equal_symbols_keep_magnitude() {
        let provider = StubProvider::new(&[]);
        let input = payload(&[("ETH", json!("2.5"))]);

        let out = rewrite(input, &assets(), "ETH", &provider).await.unwrap();
        assert_eq!(out["ETH_ETH"], json!("2.5"));
    }
}
