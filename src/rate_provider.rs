//! Exchange-rate lookup abstraction over the external price oracle.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Error;

/// A ratio of `1 unit of from == rate units of to`. Implementations must only
/// return finite, positive values; anything else is a lookup failure.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64, Error>;

    async fn get_historical_rate(
        &self,
        from: &str,
        to: &str,
        at: DateTime<Utc>,
    ) -> Result<f64, Error>;
}
