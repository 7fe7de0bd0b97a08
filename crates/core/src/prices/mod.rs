pub mod types;
pub mod yahoo;

use crate::domain::PricePoint;
use crate::error::PriceFetchError;
use chrono::NaiveDate;

/// Daily closing prices for a security. Both `start` and `end` are inclusive; days without
/// trading (weekends, holidays) are simply absent.
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_range(
        &self,
        security: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, PriceFetchError>;
}
