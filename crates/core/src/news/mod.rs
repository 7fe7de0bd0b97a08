pub mod polygon;

use crate::error::FetchError;
use chrono::NaiveDate;

/// Source of raw article text published about a security on a given day.
#[async_trait::async_trait]
pub trait SentimentSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn fetch(&self, date: NaiveDate, security: &str) -> Result<Vec<String>, FetchError>;
}
