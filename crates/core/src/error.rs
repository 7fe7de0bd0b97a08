use crate::llm::Provider;
use chrono::NaiveDate;
use std::fmt;

/// News retrieval failed for one date. Recovered by the aggregator: the day has no sentiment.
#[derive(Debug, Clone)]
pub struct FetchError {
    pub date: NaiveDate,
    pub security: String,
    pub detail: String,
}

impl FetchError {
    pub fn new(date: NaiveDate, security: &str, detail: impl Into<String>) -> Self {
        Self {
            date,
            security: security.to_string(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "news fetch failed (security={}, date={}): {}",
            self.security, self.date, self.detail
        )
    }
}

impl std::error::Error for FetchError {}

/// Scoring one snippet failed. Recovered by the aggregator: the snippet is excluded.
#[derive(Debug, Clone)]
pub struct ScoreError {
    pub provider: Provider,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
}

impl ScoreError {
    pub fn new(provider: Provider, stage: &'static str, detail: impl Into<String>) -> Self {
        Self {
            provider,
            stage,
            detail: detail.into(),
            raw_output: None,
        }
    }

    pub fn with_raw_output(mut self, raw_output: impl Into<String>) -> Self {
        self.raw_output = Some(raw_output.into());
        self
    }
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sentiment scoring failed (provider={:?}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for ScoreError {}

/// The price series could not be retrieved. Fatal for the whole run.
#[derive(Debug, Clone)]
pub struct PriceFetchError {
    pub security: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub detail: String,
}

impl PriceFetchError {
    pub fn new(security: &str, start: NaiveDate, end: NaiveDate, detail: impl Into<String>) -> Self {
        Self {
            security: security.to_string(),
            start,
            end,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for PriceFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "price fetch failed (security={}, range={}..={}): {}",
            self.security, self.start, self.end, self.detail
        )
    }
}

impl std::error::Error for PriceFetchError {}
