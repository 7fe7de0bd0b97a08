use crate::config::Settings;
use crate::domain::PricePoint;
use crate::error::PriceFetchError;
use crate::http;
use crate::prices::types::{ChartResponse, ChartResult};
use crate::prices::PriceSource;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const CHART_PATH: &str = "/v8/finance/chart";
const CLIENT_USER_AGENT: &str = "Mozilla/5.0 (compatible; sentcorr/0.1)";

/// Daily closes from the Yahoo Finance chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: String,
    retries: u32,
}

impl YahooChartClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .price_provider_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let http = http::build_client(settings.http_timeout_secs, "yahoo chart")?;

        Ok(Self {
            http,
            base_url,
            retries: settings.http_retries,
        })
    }

    fn url(&self, security: &str) -> String {
        http::join_url(&self.base_url, &format!("{CHART_PATH}/{security}"))
    }

    async fn fetch_once(
        &self,
        security: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let res = self
            .http
            .get(self.url(security))
            .headers(headers)
            .query(&chart_query(start, end)?)
            .send()
            .await
            .context("yahoo chart request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read yahoo chart response")?;

        if !status.is_success() {
            anyhow::bail!("yahoo chart HTTP {status}: {text}");
        }

        parse_chart(&text, start, end)
    }
}

#[async_trait::async_trait]
impl PriceSource for YahooChartClient {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_range(
        &self,
        security: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, PriceFetchError> {
        http::with_retries(self.retries, "yahoo chart fetch", move || {
            self.fetch_once(security, start, end)
        })
        .await
        .map_err(|err| PriceFetchError::new(security, start, end, format!("{err:#}")))
    }
}

/// `period2` is exclusive on Yahoo's side, so it is set to midnight after `end`.
fn chart_query(start: NaiveDate, end: NaiveDate) -> Result<Vec<(&'static str, String)>> {
    let period1 = midnight_utc(start)?;
    let period2 = midnight_utc(end + Duration::days(1))?;
    Ok(vec![
        ("period1", period1.to_string()),
        ("period2", period2.to_string()),
        ("interval", "1d".to_string()),
        ("events", "history".to_string()),
    ])
}

fn midnight_utc(date: NaiveDate) -> Result<i64> {
    Ok(date
        .and_hms_opt(0, 0, 0)
        .context("invalid midnight")?
        .and_utc()
        .timestamp())
}

fn parse_chart(text: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<PricePoint>> {
    let parsed = serde_json::from_str::<ChartResponse>(text)
        .with_context(|| format!("yahoo chart response is not valid JSON: {text}"))?;

    if let Some(err) = parsed.chart.error {
        anyhow::bail!(
            "yahoo chart error {}: {}",
            err.code.as_deref().unwrap_or("unknown"),
            err.description.as_deref().unwrap_or("")
        );
    }

    let result = parsed
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .context("yahoo chart response has no result")?;

    closes_in_range(&result, start, end)
}

/// Exchange-local dated closes within `[start, end]`. Null or non-positive closes are skipped.
fn closes_in_range(
    result: &ChartResult,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PricePoint>> {
    let offset = FixedOffset::east_opt(result.meta.gmtoffset)
        .with_context(|| format!("invalid gmtoffset {}", result.meta.gmtoffset))?;
    let closes = result
        .indicators
        .quote
        .first()
        .map(|q| q.close.as_slice())
        .unwrap_or_default();

    let mut out = Vec::with_capacity(result.timestamp.len());
    for (ts, close) in result.timestamp.iter().zip(closes) {
        let Some(close) = (*close).filter(|c| c.is_finite() && *c > 0.0) else {
            continue;
        };
        let date = DateTime::from_timestamp(*ts, 0)
            .with_context(|| format!("timestamp out of range: {ts}"))?
            .with_timezone(&offset)
            .date_naive();
        if date < start || date > end {
            continue;
        }
        out.push(PricePoint { date, close });
    }

    Ok(out)
}
