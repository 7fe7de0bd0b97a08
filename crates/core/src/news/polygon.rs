use crate::config::Settings;
use crate::error::FetchError;
use crate::http;
use crate::news::SentimentSource;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.polygon.io";
const NEWS_PATH: &str = "/v2/reference/news";

/// Polygon.io reference-news client. One request per (ticker, published day).
#[derive(Debug, Clone)]
pub struct PolygonNewsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    limit: Option<u32>,
    retries: u32,
}

impl PolygonNewsClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_polygon_api_key()?.to_string();
        let base_url = settings
            .polygon_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let http = http::build_client(settings.http_timeout_secs, "polygon")?;

        Ok(Self {
            http,
            base_url,
            api_key,
            limit: settings.polygon_news_limit,
            retries: settings.http_retries,
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        Ok(headers)
    }

    fn query(&self, date: NaiveDate, security: &str) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("ticker", security.to_string()),
            ("published_utc", date.format("%Y-%m-%d").to_string()),
        ];
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        query
    }

    async fn fetch_once(&self, date: NaiveDate, security: &str) -> Result<NewsResponse> {
        let res = self
            .http
            .get(http::join_url(&self.base_url, NEWS_PATH))
            .headers(self.headers()?)
            .query(&self.query(date, security))
            .send()
            .await
            .context("polygon news request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read polygon news response")?;

        if !status.is_success() {
            anyhow::bail!("polygon news HTTP {status}: {text}");
        }

        parse_news_response(&text)
    }
}

#[async_trait::async_trait]
impl SentimentSource for PolygonNewsClient {
    fn source_name(&self) -> &'static str {
        "polygon"
    }

    async fn fetch(&self, date: NaiveDate, security: &str) -> Result<Vec<String>, FetchError> {
        let response = http::with_retries(self.retries, "polygon news fetch", move || {
            self.fetch_once(date, security)
        })
        .await
        .map_err(|err| FetchError::new(date, security, format!("{err:#}")))?;

        Ok(response.snippets())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Vec<NewsArticle>,
}

#[derive(Debug, Clone, Deserialize)]
struct NewsArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl NewsResponse {
    /// Description when present, otherwise the title. Articles with neither are skipped.
    fn snippets(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|article| {
                non_blank(article.description.as_deref())
                    .or_else(|| non_blank(article.title.as_deref()))
                    .map(str::to_string)
            })
            .collect()
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_news_response(text: &str) -> Result<NewsResponse> {
    let parsed = serde_json::from_str::<NewsResponse>(text)
        .with_context(|| format!("polygon news response is not valid JSON: {text}"))?;

    if parsed.status.as_deref() == Some("ERROR") {
        anyhow::bail!(
            "polygon news returned an error: {}",
            parsed.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(parsed)
}
