pub mod domain;
pub mod error;
mod http;
pub mod llm;
pub mod news;
pub mod pipeline;
pub mod prices;
pub mod time;

pub mod config {
    use anyhow::Context;

    const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_LLM_TIMEOUT_SECS: u64 = 300;
    const DEFAULT_HTTP_RETRIES: u32 = 3;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub polygon_api_key: Option<String>,
        pub polygon_base_url: Option<String>,
        pub polygon_news_limit: Option<u32>,
        pub sentiment_provider: Option<String>,
        pub openai_api_key: Option<String>,
        pub openai_base_url: Option<String>,
        pub openai_model: Option<String>,
        pub anthropic_api_key: Option<String>,
        pub anthropic_base_url: Option<String>,
        pub anthropic_model: Option<String>,
        pub llm_timeout_secs: u64,
        pub price_provider_base_url: Option<String>,
        pub http_timeout_secs: u64,
        pub http_retries: u32,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        /// Builds settings from an arbitrary key lookup. Blank values count as unset.
        pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
        where
            F: Fn(&str) -> Option<String>,
        {
            let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

            let parse_u64 = |key: &str, default: u64| -> anyhow::Result<u64> {
                match get(key) {
                    Some(s) => s
                        .trim()
                        .parse::<u64>()
                        .with_context(|| format!("{key} must be a non-negative integer (got {s:?})")),
                    None => Ok(default),
                }
            };

            let http_retries = match get("HTTP_RETRIES") {
                Some(s) => s
                    .trim()
                    .parse::<u32>()
                    .with_context(|| format!("HTTP_RETRIES must be a non-negative integer (got {s:?})"))?,
                None => DEFAULT_HTTP_RETRIES,
            };

            let polygon_news_limit = match get("POLYGON_NEWS_LIMIT") {
                Some(s) => Some(
                    s.trim()
                        .parse::<u32>()
                        .with_context(|| format!("POLYGON_NEWS_LIMIT must be an integer (got {s:?})"))?,
                ),
                None => None,
            };

            Ok(Self {
                polygon_api_key: get("POLYGON_API_KEY"),
                polygon_base_url: get("POLYGON_BASE_URL"),
                polygon_news_limit,
                sentiment_provider: get("SENTIMENT_PROVIDER"),
                openai_api_key: get("OPENAI_API_KEY"),
                openai_base_url: get("OPENAI_BASE_URL"),
                openai_model: get("OPENAI_MODEL"),
                anthropic_api_key: get("ANTHROPIC_API_KEY"),
                anthropic_base_url: get("ANTHROPIC_BASE_URL"),
                anthropic_model: get("ANTHROPIC_MODEL"),
                llm_timeout_secs: parse_u64("LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)?,
                price_provider_base_url: get("PRICE_PROVIDER_BASE_URL"),
                http_timeout_secs: parse_u64("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
                http_retries: http_retries.max(1),
                sentry_dsn: get("SENTRY_DSN"),
            })
        }

        pub fn require_polygon_api_key(&self) -> anyhow::Result<&str> {
            self.polygon_api_key
                .as_deref()
                .context("POLYGON_API_KEY is required")
        }

        pub fn require_openai_api_key(&self) -> anyhow::Result<&str> {
            self.openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY is required")
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY is required")
        }
    }

}
