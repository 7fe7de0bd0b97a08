use crate::config::Settings;
use crate::error::ScoreError;
use crate::http;
use crate::llm::parse::score_from_reply;
use crate::llm::{repair_prompt, sentiment_prompt, Provider, SentimentScorer};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const MAX_TOKENS: u32 = 50;
const TEMPERATURE: f32 = 0.7;
const REPAIR_ATTEMPTS: u32 = 1;

#[derive(Debug, Clone)]
pub struct AnthropicScorer {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    repair_attempts: u32,
}

impl AnthropicScorer {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_anthropic_api_key()?.to_string();
        let base_url = settings
            .anthropic_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = settings
            .anthropic_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let http = http::build_client(settings.llm_timeout_secs, "anthropic")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
            repair_attempts: REPAIR_ATTEMPTS,
        })
    }

    fn request(&self, content: String) -> CreateMessageRequest {
        CreateMessageRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![Message {
                role: "user",
                content,
            }],
        }
    }

    fn headers(&self) -> anyhow::Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        Ok(headers)
    }

    async fn create_message(&self, req: &CreateMessageRequest) -> Result<String, ScoreError> {
        let transport = |err: anyhow::Error| {
            ScoreError::new(Provider::Anthropic, "transport", format!("{err:#}"))
        };

        let url = http::join_url(&self.base_url, "/v1/messages");
        let res = self
            .http
            .post(url)
            .headers(self.headers().map_err(transport)?)
            .json(req)
            .send()
            .await
            .context("Anthropic request failed")
            .map_err(transport)?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Anthropic response body")
            .map_err(transport)?;

        if !status.is_success() {
            return Err(
                ScoreError::new(Provider::Anthropic, "http", format!("status={status}"))
                    .with_raw_output(text),
            );
        }

        response_text(&text)
    }
}

#[async_trait::async_trait]
impl SentimentScorer for AnthropicScorer {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn score(&self, text: &str, security: &str) -> Result<f64, ScoreError> {
        let reply = self
            .create_message(&self.request(sentiment_prompt(text, security)))
            .await?;

        let mut last_err = match score_from_reply(Provider::Anthropic, &reply) {
            Ok(score) => return Ok(score),
            Err(err) => err,
        };
        let mut last_reply = reply;

        for attempt in 1..=self.repair_attempts {
            tracing::debug!(
                attempt,
                %security,
                error = %last_err,
                "Anthropic reply had no usable score; sending repair prompt"
            );
            let reply = self
                .create_message(&self.request(repair_prompt(&last_reply)))
                .await?;
            match score_from_reply(Provider::Anthropic, &reply) {
                Ok(score) => return Ok(score),
                Err(err) => {
                    last_err = err;
                    last_reply = reply;
                }
            }
        }

        Err(last_err)
    }
}

/// Concatenated text blocks of a messages-API response.
fn response_text(body: &str) -> Result<String, ScoreError> {
    let parsed = serde_json::from_str::<CreateMessageResponse>(body).map_err(|err| {
        ScoreError::new(Provider::Anthropic, "decode", err.to_string()).with_raw_output(body)
    })?;

    let mut out = String::new();
    for block in &parsed.content {
        match block {
            ContentBlock::Text { text } => {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(text);
            }
            ContentBlock::Unknown => {}
        }
    }

    if out.trim().is_empty() {
        return Err(
            ScoreError::new(Provider::Anthropic, "empty", "response contained no text")
                .with_raw_output(body),
        );
    }

    Ok(out.trim().to_string())
}

#[derive(Debug, Clone, Serialize)]
struct CreateMessageRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateMessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(other)]
    Unknown,
}
