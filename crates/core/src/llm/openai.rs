use crate::config::Settings;
use crate::error::ScoreError;
use crate::http;
use crate::llm::parse::score_from_reply;
use crate::llm::{sentiment_prompt, Provider, SentimentScorer};
use anyhow::Context;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 50;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone)]
pub struct OpenAiScorer {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiScorer {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_openai_api_key()?.to_string();
        let base_url = settings
            .openai_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = settings
            .openai_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let http = http::build_client(settings.llm_timeout_secs, "openai")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    fn request(&self, text: &str, security: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: sentiment_prompt(text, security),
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }

    async fn create_completion(&self, req: &ChatCompletionRequest) -> Result<String, ScoreError> {
        let url = http::join_url(&self.base_url, "/v1/chat/completions");
        let res = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await
            .context("OpenAI request failed")
            .map_err(|err| ScoreError::new(Provider::OpenAI, "transport", format!("{err:#}")))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read OpenAI response body")
            .map_err(|err| ScoreError::new(Provider::OpenAI, "transport", format!("{err:#}")))?;

        if !status.is_success() {
            return Err(
                ScoreError::new(Provider::OpenAI, "http", format!("status={status}"))
                    .with_raw_output(text),
            );
        }

        response_text(&text)
    }
}

#[async_trait::async_trait]
impl SentimentScorer for OpenAiScorer {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn score(&self, text: &str, security: &str) -> Result<f64, ScoreError> {
        let reply = self.create_completion(&self.request(text, security)).await?;
        score_from_reply(Provider::OpenAI, &reply)
    }
}

/// Content of the first choice. A reply without choices counts as an empty response.
fn response_text(body: &str) -> Result<String, ScoreError> {
    let parsed = serde_json::from_str::<ChatCompletionResponse>(body).map_err(|err| {
        ScoreError::new(Provider::OpenAI, "decode", err.to_string()).with_raw_output(body)
    })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| {
            ScoreError::new(Provider::OpenAI, "empty", "response contained no choices")
                .with_raw_output(body)
        })
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
