pub mod anthropic;
pub mod openai;
pub mod parse;

use crate::config::Settings;
use crate::error::ScoreError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAI),
            other => anyhow::bail!("unknown sentiment provider {other:?} (expected openai or anthropic)"),
        }
    }
}

impl Provider {
    /// Provider named by `SENTIMENT_PROVIDER`, OpenAI when unset.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        match settings.sentiment_provider.as_deref() {
            Some(s) => s.parse::<Provider>().context("invalid SENTIMENT_PROVIDER"),
            None => Ok(Self::OpenAI),
        }
    }
}

/// Scores a single text snippet about a security on a 0 (negative) to 1 (positive) scale.
#[async_trait::async_trait]
pub trait SentimentScorer: Send + Sync {
    fn provider(&self) -> Provider;

    async fn score(&self, text: &str, security: &str) -> Result<f64, ScoreError>;
}

pub fn build_scorer(settings: &Settings) -> anyhow::Result<Box<dyn SentimentScorer>> {
    let scorer: Box<dyn SentimentScorer> = match Provider::from_settings(settings)? {
        Provider::OpenAI => Box::new(openai::OpenAiScorer::from_settings(settings)?),
        Provider::Anthropic => Box::new(anthropic::AnthropicScorer::from_settings(settings)?),
    };
    Ok(scorer)
}

pub(crate) fn sentiment_prompt(text: &str, security: &str) -> String {
    format!(
        "Please analyze the sentiment of the following news about {security} stock:\n\n{text}\n\n\
The sentiment score ranges from 0 (most negative) to 1 (most positive). \
A 0.5 score would indicate a neutral sentiment. \
Return only the sentiment score rounded to two decimal points without any words."
    )
}

pub(crate) fn repair_prompt(previous_output: &str) -> String {
    format!(
        "Your previous reply did not contain a sentiment score.\n\n\
Reply with ONLY a number between 0 and 1 rounded to two decimal points, for example 0.42.\n\
Do not include any words, units or formatting.\n\n\
PREVIOUS REPLY (for reference only):\n{previous_output}"
    )
}
