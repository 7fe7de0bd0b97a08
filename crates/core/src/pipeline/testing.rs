//! In-memory collaborators shared by the pipeline tests.

use crate::domain::PricePoint;
use crate::error::{FetchError, PriceFetchError, ScoreError};
use crate::llm::{Provider, SentimentScorer};
use crate::news::SentimentSource;
use crate::pipeline::events::{PipelineEvent, PipelineObserver};
use crate::prices::PriceSource;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[derive(Default)]
pub struct ScriptedSource {
    days: HashMap<NaiveDate, Vec<String>>,
    failures: HashSet<NaiveDate>,
    requested: Mutex<Vec<(NaiveDate, String)>>,
}

impl ScriptedSource {
    pub fn with_day(mut self, date: NaiveDate, snippets: &[&str]) -> Self {
        self.days
            .insert(date, snippets.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_failure(mut self, date: NaiveDate) -> Self {
        self.failures.insert(date);
        self
    }

    pub fn requested(&self) -> Vec<(NaiveDate, String)> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SentimentSource for ScriptedSource {
    fn source_name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch(&self, date: NaiveDate, security: &str) -> Result<Vec<String>, FetchError> {
        self.requested
            .lock()
            .unwrap()
            .push((date, security.to_string()));
        if self.failures.contains(&date) {
            return Err(FetchError::new(date, security, "connection reset"));
        }
        Ok(self.days.get(&date).cloned().unwrap_or_default())
    }
}

/// Scores known snippets from a table; anything else fails to parse.
#[derive(Default)]
pub struct FixedScorer {
    scores: HashMap<String, f64>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FixedScorer {
    pub fn with(mut self, text: &str, score: f64) -> Self {
        self.scores.insert(text.to_string(), score);
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SentimentScorer for FixedScorer {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn score(&self, text: &str, security: &str) -> Result<f64, ScoreError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), security.to_string()));
        self.scores
            .get(text)
            .copied()
            .ok_or_else(|| ScoreError::new(Provider::OpenAI, "parse", "no score in reply"))
    }
}

#[derive(Default)]
pub struct StaticPrices {
    points: Vec<PricePoint>,
    fail: bool,
    requested: Mutex<Vec<(NaiveDate, NaiveDate)>>,
}

impl StaticPrices {
    pub fn new(points: &[(NaiveDate, f64)]) -> Self {
        Self {
            points: points
                .iter()
                .map(|(date, close)| PricePoint {
                    date: *date,
                    close: *close,
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn requested(&self) -> Vec<(NaiveDate, NaiveDate)> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PriceSource for StaticPrices {
    fn provider_name(&self) -> &'static str {
        "static"
    }

    async fn fetch_range(
        &self,
        security: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, PriceFetchError> {
        self.requested.lock().unwrap().push((start, end));
        if self.fail {
            return Err(PriceFetchError::new(security, start, end, "HTTP 503"));
        }
        Ok(self
            .points
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .copied()
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_event(&self, event: &PipelineEvent<'_>) {
        let line = match *event {
            PipelineEvent::DayStarted { date } => format!("day_started {date}"),
            PipelineEvent::SnippetsFetched { date, count } => {
                format!("snippets_fetched {date} {count}")
            }
            PipelineEvent::FetchFailed { date, .. } => format!("fetch_failed {date}"),
            PipelineEvent::SnippetScored { date, index, .. } => {
                format!("snippet_scored {date} #{index}")
            }
            PipelineEvent::SnippetFailed { date, index, .. } => {
                format!("snippet_failed {date} #{index}")
            }
            PipelineEvent::DayFinalized {
                date,
                scored,
                attempted,
                ..
            } => format!("day_finalized {date} scored={scored}/{attempted}"),
            PipelineEvent::PricesFetched { start, end, count } => {
                format!("prices_fetched {start}..={end} {count}")
            }
            PipelineEvent::Aligned { retained, dropped } => {
                format!("aligned retained={retained} dropped={dropped}")
            }
        };
        self.events.lock().unwrap().push(line);
    }
}
