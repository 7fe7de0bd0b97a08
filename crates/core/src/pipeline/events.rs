use crate::error::{FetchError, ScoreError};
use chrono::NaiveDate;

/// Progress and diagnostics emitted while a run is processed. Observers never influence results.
#[derive(Debug, Clone, Copy)]
pub enum PipelineEvent<'a> {
    DayStarted {
        date: NaiveDate,
    },
    SnippetsFetched {
        date: NaiveDate,
        count: usize,
    },
    FetchFailed {
        date: NaiveDate,
        error: &'a FetchError,
    },
    SnippetScored {
        date: NaiveDate,
        index: usize,
        score: f64,
    },
    SnippetFailed {
        date: NaiveDate,
        index: usize,
        error: &'a ScoreError,
    },
    DayFinalized {
        date: NaiveDate,
        value: Option<f64>,
        scored: usize,
        attempted: usize,
    },
    PricesFetched {
        start: NaiveDate,
        end: NaiveDate,
        count: usize,
    },
    Aligned {
        retained: usize,
        dropped: usize,
    },
}

pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent<'_>);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_event(&self, _event: &PipelineEvent<'_>) {}
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingObserver {
    security: String,
}

impl TracingObserver {
    pub fn new(security: impl Into<String>) -> Self {
        Self {
            security: security.into(),
        }
    }
}

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent<'_>) {
        let security = self.security.as_str();
        match *event {
            PipelineEvent::DayStarted { date } => {
                tracing::info!(%security, %date, "processing date");
            }
            PipelineEvent::SnippetsFetched { date, count } => {
                tracing::info!(%security, %date, count, "fetched article descriptions");
            }
            PipelineEvent::FetchFailed { date, error } => {
                tracing::warn!(%security, %date, error = %error, "news fetch failed; day has no sentiment");
            }
            PipelineEvent::SnippetScored { date, index, score } => {
                tracing::debug!(%security, %date, index, score, "snippet scored");
            }
            PipelineEvent::SnippetFailed { date, index, error } => {
                tracing::warn!(
                    %security,
                    %date,
                    index,
                    provider = ?error.provider,
                    stage = error.stage,
                    error = %error,
                    raw_output = error.raw_output.as_deref().unwrap_or(""),
                    "snippet scoring failed; skipping"
                );
            }
            PipelineEvent::DayFinalized {
                date,
                value: Some(value),
                scored,
                attempted,
            } => {
                tracing::info!(%security, %date, average = value, scored, attempted, "daily sentiment");
            }
            PipelineEvent::DayFinalized {
                date,
                value: None,
                scored: _,
                attempted,
            } => {
                tracing::info!(%security, %date, attempted, "no sentiment scores available for date");
            }
            PipelineEvent::PricesFetched { start, end, count } => {
                tracing::info!(%security, %start, %end, count, "fetched closing prices");
            }
            PipelineEvent::Aligned { retained, dropped } => {
                tracing::info!(%security, retained, dropped, "aligned sentiment with next-day closes");
            }
        }
    }
}
