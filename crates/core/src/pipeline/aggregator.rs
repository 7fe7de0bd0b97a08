use crate::domain::DailySentiment;
use crate::llm::SentimentScorer;
use crate::news::SentimentSource;
use crate::pipeline::events::{PipelineEvent, PipelineObserver};
use crate::time::business_days::business_days;
use chrono::NaiveDate;

/// Turns per-day article text into one mean sentiment per business day.
pub struct DailySentimentAggregator<'a> {
    source: &'a dyn SentimentSource,
    scorer: &'a dyn SentimentScorer,
    observer: &'a dyn PipelineObserver,
}

impl<'a> DailySentimentAggregator<'a> {
    pub fn new(
        source: &'a dyn SentimentSource,
        scorer: &'a dyn SentimentScorer,
        observer: &'a dyn PipelineObserver,
    ) -> Self {
        Self {
            source,
            scorer,
            observer,
        }
    }

    /// One entry per business day in `[start, end)`, in date order.
    ///
    /// Fetch and scoring failures only degrade the affected day or snippet.
    pub async fn aggregate(
        &self,
        security: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<DailySentiment> {
        let days = business_days(start, end);
        let mut out = Vec::with_capacity(days.len());
        for date in days {
            out.push(self.aggregate_day(security, date).await);
        }
        out
    }

    async fn aggregate_day(&self, security: &str, date: NaiveDate) -> DailySentiment {
        self.observer.on_event(&PipelineEvent::DayStarted { date });

        let snippets = match self.source.fetch(date, security).await {
            Ok(snippets) => snippets,
            Err(error) => {
                self.observer
                    .on_event(&PipelineEvent::FetchFailed { date, error: &error });
                Vec::new()
            }
        };
        self.observer.on_event(&PipelineEvent::SnippetsFetched {
            date,
            count: snippets.len(),
        });

        let mut scores = Vec::with_capacity(snippets.len());
        for (index, snippet) in snippets.iter().enumerate() {
            match self.scorer.score(snippet, security).await {
                Ok(score) => {
                    self.observer
                        .on_event(&PipelineEvent::SnippetScored { date, index, score });
                    scores.push(score);
                }
                Err(error) => {
                    self.observer.on_event(&PipelineEvent::SnippetFailed {
                        date,
                        index,
                        error: &error,
                    });
                }
            }
        }

        let value = mean(&scores);
        self.observer.on_event(&PipelineEvent::DayFinalized {
            date,
            value,
            scored: scores.len(),
            attempted: snippets.len(),
        });

        DailySentiment { date, value }
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
