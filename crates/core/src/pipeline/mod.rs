pub mod aggregator;
pub mod aligner;
pub mod correlation;
pub mod events;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::DailySentimentAggregator;
pub use aligner::Aligner;
pub use correlation::{correlate, Correlation};
pub use events::{NoopObserver, PipelineEvent, PipelineObserver, TracingObserver};

use crate::domain::{AlignedSample, DailySentiment, PriceIndex};
use crate::error::PriceFetchError;
use crate::llm::SentimentScorer;
use crate::news::SentimentSource;
use crate::prices::PriceSource;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub security: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub lag_days: i64,
    pub daily: Vec<DailySentiment>,
    pub prices_fetched: usize,
    pub samples: Vec<AlignedSample>,
    pub correlation: Correlation,
}

/// Sentiment aggregation, price fetch, alignment and correlation for one security.
pub struct Pipeline<'a> {
    news: &'a dyn SentimentSource,
    scorer: &'a dyn SentimentScorer,
    prices: &'a dyn PriceSource,
    observer: &'a dyn PipelineObserver,
    aligner: Aligner,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        news: &'a dyn SentimentSource,
        scorer: &'a dyn SentimentScorer,
        prices: &'a dyn PriceSource,
        observer: &'a dyn PipelineObserver,
    ) -> Self {
        Self {
            news,
            scorer,
            prices,
            observer,
            aligner: Aligner::default(),
        }
    }

    pub fn with_aligner(mut self, aligner: Aligner) -> Self {
        self.aligner = aligner;
        self
    }

    /// Sentiment covers business days in `[start, end)`; prices are requested for
    /// `[start, end]` so the day before `end` can still find its next-day close.
    ///
    /// Only a price fetch failure aborts the run.
    pub async fn run(
        &self,
        security: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AnalysisReport, PriceFetchError> {
        let daily = DailySentimentAggregator::new(self.news, self.scorer, self.observer)
            .aggregate(security, start, end)
            .await;

        let prices = self.prices.fetch_range(security, start, end).await?;
        self.observer.on_event(&PipelineEvent::PricesFetched {
            start,
            end,
            count: prices.len(),
        });

        let index = PriceIndex::build(&prices);
        let samples = self.aligner.align_with_index(&daily, &index);
        self.observer.on_event(&PipelineEvent::Aligned {
            retained: samples.len(),
            dropped: daily.len() - samples.len(),
        });

        let correlation = correlate(&samples);

        Ok(AnalysisReport {
            security: security.to_string(),
            start,
            end,
            lag_days: self.aligner.lag_days(),
            daily,
            prices_fetched: prices.len(),
            samples,
            correlation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{d, FixedScorer, RecordingObserver, ScriptedSource, StaticPrices};

    fn week_of_news() -> (ScriptedSource, FixedScorer) {
        // Business days 2022-07-11 (Mon) .. 2022-07-15 (Fri).
        let source = ScriptedSource::default()
            .with_day(d(2022, 7, 11), &["weak", "soft"])
            .with_day(d(2022, 7, 12), &["mixed"])
            .with_day(d(2022, 7, 13), &["upbeat"])
            .with_day(d(2022, 7, 14), &["strong", "unparseable"])
            .with_day(d(2022, 7, 15), &["euphoric"]);
        let scorer = FixedScorer::default()
            .with("weak", 0.1)
            .with("soft", 0.3)
            .with("mixed", 0.4)
            .with("upbeat", 0.6)
            .with("strong", 0.8)
            .with("euphoric", 0.95);
        (source, scorer)
    }

    #[tokio::test]
    async fn end_to_end_monotonic_week() {
        let (source, scorer) = week_of_news();
        let prices = StaticPrices::new(&[
            (d(2022, 7, 11), 144.87),
            (d(2022, 7, 12), 145.86),
            (d(2022, 7, 13), 145.49),
            (d(2022, 7, 14), 148.47),
            (d(2022, 7, 15), 150.17),
            (d(2022, 7, 18), 147.07),
        ]);
        let observer = RecordingObserver::default();
        let pipeline = Pipeline::new(&source, &scorer, &prices, &observer);

        // end = Saturday 16th: sentiment covers Mon..Fri, the Friday has no Saturday close.
        let report = pipeline.run("AAPL", d(2022, 7, 11), d(2022, 7, 16)).await.unwrap();

        assert_eq!(report.daily.len(), 5);
        assert_eq!(report.prices_fetched, 5);
        assert_eq!(prices.requested(), vec![(d(2022, 7, 11), d(2022, 7, 16))]);

        let dates: Vec<_> = report.samples.iter().map(|s| s.sentiment_date).collect();
        assert_eq!(
            dates,
            vec![d(2022, 7, 11), d(2022, 7, 12), d(2022, 7, 13), d(2022, 7, 14)]
        );
        assert!((report.samples[0].sentiment - 0.2).abs() < 1e-12);

        // Sentiments 0.2, 0.4, 0.6, 0.8 against closes 145.86, 145.49, 148.47, 150.17.
        let rho = report.correlation.coefficient().unwrap();
        assert!((rho - 0.8).abs() < 1e-12);
        assert_eq!(report.lag_days, 1);

        let events = observer.events();
        assert!(events.contains(&"prices_fetched 2022-07-11..=2022-07-16 5".to_string()));
        assert_eq!(events.last().unwrap(), "aligned retained=4 dropped=1");
    }

    #[tokio::test]
    async fn last_business_day_before_end_keeps_its_sample() {
        let (source, scorer) = week_of_news();
        let prices = StaticPrices::new(&[
            (d(2022, 7, 12), 145.86),
            (d(2022, 7, 13), 145.49),
            (d(2022, 7, 14), 148.47),
        ]);
        let observer = RecordingObserver::default();
        let pipeline = Pipeline::new(&source, &scorer, &prices, &observer);

        // Sentiment for Mon..Wed; Wednesday's next-day close is dated on `end` itself.
        let report = pipeline.run("AAPL", d(2022, 7, 11), d(2022, 7, 14)).await.unwrap();

        assert_eq!(report.daily.len(), 3);
        assert_eq!(report.samples.len(), 3);
        assert_eq!(report.samples[2].price_date, d(2022, 7, 14));
        assert!(matches!(report.correlation, Correlation::Spearman { samples: 3, .. }));
    }

    #[tokio::test]
    async fn two_aligned_samples_are_insufficient() {
        let source = ScriptedSource::default()
            .with_day(d(2022, 7, 8), &["great"])
            .with_day(d(2022, 7, 11), &["poor"]);
        let scorer = FixedScorer::default().with("great", 0.8).with("poor", 0.2);
        let prices = StaticPrices::new(&[(d(2022, 7, 9), 150.0), (d(2022, 7, 12), 148.0)]);
        let observer = RecordingObserver::default();
        let pipeline = Pipeline::new(&source, &scorer, &prices, &observer);

        let report = pipeline.run("AAPL", d(2022, 7, 8), d(2022, 7, 12)).await.unwrap();

        let pairs: Vec<_> = report.samples.iter().map(|s| (s.sentiment, s.price)).collect();
        assert_eq!(pairs, vec![(0.8, 150.0), (0.2, 148.0)]);
        assert_eq!(report.correlation, Correlation::InsufficientData { samples: 2 });
    }

    #[tokio::test]
    async fn price_failure_is_fatal() {
        let (source, scorer) = week_of_news();
        let prices = StaticPrices::failing();
        let observer = RecordingObserver::default();
        let pipeline = Pipeline::new(&source, &scorer, &prices, &observer);

        let err = pipeline
            .run("AAPL", d(2022, 7, 11), d(2022, 7, 16))
            .await
            .unwrap_err();

        assert_eq!(err.security, "AAPL");
        assert_eq!(err.end, d(2022, 7, 16));
        assert!(!observer.events().iter().any(|e| e.starts_with("aligned")));
    }

    #[tokio::test]
    async fn custom_lag_is_reported() {
        let (source, scorer) = week_of_news();
        let prices = StaticPrices::new(&[(d(2022, 7, 18), 147.07)]);
        let observer = RecordingObserver::default();
        let pipeline = Pipeline::new(&source, &scorer, &prices, &observer)
            .with_aligner(Aligner::with_lag(3));

        let report = pipeline.run("AAPL", d(2022, 7, 11), d(2022, 7, 18)).await.unwrap();

        assert_eq!(report.lag_days, 3);
        assert_eq!(report.samples.len(), 1);
        assert_eq!(report.samples[0].sentiment_date, d(2022, 7, 15));
    }

    #[test]
    fn report_serializes_correlation_kind() {
        let report = AnalysisReport {
            security: "AAPL".to_string(),
            start: d(2022, 7, 8),
            end: d(2022, 7, 12),
            lag_days: 1,
            daily: vec![DailySentiment::absent(d(2022, 7, 8))],
            prices_fetched: 0,
            samples: vec![],
            correlation: Correlation::InsufficientData { samples: 0 },
        };
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["correlation"]["kind"], "insufficient_data");
        assert_eq!(v["daily"][0]["date"], "2022-07-08");
        assert!(v["daily"][0]["value"].is_null());
    }
}
