use crate::domain::{AlignedSample, DailySentiment, PriceIndex, PricePoint};
use crate::time::business_days::shift_days;

pub const DEFAULT_LAG_DAYS: i64 = 1;

/// Joins each day's sentiment with the close `lag_days` calendar days later.
///
/// Days without a sentiment value, or without a close on the target date, are dropped.
/// Nothing is interpolated and input order is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aligner {
    lag_days: i64,
}

impl Default for Aligner {
    fn default() -> Self {
        Self {
            lag_days: DEFAULT_LAG_DAYS,
        }
    }
}

impl Aligner {
    pub fn with_lag(lag_days: i64) -> Self {
        Self { lag_days }
    }

    pub fn lag_days(&self) -> i64 {
        self.lag_days
    }

    pub fn align(
        &self,
        sentiments: &[DailySentiment],
        prices: &[PricePoint],
    ) -> Vec<AlignedSample> {
        let index = PriceIndex::build(prices);
        self.align_with_index(sentiments, &index)
    }

    pub fn align_with_index(
        &self,
        sentiments: &[DailySentiment],
        index: &PriceIndex,
    ) -> Vec<AlignedSample> {
        sentiments
            .iter()
            .filter_map(|day| {
                let sentiment = day.value?;
                let price_date = shift_days(day.date, self.lag_days);
                let price = index.close_on(price_date)?;
                Some(AlignedSample {
                    sentiment_date: day.date,
                    price_date,
                    sentiment,
                    price,
                })
            })
            .collect()
    }
}
