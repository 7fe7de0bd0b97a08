use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Mean sentiment for one business day.
///
/// `value` is `None` when no snippet for that day produced a usable score. That marks
/// missing data and must never be read as a neutral or negative sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailySentiment {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl DailySentiment {
    pub fn present(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value: Some(value),
        }
    }

    pub fn absent(date: NaiveDate) -> Self {
        Self { date, value: None }
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }
}

/// One retained observation after joining a day's sentiment with a later close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedSample {
    pub sentiment_date: NaiveDate,
    pub price_date: NaiveDate,
    pub sentiment: f64,
    pub price: f64,
}
