use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Date -> close lookup over a full price series.
///
/// Duplicate dates violate the price source contract; the last point seen wins.
#[derive(Debug, Clone, Default)]
pub struct PriceIndex {
    closes: HashMap<NaiveDate, f64>,
}

impl PriceIndex {
    pub fn build(prices: &[PricePoint]) -> Self {
        let mut closes = HashMap::with_capacity(prices.len());
        for point in prices {
            closes.insert(point.date, point.close);
        }
        Self { closes }
    }

    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        self.closes.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}
