use crate::domain::AlignedSample;
use serde::{Deserialize, Serialize};

/// Below this many aligned samples no correlation is reported.
pub const MIN_SAMPLES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Correlation {
    Spearman { rho: f64, samples: usize },
    InsufficientData { samples: usize },
    /// One of the series has no rank variance (e.g. every sentiment identical).
    Undefined { samples: usize },
}

impl Correlation {
    pub fn coefficient(&self) -> Option<f64> {
        match *self {
            Self::Spearman { rho, .. } => Some(rho),
            _ => None,
        }
    }

    pub fn samples(&self) -> usize {
        match *self {
            Self::Spearman { samples, .. }
            | Self::InsufficientData { samples }
            | Self::Undefined { samples } => samples,
        }
    }
}

/// Spearman rank correlation between aligned sentiments and prices.
pub fn correlate(samples: &[AlignedSample]) -> Correlation {
    let n = samples.len();
    if n < MIN_SAMPLES {
        return Correlation::InsufficientData { samples: n };
    }

    let sentiments: Vec<f64> = samples.iter().map(|s| s.sentiment).collect();
    let prices: Vec<f64> = samples.iter().map(|s| s.price).collect();

    match spearman(&sentiments, &prices) {
        Some(rho) => Correlation::Spearman { rho, samples: n },
        None => Correlation::Undefined { samples: n },
    }
}

pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    pearson(&rank(x), &rank(y))
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// 1-based ranks; tied values share the average of their positions.
fn rank(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && values[order[j]] == values[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j + 1) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = avg_rank;
        }
        i = j;
    }
    ranks
}
