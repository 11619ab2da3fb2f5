use serde::{Deserialize, Serialize};

use crate::chain::ChainStore;

/// Moments of the flattened chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSummary {
    /// Number of flattened samples (walkers times saved steps).
    pub samples: usize,
    /// Per-dimension sample mean.
    pub mean: Vec<f64>,
    /// Per-dimension population variance.
    pub variance: Vec<f64>,
    /// Mean of the finite log-posterior values.
    pub mean_ln_posterior: f64,
}

/// Summarises every saved sample in `store`.
pub fn summarize(store: &ChainStore) -> ChainSummary {
    let flat = store.flatten();
    let (mean, variance): (Vec<f64>, Vec<f64>) = flat.iter().map(|row| moments(row)).unzip();
    let finite: Vec<f64> = store
        .flat_ln_posterior()
        .into_iter()
        .filter(|value| value.is_finite())
        .collect();
    ChainSummary {
        samples: store.walkers() * store.saved_steps(),
        mean,
        variance,
        mean_ln_posterior: moments(&finite).0,
    }
}

/// Mean and population variance of `values`; zeros when empty.
pub fn moments(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance)
}
