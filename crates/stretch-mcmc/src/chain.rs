use serde::{Deserialize, Serialize};
use stretch_core::errors::ErrorInfo;
use stretch_core::SamplerError;

/// Append-only store of saved walker positions and log-posteriors.
///
/// Logically `chain` is indexed `(walker, dimension, step)` and
/// `ln_posterior` `(walker, step)`. Internally each saved step occupies one
/// contiguous block so that growing along the step axis is an append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainStore {
    walkers: usize,
    dimension: usize,
    steps: usize,
    chain: Vec<f64>,
    ln_posterior: Vec<f64>,
}

impl ChainStore {
    /// Creates an empty store for the given ensemble shape.
    pub fn new(walkers: usize, dimension: usize) -> Self {
        Self {
            walkers,
            dimension,
            steps: 0,
            chain: Vec::new(),
            ln_posterior: Vec::new(),
        }
    }

    /// Number of walkers.
    pub fn walkers(&self) -> usize {
        self.walkers
    }

    /// Dimension of each walker.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of saved steps.
    pub fn saved_steps(&self) -> usize {
        self.steps
    }

    /// Returns `true` when no step has been saved.
    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }

    /// Shape of the chain: `(walkers, dimension, saved_steps)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.walkers, self.dimension, self.steps)
    }

    /// Shape of the log-posterior: `(walkers, saved_steps)`.
    pub fn ln_shape(&self) -> (usize, usize) {
        (self.walkers, self.steps)
    }

    /// Appends `extra_steps` zero-initialized columns to both arrays.
    pub fn grow(&mut self, extra_steps: usize) {
        self.steps += extra_steps;
        self.chain
            .resize(self.steps * self.walkers * self.dimension, 0.0);
        self.ln_posterior.resize(self.steps * self.walkers, 0.0);
    }

    /// Writes one walker's position and log-probability into column `step`.
    pub fn record(
        &mut self,
        walker: usize,
        step: usize,
        position: &[f64],
        ln_prob: f64,
    ) -> Result<(), SamplerError> {
        if walker >= self.walkers || step >= self.steps || position.len() != self.dimension {
            return Err(SamplerError::Config(
                ErrorInfo::new("record-out-of-range", "chain cell outside the grown region")
                    .with_context("walker", walker)
                    .with_context("step", step)
                    .with_context("position_len", position.len())
                    .with_context("shape", format!("{:?}", self.shape())),
            ));
        }
        let offset = self.cell(walker, 0, step);
        self.chain[offset..offset + self.dimension].copy_from_slice(position);
        self.ln_posterior[step * self.walkers + walker] = ln_prob;
        Ok(())
    }

    /// Value of coordinate `dim` of `walker` at saved `step`.
    ///
    /// # Panics
    ///
    /// Panics when any index is outside `shape()`. Use [`Self::record`] for
    /// checked writes.
    pub fn get(&self, walker: usize, dim: usize, step: usize) -> f64 {
        self.chain[self.cell(walker, dim, step)]
    }

    /// Log-posterior of `walker` at saved `step`.
    ///
    /// # Panics
    ///
    /// Panics when `walker` or `step` is outside `ln_shape()`.
    pub fn ln_prob(&self, walker: usize, step: usize) -> f64 {
        self.ln_posterior[step * self.walkers + walker]
    }

    /// Positions of all walkers at saved `step`, one row per walker.
    ///
    /// # Panics
    ///
    /// Panics when `step >= saved_steps()`; [`Self::last_column`] is the
    /// non-panicking accessor for the newest column.
    pub fn column(&self, step: usize) -> Vec<Vec<f64>> {
        let block = self.walkers * self.dimension;
        self.chain[step * block..(step + 1) * block]
            .chunks(self.dimension)
            .map(|row| row.to_vec())
            .collect()
    }

    /// Positions recorded in the last saved column, if any.
    pub fn last_column(&self) -> Option<Vec<Vec<f64>>> {
        self.steps.checked_sub(1).map(|step| self.column(step))
    }

    /// Flattens the chain into `dimension` rows of `walkers * saved_steps` values.
    ///
    /// Ordering is step-major: every walker of step 0, then every walker of
    /// step 1, and so on.
    pub fn flatten(&self) -> Vec<Vec<f64>> {
        let mut rows = vec![Vec::with_capacity(self.walkers * self.steps); self.dimension];
        for sample in self.chain.chunks(self.dimension.max(1)) {
            for (row, &value) in rows.iter_mut().zip(sample) {
                row.push(value);
            }
        }
        rows
    }

    /// Flattened log-posterior in the same step-major order as [`Self::flatten`].
    pub fn flat_ln_posterior(&self) -> Vec<f64> {
        self.ln_posterior.clone()
    }

    /// Drops every saved column.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Keeps only the first `steps` columns.
    pub fn truncate(&mut self, steps: usize) {
        self.steps = self.steps.min(steps);
        self.chain.truncate(self.steps * self.walkers * self.dimension);
        self.ln_posterior.truncate(self.steps * self.walkers);
    }

    fn cell(&self, walker: usize, dim: usize, step: usize) -> usize {
        (step * self.walkers + walker) * self.dimension + dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_is_step_major() {
        let (a0, a1, b0, b1) = (1.0, 2.0, 10.0, 20.0);
        let mut store = ChainStore::new(2, 1);
        store.grow(2);
        store.record(0, 0, &[a0], -1.0).unwrap();
        store.record(0, 1, &[a1], -2.0).unwrap();
        store.record(1, 0, &[b0], -10.0).unwrap();
        store.record(1, 1, &[b1], -20.0).unwrap();

        assert_eq!(store.flatten(), vec![vec![a0, b0, a1, b1]]);
        assert_eq!(store.flat_ln_posterior(), vec![-1.0, -10.0, -2.0, -20.0]);
        assert_eq!(store.get(1, 0, 1), b1);
        assert_eq!(store.ln_prob(0, 1), -2.0);
    }

    #[test]
    fn grow_appends_zeroed_columns() {
        let mut store = ChainStore::new(4, 3);
        assert_eq!(store.shape(), (4, 3, 0));
        store.grow(2);
        store.record(3, 1, &[1.0, 2.0, 3.0], 0.5).unwrap();
        store.grow(3);
        assert_eq!(store.shape(), (4, 3, 5));
        assert_eq!(store.ln_shape(), (4, 5));
        assert_eq!(store.column(1)[3], vec![1.0, 2.0, 3.0]);
        assert_eq!(store.column(4), vec![vec![0.0; 3]; 4]);
        assert_eq!(store.flatten().len(), 3);
        assert!(store.flatten().iter().all(|row| row.len() == 20));
    }

    #[test]
    fn record_outside_grown_region_fails() {
        let mut store = ChainStore::new(2, 2);
        let err = store.record(0, 0, &[0.0, 0.0], 0.0).unwrap_err();
        assert_eq!(err.info().code, "record-out-of-range");
        store.grow(1);
        assert!(store.record(2, 0, &[0.0, 0.0], 0.0).is_err());
        assert!(store.record(0, 0, &[0.0], 0.0).is_err());
        assert!(store.record(1, 0, &[0.0, 0.0], 0.0).is_ok());
    }

    #[test]
    #[should_panic]
    fn reading_past_saved_steps_panics() {
        let mut store = ChainStore::new(2, 1);
        store.grow(1);
        store.get(0, 0, 1);
    }

    #[test]
    fn clear_resets_to_empty() {
        let mut store = ChainStore::new(2, 1);
        store.grow(4);
        store.clear();
        assert!(store.is_empty());
        assert!(store.last_column().is_none());
        assert_eq!(store.flatten(), vec![Vec::<f64>::new()]);
    }
}
