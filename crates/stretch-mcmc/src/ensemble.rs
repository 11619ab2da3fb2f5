use std::panic::{self, AssertUnwindSafe};

use rand::Rng;
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use stretch_core::errors::ErrorInfo;
use stretch_core::SamplerError;

use crate::density::LogDensity;
use crate::determinism;
use crate::stretch;

/// Walker positions and their cached log-probabilities.
///
/// Positions are stored walker-major in one flat buffer of
/// `walkers * dimension` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ensemble {
    walkers: usize,
    dimension: usize,
    positions: Vec<f64>,
    ln_probs: Vec<f64>,
}

/// Counters produced by one full sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepStats {
    /// Proposals evaluated (always the walker count).
    pub proposed: u64,
    /// Proposals accepted.
    pub accepted: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Half {
    First,
    Second,
}

impl Ensemble {
    /// Assembles an ensemble from flat positions and matching log-probabilities.
    pub fn new(
        positions: Vec<f64>,
        ln_probs: Vec<f64>,
        dimension: usize,
    ) -> Result<Self, SamplerError> {
        if dimension == 0 || positions.len() != ln_probs.len() * dimension {
            return Err(SamplerError::Config(
                ErrorInfo::new(
                    "ensemble-shape",
                    "positions do not match log-probabilities and dimension",
                )
                .with_context("positions", positions.len())
                .with_context("ln_probs", ln_probs.len())
                .with_context("dimension", dimension),
            ));
        }
        Ok(Self {
            walkers: ln_probs.len(),
            dimension,
            positions,
            ln_probs,
        })
    }

    /// Number of walkers.
    pub fn walkers(&self) -> usize {
        self.walkers
    }

    /// Dimension of each walker.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Position of walker `walker`.
    pub fn position(&self, walker: usize) -> &[f64] {
        &self.positions[walker * self.dimension..(walker + 1) * self.dimension]
    }

    /// Flat walker-major positions.
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Cached log-probabilities, one per walker.
    pub fn ln_probs(&self) -> &[f64] {
        &self.ln_probs
    }

    /// Positions as one row per walker.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.positions
            .chunks(self.dimension)
            .map(|row| row.to_vec())
            .collect()
    }

    /// Splits into `(active positions, active ln-probs, passive positions, offset)`.
    fn split(&mut self, half: Half) -> (&mut [f64], &mut [f64], &[f64], usize) {
        let mid = self.walkers / 2;
        let (first_pos, second_pos) = self.positions.split_at_mut(mid * self.dimension);
        let (first_lp, second_lp) = self.ln_probs.split_at_mut(mid);
        match half {
            Half::First => (first_pos, first_lp, &*second_pos, 0),
            Half::Second => (second_pos, second_lp, &*first_pos, mid),
        }
    }
}

/// Advances every walker once on the calling thread.
///
/// All randomness is drawn from `rng` in walker order: the first half moves
/// against the second, then the second against the updated first.
pub fn sweep_serial<D, R>(
    ensemble: &mut Ensemble,
    density: &D,
    scale: f64,
    rng: &mut R,
) -> SweepStats
where
    D: LogDensity + ?Sized,
    R: Rng + ?Sized,
{
    let dimension = ensemble.dimension;
    let mut accepted = 0;
    for half in [Half::First, Half::Second] {
        let (active, ln_probs, passive, _) = ensemble.split(half);
        for (position, ln_prob) in active.chunks_mut(dimension).zip(ln_probs.iter_mut()) {
            let proposal = stretch::propose(position, passive, *ln_prob, scale, density, rng);
            if proposal.accepted {
                position.copy_from_slice(&proposal.position);
                *ln_prob = proposal.ln_prob;
                accepted += 1;
            }
        }
    }
    SweepStats {
        proposed: ensemble.walkers as u64,
        accepted,
    }
}

/// Advances every walker once, spreading each half-sweep across `pool`.
///
/// Walker `i` draws from its own substream of `sweep_seed`, so the outcome
/// does not depend on the number of workers. Each half-sweep completes
/// before the next one starts. A panicking density aborts the sweep with
/// [`SamplerError::Worker`].
pub fn sweep_parallel<D>(
    ensemble: &mut Ensemble,
    density: &D,
    scale: f64,
    pool: &ThreadPool,
    sweep_seed: u64,
) -> Result<SweepStats, SamplerError>
where
    D: LogDensity + ?Sized,
{
    let dimension = ensemble.dimension;
    let accepted = install_guarded(pool, || {
        let mut accepted = 0;
        for half in [Half::First, Half::Second] {
            let (active, ln_probs, passive, offset) = ensemble.split(half);
            accepted += active
                .par_chunks_mut(dimension)
                .zip(ln_probs.par_iter_mut())
                .enumerate()
                .map(|(index, (position, ln_prob))| {
                    let mut rng = determinism::walker_rng(sweep_seed, offset + index);
                    let proposal =
                        stretch::propose(position, passive, *ln_prob, scale, density, &mut rng);
                    if proposal.accepted {
                        position.copy_from_slice(&proposal.position);
                        *ln_prob = proposal.ln_prob;
                        1u64
                    } else {
                        0
                    }
                })
                .sum::<u64>();
        }
        accepted
    })
    .map_err(|err| {
        SamplerError::Worker(err.info().clone().with_context("sweep_seed", sweep_seed))
    })?;
    Ok(SweepStats {
        proposed: ensemble.walkers as u64,
        accepted,
    })
}

/// Runs `job` inside `pool`, turning a worker panic into [`SamplerError::Worker`].
pub fn install_guarded<T, F>(pool: &ThreadPool, job: F) -> Result<T, SamplerError>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    guarded(|| pool.install(job))
}

/// Runs `job` on the calling thread, turning a panic into [`SamplerError::Worker`].
pub fn guarded<T, F>(job: F) -> Result<T, SamplerError>
where
    F: FnOnce() -> T,
{
    panic::catch_unwind(AssertUnwindSafe(job)).map_err(|payload| {
        SamplerError::Worker(
            ErrorInfo::new("worker-panic", panic_message(payload.as_ref()))
                .with_hint("the log-density must not panic for any proposed position"),
        )
    })
}

/// Builds the fixed-size pool used by [`sweep_parallel`]; `0` picks the rayon default.
pub fn build_pool(threads: usize) -> Result<ThreadPool, SamplerError> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if threads > 0 {
        builder = builder.num_threads(threads);
    }
    builder.build().map_err(|err| {
        SamplerError::Worker(
            ErrorInfo::new("thread-pool", err.to_string()).with_context("threads", threads),
        )
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stretch_core::RngHandle;

    use crate::density::evaluate_all;

    fn gaussian(x: &[f64]) -> f64 {
        -0.5 * x.iter().map(|v| v * v).sum::<f64>()
    }

    fn spread_ensemble(walkers: usize, dimension: usize) -> Ensemble {
        let positions: Vec<f64> = (0..walkers * dimension)
            .map(|i| (i as f64 * 0.37).sin())
            .collect();
        let ln_probs = evaluate_all(&gaussian, &positions, dimension);
        Ensemble::new(positions, ln_probs, dimension).unwrap()
    }

    #[test]
    fn mismatched_buffers_are_rejected() {
        let err = Ensemble::new(vec![0.0; 5], vec![0.0; 2], 2).unwrap_err();
        assert_eq!(err.info().code, "ensemble-shape");
    }

    #[test]
    fn serial_sweep_counts_every_walker() {
        let mut ensemble = spread_ensemble(8, 2);
        let mut rng = RngHandle::from_seed(5);
        for _ in 0..10 {
            let stats = sweep_serial(&mut ensemble, &gaussian, 2.0, &mut rng);
            assert_eq!(stats.proposed, 8);
            assert!(stats.accepted <= stats.proposed);
        }
        for walker in 0..8 {
            assert_eq!(
                ensemble.ln_probs()[walker],
                gaussian(ensemble.position(walker))
            );
        }
    }

    #[test]
    fn parallel_sweep_ignores_worker_count() {
        let single = build_pool(1).unwrap();
        let many = build_pool(4).unwrap();
        let mut a = spread_ensemble(16, 3);
        let mut b = a.clone();
        for sweep in 0..20u64 {
            let stats_a = sweep_parallel(&mut a, &gaussian, 2.0, &single, sweep).unwrap();
            let stats_b = sweep_parallel(&mut b, &gaussian, 2.0, &many, sweep).unwrap();
            assert_eq!(stats_a, stats_b);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn panicking_density_surfaces_as_worker_error() {
        let pool = build_pool(2).unwrap();
        let mut ensemble = spread_ensemble(4, 1);
        let density = |_: &[f64]| -> f64 { panic!("density exploded") };
        let err = sweep_parallel(&mut ensemble, &density, 2.0, &pool, 1).unwrap_err();
        assert_eq!(err.info().code, "worker-panic");
        assert!(err.info().message.contains("density exploded"));
    }

    #[test]
    fn guarded_serial_sweep_reports_panic_message() {
        let mut ensemble = spread_ensemble(4, 1);
        let mut rng = RngHandle::from_seed(3);
        let density = |_: &[f64]| -> f64 { panic!("serial density exploded") };
        let err = guarded(|| sweep_serial(&mut ensemble, &density, 2.0, &mut rng)).unwrap_err();
        assert_eq!(err.info().code, "worker-panic");
        assert!(err.info().message.contains("serial density exploded"));
    }
}
