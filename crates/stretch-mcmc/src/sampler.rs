use log::{debug, info, trace, warn};
use rand::RngCore;
use rayon::ThreadPool;
use stretch_core::errors::ErrorInfo;
use stretch_core::{RngHandle, SamplerError};

use crate::chain::ChainStore;
use crate::config::{ExecutionStrategy, RunOptions, SamplerConfig};
use crate::density::{evaluate_all, evaluate_all_parallel, LogDensity};
use crate::ensemble::{self, Ensemble, SweepStats};
use crate::observer::{NullObserver, StepEvent, StepObserver};

/// Affine-invariant ensemble sampler.
///
/// Owns the walker configuration, the log-density, the random source, the
/// chain store and the running counters. Runs are chained by feeding the
/// positions returned by [`Sampler::run`] into the next call, or by
/// [`Sampler::resume`] which starts from the last saved column.
pub struct Sampler<D> {
    config: SamplerConfig,
    density: D,
    observer: Box<dyn StepObserver>,
    rng: RngHandle,
    chain: ChainStore,
    last_state: Option<Ensemble>,
    iterations: u64,
    accepted: u64,
}

impl<D: LogDensity> Sampler<D> {
    /// Validates `config` and builds a sampler with an empty chain.
    pub fn new(config: SamplerConfig, density: D) -> Result<Self, SamplerError> {
        config.validate()?;
        Ok(Self {
            rng: config.seed.rng()?,
            chain: ChainStore::new(config.walkers, config.dimension),
            config,
            density,
            observer: Box::new(NullObserver),
            last_state: None,
            iterations: 0,
            accepted: 0,
        })
    }

    /// Installs the observer notified for every recorded walker.
    pub fn with_observer(mut self, observer: impl StepObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Replaces the random source, e.g. with a seeded handle in tests.
    pub fn with_rng(mut self, rng: RngHandle) -> Self {
        self.rng = rng;
        self
    }

    /// Construction parameters.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Number of walkers.
    pub fn walkers(&self) -> usize {
        self.config.walkers
    }

    /// Dimension of the parameter space.
    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// Stretch scale parameter.
    pub fn scale(&self) -> f64 {
        self.config.scale
    }

    /// The target log-density.
    pub fn density(&self) -> &D {
        &self.density
    }

    /// Saved chain and log-posterior history.
    pub fn chain(&self) -> &ChainStore {
        &self.chain
    }

    /// Total proposals evaluated across all walkers.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Total proposals accepted.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Fraction of accepted proposals; zero before any sweep.
    pub fn acceptance_fraction(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.accepted as f64 / self.iterations as f64
        }
    }

    /// Step-major flattened chain, one row per dimension.
    pub fn flat_chain(&self) -> Vec<Vec<f64>> {
        self.chain.flatten()
    }

    /// Step-major flattened log-posterior.
    pub fn flat_ln_posterior(&self) -> Vec<f64> {
        self.chain.flat_ln_posterior()
    }

    /// Log-probabilities of the walkers at the end of the latest run.
    pub fn last_ln_probs(&self) -> Option<&[f64]> {
        self.last_state.as_ref().map(Ensemble::ln_probs)
    }

    /// Discards chain history and counters; configuration is kept.
    pub fn reset(&mut self) {
        self.chain.clear();
        self.last_state = None;
        self.iterations = 0;
        self.accepted = 0;
    }

    /// Runs `options.steps` sweeps from `initial` and returns the final positions.
    ///
    /// `initial` must hold one row of length `dimension` per walker. When
    /// `options.persist` is set, every `thin`-th sweep is appended to the
    /// chain and reported to the observer walker by walker. A panic raised
    /// while sweeping fails the run with [`SamplerError::Worker`] and drops
    /// the columns this run had grown.
    pub fn run(
        &mut self,
        initial: &[Vec<f64>],
        options: &RunOptions,
    ) -> Result<Vec<Vec<f64>>, SamplerError> {
        options.validate()?;
        let positions = self.flatten_initial(initial)?;
        let strategy = options.strategy.resolve();
        let pool = match strategy {
            ExecutionStrategy::Parallel { threads } => Some(ensemble::build_pool(threads)?),
            _ => None,
        };

        let dimension = self.config.dimension;
        let ln_probs = match &pool {
            Some(pool) => {
                let density = &self.density;
                let positions = &positions;
                ensemble::install_guarded(pool, || {
                    evaluate_all_parallel(density, positions, dimension)
                })?
            }
            None => ensemble::guarded(|| evaluate_all(&self.density, &positions, dimension))?,
        };
        let mut state = Ensemble::new(positions, ln_probs, dimension)?;

        let first_column = self.chain.saved_steps();
        let saved = options.saved_steps();
        if saved > 0 {
            self.chain.grow(saved);
        } else if options.persist {
            warn!(
                "run of {} steps with thin {} saves no chain columns",
                options.steps, options.thin
            );
        }
        info!(
            "sampling {} walkers x {} dims for {} steps ({} strategy, thin {}, {} saved)",
            self.config.walkers,
            dimension,
            options.steps,
            strategy.label(),
            options.thin,
            saved
        );

        let outcome = ensemble::guarded(|| {
            self.sweep_loop(&mut state, options, pool.as_ref(), first_column)
        })
        .and_then(|result| result);
        if let Err(err) = outcome {
            self.chain.truncate(first_column);
            return Err(err);
        }

        info!(
            "finished {} steps; acceptance fraction {:.3}",
            options.steps,
            self.acceptance_fraction()
        );
        let final_positions = state.to_rows();
        self.last_state = Some(state);
        Ok(final_positions)
    }

    /// Continues from the last saved column for an explicit number of sweeps.
    pub fn resume(&mut self, options: &RunOptions) -> Result<Vec<Vec<f64>>, SamplerError> {
        let initial = self.chain.last_column().ok_or_else(|| {
            SamplerError::Config(
                ErrorInfo::new("empty-chain", "cannot resume: no saved chain columns")
                    .with_hint("run with persist enabled before resuming"),
            )
        })?;
        self.run(&initial, options)
    }

    fn sweep_loop(
        &mut self,
        state: &mut Ensemble,
        options: &RunOptions,
        pool: Option<&ThreadPool>,
        first_column: usize,
    ) -> Result<(), SamplerError> {
        let scale = self.config.scale;
        for step in 0..options.steps {
            let stats: SweepStats = match pool {
                Some(pool) => {
                    let sweep_seed = self.rng.next_u64();
                    ensemble::sweep_parallel(state, &self.density, scale, pool, sweep_seed)?
                }
                None => ensemble::sweep_serial(state, &self.density, scale, &mut self.rng),
            };
            self.iterations += stats.proposed;
            self.accepted += stats.accepted;
            trace!("sweep {step}: accepted {}/{}", stats.accepted, stats.proposed);
            self.observer.on_sweep(step, &stats);

            if !options.persist || (step + 1) % options.thin != 0 {
                continue;
            }
            let column = first_column + (step + 1) / options.thin - 1;
            for walker in 0..state.walkers() {
                let position = state.position(walker);
                let ln_prob = state.ln_probs()[walker];
                self.chain.record(walker, column, position, ln_prob)?;
                self.observer.on_step_recorded(&StepEvent {
                    relative_step: step,
                    saved_step: column,
                    walker,
                    position,
                    ln_prob,
                    iterations: self.iterations,
                    accepted: self.accepted,
                });
            }
            debug!("saved sweep {step} into column {column}");
        }
        Ok(())
    }

    fn flatten_initial(&self, initial: &[Vec<f64>]) -> Result<Vec<f64>, SamplerError> {
        let (walkers, dimension) = (self.config.walkers, self.config.dimension);
        if initial.len() != walkers || initial.iter().any(|row| row.len() != dimension) {
            let widths: Vec<usize> = initial.iter().map(Vec::len).collect();
            return Err(SamplerError::Config(
                ErrorInfo::new(
                    "initial-shape",
                    "initial positions must have shape (walkers, dimension)",
                )
                .with_context("expected", format!("({walkers}, {dimension})"))
                .with_context("rows", initial.len())
                .with_context("row_widths", format!("{widths:?}")),
            ));
        }
        Ok(initial.concat())
    }
}
