#![deny(missing_docs)]

//! Affine-invariant ensemble MCMC sampler built on the Goodman & Weare stretch move.
//!
//! A [`Sampler`] advances an even number of walkers in two half-sweeps: each
//! half moves along lines through walkers of the other half, which stays
//! frozen while it is read. The walker loop of a half-sweep runs either on
//! the calling thread or on a rayon pool, selected per run through
//! [`ExecutionStrategy`].
//!
//! ```
//! use stretch_mcmc::{RunOptions, Sampler, SamplerConfig};
//!
//! let config = SamplerConfig::new(8, 1).with_seed(7);
//! let mut sampler = Sampler::new(config, |x: &[f64]| -(x[0] - 1.0).powi(2)).unwrap();
//! let start: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64 * 0.1]).collect();
//! let burned = sampler.run(&start, &RunOptions::burn_in(20)).unwrap();
//! sampler.run(&burned, &RunOptions::new(50).thin(5)).unwrap();
//! assert_eq!(sampler.chain().shape(), (8, 1, 10));
//! ```

/// Moments of saved samples.
pub mod analysis;
/// Saved chain and log-posterior storage.
pub mod chain;
/// Configuration schema and defaults.
pub mod config;
/// Log-density trait and batch evaluation.
pub mod density;
/// Per-walker seed derivation for the parallel strategy.
pub mod determinism;
/// Ensemble state and the serial/parallel sweep engines.
pub mod ensemble;
/// Binary array export of flattened chains.
pub mod export;
/// Run manifest serialization helpers.
pub mod manifest;
/// Step notification hooks.
pub mod observer;
/// Burn-in plus production driver.
pub mod plan;
/// Sampler state and the `run`/`resume` entry points.
pub mod sampler;
/// Stretch-move proposal and acceptance rule.
pub mod stretch;
/// Stretch-factor distribution.
pub mod zdist;

pub use chain::ChainStore;
pub use config::{ExecutionStrategy, OutputConfig, RunOptions, RunPlan, SamplerConfig, SeedPolicy};
pub use density::{LogDensity, WithArgs};
pub use ensemble::{Ensemble, SweepStats};
pub use observer::{NullObserver, StepEvent, StepObserver};
pub use plan::{run_plan, PlanReport};
pub use sampler::Sampler;
pub use stretch_core::{ErrorInfo, RngHandle, SamplerError};
