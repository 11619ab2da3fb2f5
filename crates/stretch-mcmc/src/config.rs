use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stretch_core::errors::ErrorInfo;
use stretch_core::{RngHandle, SamplerError};

/// Fixed parameters of an ensemble sampler, validated once at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Number of walkers in the ensemble. Must be even and at least `2 * dimension`.
    pub walkers: usize,
    /// Dimension of the sampled parameter space.
    pub dimension: usize,
    /// Stretch-move scale parameter `a` (must exceed 1).
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Seeding policy for the sampler-owned random source.
    #[serde(default)]
    pub seed: SeedPolicy,
}

fn default_scale() -> f64 {
    2.0
}

impl SamplerConfig {
    /// Creates a configuration with the default scale and seed policy.
    pub fn new(walkers: usize, dimension: usize) -> Self {
        Self {
            walkers,
            dimension,
            scale: default_scale(),
            seed: SeedPolicy::default(),
        }
    }

    /// Overrides the stretch scale parameter.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Pins the random source to a fixed master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = SeedPolicy::Fixed { seed };
        self
    }

    /// Checks the ensemble-splitting preconditions.
    pub fn validate(&self) -> Result<(), SamplerError> {
        if self.walkers == 0 || self.dimension == 0 {
            return Err(SamplerError::Config(
                ErrorInfo::new(
                    "non-positive-shape",
                    "walker count and dimension must be positive",
                )
                .with_context("walkers", self.walkers)
                .with_context("dimension", self.dimension),
            ));
        }
        if self.walkers % 2 != 0 {
            return Err(SamplerError::Config(
                ErrorInfo::new("odd-walkers", "the number of walkers must be even")
                    .with_context("walkers", self.walkers),
            ));
        }
        if self.walkers < 2 * self.dimension {
            return Err(SamplerError::Config(
                ErrorInfo::new(
                    "too-few-walkers",
                    "the number of walkers must be at least twice the dimension",
                )
                .with_context("walkers", self.walkers)
                .with_context("dimension", self.dimension),
            ));
        }
        if !(self.scale.is_finite() && self.scale > 1.0) {
            return Err(SamplerError::Config(
                ErrorInfo::new("invalid-scale", "the stretch scale must be finite and > 1")
                    .with_context("scale", self.scale),
            ));
        }
        Ok(())
    }
}

/// Seeding policy for the sampler's random source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SeedPolicy {
    /// Seed from operating system entropy; runs are not reproducible.
    #[default]
    Entropy,
    /// Deterministic master seed.
    Fixed {
        /// Master seed used for the sampler-owned stream.
        seed: u64,
    },
}

impl SeedPolicy {
    /// Builds the random source described by the policy.
    pub fn rng(&self) -> Result<RngHandle, SamplerError> {
        match self {
            SeedPolicy::Entropy => RngHandle::from_entropy(),
            SeedPolicy::Fixed { seed } => Ok(RngHandle::from_seed(*seed)),
        }
    }

    /// Returns the fixed master seed, if any.
    pub fn master_seed(&self) -> Option<u64> {
        match self {
            SeedPolicy::Entropy => None,
            SeedPolicy::Fixed { seed } => Some(*seed),
        }
    }
}

/// How the walker loop inside each half-sweep is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ExecutionStrategy {
    /// Parallel when more than one CPU is available, serial otherwise.
    #[default]
    Auto,
    /// Single-threaded, deterministically ordered draws.
    Serial,
    /// Fixed-size worker pool over the active half of the ensemble.
    Parallel {
        /// Worker count; `0` uses the rayon default.
        #[serde(default)]
        threads: usize,
    },
}

impl ExecutionStrategy {
    /// Resolves `Auto` against the parallelism available on this machine.
    pub fn resolve(self) -> ExecutionStrategy {
        match self {
            ExecutionStrategy::Auto => {
                let cpus = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                if cpus > 1 {
                    ExecutionStrategy::Parallel { threads: 0 }
                } else {
                    ExecutionStrategy::Serial
                }
            }
            other => other,
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            ExecutionStrategy::Auto => "auto",
            ExecutionStrategy::Serial => "serial",
            ExecutionStrategy::Parallel { .. } => "parallel",
        }
    }
}

/// Per-call options of [`crate::Sampler::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Number of sweeps to execute.
    pub steps: usize,
    /// Save every `thin`-th sweep.
    #[serde(default = "default_thin")]
    pub thin: usize,
    /// Whether saved sweeps are appended to the chain store.
    #[serde(default = "default_persist")]
    pub persist: bool,
    /// Walker-loop execution strategy.
    #[serde(default)]
    pub strategy: ExecutionStrategy,
}

fn default_thin() -> usize {
    1
}

fn default_persist() -> bool {
    true
}

impl RunOptions {
    /// Persisted run of `steps` sweeps with no thinning and automatic strategy.
    pub fn new(steps: usize) -> Self {
        Self {
            steps,
            thin: default_thin(),
            persist: default_persist(),
            strategy: ExecutionStrategy::default(),
        }
    }

    /// Unsaved run, used for burn-in.
    pub fn burn_in(steps: usize) -> Self {
        Self {
            persist: false,
            ..Self::new(steps)
        }
    }

    /// Sets the thinning interval.
    pub fn thin(mut self, thin: usize) -> Self {
        self.thin = thin;
        self
    }

    /// Sets the execution strategy.
    pub fn strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Number of chain columns a run with these options appends.
    pub fn saved_steps(&self) -> usize {
        if self.persist && self.thin > 0 {
            self.steps / self.thin
        } else {
            0
        }
    }

    /// Rejects zero step counts and zero thinning.
    pub fn validate(&self) -> Result<(), SamplerError> {
        if self.steps == 0 {
            return Err(SamplerError::Config(
                ErrorInfo::new("zero-steps", "the number of steps must be positive")
                    .with_context("steps", self.steps),
            ));
        }
        if self.thin == 0 {
            return Err(SamplerError::Config(
                ErrorInfo::new("zero-thin", "the thinning interval must be positive")
                    .with_context("thin", self.thin),
            ));
        }
        Ok(())
    }
}

/// Output layout for exported chains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for exported arrays and the manifest. Nothing is written when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Basename shared by the `_chain` and `_lnprob` files.
    #[serde(default = "default_basename")]
    pub basename: String,
    /// File extension of the exported arrays.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Manifest filename relative to `directory`.
    #[serde(default = "default_manifest_filename")]
    pub manifest_file: PathBuf,
}

fn default_basename() -> String {
    "samples".to_string()
}

fn default_extension() -> String {
    "bin".to_string()
}

fn default_manifest_filename() -> PathBuf {
    PathBuf::from("manifest.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            basename: default_basename(),
            extension: default_extension(),
            manifest_file: default_manifest_filename(),
        }
    }
}

/// YAML-configurable burn-in plus production schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPlan {
    /// Sampler construction parameters.
    pub sampler: SamplerConfig,
    /// Unsaved sweeps executed before production.
    #[serde(default)]
    pub burn_in: usize,
    /// Persisted production sweeps.
    pub production: usize,
    /// Thinning interval applied to the production phase.
    #[serde(default = "default_thin")]
    pub thin: usize,
    /// Execution strategy used by both phases.
    #[serde(default)]
    pub strategy: ExecutionStrategy,
    /// Export layout.
    #[serde(default)]
    pub output: OutputConfig,
}

impl RunPlan {
    /// Parses a plan from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SamplerError> {
        serde_yaml::from_str(yaml).map_err(|err| SamplerError::serde("plan-parse", err))
    }

    /// Loads a plan from a YAML file.
    pub fn load(path: &Path) -> Result<Self, SamplerError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SamplerError::Serde(
                ErrorInfo::new("plan-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Self::from_yaml_str(&contents).map_err(|err| {
            SamplerError::Serde(err.info().clone().with_context("path", path.display()))
        })
    }

    /// Options for the unsaved burn-in phase, if any.
    pub fn burn_in_options(&self) -> Option<RunOptions> {
        (self.burn_in > 0).then(|| RunOptions::burn_in(self.burn_in).strategy(self.strategy))
    }

    /// Options for the persisted production phase.
    pub fn production_options(&self) -> RunOptions {
        RunOptions::new(self.production)
            .thin(self.thin)
            .strategy(self.strategy)
    }
}
