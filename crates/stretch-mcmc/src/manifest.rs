use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stretch_core::errors::ErrorInfo;
use stretch_core::SamplerError;

use crate::analysis::ChainSummary;
use crate::config::RunPlan;

/// Structured record describing a completed sampling plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Plan used for the run.
    pub plan: RunPlan,
    /// Master seed, when the seed policy was fixed.
    pub master_seed: Option<u64>,
    /// Total proposals evaluated.
    pub iterations: u64,
    /// Total proposals accepted.
    pub accepted: u64,
    /// Chain shape `(walkers, dimension, saved_steps)`.
    pub chain_shape: (usize, usize, usize),
    /// Moments of the saved samples.
    pub summary: ChainSummary,
    /// Exported chain file (relative to the output directory).
    pub chain_file: Option<PathBuf>,
    /// Exported log-posterior file (relative to the output directory).
    pub ln_prob_file: Option<PathBuf>,
}

impl RunManifest {
    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), SamplerError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                SamplerError::Serde(
                    ErrorInfo::new("manifest-mkdir", err.to_string())
                        .with_context("path", parent.display()),
                )
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            SamplerError::Serde(
                ErrorInfo::new("manifest-serialize", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            SamplerError::Serde(
                ErrorInfo::new("manifest-write", err.to_string())
                    .with_context("path", path.display()),
            )
        })
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, SamplerError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SamplerError::Serde(
                ErrorInfo::new("manifest-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            SamplerError::Serde(
                ErrorInfo::new("manifest-parse", err.to_string())
                    .with_context("path", path.display()),
            )
        })
    }
}
