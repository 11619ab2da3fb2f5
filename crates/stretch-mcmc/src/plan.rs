use std::path::PathBuf;

use log::info;
use serde::{Deserialize, Serialize};
use stretch_core::SamplerError;

use crate::analysis::{self, ChainSummary};
use crate::config::RunPlan;
use crate::density::LogDensity;
use crate::export::{self, ExportedFiles};
use crate::manifest::RunManifest;
use crate::sampler::Sampler;

/// Summary returned after a plan completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    /// Walker positions after the production phase.
    pub final_positions: Vec<Vec<f64>>,
    /// Moments of the production samples.
    pub summary: ChainSummary,
    /// Accepted over evaluated proposals, both phases included.
    pub acceptance_fraction: f64,
    /// Total proposals evaluated.
    pub iterations: u64,
    /// Exported array files, when an output directory was configured.
    pub files: Option<ExportedFiles>,
    /// Manifest path, when an output directory was configured.
    pub manifest_path: Option<PathBuf>,
}

/// Runs burn-in (not saved) then production (saved) from `initial`.
///
/// With `plan.output.directory` set, the flattened chain and log-posterior
/// are exported and a JSON manifest is written next to them.
pub fn run_plan<D: LogDensity>(
    plan: &RunPlan,
    initial: &[Vec<f64>],
    density: D,
) -> Result<PlanReport, SamplerError> {
    let mut sampler = Sampler::new(plan.sampler.clone(), density)?;
    let production = plan.production_options();
    production.validate()?;

    let start = match plan.burn_in_options() {
        Some(burn_in) => {
            info!("burn-in for {} steps", burn_in.steps);
            sampler.run(initial, &burn_in)?
        }
        None => initial.to_vec(),
    };
    let final_positions = sampler.run(&start, &production)?;
    let summary = analysis::summarize(sampler.chain());

    let (files, manifest_path) = match &plan.output.directory {
        Some(directory) => {
            let files = export::write_chain(
                &directory.join(&plan.output.basename),
                &plan.output.extension,
                sampler.chain(),
            )?;
            let relative = |path: &PathBuf| {
                path.strip_prefix(directory)
                    .map(|rel| rel.to_path_buf())
                    .unwrap_or_else(|_| path.clone())
            };
            let manifest = RunManifest {
                plan: plan.clone(),
                master_seed: plan.sampler.seed.master_seed(),
                iterations: sampler.iterations(),
                accepted: sampler.accepted(),
                chain_shape: sampler.chain().shape(),
                summary: summary.clone(),
                chain_file: Some(relative(&files.chain)),
                ln_prob_file: Some(relative(&files.ln_prob)),
            };
            let manifest_path = directory.join(&plan.output.manifest_file);
            manifest.write(&manifest_path)?;
            (Some(files), Some(manifest_path))
        }
        None => (None, None),
    };

    Ok(PlanReport {
        final_positions,
        summary,
        acceptance_fraction: sampler.acceptance_fraction(),
        iterations: sampler.iterations(),
        files,
        manifest_path,
    })
}
