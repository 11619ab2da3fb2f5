use rand::distributions::Open01;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::density::LogDensity;
use crate::zdist;

/// Outcome of a single stretch-move proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StretchProposal {
    /// Whether the proposal passed the acceptance test.
    pub accepted: bool,
    /// Proposed position `Y`.
    pub position: Vec<f64>,
    /// Log-probability evaluated at `position`.
    pub ln_prob: f64,
    /// Stretch factor used to build the proposal.
    pub z: f64,
}

/// Log acceptance ratio of the stretch move, including the `z^(d-1)` Jacobian.
pub fn log_acceptance_ratio(z: f64, dimension: usize, new_ln_prob: f64, old_ln_prob: f64) -> f64 {
    (dimension as f64 - 1.0) * z.ln() + new_ln_prob - old_ln_prob
}

/// Proposes a stretch move for `active` against a walker drawn from `passive`.
///
/// `passive` is the flat `walkers * dimension` buffer of the complementary
/// half. Draw order is fixed (stretch factor, passive index, acceptance
/// uniform) so seeded runs replay exactly.
pub fn propose<D, R>(
    active: &[f64],
    passive: &[f64],
    ln_prob_active: f64,
    scale: f64,
    density: &D,
    rng: &mut R,
) -> StretchProposal
where
    D: LogDensity + ?Sized,
    R: Rng + ?Sized,
{
    let dimension = active.len();
    let z = zdist::draw_z(scale, rng);
    let partner = rng.gen_range(0..passive.len() / dimension);
    let anchor = &passive[partner * dimension..(partner + 1) * dimension];

    let position: Vec<f64> = anchor
        .iter()
        .zip(active)
        .map(|(&x_j, &x_k)| x_j + z * (x_k - x_j))
        .collect();
    let ln_prob = density.ln_prob(&position);

    let log_ratio = log_acceptance_ratio(z, dimension, ln_prob, ln_prob_active);
    let u: f64 = rng.sample(Open01);
    StretchProposal {
        accepted: u.ln() <= log_ratio,
        position,
        ln_prob,
        z,
    }
}
