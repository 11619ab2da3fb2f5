use stretch_core::{derive_substream_seed, RngHandle};

/// Derives the seed a parallel worker uses for one walker within one sweep.
pub fn walker_seed(sweep_seed: u64, walker: usize) -> u64 {
    derive_substream_seed(sweep_seed, walker as u64)
}

/// Random source owned by a single walker update during a parallel sub-step.
pub fn walker_rng(sweep_seed: u64, walker: usize) -> RngHandle {
    RngHandle::from_seed(walker_seed(sweep_seed, walker))
}
