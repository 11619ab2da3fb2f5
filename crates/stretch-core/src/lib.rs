#![deny(missing_docs)]
#![doc = "Error types and seeded random sources shared by the stretch ensemble sampler crates."]

pub mod errors;
pub mod rng;

pub use errors::{ErrorInfo, SamplerError};
pub use rng::{derive_substream_seed, RngHandle};
