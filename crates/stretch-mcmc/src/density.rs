use rayon::prelude::*;

/// Target distribution known through its (possibly unnormalized) log-density.
///
/// Implementations are called concurrently by the parallel strategy and must
/// not rely on shared mutable state.
pub trait LogDensity: Send + Sync {
    /// Log-probability of `position` (length equal to the sampler dimension).
    fn ln_prob(&self, position: &[f64]) -> f64;
}

impl<F> LogDensity for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn ln_prob(&self, position: &[f64]) -> f64 {
        self(position)
    }
}

/// Log-density with a fixed set of extra arguments forwarded on every call.
#[derive(Debug, Clone)]
pub struct WithArgs<F, A> {
    func: F,
    args: A,
}

impl<F, A> WithArgs<F, A>
where
    F: Fn(&[f64], &A) -> f64 + Send + Sync,
    A: Send + Sync,
{
    /// Binds `args` to `func`.
    pub fn new(func: F, args: A) -> Self {
        Self { func, args }
    }

    /// The bound arguments.
    pub fn args(&self) -> &A {
        &self.args
    }
}

impl<F, A> LogDensity for WithArgs<F, A>
where
    F: Fn(&[f64], &A) -> f64 + Send + Sync,
    A: Send + Sync,
{
    fn ln_prob(&self, position: &[f64]) -> f64 {
        (self.func)(position, &self.args)
    }
}

/// Evaluates every walker of a flat `walkers * dimension` buffer in order.
pub fn evaluate_all<D: LogDensity + ?Sized>(
    density: &D,
    positions: &[f64],
    dimension: usize,
) -> Vec<f64> {
    positions
        .chunks(dimension)
        .map(|walker| density.ln_prob(walker))
        .collect()
}

/// Parallel counterpart of [`evaluate_all`]; must run inside the caller's pool.
pub fn evaluate_all_parallel<D: LogDensity + ?Sized>(
    density: &D,
    positions: &[f64],
    dimension: usize,
) -> Vec<f64> {
    positions
        .par_chunks(dimension)
        .map(|walker| density.ln_prob(walker))
        .collect()
}
