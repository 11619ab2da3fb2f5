use crate::ensemble::SweepStats;

/// Notification emitted once per walker for every saved step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEvent<'a> {
    /// Zero-based sweep index within the current run.
    pub relative_step: usize,
    /// Column of the chain store the walker was written to.
    pub saved_step: usize,
    /// Walker index.
    pub walker: usize,
    /// Recorded position.
    pub position: &'a [f64],
    /// Recorded log-probability.
    pub ln_prob: f64,
    /// Total proposals evaluated so far.
    pub iterations: u64,
    /// Total proposals accepted so far.
    pub accepted: u64,
}

/// Hook for progress reporting and custom per-step handling.
pub trait StepObserver: Send {
    /// Called after `event.walker` has been recorded, in walker order.
    fn on_step_recorded(&mut self, event: &StepEvent<'_>);

    /// Called after every sweep, saved or not.
    fn on_sweep(&mut self, _relative_step: usize, _stats: &SweepStats) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl StepObserver for NullObserver {
    fn on_step_recorded(&mut self, _event: &StepEvent<'_>) {}
}
