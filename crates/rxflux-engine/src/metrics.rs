//! Per-step performance metrics for the integrator.
//!
//! [`StepMetrics`] captures timing data for a single step, one duration
//! per phase, plus the amount of work done.

use rxflux_core::StepIndex;

/// Timing and workload metrics collected during a single step.
///
/// All durations are in microseconds. Populated after each successful
/// `step()`; the most recent is kept as `last_metrics()`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step.
    pub total_us: u64,
    /// Time spent capturing the snapshot.
    pub snapshot_us: u64,
    /// Time spent evaluating rate terms and flux sources.
    pub evaluation_us: u64,
    /// Time spent computing, checking, and committing new concentrations.
    pub update_us: u64,
    /// Number of nodes advanced.
    pub node_count: usize,
    /// Number of flux sources evaluated.
    pub sources_evaluated: usize,
    /// Whether the evaluation phase ran on the rayon pool.
    pub parallel: bool,
}

/// Result of a successful step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// Index of the completed step.
    pub step: StepIndex,
    /// Simulation time after the step.
    pub time: f64,
    /// Performance metrics for this step.
    pub metrics: StepMetrics,
}
