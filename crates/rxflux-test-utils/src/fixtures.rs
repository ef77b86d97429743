//! Reusable rate term fixtures.
//!
//! - [`ConstRate`]: the same rate for every node.
//! - [`FailingRate`]: fails on one node from a given step onwards.

use rxflux_core::{NodeId, NodeSite, RateError, SpeciesDef, StepIndex};
use rxflux_rate::{RateContext, RateTerm};
use rxflux_space::Space;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Contributes `value` to every node, optionally with a `max_dt`.
pub struct ConstRate {
    pub name: String,
    pub value: f64,
    pub max_dt: Option<f64>,
}

impl ConstRate {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            max_dt: None,
        }
    }

    /// Impose a timestep limit.
    pub fn with_max_dt(mut self, max_dt: f64) -> Self {
        self.max_dt = Some(max_dt);
        self
    }
}

impl RateTerm for ConstRate {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_dt(&self, _space: &dyn Space, _species: &[SpeciesDef]) -> Option<f64> {
        self.max_dt
    }

    fn rate(&self, _site: NodeSite, _ctx: &RateContext<'_>) -> Result<f64, RateError> {
        Ok(self.value)
    }
}

/// Fails on `node` for every step at or after `from_step`; returns zero
/// otherwise.
///
/// Useful for testing rollback and error attribution in the integrator.
/// Uses `AtomicUsize` for the call counter so it satisfies `Sync`.
pub struct FailingRate {
    pub name: String,
    pub node: NodeId,
    pub from_step: StepIndex,
    call_count: AtomicUsize,
}

impl FailingRate {
    pub fn new(name: impl Into<String>, node: NodeId, from_step: StepIndex) -> Self {
        Self {
            name: name.into(),
            node,
            from_step,
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `rate()` has been called, over all nodes.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Reset the call counter.
    pub fn reset(&self) {
        self.call_count.store(0, Ordering::Relaxed);
    }
}

impl RateTerm for FailingRate {
    fn name(&self) -> &str {
        &self.name
    }

    fn rate(&self, site: NodeSite, ctx: &RateContext<'_>) -> Result<f64, RateError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if site.id == self.node && ctx.step() >= self.from_step {
            return Err(RateError::ExecutionFailed {
                reason: format!(
                    "deliberate failure on node {} at step {}",
                    site.id,
                    ctx.step()
                ),
            });
        }
        Ok(0.0)
    }
}
