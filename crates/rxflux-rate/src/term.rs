//! The [`RateTerm`] trait.

use rxflux_core::{NodeSite, RateError, SpeciesDef};
use rxflux_space::Space;

use crate::context::RateContext;

/// A diffusion or reaction contribution to a node's rate of change.
///
/// # Contract
///
/// - `rate()` MUST be a pure function of the context: same snapshot, same
///   result. It reads step-start values only.
/// - `&self`: terms are stateless and may be called from several threads
///   at once.
/// - `max_dt()` is called once at startup, not per step.
///
/// # Examples
///
/// ```
/// use rxflux_core::{NodeSite, RateError, SpeciesDef};
/// use rxflux_rate::{RateContext, RateTerm};
///
/// struct Production(f64);
///
/// impl RateTerm for Production {
///     fn name(&self) -> &str { "production" }
///
///     fn rate(&self, _site: NodeSite, _ctx: &RateContext<'_>) -> Result<f64, RateError> {
///         Ok(self.0)
///     }
/// }
///
/// assert_eq!(Production(2.0).name(), "production");
/// ```
pub trait RateTerm: Send + Sync + 'static {
    /// Human-readable name for error reporting.
    fn name(&self) -> &str;

    /// Largest stable timestep for this term on `space`, or `None` for no
    /// constraint.
    fn max_dt(&self, space: &dyn Space, species: &[SpeciesDef]) -> Option<f64> {
        let _ = (space, species);
        None
    }

    /// Rate of change of the concentration at `site`, in concentration per
    /// unit time.
    fn rate(&self, site: NodeSite, ctx: &RateContext<'_>) -> Result<f64, RateError>;
}
