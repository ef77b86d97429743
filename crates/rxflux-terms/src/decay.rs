//! First-order degradation of a single species.

use rxflux_core::{NodeSite, RateError, SpeciesDef, SpeciesId};
use rxflux_rate::{RateContext, RateTerm};
use rxflux_space::Space;

/// `rate = -k * c` for nodes of one species, zero for all others.
#[derive(Debug, Clone)]
pub struct FirstOrderDecay {
    name: String,
    species: SpeciesId,
    k: f64,
}

impl FirstOrderDecay {
    /// Decay of `species` with rate constant `k` (per unit time).
    ///
    /// The term is named `decay[<species>]` so that one term per species
    /// can coexist in a term list.
    pub fn new(species: SpeciesId, k: f64) -> Result<Self, String> {
        if !k.is_finite() || k < 0.0 {
            return Err(format!("k must be finite and >= 0, got {k}"));
        }
        Ok(Self {
            name: format!("decay[{species}]"),
            species,
            k,
        })
    }

    /// The decaying species.
    pub fn species(&self) -> SpeciesId {
        self.species
    }

    /// The rate constant.
    pub fn k(&self) -> f64 {
        self.k
    }
}

impl RateTerm for FirstOrderDecay {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_dt(&self, _space: &dyn Space, _species: &[SpeciesDef]) -> Option<f64> {
        // Explicit Euler stays non-negative for dt <= 1/k.
        (self.k > 0.0).then(|| 1.0 / self.k)
    }

    fn rate(&self, site: NodeSite, ctx: &RateContext<'_>) -> Result<f64, RateError> {
        if site.species != self.species || self.k == 0.0 {
            return Ok(0.0);
        }
        let c = ctx
            .snapshot()
            .concentration(site.id)
            .ok_or_else(|| RateError::ExecutionFailed {
                reason: format!("node {} missing from snapshot", site.id),
            })?;
        Ok(-self.k * c)
    }
}
