//! Finite-volume diffusion along a cable.
//!
//! Constructed via the builder pattern: [`CableDiffusion::builder`].

use rxflux_core::{NodeSite, RateError, SpeciesDef, SpeciesId};
use rxflux_rate::{RateContext, RateTerm};
use rxflux_space::Space;

/// Diffusion of each species between neighbouring cells.
///
/// For a node of species `s` at cell `r`:
/// ```text
/// rate = D_s * Σ_nb g(r, nb) * (c_nb - c_r) / V_r
/// ```
/// over the neighbours `nb` that hold a node of the same species. All
/// values come from the step-start snapshot. Species with `D_s = 0`
/// contribute nothing.
///
/// # Construction
///
/// ```
/// use rxflux_core::SpeciesId;
/// use rxflux_terms::CableDiffusion;
///
/// let all = CableDiffusion::new();
/// let ca_only = CableDiffusion::builder()
///     .species(SpeciesId(1))
///     .name("ca_diffusion")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct CableDiffusion {
    name: String,
    species: Option<Vec<SpeciesId>>,
}

/// Builder for [`CableDiffusion`].
///
/// With no `species` calls the term covers every species.
#[derive(Debug)]
pub struct CableDiffusionBuilder {
    name: String,
    species: Vec<SpeciesId>,
}

impl CableDiffusion {
    /// Diffusion of every species, named `"cable_diffusion"`.
    pub fn new() -> Self {
        Self {
            name: "cable_diffusion".to_string(),
            species: None,
        }
    }

    /// Create a new builder.
    pub fn builder() -> CableDiffusionBuilder {
        CableDiffusionBuilder {
            name: "cable_diffusion".to_string(),
            species: Vec::new(),
        }
    }

    fn covers(&self, species: SpeciesId) -> bool {
        self.species.as_ref().is_none_or(|s| s.contains(&species))
    }

    fn coefficient(&self, species: &[SpeciesDef], id: SpeciesId) -> f64 {
        if !self.covers(id) {
            return 0.0;
        }
        species.get(id.0 as usize).map_or(0.0, |d| d.diffusion)
    }
}

impl Default for CableDiffusion {
    fn default() -> Self {
        Self::new()
    }
}

impl CableDiffusionBuilder {
    /// Restrict the term to `species`. May be called repeatedly.
    pub fn species(mut self, species: SpeciesId) -> Self {
        if !self.species.contains(&species) {
            self.species.push(species);
        }
        self
    }

    /// Override the term name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Build the term.
    pub fn build(self) -> Result<CableDiffusion, String> {
        if self.name.is_empty() {
            return Err("name must not be empty".to_string());
        }
        Ok(CableDiffusion {
            name: self.name,
            species: (!self.species.is_empty()).then_some(self.species),
        })
    }
}

impl RateTerm for CableDiffusion {
    fn name(&self) -> &str {
        &self.name
    }

    /// Explicit-Euler stability limit: `min_r V_r / (D_s Σ_nb g(r, nb))`
    /// over diffusing species.
    fn max_dt(&self, space: &dyn Space, species: &[SpeciesDef]) -> Option<f64> {
        let d_max = (0..species.len())
            .map(|i| self.coefficient(species, SpeciesId(i as u32)))
            .fold(0.0_f64, f64::max);
        if d_max <= 0.0 {
            return None;
        }
        (0..space.cell_count())
            .filter_map(|r| {
                let g_sum: f64 = space
                    .neighbours(r)
                    .iter()
                    .filter_map(|&nb| space.coupling(r, nb))
                    .sum();
                (g_sum > 0.0).then(|| space.volume(r) / (d_max * g_sum))
            })
            .reduce(f64::min)
    }

    fn rate(&self, site: NodeSite, ctx: &RateContext<'_>) -> Result<f64, RateError> {
        if ctx.species_def(site.species).is_none() {
            return Err(RateError::ExecutionFailed {
                reason: format!("unknown species {}", site.species),
            });
        }
        let d = self.coefficient(ctx.species(), site.species);
        if d == 0.0 {
            return Ok(0.0);
        }
        let c = ctx
            .snapshot()
            .concentration(site.id)
            .ok_or_else(|| RateError::ExecutionFailed {
                reason: format!("node {} missing from snapshot", site.id),
            })?;

        let space = ctx.space();
        let mut exchange = 0.0;
        for nb in space.neighbours(site.location) {
            let Some(c_nb) = ctx.concentration_at(site.species, nb) else {
                continue;
            };
            let g = space
                .coupling(site.location, nb)
                .ok_or_else(|| RateError::ConstraintViolation {
                    constraint: format!("no coupling between neighbours {} and {nb}", site.location),
                })?;
            exchange += g * (c_nb - c);
        }
        Ok(d * exchange / space.volume(site.location))
    }
}
