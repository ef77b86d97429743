//! Read-only context handed to rate terms.

use rxflux_core::{ConcentrationReader, NodeLocator, SpeciesDef, SpeciesId, StepIndex};
use rxflux_space::Space;

/// Everything a [`RateTerm`](crate::RateTerm) may look at while computing
/// one node's rate.
///
/// Built once per step by the integrator and shared by every node, so it
/// holds only shared references.
#[derive(Clone, Copy)]
pub struct RateContext<'a> {
    snapshot: &'a dyn ConcentrationReader,
    locator: &'a dyn NodeLocator,
    space: &'a dyn Space,
    species: &'a [SpeciesDef],
    step: StepIndex,
    time: f64,
    dt: f64,
}

impl<'a> RateContext<'a> {
    /// Construct a context.
    ///
    /// Typically called by the integrator. For testing, pass mocks from
    /// `rxflux-test-utils`.
    pub fn new(
        snapshot: &'a dyn ConcentrationReader,
        locator: &'a dyn NodeLocator,
        space: &'a dyn Space,
        species: &'a [SpeciesDef],
        step: StepIndex,
        time: f64,
        dt: f64,
    ) -> Self {
        Self {
            snapshot,
            locator,
            space,
            species,
            step,
            time,
            dt,
        }
    }

    /// Step-start concentrations.
    pub fn snapshot(&self) -> &'a dyn ConcentrationReader {
        self.snapshot
    }

    /// Maps `(species, rank)` to nodes.
    pub fn locator(&self) -> &'a dyn NodeLocator {
        self.locator
    }

    /// The geometry. Use `space().downcast_ref::<T>()` for
    /// geometry-specific fast paths.
    pub fn space(&self) -> &'a dyn Space {
        self.space
    }

    /// Species definitions, indexed by `SpeciesId`.
    pub fn species(&self) -> &'a [SpeciesDef] {
        self.species
    }

    /// Definition of one species.
    pub fn species_def(&self, id: SpeciesId) -> Option<&'a SpeciesDef> {
        self.species.get(id.0 as usize)
    }

    /// The step being computed.
    pub fn step(&self) -> StepIndex {
        self.step
    }

    /// Simulation time at the start of the step.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Timestep of the step.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Step-start concentration of `species` at cell `rank`, if a node
    /// holds it.
    pub fn concentration_at(&self, species: SpeciesId, rank: usize) -> Option<f64> {
        let node = self.locator.locate(species, rank)?;
        self.snapshot.concentration(node)
    }
}
