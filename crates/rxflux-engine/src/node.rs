//! Nodes and the `(species, location)` site index.

use indexmap::IndexMap;
use rxflux_core::{NodeId, NodeLocator, NodeSite, SpeciesId};
use rxflux_flux::FluxRegistry;

/// One tracked concentration: a species at a cell of the geometry.
///
/// Concentration changes only through the integrator, once per completed
/// step or between steps via `set_concentration`/`initialize`.
#[derive(Clone, Debug)]
pub struct Node {
    site: NodeSite,
    concentration: f64,
    pending_flux: f64,
    fluxes: FluxRegistry,
}

impl Node {
    pub(crate) fn new(site: NodeSite, concentration: f64) -> Self {
        Self {
            site,
            concentration,
            pending_flux: 0.0,
            fluxes: FluxRegistry::new(site.id),
        }
    }

    /// The node's id.
    pub fn id(&self) -> NodeId {
        self.site.id
    }

    /// Species and location.
    pub fn site(&self) -> NodeSite {
        self.site
    }

    /// Species whose concentration this node holds.
    pub fn species(&self) -> SpeciesId {
        self.site.species
    }

    /// Cell rank in the geometry.
    pub fn location(&self) -> usize {
        self.site.location
    }

    /// Current concentration.
    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    /// Total injected flux applied by the most recent completed step.
    ///
    /// Zero after initialization.
    pub fn pending_flux(&self) -> f64 {
        self.pending_flux
    }

    /// The node's flux sources.
    pub fn fluxes(&self) -> &FluxRegistry {
        &self.fluxes
    }

    pub(crate) fn fluxes_mut(&mut self) -> &mut FluxRegistry {
        &mut self.fluxes
    }

    pub(crate) fn set_concentration(&mut self, value: f64) {
        self.concentration = value;
    }

    pub(crate) fn commit(&mut self, concentration: f64, injected: f64) {
        self.concentration = concentration;
        self.pending_flux = injected;
    }

    pub(crate) fn reset(&mut self, concentration: f64) {
        self.concentration = concentration;
        self.pending_flux = 0.0;
    }
}

/// Lookup from `(species, location)` to the node occupying it.
#[derive(Clone, Debug, Default)]
pub(crate) struct SiteIndex {
    sites: IndexMap<(SpeciesId, usize), NodeId>,
}

impl SiteIndex {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            sites: IndexMap::with_capacity(n),
        }
    }

    pub(crate) fn get(&self, species: SpeciesId, location: usize) -> Option<NodeId> {
        self.sites.get(&(species, location)).copied()
    }

    pub(crate) fn insert(&mut self, site: NodeSite) {
        self.sites.insert((site.species, site.location), site.id);
    }

    pub(crate) fn remove(&mut self, site: NodeSite) {
        self.sites.swap_remove(&(site.species, site.location));
    }
}

impl NodeLocator for SiteIndex {
    fn locate(&self, species: SpeciesId, location: usize) -> Option<NodeId> {
        self.get(species, location)
    }
}
